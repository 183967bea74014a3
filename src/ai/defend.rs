// Defend tactic - fall back to the guard point in front of the goal

use super::{nudge_probability, steer_toward, Tactic, INITIAL_PROBABILITY};
use crate::arena::{ArenaSnapshot, TickContext};
use crate::features::FeatureVector;

/// Paddle speed while retreating, table units per second.
const GUARD_SPEED: f32 = 1.4;

/// Separation at which the paddle counts as holding the guard point.
const ARRIVE_DIST: f32 = 0.04;

/// Squared distance beyond which the ball is "far" from the paddle.
const BALL_FAR_DIST_SQ: f32 = 0.64;

/// Weight multiplier when the ball is far away and not approaching.
const HOLD_BOOST: f64 = 1.6;

pub struct Defend {
    probability: f64,
    guard_x: f32,
    guard_y: f32,
}

impl Defend {
    pub fn new(guard_x: f32, guard_y: f32) -> Self {
        Self {
            probability: INITIAL_PROBABILITY,
            guard_x,
            guard_y,
        }
    }
}

impl Tactic for Defend {
    fn name(&self) -> &str {
        "defend"
    }

    fn apply(&self, tick: &mut TickContext) -> bool {
        steer_toward(
            tick.paddle,
            self.guard_x,
            self.guard_y,
            GUARD_SPEED,
            ARRIVE_DIST,
            tick.dt,
        )
    }

    fn base_probability(&self) -> f64 {
        self.probability
    }

    fn selection_weight(&self, features: &FeatureVector) -> f64 {
        let mut weight = self.probability;
        // A distant ball that is not coming in means the goal is the place
        // to be
        if features.ball_dist_sq > BALL_FAR_DIST_SQ && features.ball_ttc <= 0.0 {
            weight *= HOLD_BOOST;
        }
        weight
    }

    fn predict_next(&self, snapshot: &ArenaSnapshot) -> ArenaSnapshot {
        let mut next = snapshot.clone();
        next.ball = snapshot.ball.advance(snapshot.dt);
        steer_toward(
            &mut next.paddle,
            self.guard_x,
            self.guard_y,
            GUARD_SPEED,
            ARRIVE_DIST,
            snapshot.dt,
        );
        next
    }

    fn adapt_probability(&mut self, feedback: f64) {
        self.probability = nudge_probability(self.probability, feedback);
    }
}
