// Attack tactic - chase the ball down and strike through it

use super::{nudge_probability, steer_toward, Tactic, INITIAL_PROBABILITY};
use crate::arena::{ArenaSnapshot, TickContext};
use crate::features::FeatureVector;

/// Paddle speed while chasing the ball, table units per second.
const CHASE_SPEED: f32 = 1.8;

/// Separation at which the strike counts as delivered.
const CONTACT_DIST: f32 = 0.06;

/// Squared distance beyond which the opponent is out of engagement range.
const OPPONENT_FAR_DIST_SQ: f32 = 1.44;

/// Weight multiplier when the opponent is far away and not closing.
const OUT_OF_RANGE_DISCOUNT: f64 = 0.1;

pub struct Attack {
    probability: f64,
}

impl Attack {
    pub fn new() -> Self {
        Self {
            probability: INITIAL_PROBABILITY,
        }
    }
}

impl Default for Attack {
    fn default() -> Self {
        Self::new()
    }
}

impl Tactic for Attack {
    fn name(&self) -> &str {
        "attack"
    }

    fn apply(&self, tick: &mut TickContext) -> bool {
        steer_toward(
            tick.paddle,
            tick.ball.x,
            tick.ball.y,
            CHASE_SPEED,
            CONTACT_DIST,
            tick.dt,
        )
    }

    fn base_probability(&self) -> f64 {
        self.probability
    }

    fn selection_weight(&self, features: &FeatureVector) -> f64 {
        let mut weight = self.probability;
        // Charging at the ball is pointless when the opponent has fallen far
        // back and is not closing
        if features.opponent_dist_sq > OPPONENT_FAR_DIST_SQ && features.opponent_ttc <= 0.0 {
            weight *= OUT_OF_RANGE_DISCOUNT;
        }
        weight
    }

    fn predict_next(&self, snapshot: &ArenaSnapshot) -> ArenaSnapshot {
        let mut next = snapshot.clone();
        next.ball = snapshot.ball.advance(snapshot.dt);
        steer_toward(
            &mut next.paddle,
            snapshot.ball.x,
            snapshot.ball.y,
            CHASE_SPEED,
            CONTACT_DIST,
            snapshot.dt,
        );
        next
    }

    fn adapt_probability(&mut self, feedback: f64) {
        self.probability = nudge_probability(self.probability, feedback);
    }
}
