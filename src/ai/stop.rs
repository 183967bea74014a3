// Stop tactic - kill all paddle motion immediately

use super::{nudge_probability, Tactic, INITIAL_PROBABILITY};
use crate::arena::{ArenaSnapshot, TickContext};
use crate::features::FeatureVector;

/// Weight multiplier when the ball is receding from the paddle.
const RECEDING_BOOST: f64 = 1.5;

/// Weight multiplier otherwise; standing still is rarely the best answer
/// while the ball is in play.
const ENGAGED_DISCOUNT: f64 = 0.5;

pub struct Stop {
    probability: f64,
}

impl Stop {
    pub fn new() -> Self {
        Self {
            probability: INITIAL_PROBABILITY,
        }
    }
}

impl Default for Stop {
    fn default() -> Self {
        Self::new()
    }
}

impl Tactic for Stop {
    fn name(&self) -> &str {
        "stop"
    }

    fn apply(&self, tick: &mut TickContext) -> bool {
        tick.paddle.vx = 0.0;
        tick.paddle.vy = 0.0;
        true
    }

    fn base_probability(&self) -> f64 {
        self.probability
    }

    fn selection_weight(&self, features: &FeatureVector) -> f64 {
        if features.ball_ttc < 0.0 {
            self.probability * RECEDING_BOOST
        } else {
            self.probability * ENGAGED_DISCOUNT
        }
    }

    fn predict_next(&self, snapshot: &ArenaSnapshot) -> ArenaSnapshot {
        let mut next = snapshot.clone();
        next.ball = snapshot.ball.advance(snapshot.dt);
        next.paddle.vx = 0.0;
        next.paddle.vy = 0.0;
        next
    }

    fn adapt_probability(&mut self, feedback: f64) {
        self.probability = nudge_probability(self.probability, feedback);
    }
}
