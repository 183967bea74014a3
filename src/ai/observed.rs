// Observed opponent movement - descriptive only, kept for prediction

use super::{nudge_probability, Tactic};
use crate::arena::{ArenaSnapshot, Body, TickContext};
use crate::features::FeatureVector;

/// Physical change of the opponent's body between two snapshots, replayed
/// during forward prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpponentStep {
    pub dx: f32,
    pub dy: f32,
    pub dvx: f32,
    pub dvy: f32,
}

impl OpponentStep {
    pub fn between(earlier: &Body, later: &Body) -> Self {
        Self {
            dx: later.x - earlier.x,
            dy: later.y - earlier.y,
            dvx: later.vx - earlier.vx,
            dvy: later.vy - earlier.vy,
        }
    }
}

/// One distinct movement the opponent has been seen making from a state.
///
/// Unlike the paddle tactics, the base probability here is a running
/// frequency estimate: observations of this move divided by all
/// observations at the same origin state.
pub struct ObservedMove {
    delta: [f32; 4],
    step: OpponentStep,
    observations: u64,
    probability: f64,
}

impl ObservedMove {
    pub fn new(delta: [f32; 4], step: OpponentStep) -> Self {
        Self {
            delta,
            step,
            observations: 1,
            probability: 0.0,
        }
    }

    /// The feature-space movement delta identifying this move.
    pub fn delta(&self) -> [f32; 4] {
        self.delta
    }

    pub fn observations(&self) -> u64 {
        self.observations
    }

    pub fn record_observation(&mut self) {
        self.observations += 1;
    }

    /// Refresh the frequency estimate against the origin state's total.
    pub fn set_frequency(&mut self, total_observations: u64) {
        if total_observations > 0 {
            self.probability = self.observations as f64 / total_observations as f64;
        }
    }
}

impl Tactic for ObservedMove {
    fn name(&self) -> &str {
        "observed-move"
    }

    /// Never executed, only predicted with.
    fn apply(&self, _tick: &mut TickContext) -> bool {
        true
    }

    fn base_probability(&self) -> f64 {
        self.probability
    }

    fn selection_weight(&self, _features: &FeatureVector) -> f64 {
        // No hand-tuned heuristics on the observed side; the frequency
        // estimate is the whole weight
        self.probability
    }

    fn predict_next(&self, snapshot: &ArenaSnapshot) -> ArenaSnapshot {
        let mut next = snapshot.clone();
        next.ball = snapshot.ball.advance(snapshot.dt);
        next.opponent.x += self.step.dx;
        next.opponent.y += self.step.dy;
        next.opponent.vx += self.step.dvx;
        next.opponent.vy += self.step.dvy;
        next
    }

    /// Present for interface uniformity; the observation pipeline adapts
    /// through `set_frequency` instead.
    fn adapt_probability(&mut self, feedback: f64) {
        self.probability = nudge_probability(self.probability, feedback);
    }
}
