// A discretized state bucket and its candidate tactics

use std::sync::Arc;

use super::{lock_tactic, SharedTactic, CREDIT_SHARE};
use crate::features::FeatureVector;

/// Binds one voxel region of state space to its ordered tactic set.
///
/// Created lazily on the first query miss for the region, never destroyed
/// during a session. The tactic list is fixed at creation; only the
/// probabilities inside the tactics change.
pub struct ActionState {
    voxel: FeatureVector,
    tactics: Vec<SharedTactic>,
}

impl ActionState {
    pub fn new(voxel: FeatureVector, tactics: Vec<SharedTactic>) -> Self {
        Self { voxel, tactics }
    }

    pub fn voxel(&self) -> &FeatureVector {
        &self.voxel
    }

    pub fn tactics(&self) -> &[SharedTactic] {
        &self.tactics
    }

    /// Distribute outcome feedback across this state's tactics: the chosen
    /// tactic is credited `feedback * CREDIT_SHARE`, every alternative is
    /// debited an equal share of the same amount.
    pub fn adapt_probabilities(&self, chosen: &SharedTactic, feedback: f64) {
        let alternatives = self
            .tactics
            .iter()
            .filter(|tactic| !Arc::ptr_eq(tactic, chosen))
            .count();

        for tactic in &self.tactics {
            let mut guard = lock_tactic(tactic);
            if Arc::ptr_eq(tactic, chosen) {
                guard.adapt_probability(feedback * CREDIT_SHARE);
            } else if alternatives > 0 {
                guard.adapt_probability(feedback * (-1.0 / alternatives as f64) * CREDIT_SHARE);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::default_tactics;
    use crate::config::ArenaConfig;

    fn fresh_state() -> ActionState {
        let voxel = FeatureVector::from_array([0.0; 4]);
        ActionState::new(voxel, default_tactics(&ArenaConfig::default()))
    }

    fn probabilities(state: &ActionState) -> Vec<f64> {
        state
            .tactics()
            .iter()
            .map(|t| lock_tactic(t).base_probability())
            .collect()
    }

    #[test]
    fn test_positive_feedback_credits_chosen_debits_rest() {
        let state = fresh_state();
        let chosen = state.tactics()[0].clone();

        state.adapt_probabilities(&chosen, 1.0);

        let probs = probabilities(&state);
        // Chosen: 0.5 + 0.2 * (1.0 * 0.5) = 0.6
        assert!((probs[0] - 0.6).abs() < 1e-12);
        // Others: 0.5 + 0.2 * (1.0 * (-1/2) * 0.5) = 0.45
        assert!((probs[1] - 0.45).abs() < 1e-12);
        assert!((probs[2] - 0.45).abs() < 1e-12);
    }

    #[test]
    fn test_negative_feedback_mirrors_the_update() {
        let state = fresh_state();
        let chosen = state.tactics()[1].clone();

        state.adapt_probabilities(&chosen, -1.0);

        let probs = probabilities(&state);
        assert!((probs[1] - 0.4).abs() < 1e-12);
        assert!((probs[0] - 0.55).abs() < 1e-12);
        assert!((probs[2] - 0.55).abs() < 1e-12);
    }

    #[test]
    fn test_probabilities_clamp_at_bounds() {
        let state = fresh_state();
        let chosen = state.tactics()[0].clone();

        for _ in 0..10 {
            state.adapt_probabilities(&chosen, 1.0);
        }

        let probs = probabilities(&state);
        assert_eq!(probs[0], 1.0);
        assert_eq!(probs[1], 0.0);
        assert_eq!(probs[2], 0.0);

        // One more round must stay inside [0, 1]
        state.adapt_probabilities(&chosen, 1.0);
        let probs = probabilities(&state);
        assert_eq!(probs[0], 1.0);
        assert_eq!(probs[1], 0.0);
    }
}
