// Paddle-side spatial action index

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use tracing::debug;

use super::{default_tactics, lock_tactic, ActionState, Candidate};
use crate::config::{ArenaConfig, FeatureConfig, IndexConfig};
use crate::features::{progress_factor, voxelize, FeatureVector};
use crate::index::KdTree;

/// The controlled paddle's repertoire, indexed by voxelized state.
///
/// Decision-path queries generalize over a wide radius; a miss lazily seeds
/// the region with the canonical tactic set, so this side never reports "no
/// options". States are never evicted.
pub struct PaddleModel {
    index: Mutex<KdTree<Arc<ActionState>>>,
    arena: ArenaConfig,
    round_factor: [f32; 4],
    query_radius: f32,
}

impl PaddleModel {
    pub fn new(arena: ArenaConfig, features: &FeatureConfig, index: &IndexConfig) -> Self {
        Self {
            index: Mutex::new(KdTree::new()),
            arena,
            round_factor: features.round_factor,
            query_radius: index.query_radius,
        }
    }

    /// All candidate tactics near the given state, heaviest first.
    ///
    /// Weights are regenerated on every call as
    /// `progress_factor(features) * tactic.selection_weight(features)`.
    pub fn best_candidates(&self, features: &FeatureVector) -> Vec<Candidate> {
        let voxel = voxelize(features, &self.round_factor);
        let key = voxel.as_array();

        let mut index = self.index.lock().unwrap_or_else(|e| e.into_inner());
        let mut states: Vec<Arc<ActionState>> = index
            .within_radius(&key, self.query_radius)
            .into_iter()
            .map(|(_, state)| state.clone())
            .collect();

        if states.is_empty() {
            let state = Arc::new(ActionState::new(voxel, default_tactics(&self.arena)));
            index.insert(key, state.clone());
            debug!(states = index.len(), "seeded action state for new region");
            states.push(state);
        }
        drop(index);

        let progress = progress_factor(features);
        let mut candidates = Vec::new();
        for state in &states {
            for tactic in state.tactics() {
                let weight = progress * lock_tactic(tactic).selection_weight(features);
                candidates.push(Candidate {
                    weight,
                    tactic: tactic.clone(),
                    state: state.clone(),
                });
            }
        }
        candidates.sort_by(|a, b| b.weight.partial_cmp(&a.weight).unwrap_or(Ordering::Equal));
        candidates
    }

    /// Number of distinct state regions learned so far.
    pub fn state_count(&self) -> usize {
        self.index.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arena::{ArenaSnapshot, Body};
    use crate::config::Config;
    use crate::features::extract;

    fn model() -> PaddleModel {
        let config = Config::default();
        PaddleModel::new(config.arena.clone(), &config.features, &config.index)
    }

    #[test]
    fn test_query_miss_seeds_default_tactics() {
        let model = model();
        let features = FeatureVector::from_array([0.5, 0.5, 0.0, 0.0]);

        let candidates = model.best_candidates(&features);
        assert_eq!(candidates.len(), 3);
        assert_eq!(model.state_count(), 1);
    }

    #[test]
    fn test_repeat_query_reuses_the_region() {
        let model = model();
        let features = FeatureVector::from_array([0.5, 0.5, 0.0, 0.0]);

        let first = model.best_candidates(&features);
        let second = model.best_candidates(&features);

        assert_eq!(model.state_count(), 1);
        // Same underlying tactics come back, not fresh copies
        assert!(first.iter().any(|a| second
            .iter()
            .any(|b| Arc::ptr_eq(&a.tactic, &b.tactic))));
    }

    #[test]
    fn test_distant_states_get_their_own_region() {
        let model = model();
        let near = FeatureVector::from_array([0.25, 0.25, 0.0, 0.0]);
        let far = FeatureVector::from_array([6.0, 4.0, 0.0, 0.0]);

        model.best_candidates(&near);
        model.best_candidates(&far);
        assert_eq!(model.state_count(), 2);
    }

    #[test]
    fn test_defend_outranks_attack_when_ball_far_and_opponent_near() {
        // Ball stationary far from the paddle, paddle stationary near the
        // opponent: the retreat behavior must come out on top of the chase.
        let model = model();
        let snapshot = ArenaSnapshot::new(
            Body::new(0.3, 0.6),
            Body::new(1.5, 0.9),
            Body::new(0.5, 0.6),
            1.0 / 60.0,
        );
        let features = extract(&snapshot);

        let candidates = model.best_candidates(&features);
        let rank_of = |name: &str| {
            candidates
                .iter()
                .position(|c| lock_tactic(&c.tactic).name() == name)
                .expect("tactic present")
        };

        assert!(rank_of("defend") < rank_of("attack"));
        assert_eq!(lock_tactic(&candidates[0].tactic).name(), "defend");
    }

    #[test]
    fn test_candidates_sorted_heaviest_first() {
        let model = model();
        let features = FeatureVector::from_array([1.0, 0.3, 0.0, 0.0]);

        let candidates = model.best_candidates(&features);
        for pair in candidates.windows(2) {
            assert!(pair[0].weight >= pair[1].weight);
        }
    }
}
