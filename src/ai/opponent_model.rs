// Observed-side movement model

use std::cmp::Ordering;
use std::sync::{Arc, Mutex};

use tracing::trace;

use super::{ObservedMove, OpponentStep, SharedTactic, Tactic};
use crate::config::{FeatureConfig, IndexConfig};
use crate::features::{progress_factor, voxelize, FeatureVector};
use crate::index::KdTree;

/// The moves seen from one origin state, with the running observation total
/// the frequency estimates are computed against.
struct MoveSet {
    moves: KdTree<Arc<Mutex<ObservedMove>>>,
    total_observations: u64,
}

impl MoveSet {
    fn new() -> Self {
        Self {
            moves: KdTree::new(),
            total_observations: 0,
        }
    }
}

/// What the opponent has been seen doing, indexed by the voxelized state
/// the movement started from.
///
/// Unlike the paddle side there is no lazy seeding: a state nobody has
/// moved from yet legitimately has no prediction, and callers must treat an
/// empty candidate list as exactly that.
pub struct OpponentModel {
    states: Mutex<KdTree<Arc<Mutex<MoveSet>>>>,
    round_factor: [f32; 4],
    query_radius: f32,
    match_radius: f32,
}

impl OpponentModel {
    pub fn new(features: &FeatureConfig, index: &IndexConfig) -> Self {
        Self {
            states: Mutex::new(KdTree::new()),
            round_factor: features.round_factor,
            query_radius: index.query_radius,
            match_radius: index.match_radius(),
        }
    }

    /// Record one observed movement: the features of the snapshot it began
    /// from, the feature-space delta it produced, and the opponent's
    /// physical step for replay during prediction.
    ///
    /// Upserts are radius-bounded on both levels: an origin or delta within
    /// the tight match radius of an existing entry updates it in place.
    pub fn record(&self, origin: &FeatureVector, delta: &FeatureVector, step: OpponentStep) {
        let key = voxelize(origin, &self.round_factor).as_array();

        let mut states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let found = states
            .nearest_within(&key, self.match_radius)
            .map(|(_, set)| set.clone());
        let set = match found {
            Some(set) => set,
            None => {
                let set = Arc::new(Mutex::new(MoveSet::new()));
                states.insert(key, set.clone());
                set
            }
        };
        drop(states);

        let mut set = set.lock().unwrap_or_else(|e| e.into_inner());
        set.total_observations += 1;

        let delta_key = delta.as_array();
        let hit = set
            .moves
            .nearest_within(&delta_key, self.match_radius)
            .map(|(_, observed)| observed.clone());
        match hit {
            Some(observed) => observed
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .record_observation(),
            None => {
                trace!(?delta_key, "new observed movement");
                set.moves
                    .insert(delta_key, Arc::new(Mutex::new(ObservedMove::new(delta_key, step))));
            }
        }

        // Frequencies shift for every move at this origin, not just the one
        // that was hit
        let total = set.total_observations;
        for observed in set.moves.values() {
            observed
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .set_frequency(total);
        }
    }

    /// Candidate opponent movements near a state, lightest first (the
    /// minimizing ply consumes these). May be empty.
    pub fn candidates(&self, features: &FeatureVector) -> Vec<(f64, SharedTactic)> {
        let key = voxelize(features, &self.round_factor).as_array();

        let states = self.states.lock().unwrap_or_else(|e| e.into_inner());
        let sets: Vec<Arc<Mutex<MoveSet>>> = states
            .within_radius(&key, self.query_radius)
            .into_iter()
            .map(|(_, set)| set.clone())
            .collect();
        drop(states);

        let progress = progress_factor(features);
        let mut candidates: Vec<(f64, SharedTactic)> = Vec::new();
        for set in sets {
            let set = set.lock().unwrap_or_else(|e| e.into_inner());
            for observed in set.moves.values() {
                let weight = {
                    let guard = observed.lock().unwrap_or_else(|e| e.into_inner());
                    progress * guard.selection_weight(features)
                };
                let tactic: SharedTactic = observed.clone();
                candidates.push((weight, tactic));
            }
        }
        candidates.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(Ordering::Equal));
        candidates
    }

    /// Number of distinct origin states observed so far.
    pub fn state_count(&self) -> usize {
        self.states.lock().unwrap_or_else(|e| e.into_inner()).len()
    }
}
