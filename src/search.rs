// Timeout-bounded adversarial search over predicted states

use std::sync::Arc;

use crate::ai::{lock_tactic, Candidate, OpponentModel, PaddleModel};
use crate::arena::ArenaSnapshot;
use crate::control::SessionFlags;
use crate::features;

/// Depth-limited two-ply-alternating minimax: the paddle maximizes, the
/// observed opponent minimizes, candidates come from each side's spatial
/// index pre-sorted by weight.
///
/// Best-effort by design: depth 0, the satisfied flag or the watchdog's
/// timeout flag all short-circuit to the head of the sorted candidate list,
/// so a usable (if shallow) decision always comes back. Every recursive
/// call observes the timeout flag; termination within the wall-clock budget
/// is the watchdog's guarantee, not depth's.
pub struct Planner {
    paddle: Arc<PaddleModel>,
    opponent: Arc<OpponentModel>,
    flags: Arc<SessionFlags>,
    depth: u32,
}

impl Planner {
    pub fn new(
        paddle: Arc<PaddleModel>,
        opponent: Arc<OpponentModel>,
        flags: Arc<SessionFlags>,
        depth: u32,
    ) -> Self {
        Self {
            paddle,
            opponent,
            flags,
            depth,
        }
    }

    /// Best tactic for the snapshot at the configured depth.
    pub fn plan(&self, snapshot: &ArenaSnapshot) -> Option<Candidate> {
        self.search(snapshot, self.depth).map(|(_, candidate)| candidate)
    }

    /// Full search result including the minimax score. Depth counts ply
    /// pairs: one paddle move plus one opponent reply each.
    pub fn search(&self, snapshot: &ArenaSnapshot, depth: u32) -> Option<(f64, Candidate)> {
        self.max_ply(snapshot, depth)
    }

    fn shortcut(&self) -> bool {
        self.flags.satisfied() || self.flags.timed_out()
    }

    fn max_ply(&self, snapshot: &ArenaSnapshot, depth: u32) -> Option<(f64, Candidate)> {
        let features = features::extract(snapshot);
        let candidates = self.paddle.best_candidates(&features);
        // The paddle side lazily seeds, so this is only empty if the
        // repertoire factory ever produced nothing
        let first = candidates.first()?.clone();

        if depth == 0 || self.shortcut() {
            // The list's own sort order is the fallback heuristic
            return Some((first.weight, first));
        }

        let mut best: Option<(f64, Candidate)> = None;
        for candidate in candidates {
            if self.flags.timed_out() {
                break;
            }
            let predicted = lock_tactic(&candidate.tactic).predict_next(snapshot);
            let score = match self.min_ply(&predicted, depth) {
                Some(score) => score,
                // No opponent prediction from here: fall back to the
                // candidate's own static weight
                None => candidate.weight,
            };
            if best.as_ref().map_or(true, |(top, _)| score > *top) {
                best = Some((score, candidate));
            }
        }
        best.or(Some((first.weight, first)))
    }

    fn min_ply(&self, snapshot: &ArenaSnapshot, depth: u32) -> Option<f64> {
        let features = features::extract(snapshot);
        let candidates = self.opponent.candidates(&features);
        let first_weight = candidates.first()?.0;

        if depth == 0 || self.shortcut() {
            return Some(first_weight);
        }

        let mut worst: Option<f64> = None;
        for (weight, tactic) in &candidates {
            if self.flags.timed_out() {
                break;
            }
            let predicted = lock_tactic(tactic).predict_next(snapshot);
            let score = match self.max_ply(&predicted, depth - 1) {
                Some((score, _)) => score,
                None => *weight,
            };
            if worst.map_or(true, |bottom| score < bottom) {
                worst = Some(score);
            }
        }
        worst.or(Some(first_weight))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::{lock_tactic, OpponentStep};
    use crate::arena::Body;
    use crate::config::Config;
    use crate::features::FeatureVector;

    fn planner(depth: u32) -> Planner {
        let config = Config::default();
        let paddle = Arc::new(PaddleModel::new(
            config.arena.clone(),
            &config.features,
            &config.index,
        ));
        let opponent = Arc::new(OpponentModel::new(&config.features, &config.index));
        Planner::new(paddle, opponent, Arc::new(SessionFlags::new()), depth)
    }

    fn snapshot() -> ArenaSnapshot {
        ArenaSnapshot::new(
            Body::new(0.3, 0.6),
            Body::with_velocity(1.2, 0.7, -0.6, 0.0),
            Body::new(2.0, 0.6),
            1.0 / 60.0,
        )
    }

    #[test]
    fn test_depth_zero_returns_sorted_head() {
        let planner = planner(0);
        let snapshot = snapshot();

        let head = {
            let features = crate::features::extract(&snapshot);
            planner.paddle.best_candidates(&features).remove(0)
        };
        let (score, chosen) = planner.search(&snapshot, 0).expect("candidate");

        assert!(Arc::ptr_eq(&chosen.tactic, &head.tactic));
        assert_eq!(score, head.weight);
    }

    #[test]
    fn test_preset_timeout_equals_depth_zero_result() {
        let planner = planner(3);
        let snapshot = snapshot();

        let (baseline_score, baseline) = planner.search(&snapshot, 0).expect("candidate");

        planner.flags.set_timeout();
        let (score, chosen) = planner.search(&snapshot, 3).expect("candidate");

        assert!(Arc::ptr_eq(&chosen.tactic, &baseline.tactic));
        assert_eq!(score, baseline_score);
    }

    #[test]
    fn test_satisfied_flag_short_circuits() {
        let planner = planner(3);
        let snapshot = snapshot();

        planner.flags.set_satisfied(true);
        let (_, chosen) = planner.search(&snapshot, 3).expect("candidate");

        let head = {
            let features = crate::features::extract(&snapshot);
            planner.paddle.best_candidates(&features).remove(0)
        };
        assert!(Arc::ptr_eq(&chosen.tactic, &head.tactic));
    }

    #[test]
    fn test_empty_opponent_model_falls_back_to_static_weights() {
        // With no opponent observations every recursion reports "no
        // prediction" and the static sort order decides
        let planner = planner(3);
        let snapshot = snapshot();

        let head = {
            let features = crate::features::extract(&snapshot);
            planner.paddle.best_candidates(&features).remove(0)
        };
        let (score, chosen) = planner.search(&snapshot, 3).expect("candidate");

        assert!(Arc::ptr_eq(&chosen.tactic, &head.tactic));
        assert_eq!(score, head.weight);
    }

    #[test]
    fn test_search_with_observations_still_picks_paddle_tactic() {
        let planner = planner(2);
        let snapshot = snapshot();

        // Teach the opponent model a movement near the searched states
        let origin = crate::features::extract(&snapshot);
        let delta = FeatureVector::from_array([0.1, 0.0, 0.0, 0.0]);
        let step = OpponentStep {
            dx: 0.05,
            dy: 0.0,
            dvx: 0.0,
            dvy: 0.0,
        };
        planner.opponent.record(&origin, &delta, step);

        let (score, chosen) = planner.search(&snapshot, 2).expect("candidate");
        assert!(score.is_finite());

        let name = lock_tactic(&chosen.tactic).name().to_string();
        assert!(["attack", "defend", "stop"].contains(&name.as_str()));
    }
}
