// Feature extraction and discretization

use crate::arena::{ArenaSnapshot, Body};

/// Speeds below this are treated as "not moving" for time-to-contact.
/// Guards the division in the TTC formula.
pub const VELOCITY_THRESHOLD: f32 = 0.05;

/// Per-dimension rounding factor for voxelization: features are rounded to
/// the nearest multiple of 1/factor after the 1-decimal rounding step.
pub const DEFAULT_ROUND_FACTOR: [f32; 4] = [4.0, 4.0, 4.0, 4.0];

/// Four scalar features derived from a snapshot.
///
/// The order is fixed and significant: all discretization and indexing
/// operate positionally on `as_array()`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector {
    /// Squared distance from the paddle to the ball.
    pub ball_dist_sq: f32,
    /// Squared distance from the opponent to the paddle.
    pub opponent_dist_sq: f32,
    /// Time-to-contact of the ball toward the paddle.
    pub ball_ttc: f32,
    /// Time-to-contact of the paddle toward the opponent.
    pub opponent_ttc: f32,
}

impl FeatureVector {
    pub const DIMS: usize = 4;

    pub fn as_array(&self) -> [f32; 4] {
        [
            self.ball_dist_sq,
            self.opponent_dist_sq,
            self.ball_ttc,
            self.opponent_ttc,
        ]
    }

    pub fn from_array(values: [f32; 4]) -> Self {
        Self {
            ball_dist_sq: values[0],
            opponent_dist_sq: values[1],
            ball_ttc: values[2],
            opponent_ttc: values[3],
        }
    }

    /// Component-wise difference `self - earlier`, the movement delta
    /// recorded by the observation worker.
    pub fn delta(&self, earlier: &FeatureVector) -> FeatureVector {
        FeatureVector {
            ball_dist_sq: self.ball_dist_sq - earlier.ball_dist_sq,
            opponent_dist_sq: self.opponent_dist_sq - earlier.opponent_dist_sq,
            ball_ttc: self.ball_ttc - earlier.ball_ttc,
            opponent_ttc: self.opponent_ttc - earlier.opponent_ttc,
        }
    }
}

/// Derive the feature vector for a snapshot. Pure and infallible.
pub fn extract(snapshot: &ArenaSnapshot) -> FeatureVector {
    FeatureVector {
        ball_dist_sq: snapshot.paddle.dist_sq(&snapshot.ball),
        opponent_dist_sq: snapshot.opponent.dist_sq(&snapshot.paddle),
        ball_ttc: time_to_contact(&snapshot.ball, &snapshot.paddle),
        opponent_ttc: time_to_contact(&snapshot.paddle, &snapshot.opponent),
    }
}

/// Estimate the time until `mover` reaches `target`.
///
/// If neither body is moving faster than `VELOCITY_THRESHOLD` the pair is
/// treated as already co-located and the estimate is 0. Otherwise the
/// estimate is `(separation / speed) * cos(angle)` where `angle` is between
/// the separation vector and the moving body's velocity: positive when
/// closing, near-zero or negative when not meaningfully approaching.
///
/// The mover's own motion is preferred; when only the target moves, its
/// motion is used instead and the result is floored at 0 so a reversing
/// approach never yields a negative estimate.
pub fn time_to_contact(mover: &Body, target: &Body) -> f32 {
    let mover_speed = mover.speed();
    let target_speed = target.speed();

    if mover_speed < VELOCITY_THRESHOLD && target_speed < VELOCITY_THRESHOLD {
        return 0.0;
    }

    if mover_speed >= VELOCITY_THRESHOLD {
        directed_ttc(mover, target)
    } else {
        // Only the target is moving: measure its approach toward the mover,
        // floored at 0.
        directed_ttc(target, mover).max(0.0)
    }
}

/// TTC of `from` toward `to` using `from`'s velocity. `from.speed()` is at
/// least `VELOCITY_THRESHOLD` when called, so the division is safe.
fn directed_ttc(from: &Body, to: &Body) -> f32 {
    let sx = to.x - from.x;
    let sy = to.y - from.y;
    let dist = (sx * sx + sy * sy).sqrt();
    if dist < f32::EPSILON {
        // Already co-located
        return 0.0;
    }

    let speed = from.speed();
    let cos_angle = (sx * from.vx + sy * from.vy) / (dist * speed);
    (dist / speed) * cos_angle
}

/// Discretize a feature vector into its voxel key: round each component to
/// 1 decimal digit, then to the nearest multiple of `1/round_factor[dim]`.
///
/// Two snapshots mapping to the same voxel are "the same state" for lookup
/// purposes. Idempotent: `voxelize(voxelize(v)) == voxelize(v)`.
pub fn voxelize(features: &FeatureVector, round_factor: &[f32; 4]) -> FeatureVector {
    let mut values = features.as_array();
    for (value, factor) in values.iter_mut().zip(round_factor.iter()) {
        let tenths = (*value * 10.0).round() / 10.0;
        *value = (tenths * factor).round() / factor;
    }
    FeatureVector::from_array(values)
}

/// Heuristic proxy for closeness to a terminal outcome, used to scale
/// action weights toward outcome-relevant states: the paddle-to-ball
/// distance feature itself.
pub fn progress_factor(features: &FeatureVector) -> f64 {
    features.ball_dist_sq as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(paddle: Body, ball: Body, opponent: Body) -> ArenaSnapshot {
        ArenaSnapshot::new(paddle, ball, opponent, 1.0 / 60.0)
    }

    #[test]
    fn test_ttc_zero_when_both_bodies_slow() {
        // Both speeds below the threshold - treated as co-located
        let a = Body::with_velocity(0.2, 0.3, 0.01, 0.0);
        let b = Body::with_velocity(1.8, 0.9, 0.0, 0.02);

        assert_eq!(time_to_contact(&a, &b), 0.0);
    }

    #[test]
    fn test_ttc_positive_when_closing_head_on() {
        // Mover heading straight at a stationary target 1 unit away at 0.5 u/s
        let mover = Body::with_velocity(0.0, 0.0, 0.5, 0.0);
        let target = Body::new(1.0, 0.0);

        let ttc = time_to_contact(&mover, &target);
        assert!((ttc - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_ttc_negative_when_receding() {
        // Mover heading directly away from the target
        let mover = Body::with_velocity(0.0, 0.0, -0.5, 0.0);
        let target = Body::new(1.0, 0.0);

        let ttc = time_to_contact(&mover, &target);
        assert!((ttc + 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_ttc_scaled_by_approach_angle() {
        // Velocity at 90 degrees to the separation vector - no closing motion
        let mover = Body::with_velocity(0.0, 0.0, 0.0, 0.5);
        let target = Body::new(1.0, 0.0);

        let ttc = time_to_contact(&mover, &target);
        assert!(ttc.abs() < 1e-5);
    }

    #[test]
    fn test_ttc_target_motion_floored_at_zero() {
        // Only the second body moves, and away from the first: floored at 0
        let mover = Body::new(0.0, 0.0);
        let target = Body::with_velocity(1.0, 0.0, 0.5, 0.0);

        assert_eq!(time_to_contact(&mover, &target), 0.0);
    }

    #[test]
    fn test_ttc_target_motion_used_when_closing() {
        // Only the second body moves, toward the first
        let mover = Body::new(0.0, 0.0);
        let target = Body::with_velocity(1.0, 0.0, -0.5, 0.0);

        let ttc = time_to_contact(&mover, &target);
        assert!((ttc - 2.0).abs() < 1e-5);
    }

    #[test]
    fn test_ttc_guards_zero_separation() {
        let a = Body::with_velocity(0.4, 0.4, 1.0, 0.0);
        let b = Body::with_velocity(0.4, 0.4, 0.0, 0.0);

        assert_eq!(time_to_contact(&a, &b), 0.0);
    }

    #[test]
    fn test_voxelize_rounds_to_quarters() {
        let v = FeatureVector::from_array([0.13, 0.42, -0.08, 1.91]);
        let voxel = voxelize(&v, &DEFAULT_ROUND_FACTOR);

        // 0.13 -> 0.1 -> 0.0; 0.42 -> 0.4 -> 0.5; -0.08 -> -0.1 -> 0.0 (-0.0);
        // 1.91 -> 1.9 -> 2.0 (nearest quarter of 1.9 is 2.0 after x4 rounding)
        let rounded = voxel.as_array();
        assert!((rounded[0] - 0.0).abs() < 1e-6);
        assert!((rounded[1] - 0.5).abs() < 1e-6);
        assert!(rounded[2].abs() < 1e-6);
        assert!((rounded[3] - 2.0).abs() < 1e-6);
    }

    #[test]
    fn test_voxelize_idempotent() {
        let samples = [
            [0.0, 0.0, 0.0, 0.0],
            [0.13, 0.42, -0.08, 1.91],
            [3.77, -2.5, 0.25, 0.126],
            [10.04, 0.51, -1.3, 6.66],
        ];

        for values in samples {
            let once = voxelize(&FeatureVector::from_array(values), &DEFAULT_ROUND_FACTOR);
            let twice = voxelize(&once, &DEFAULT_ROUND_FACTOR);
            assert_eq!(once, twice, "voxelize not idempotent for {:?}", values);
        }
    }

    #[test]
    fn test_extract_feature_order() {
        let paddle = Body::new(0.0, 0.0);
        let ball = Body::new(0.3, 0.4);
        let opponent = Body::new(1.0, 0.0);
        let features = extract(&snapshot(paddle, ball, opponent));

        // dist(paddle, ball) = 0.5, squared 0.25
        assert!((features.ball_dist_sq - 0.25).abs() < 1e-6);
        // dist(opponent, paddle) = 1.0, squared 1.0
        assert!((features.opponent_dist_sq - 1.0).abs() < 1e-6);
        // Everything stationary
        assert_eq!(features.ball_ttc, 0.0);
        assert_eq!(features.opponent_ttc, 0.0);

        let array = features.as_array();
        assert_eq!(array[0], features.ball_dist_sq);
        assert_eq!(array[1], features.opponent_dist_sq);
        assert_eq!(array[2], features.ball_ttc);
        assert_eq!(array[3], features.opponent_ttc);
    }
}
