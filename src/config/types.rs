// Engine configuration types
// All settings with sensible defaults matching the tuned constants

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub arena: ArenaConfig,
    #[serde(default)]
    pub features: FeatureConfig,
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub learning: LearningConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            arena: ArenaConfig::default(),
            features: FeatureConfig::default(),
            index: IndexConfig::default(),
            search: SearchConfig::default(),
            schedule: ScheduleConfig::default(),
            learning: LearningConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ArenaConfig {
    // Table dimensions in table units
    pub width: f32,
    pub height: f32,

    // Guard point the defend tactic retreats to
    pub guard_x: f32,
    pub guard_y: f32,
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self {
            width: 2.4,
            height: 1.2,
            guard_x: 0.3,
            guard_y: 0.6,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FeatureConfig {
    // Per-dimension voxel rounding factor: features snap to the nearest
    // multiple of 1/factor after 1-decimal rounding
    pub round_factor: [f32; 4],
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            round_factor: [4.0, 4.0, 4.0, 4.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IndexConfig {
    // Wide radius for generalization queries on the decision path
    pub query_radius: f32,
}

impl IndexConfig {
    /// Tight radius for exact-match-or-insert when recording observations:
    /// one tenth of the generalization radius.
    pub fn match_radius(&self) -> f32 {
        self.query_radius / 10.0
    }
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self { query_radius: 1.0 }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchConfig {
    // Search depth in ply pairs (one paddle move + one opponent reply)
    pub depth: u32,

    // Wall-clock budget for a single search before the watchdog aborts it
    pub budget_ms: u64,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            depth: 3,
            budget_ms: 1000,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScheduleConfig {
    // Decision worker polling interval
    pub decision_interval_ms: u64,

    // Observation worker polling interval
    pub observation_interval_ms: u64,

    // Watchdog polling interval
    pub watchdog_interval_ms: u64,

    // Delay before the observation worker starts reading state
    pub observer_start_delay_ms: u64,

    // Bounded wait for a worker's snapshot read before skipping the cycle
    pub snapshot_wait_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            decision_interval_ms: 100,
            observation_interval_ms: 100,
            watchdog_interval_ms: 10,
            observer_start_delay_ms: 1000,
            snapshot_wait_ms: 50,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LearningConfig {
    // Decisions buffered before outcome feedback is applied in one batch
    pub history_capacity: usize,
}

impl Default for LearningConfig {
    fn default() -> Self {
        Self {
            history_capacity: 1000,
        }
    }
}
