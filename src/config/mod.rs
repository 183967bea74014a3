// Configuration module for the decision engine
// Handles loading and managing engine configuration from TOML file

pub mod loader;
pub mod types;

pub use loader::{create_default_config, get_config_path, load_config};
pub use types::{
    ArenaConfig, Config, FeatureConfig, IndexConfig, LearningConfig, ScheduleConfig, SearchConfig,
};
