//! Infrastructure configuration modules.

pub mod engine;
pub mod logging;
pub mod settings;

pub use engine::{BadgeConfig, LeaderboardConfig, RecomputeConfig};
pub use logging::LoggingConfig;
pub use settings::Config;
