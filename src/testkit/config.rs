//! Canonical test configurations.

use crate::infrastructure::config::engine::RecomputeConfig;
use crate::infrastructure::config::settings::Config;

/// Recompute policy with three attempts and no delay between them.
pub fn fast_recompute() -> RecomputeConfig {
    RecomputeConfig {
        max_attempts: 3,
        retry_delay_ms: 0,
    }
}

/// Default configuration with [`fast_recompute`].
pub fn engine() -> Config {
    Config {
        recompute: fast_recompute(),
        ..Config::default()
    }
}
