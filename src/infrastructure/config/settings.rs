//! Application configuration loading and validation.
//!
//! Provides the main [`Config`] struct that aggregates all settings.
//! Configuration is loaded from a TOML file; `PELOTON_DATABASE` overrides
//! the database path.
//!
//! # Example
//!
//! ```
//! use peloton::infrastructure::config::settings::Config;
//!
//! let config = Config::parse_toml("[recompute]\nmax_attempts = 5\n").unwrap();
//! assert_eq!(config.recompute.max_attempts, 5);
//! assert_eq!(config.leaderboard.top_n, 3);
//! ```

use std::path::Path;

use serde::Deserialize;

use super::engine::{BadgeConfig, LeaderboardConfig, RecomputeConfig};
use super::logging::LoggingConfig;
use crate::domain::participation::{GRAND_TOUR_COUNT, MONUMENT_COUNT};
use crate::error::{ConfigError, Result};

/// Environment variable overriding [`Config::database`].
pub const DATABASE_ENV: &str = "PELOTON_DATABASE";

/// Main application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Path to SQLite database file.
    ///
    /// Defaults to "peloton.db" in the current directory.
    #[serde(default = "default_database_path")]
    pub database: String,

    /// Logging and tracing configuration.
    #[serde(default)]
    pub logging: LoggingConfig,

    #[serde(default)]
    pub recompute: RecomputeConfig,

    #[serde(default)]
    pub leaderboard: LeaderboardConfig,

    /// Monument and grand tour name lists.
    #[serde(default)]
    pub badges: BadgeConfig,
}

fn default_database_path() -> String {
    "peloton.db".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database: default_database_path(),
            logging: LoggingConfig::default(),
            recompute: RecomputeConfig::default(),
            leaderboard: LeaderboardConfig::default(),
            badges: BadgeConfig::default(),
        }
    }
}

impl Config {
    /// Parse and validate configuration from TOML text.
    ///
    /// # Errors
    /// Returns [`ConfigError::Parse`] for malformed TOML and
    /// [`ConfigError::InvalidValue`] / [`ConfigError::MissingField`] for
    /// values that fail validation.
    #[allow(clippy::result_large_err)]
    pub fn parse_toml(content: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(content).map_err(ConfigError::Parse)?;

        if let Ok(database) = std::env::var(DATABASE_ENV) {
            config.database = database;
        }

        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    ///
    /// # Errors
    /// Returns [`ConfigError::ReadFile`] when the file cannot be read, or
    /// any error of [`Config::parse_toml`].
    #[allow(clippy::result_large_err)]
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadFile)?;
        Self::parse_toml(&content)
    }

    /// Load `path` if it exists, otherwise fall back to defaults.
    ///
    /// # Errors
    /// Returns any error of [`Config::load`] for an existing file.
    #[allow(clippy::result_large_err)]
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load(path);
        }
        let mut config = Self::default();
        if let Ok(database) = std::env::var(DATABASE_ENV) {
            config.database = database;
        }
        Ok(config)
    }

    /// Initialize logging from the `[logging]` section.
    pub fn init_logging(&self) {
        self.logging.init();
    }

    #[allow(clippy::result_large_err)]
    fn validate(&self) -> Result<()> {
        if self.database.trim().is_empty() {
            return Err(ConfigError::MissingField { field: "database" }.into());
        }
        if !matches!(self.logging.format.as_str(), "pretty" | "json") {
            return Err(ConfigError::InvalidValue {
                field: "format",
                reason: "must be \"pretty\" or \"json\"".to_string(),
            }
            .into());
        }
        if self.recompute.max_attempts == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_attempts",
                reason: "must be at least 1".to_string(),
            }
            .into());
        }
        if self.badges.monuments.len() != MONUMENT_COUNT {
            return Err(ConfigError::InvalidValue {
                field: "monuments",
                reason: format!(
                    "expected {MONUMENT_COUNT} names, got {}",
                    self.badges.monuments.len()
                ),
            }
            .into());
        }
        if self.badges.grand_tours.len() != GRAND_TOUR_COUNT {
            return Err(ConfigError::InvalidValue {
                field: "grand_tours",
                reason: format!(
                    "expected {GRAND_TOUR_COUNT} names, got {}",
                    self.badges.grand_tours.len()
                ),
            }
            .into());
        }
        Ok(())
    }
}
