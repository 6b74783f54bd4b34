//! Engine tuning: recompute retries, leaderboard compaction and the named
//! race lists behind the milestone badges.

use std::time::Duration;

use serde::Deserialize;

/// Retry policy for a unit's score batch.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RecomputeConfig {
    /// Attempts before a recompute is reported as failed. At least 1.
    pub max_attempts: u32,
    /// Pause between attempts in milliseconds.
    pub retry_delay_ms: u64,
}

impl RecomputeConfig {
    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

impl Default for RecomputeConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            retry_delay_ms: 50,
        }
    }
}

/// Shape of compact leaderboards.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub top_n: usize,
    pub bottom_n: usize,
    /// Rows kept on each side of the requesting user.
    pub window: usize,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            top_n: 3,
            bottom_n: 3,
            window: 1,
        }
    }
}

/// Reference name lists for milestone badges, matched exactly.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BadgeConfig {
    pub monuments: Vec<String>,
    pub grand_tours: Vec<String>,
}

impl Default for BadgeConfig {
    fn default() -> Self {
        Self {
            monuments: [
                "Milan-San Remo",
                "Tour des Flandres",
                "Paris-Roubaix",
                "Liège-Bastogne-Liège",
                "Tour de Lombardie",
            ]
            .map(String::from)
            .to_vec(),
            grand_tours: ["Tour de France", "Tour d'Italie", "Tour d'Espagne"]
                .map(String::from)
                .to_vec(),
        }
    }
}
