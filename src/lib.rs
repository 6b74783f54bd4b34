//! Peloton - scoring and achievement engine for a cycling prediction game.
//!
//! Players submit a ranked top-5 for one-day races and tour stages. Once the
//! official podium is known each bet is scored against the riders' odds,
//! scores are summed into leaderboards, and badge rules award achievements.
//!
//! # Architecture
//!
//! - [`domain`] - Storage-agnostic rules: units, bets, scoring, ranking,
//!   badge eligibility
//! - [`port`] - Storage traits the engine depends on
//! - [`adapter`] - In-memory and SQLite stores, and the `peloton` CLI
//! - [`application`] - Use cases and the [`Engine`](application::Engine)
//!   facade
//! - [`infrastructure`] - Configuration and logging
//! - [`error`] - Error types for the crate
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use peloton::adapter::outbound::sqlite::{open, SqliteStore};
//! use peloton::application::Engine;
//! use peloton::domain::leaderboard::Scope;
//!
//! # async fn run() -> peloton::error::Result<()> {
//! let store = SqliteStore::new(open("peloton.db")?);
//! let engine = Engine::new(Arc::new(store));
//! let rows = engine.rank_leaderboard(&Scope::season(2026)).await?;
//! # Ok(())
//! # }
//! ```

pub mod adapter;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod port;

#[cfg(any(test, feature = "testkit"))]
pub mod testkit;
