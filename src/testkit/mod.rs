//! Shared test utilities available to both unit and integration tests.
//!
//! Enabled via `#[cfg(test)]` (unit tests) or the `testkit` feature
//! (integration tests).
//!
//! # Modules
//!
//! - [`domain`] - Builders for domain primitives: timestamps, picks, bets.
//! - [`fixture`] - [`SeasonFixture`](fixture::SeasonFixture), a season
//!   calendar loaded into any store.
//! - [`config`] - Canonical test configurations.

pub mod config;
pub mod domain;
pub mod fixture;
