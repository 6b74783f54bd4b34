//! Implementations of ports (hexagonal adapters).
//!
//! - [`inbound`] - the `peloton` command line
//! - [`outbound`] - in-memory and SQLite stores

pub mod inbound;
pub mod outbound;
