//! SQLite persistence adapter.
//!
//! Implements every storage port over a Diesel-managed SQLite database.

pub mod database;
pub mod store;

pub use database::connection::{create_pool, open, run_migrations, DbPool};
pub use store::SqliteStore;
