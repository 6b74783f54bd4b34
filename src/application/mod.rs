//! Application services (use cases).
//!
//! These services combine domain rules with the storage ports. [`Engine`]
//! bundles them behind one facade.

pub mod badge;
pub mod calendar;
pub mod engine;
pub mod leaderboard;
pub mod recompute;
pub mod scoring;
pub mod submission;

pub use engine::{compact_leaderboard, Engine};
pub use recompute::{RecomputeSummary, ResultWrite, UnitLocks};
pub use submission::SubmissionReport;
