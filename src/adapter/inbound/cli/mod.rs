//! CLI module graph.

pub mod command;
pub mod config;
pub mod leaderboard;
pub mod output;
pub mod run;
