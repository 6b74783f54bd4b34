//! CLI output formatting.
//!
//! Human-readable lines on stdout, or a single JSON document per command
//! when `--json` is set. Errors go to stderr.

use std::fmt::Display;
use std::sync::atomic::{AtomicBool, Ordering};

use owo_colors::OwoColorize;
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

use crate::domain::leaderboard::CompactRow;
use crate::error::Result;

static JSON: AtomicBool = AtomicBool::new(false);

/// Apply the global `--json` flag.
pub fn configure(json: bool) {
    JSON.store(json, Ordering::Relaxed);
}

#[must_use]
pub fn is_json() -> bool {
    JSON.load(Ordering::Relaxed)
}

/// Print `value` as pretty JSON.
///
/// # Errors
/// Returns an error when `value` cannot be serialized.
pub fn json_output<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

pub fn section(title: &str) {
    println!();
    println!("{}", title.bold());
}

/// Print a labeled value.
pub fn field(label: &str, value: impl Display) {
    println!("  {:<14} {}", label.dimmed(), value);
}

pub fn success(message: &str) {
    println!("  {} {}", "✓".green(), message);
}

pub fn note(message: &str) {
    println!("  {}", message.dimmed());
}

/// Print an error line to stderr.
pub fn error(message: &str) {
    if is_json() {
        eprintln!("{}", serde_json::json!({ "error": message }));
        return;
    }
    eprintln!("  {} {}", "×".red(), message);
}

#[derive(Tabled)]
struct LeaderboardLine {
    #[tabled(rename = "#")]
    rank: String,
    #[tabled(rename = "Player")]
    username: String,
    #[tabled(rename = "Points")]
    total: String,
    #[tabled(rename = "")]
    me: &'static str,
}

/// Render leaderboard rows as a table; gaps become an ellipsis line.
#[must_use]
pub fn leaderboard_table(rows: &[CompactRow]) -> String {
    let lines = rows.iter().map(|entry| match entry.row() {
        Some(row) => LeaderboardLine {
            rank: row.rank.to_string(),
            username: row.username.clone(),
            total: row.total.round_dp(4).normalize().to_string(),
            me: if row.is_me { "<- you" } else { "" },
        },
        None => LeaderboardLine {
            rank: "…".to_string(),
            username: String::new(),
            total: String::new(),
            me: "",
        },
    });
    Table::new(lines).with(Style::rounded()).to_string()
}
