//! Command-line interface definitions.
//!
//! Batch jobs of the engine over a SQLite database, defined with `clap`.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::domain::leaderboard::TourCategory;
use crate::domain::unit::UnitRef;

/// Default configuration file, read when present.
pub const DEFAULT_CONFIG: &str = "peloton.toml";

/// Scoring and achievement engine for a cycling prediction game
#[derive(Parser, Debug)]
#[command(name = "peloton")]
#[command(version)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// SQLite database path, overriding the configuration
    #[arg(long, global = true)]
    pub db: Option<String>,

    /// JSON output for scripting
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create or upgrade the database schema
    Migrate,

    /// Insert or refresh the default badge catalog
    SeedBadges(YearArg),

    /// Rescore every bet of a unit and re-run its badges
    Recompute(UnitArg),

    /// Award WINNER/PODIUM/TOP5 placement badges
    AwardPlacements(AwardPlacementsArgs),

    /// Evaluate the yearly milestone badges of a user
    SeasonBadges(SeasonBadgesArgs),

    /// Award TOP10_GLOBAL for a season
    Top10(YearArg),

    /// Print a leaderboard
    #[command(subcommand)]
    Leaderboard(LeaderboardCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Args, Debug)]
pub struct YearArg {
    /// Season year
    #[arg(long)]
    pub year: i32,
}

#[derive(Args, Debug)]
pub struct UnitArg {
    /// Unit reference: one-day:<id> or stage:<id>
    #[arg(long)]
    pub unit: UnitRef,
}

/// Arguments for `award-placements`.
#[derive(Args, Debug)]
#[command(group(
    clap::ArgGroup::new("target")
        .required(true)
        .args(["unit", "all_finished"]),
))]
pub struct AwardPlacementsArgs {
    /// Single unit: one-day:<id> or stage:<id>
    #[arg(long)]
    pub unit: Option<UnitRef>,

    /// Every unit with at least three results
    #[arg(long)]
    pub all_finished: bool,

    /// Compute the awards without writing them
    #[arg(long)]
    pub dry_run: bool,
}

#[derive(Args, Debug)]
pub struct SeasonBadgesArgs {
    /// User id
    #[arg(long)]
    pub user: i64,

    /// Season year
    #[arg(long)]
    pub year: i32,
}

/// Subcommands for `peloton leaderboard`.
#[derive(Subcommand, Debug)]
pub enum LeaderboardCommand {
    /// Whole season: every one-day race and every stage
    Global(GlobalScopeArgs),
    /// One race or stage
    Unit(UnitScopeArgs),
    /// All stages of a tour
    Tour(TourScopeArgs),
    /// Stages of a tour matching a rider category
    Category(CategoryScopeArgs),
}

#[derive(Args, Debug)]
pub struct GlobalScopeArgs {
    #[arg(long)]
    pub year: i32,

    /// Only sum scores of these users (comma separated ids)
    #[arg(long, value_delimiter = ',')]
    pub members: Option<Vec<i64>>,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Args, Debug)]
pub struct UnitScopeArgs {
    /// one-day:<id> or stage:<id>
    #[arg(long)]
    pub unit: UnitRef,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Args, Debug)]
pub struct TourScopeArgs {
    #[arg(long)]
    pub tour: i64,

    #[command(flatten)]
    pub view: ViewArgs,
}

#[derive(Args, Debug)]
pub struct CategoryScopeArgs {
    #[arg(long)]
    pub tour: i64,

    /// sprinter, climber, breakaway or tt
    #[arg(long)]
    pub category: TourCategory,

    #[command(flatten)]
    pub view: ViewArgs,
}

/// Compaction and highlighting shared by every leaderboard scope.
///
/// Unset sizes fall back to the `[leaderboard]` configuration.
#[derive(Args, Debug, Clone, Copy)]
pub struct ViewArgs {
    /// Requesting user, highlighted and kept with a window around it
    #[arg(long)]
    pub user: Option<i64>,

    #[arg(long)]
    pub top: Option<usize>,

    #[arg(long)]
    pub bottom: Option<usize>,

    #[arg(long)]
    pub window: Option<usize>,

    /// Print every row instead of the compact view
    #[arg(long)]
    pub full: bool,
}

/// Subcommands for `peloton config`.
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Validate the configuration file
    Validate,
    /// Display the effective configuration with defaults applied
    Show,
}
