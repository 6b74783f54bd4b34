//! Command dispatch for the `peloton` binary.

use std::sync::Arc;

use serde_json::json;

use crate::adapter::inbound::cli::command::{
    AwardPlacementsArgs, Cli, Commands, SeasonBadgesArgs,
};
use crate::adapter::inbound::cli::{config, leaderboard, output};
use crate::adapter::outbound::sqlite::{open, SqliteStore};
use crate::application::Engine;
use crate::domain::id::UserId;
use crate::domain::unit::UnitRef;
use crate::error::Result;
use crate::infrastructure::config::settings::Config;

type SqliteEngine = Engine<SqliteStore>;

/// Execute the parsed command line.
///
/// # Errors
/// Returns configuration, storage and lookup errors; the binary reports
/// them and exits non-zero.
pub async fn execute(cli: Cli) -> Result<()> {
    output::configure(cli.json);

    if let Commands::Config(command) = &cli.command {
        return config::execute(command, &cli.config);
    }

    let mut settings = Config::load_or_default(&cli.config)?;
    if let Some(db) = &cli.db {
        settings.database.clone_from(db);
    }
    settings.init_logging();

    let pool = open(&settings.database)?;
    let engine = Engine::with_config(Arc::new(SqliteStore::new(pool)), &settings);

    match cli.command {
        Commands::Migrate => {
            if output::is_json() {
                output::json_output(&json!({ "migrated": settings.database }))
            } else {
                output::success(&format!("Schema up to date: {}", settings.database));
                Ok(())
            }
        }
        Commands::SeedBadges(args) => seed_badges(&engine, args.year).await,
        Commands::Recompute(args) => recompute(&engine, args.unit).await,
        Commands::AwardPlacements(args) => award_placements(&engine, &args).await,
        Commands::SeasonBadges(args) => season_badges(&engine, &args).await,
        Commands::Top10(args) => top10(&engine, args.year).await,
        Commands::Leaderboard(command) => {
            leaderboard::execute(&engine, &command, settings.leaderboard).await
        }
        Commands::Config(_) => Ok(()),
    }
}

async fn seed_badges(engine: &SqliteEngine, year: i32) -> Result<()> {
    let report = engine.seed_default_catalog(year).await?;
    if output::is_json() {
        return output::json_output(&report);
    }
    output::section("Badge catalog");
    output::field("Created", report.created);
    output::field("Updated", report.updated);
    Ok(())
}

async fn recompute(engine: &SqliteEngine, unit: UnitRef) -> Result<()> {
    let summary = engine.recompute_unit(unit).await?;
    if output::is_json() {
        let badges: Vec<_> = summary
            .badges
            .iter()
            .map(|o| json!({ "code": o.code, "status": o.status() }))
            .collect();
        return output::json_output(&json!({
            "unit": summary.unit.to_string(),
            "scored": summary.scored,
            "attempts": summary.attempts,
            "badges": badges,
        }));
    }
    output::section(&format!("Recompute {}", summary.unit));
    output::field("Scored bets", summary.scored);
    output::field("Attempts", summary.attempts);
    for outcome in &summary.badges {
        output::field(outcome.code.as_str(), outcome.status());
    }
    Ok(())
}

async fn award_placements(engine: &SqliteEngine, args: &AwardPlacementsArgs) -> Result<()> {
    let Some(unit) = args.unit else {
        let report = engine.award_all_finished_placements(args.dry_run).await?;
        if output::is_json() {
            return output::json_output(&json!({
                "dry_run": args.dry_run,
                "units": report.units,
                "created": report.created,
                "skipped": report.skipped,
            }));
        }
        output::section("Placement badges");
        output::field("Units", report.units);
        output::field("Created", report.created);
        output::field("Skipped", report.skipped);
        if args.dry_run {
            output::note("dry run: nothing was written");
        }
        return Ok(());
    };

    let report = engine.award_unit_placements(unit, args.dry_run).await?;
    if output::is_json() {
        return output::json_output(&json!({
            "unit": unit.to_string(),
            "dry_run": args.dry_run,
            "planned": report.planned,
            "created": report.created,
            "skipped": report.skipped.as_ref().map(ToString::to_string),
        }));
    }
    output::section(&format!("Placement badges for {unit}"));
    if let Some(reason) = &report.skipped {
        output::note(&format!("skipped: {reason}"));
        return Ok(());
    }
    for award in &report.planned {
        output::field(award.code.as_str(), format!("user {}", award.user));
    }
    output::field("Created", report.created);
    if args.dry_run {
        output::note("dry run: nothing was written");
    }
    Ok(())
}

async fn season_badges(engine: &SqliteEngine, args: &SeasonBadgesArgs) -> Result<()> {
    let report = engine
        .evaluate_season_badges(UserId::new(args.user), args.year)
        .await?;
    let lines = report.summary();
    if output::is_json() {
        return output::json_output(&json!({
            "user": args.user,
            "year": args.year,
            "badges": lines,
        }));
    }
    output::section(&format!("Season {} badges for user {}", args.year, args.user));
    for line in &lines {
        output::field(&line.code, &line.status);
    }
    Ok(())
}

async fn top10(engine: &SqliteEngine, year: i32) -> Result<()> {
    let awarded = engine.award_season_top10(year).await?;
    if output::is_json() {
        return output::json_output(&json!({ "year": year, "awarded": awarded }));
    }
    output::section(&format!("Top 10 of {year}"));
    output::field("New awards", awarded.len());
    Ok(())
}
