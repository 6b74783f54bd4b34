//! Handler for the `leaderboard` command group.

use std::collections::HashSet;

use serde_json::json;

use crate::adapter::inbound::cli::command::{LeaderboardCommand, ViewArgs};
use crate::adapter::inbound::cli::output;
use crate::application::{compact_leaderboard, Engine};
use crate::domain::id::{TourId, UserId};
use crate::domain::leaderboard::{mark_requesting_user, CompactRow, Scope};
use crate::error::Result;
use crate::infrastructure::config::engine::LeaderboardConfig;
use crate::port::outbound::store::EngineStore;

/// Translate the scope subcommand into a [`Scope`] and its view options.
fn scope_of(command: &LeaderboardCommand) -> (Scope, ViewArgs) {
    match command {
        LeaderboardCommand::Global(args) => (
            Scope::Global {
                year: args.year,
                members: args
                    .members
                    .as_ref()
                    .map(|ids| ids.iter().copied().map(UserId::new).collect::<HashSet<_>>()),
            },
            args.view,
        ),
        LeaderboardCommand::Unit(args) => (Scope::Unit(args.unit), args.view),
        LeaderboardCommand::Tour(args) => (Scope::Tour(TourId::new(args.tour)), args.view),
        LeaderboardCommand::Category(args) => (
            Scope::TourCategory {
                tour: TourId::new(args.tour),
                category: args.category,
            },
            args.view,
        ),
    }
}

/// Execute `leaderboard <scope>`.
pub async fn execute<S: EngineStore>(
    engine: &Engine<S>,
    command: &LeaderboardCommand,
    defaults: LeaderboardConfig,
) -> Result<()> {
    let (scope, view) = scope_of(command);
    let user = view.user.map(UserId::new);

    let mut rows = engine.rank_leaderboard(&scope).await?;
    mark_requesting_user(&mut rows, user);

    let entries: Vec<CompactRow> = if view.full {
        rows.into_iter().map(CompactRow::Row).collect()
    } else {
        compact_leaderboard(
            &rows,
            user,
            view.top.unwrap_or(defaults.top_n),
            view.bottom.unwrap_or(defaults.bottom_n),
            view.window.unwrap_or(defaults.window),
        )
    };

    if output::is_json() {
        return output::json_output(&json!({ "rows": entries }));
    }
    if entries.is_empty() {
        output::note("no scores yet");
        return Ok(());
    }
    println!("{}", output::leaderboard_table(&entries));
    Ok(())
}
