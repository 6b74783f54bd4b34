//! TOP10_GLOBAL: the first ten rows of a season's global leaderboard.

use tracing::info;

use crate::application::leaderboard::rank_leaderboard;
use crate::domain::badge::{AwardContext, BadgeCode};
use crate::domain::id::UserId;
use crate::domain::leaderboard::Scope;
use crate::error::Result;
use crate::port::outbound::store::{BadgeStore, RaceReader, ScoreStore};

use super::award_badge;

/// Leaderboard depth covered by the badge.
pub const TOP10_DEPTH: usize = 10;

/// Award TOP10_GLOBAL for season `year`; returns the users newly awarded.
///
/// # Errors
/// Returns [`Error::NotFound`](crate::error::Error::NotFound) for an
/// unknown season and propagates storage failures.
pub async fn award_season_top10<S>(store: &S, year: i32) -> Result<Vec<UserId>>
where
    S: RaceReader + ScoreStore + BadgeStore,
{
    let rows = rank_leaderboard(store, &Scope::season(year)).await?;
    let code = BadgeCode::from(BadgeCode::TOP10_GLOBAL);

    let mut awarded = Vec::new();
    for row in rows.iter().take(TOP10_DEPTH) {
        if award_badge(store, row.user, &code, AwardContext::season(year)).await? {
            awarded.push(row.user);
        }
    }
    info!(year, ranked = rows.len(), awarded = awarded.len(), "Season top 10 awarded");
    Ok(awarded)
}
