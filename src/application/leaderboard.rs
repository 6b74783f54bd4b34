//! Leaderboard aggregation over stored scores.
//!
//! A [`Scope`] resolves to a set of units; stored scores of bets on those
//! units are summed per user and ranked by
//! [`rank_totals`](crate::domain::leaderboard::rank_totals).

use tracing::debug;

use crate::application::calendar::{season_layout, tour_stage_units};
use crate::domain::leaderboard::{rank_totals, LeaderboardRow, Scope};
use crate::domain::unit::UnitRef;
use crate::error::{Error, Result};
use crate::port::outbound::store::{RaceReader, ScoreStore};

/// Units a scope sums over.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown season, unit or tour.
pub async fn scope_units<S: RaceReader>(store: &S, scope: &Scope) -> Result<Vec<UnitRef>> {
    match scope {
        Scope::Global { year, .. } => {
            if !store.season_exists(*year).await? {
                return Err(Error::not_found("season", year));
            }
            let mut units: Vec<UnitRef> = season_layout(store, *year)
                .await?
                .all_units()
                .into_iter()
                .collect();
            units.sort();
            Ok(units)
        }
        Scope::Unit(unit) => {
            if store.unit(*unit).await?.is_none() {
                return Err(Error::not_found("unit", unit));
            }
            Ok(vec![*unit])
        }
        Scope::Tour(tour) => tour_stage_units(store, *tour, None).await,
        Scope::TourCategory { tour, category } => {
            tour_stage_units(store, *tour, Some(category.stage_types())).await
        }
    }
}

/// Rank every user with a stored score in `scope`.
///
/// Rows are ordered by total descending, then username; ranks are the
/// 1-based sorted positions. No row is marked as the requesting user.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown scope target and propagates
/// storage failures.
pub async fn rank_leaderboard<S>(store: &S, scope: &Scope) -> Result<Vec<LeaderboardRow>>
where
    S: RaceReader + ScoreStore,
{
    let units = scope_units(store, scope).await?;
    let members = match scope {
        Scope::Global { members, .. } => members.as_ref(),
        _ => None,
    };

    let scored = store.scored_bets(&units).await?;
    let rows = rank_totals(
        scored
            .into_iter()
            .filter(|s| members.map_or(true, |m| m.contains(&s.user)))
            .map(|s| (s.user, s.username, s.score)),
    );
    debug!(?scope, units = units.len(), rows = rows.len(), "Leaderboard ranked");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;
    use crate::domain::id::{OneDayRaceId, TourId};

    #[tokio::test]
    async fn unknown_targets_are_not_found() {
        let store = MemoryStore::new();
        for scope in [
            Scope::season(2030),
            Scope::Unit(UnitRef::OneDay(OneDayRaceId::new(404))),
            Scope::Tour(TourId::new(404)),
        ] {
            let err = rank_leaderboard(&store, &scope).await.unwrap_err();
            assert!(err.is_not_found(), "{scope:?} gave {err}");
        }
    }
}
