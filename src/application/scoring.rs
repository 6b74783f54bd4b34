//! Scoring use cases: score one bet, or every bet of a unit.
//!
//! Podium and odds are loaded once per unit; the arithmetic lives in
//! [`crate::domain::score`].

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::debug;

use crate::domain::id::BetId;
use crate::domain::score::{score_bet as score_against, Podium};
use crate::domain::unit::UnitRef;
use crate::error::{Error, Result};
use crate::port::outbound::store::{BetReader, RaceReader, ScoreStore};

/// Compute and persist the score of one bet, replacing any prior value.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown bet and propagates storage
/// failures.
pub async fn score_bet<S>(store: &S, bet: BetId) -> Result<Decimal>
where
    S: RaceReader + BetReader + ScoreStore,
{
    let bet = store
        .bet(bet)
        .await?
        .ok_or_else(|| Error::not_found("bet", bet))?;

    let results = store.results(bet.unit).await?;
    let podium = Podium::from_results(&results);
    let odds = store.entry_odds(bet.unit).await?;
    let score = score_against(&bet, podium.as_ref(), &odds);

    store.upsert_score(bet.id, score, Utc::now()).await?;
    debug!(bet = %bet.id, unit = %bet.unit, score = %score, "Bet scored");
    Ok(score)
}

/// Score every bet on `unit` without persisting anything.
pub async fn unit_scores<S>(store: &S, unit: UnitRef) -> Result<Vec<(BetId, Decimal)>>
where
    S: RaceReader + BetReader,
{
    let bets = store.bets_for_unit(unit).await?;
    let results = store.results(unit).await?;
    let podium = Podium::from_results(&results);
    let odds = store.entry_odds(unit).await?;

    Ok(bets
        .iter()
        .map(|bet| (bet.id, score_against(bet, podium.as_ref(), &odds)))
        .collect())
}
