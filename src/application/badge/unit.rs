//! WIN_UNIT: best current score on a unit.

use crate::domain::badge::{AwardContext, BadgeCode, RuleOutcome, SkipReason};
use crate::domain::score::sort_best_first;
use crate::domain::unit::UnitRef;
use crate::port::outbound::store::{BadgeStore, ScoreStore};

use super::award_for_rule;

/// Award WIN_UNIT to the holder of the best bet on `unit`.
///
/// Runs on every recompute against the stored scores, so a unit without
/// its podium yet still names a holder (everyone scores zero and the
/// earliest submission wins). Ties go to the earliest submission, then the
/// lowest bet id.
pub async fn evaluate_unit_winner<S>(store: &S, unit: UnitRef) -> RuleOutcome
where
    S: ScoreStore + BadgeStore,
{
    let code = BadgeCode::from(BadgeCode::WIN_UNIT);

    let mut scored = match store.scored_bets(&[unit]).await {
        Ok(scored) => scored,
        Err(e) => return RuleOutcome::new(code, Err(SkipReason::Storage(e.to_string()))),
    };
    sort_best_first(&mut scored);
    let Some(best) = scored.first() else {
        return RuleOutcome::new(code, Err(SkipReason::NoScores));
    };

    let result = award_for_rule(store, best.user, &code, AwardContext::unit(unit)).await;
    RuleOutcome::new(code, result)
}
