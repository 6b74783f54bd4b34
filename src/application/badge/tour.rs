//! Tour badges: WIN_TOUR, RED_LANTERN_TOUR and the legacy SEASON_FULL.
//!
//! Tour totals are the per-user sums of stored scores over every stage of
//! the tour, ranked like a leaderboard (ties by username).

use crate::application::calendar::season_layout;
use crate::domain::badge::{AwardContext, BadgeCode, RuleOutcome, SkipReason};
use crate::domain::id::{TourId, UserId};
use crate::domain::leaderboard::rank_totals;
use crate::domain::participation::units_with_any_bet;
use crate::domain::unit::UnitRef;
use crate::error::Result;
use crate::port::outbound::store::{BadgeStore, BetReader, RaceReader, ScoreStore};

use super::award_for_rule;

/// Evaluate the tour badges of `tour`.
///
/// Returns one outcome for WIN_TOUR and one for RED_LANTERN_TOUR, plus a
/// SEASON_FULL outcome for the tour winner when there is one. The leader
/// and the last-placed user may be the same person on a one-player tour.
pub async fn evaluate_tour_badges<S>(store: &S, tour: TourId) -> Vec<RuleOutcome>
where
    S: RaceReader + BetReader + ScoreStore + BadgeStore,
{
    let win = BadgeCode::from(BadgeCode::WIN_TOUR);
    let lantern = BadgeCode::from(BadgeCode::RED_LANTERN_TOUR);
    let skip_both = |reason: SkipReason| {
        vec![
            RuleOutcome::new(win.clone(), Err(reason.clone())),
            RuleOutcome::new(lantern.clone(), Err(reason)),
        ]
    };

    let (year, ranking) = match tour_ranking(store, tour).await {
        Ok(Some(found)) => found,
        Ok(None) => return skip_both(SkipReason::NoScores),
        Err(e) => return skip_both(SkipReason::Storage(e.to_string())),
    };
    let (Some(first), Some(last)) = (ranking.first(), ranking.last()) else {
        return skip_both(SkipReason::NoScores);
    };

    let context = AwardContext::tour(tour);
    let mut outcomes = vec![
        RuleOutcome::new(
            win.clone(),
            award_for_rule(store, first.0, &win, context.clone()).await,
        ),
        RuleOutcome::new(
            lantern.clone(),
            award_for_rule(store, last.0, &lantern, context).await,
        ),
    ];

    outcomes.push(evaluate_season_full(store, first.0, year).await);
    outcomes
}

/// Users ranked best first by their tour total, with the tour's season.
///
/// `None` when the tour is unknown. Unfinished stages count with the zero
/// scores their bets hold.
async fn tour_ranking<S>(store: &S, tour: TourId) -> Result<Option<(i32, Vec<(UserId, String)>)>>
where
    S: RaceReader + ScoreStore,
{
    let Some(found) = store.tour(tour).await? else {
        return Ok(None);
    };
    let stages: Vec<UnitRef> = store
        .stages(tour)
        .await?
        .into_iter()
        .map(|s| UnitRef::Stage(s.id))
        .collect();

    let scored = store.scored_bets(&stages).await?;
    let ranking = rank_totals(scored.into_iter().map(|s| (s.user, s.username, s.score)))
        .into_iter()
        .map(|row| (row.user, row.username))
        .collect();
    Ok(Some((found.season_year, ranking)))
}

/// SEASON_FULL: the user holds a bet, draft or not, on every unit of the
/// season.
///
/// This counts any bet while the yearly milestones count complete
/// submissions only; both behaviors are kept as they are.
pub async fn evaluate_season_full<S>(store: &S, user: UserId, year: i32) -> RuleOutcome
where
    S: RaceReader + BetReader + BadgeStore,
{
    let code = BadgeCode::from(BadgeCode::SEASON_FULL);

    let eligible = async {
        let layout = season_layout(store, year).await?;
        let bets = store.bets_for_user_in_season(user, year).await?;
        let all_units = layout.all_units();
        let played = units_with_any_bet(&bets);
        Ok::<_, crate::error::Error>(!all_units.is_empty() && all_units.is_subset(&played))
    };

    let result = match eligible.await {
        Ok(true) => award_for_rule(store, user, &code, AwardContext::season(year)).await,
        Ok(false) => Err(SkipReason::NotEligible),
        Err(e) => Err(SkipReason::Storage(e.to_string())),
    };
    RuleOutcome::new(code, result)
}
