//! Yearly milestone badges, evaluated after a bet submission.
//!
//! Participation is rebuilt from the user's complete submissions of the
//! season on every call.

use serde::Serialize;
use tracing::debug;

use crate::application::calendar::season_layout;
use crate::domain::badge::{AwardContext, BadgeCode, RuleOutcome, RuleResult, SkipReason};
use crate::domain::id::UserId;
use crate::domain::participation::SeasonParticipation;
use crate::error::Result;
use crate::infrastructure::config::engine::BadgeConfig;
use crate::port::outbound::store::{BadgeStore, BetReader, RaceReader};

use super::award_for_rule;

/// Outcomes of the four yearly milestones for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonBadgeReport {
    pub user: UserId,
    pub year: i32,
    pub first_unit_played: RuleOutcome,
    pub season_finisher: RuleOutcome,
    pub monument_finisher: RuleOutcome,
    pub grandtour_finisher: RuleOutcome,
}

impl SeasonBadgeReport {
    /// All four outcomes in evaluation order.
    #[must_use]
    pub fn outcomes(&self) -> [&RuleOutcome; 4] {
        [
            &self.first_unit_played,
            &self.season_finisher,
            &self.monument_finisher,
            &self.grandtour_finisher,
        ]
    }

    /// Codes awarded for the first time by this evaluation.
    #[must_use]
    pub fn newly_awarded(&self) -> Vec<&BadgeCode> {
        self.outcomes()
            .into_iter()
            .filter(|o| o.is_new_award())
            .map(|o| &o.code)
            .collect()
    }

    /// Serializable summary line per badge.
    #[must_use]
    pub fn summary(&self) -> Vec<MilestoneLine> {
        self.outcomes()
            .into_iter()
            .map(|o| MilestoneLine {
                code: o.code.to_string(),
                status: o.status(),
            })
            .collect()
    }
}

/// Printable status of one milestone.
#[derive(Debug, Clone, Serialize)]
pub struct MilestoneLine {
    pub code: String,
    pub status: String,
}

/// Evaluate the four milestones of season `year` for `user`.
///
/// # Errors
/// Fails only when the season calendar or the user's bets cannot be read;
/// award failures are reported per badge.
pub async fn evaluate_season_badges<S>(
    store: &S,
    user: UserId,
    year: i32,
    config: &BadgeConfig,
) -> Result<SeasonBadgeReport>
where
    S: RaceReader + BetReader + BadgeStore,
{
    let layout = season_layout(store, year).await?;
    let bets = store.bets_for_user_in_season(user, year).await?;
    let played = SeasonParticipation::from_complete_bets(&bets);
    debug!(
        user = %user,
        year,
        one_days = played.one_days.len(),
        stages = played.stages.len(),
        "Season participation"
    );

    Ok(SeasonBadgeReport {
        user,
        year,
        first_unit_played: milestone(
            store,
            user,
            year,
            BadgeCode::first_unit_played(year),
            played.played_any(),
        )
        .await,
        season_finisher: milestone(
            store,
            user,
            year,
            BadgeCode::season_finisher(year),
            played.finishes_season(&layout),
        )
        .await,
        monument_finisher: milestone(
            store,
            user,
            year,
            BadgeCode::monument_finisher(year),
            played.finishes_monuments(&layout, &config.monuments),
        )
        .await,
        grandtour_finisher: milestone(
            store,
            user,
            year,
            BadgeCode::grandtour_finisher(year),
            played.finishes_grand_tours(&layout, &config.grand_tours),
        )
        .await,
    })
}

/// Award a yearly milestone when `eligible`, with context `{"year": Y}`.
async fn milestone<S: BadgeStore>(
    store: &S,
    user: UserId,
    year: i32,
    code: BadgeCode,
    eligible: bool,
) -> RuleOutcome {
    let result: RuleResult = if eligible {
        award_for_rule(store, user, &code, AwardContext::year(year)).await
    } else {
        Err(SkipReason::NotEligible)
    };
    RuleOutcome::new(code, result)
}
