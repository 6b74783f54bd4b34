//! Side effects of a bet submission.
//!
//! The submission itself is stored by the caller; everything here is best
//! effort and reported rather than propagated.

use rust_decimal::Decimal;
use tracing::{info, warn};

use crate::application::badge::award_for_rule;
use crate::application::badge::season::{evaluate_season_badges, SeasonBadgeReport};
use crate::application::scoring::score_bet;
use crate::domain::badge::{AwardContext, BadgeCode, RuleOutcome, SkipReason};
use crate::domain::id::{BetId, UserId};
use crate::error::{Error, Result};
use crate::infrastructure::config::engine::BadgeConfig;
use crate::port::outbound::store::EngineStore;

/// Everything a submission triggered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReport {
    pub bet: BetId,
    pub user: UserId,
    /// Initial score, `None` when scoring failed.
    pub score: Option<Decimal>,
    pub first_bet: RuleOutcome,
    /// `None` when the season could not be evaluated.
    pub season: Option<SeasonBadgeReport>,
}

/// Run the post-submission hooks for `bet`: FIRST_BET, the yearly
/// milestones of the bet's season and the initial score.
///
/// # Errors
/// Returns [`Error::NotFound`] when the bet or its unit does not exist.
/// Every other failure is logged and reflected in the report.
pub async fn on_bet_submitted<S: EngineStore>(
    store: &S,
    bet: BetId,
    config: &BadgeConfig,
) -> Result<SubmissionReport> {
    let found = store
        .bet(bet)
        .await?
        .ok_or_else(|| Error::not_found("bet", bet))?;
    let unit = store
        .unit(found.unit)
        .await?
        .ok_or_else(|| Error::not_found("unit", found.unit))?;

    let first_bet = evaluate_first_bet(store, found.user).await;

    let season = match evaluate_season_badges(store, found.user, unit.season_year, config).await {
        Ok(report) => Some(report),
        Err(e) => {
            warn!(bet = %bet, user = %found.user, error = %e, "Season badge evaluation failed");
            None
        }
    };

    let score = match score_bet(store, bet).await {
        Ok(score) => Some(score),
        Err(e) => {
            warn!(bet = %bet, error = %e, "Initial scoring failed");
            None
        }
    };

    info!(
        bet = %bet,
        user = %found.user,
        first_bet = first_bet.is_new_award(),
        "Submission processed"
    );
    Ok(SubmissionReport {
        bet,
        user: found.user,
        score,
        first_bet,
        season,
    })
}

/// FIRST_BET: the user has exactly one submitted bet.
pub async fn evaluate_first_bet<S: EngineStore>(store: &S, user: UserId) -> RuleOutcome {
    let code = BadgeCode::from(BadgeCode::FIRST_BET);
    let result = match store.submitted_bet_count(user).await {
        Ok(1) => award_for_rule(store, user, &code, AwardContext::global()).await,
        Ok(_) => Err(SkipReason::NotEligible),
        Err(e) => Err(SkipReason::Storage(e.to_string())),
    };
    RuleOutcome::new(code, result)
}
