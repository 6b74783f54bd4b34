//! Batch placement badges for finished units.
//!
//! The best five bets on a unit earn TOP5_UNIT, the best three PODIUM_UNIT
//! and the best one WINNER_UNIT. Bets are ordered like WIN_UNIT: score,
//! then earliest submission, then bet id. A placement badge keeps the
//! context of the first unit that earned it.

use serde::Serialize;
use tracing::{debug, info};

use crate::domain::badge::{AwardContext, BadgeCode, SkipReason};
use crate::domain::id::UserId;
use crate::domain::race::is_finished;
use crate::domain::score::sort_best_first;
use crate::domain::unit::UnitRef;
use crate::error::{Error, Result};
use crate::port::outbound::store::{BadgeStore, RaceReader, ScoreStore};

use super::award_badge_once;

/// How many top bets each placement badge covers.
const PLACEMENT_TIERS: [(&str, usize); 3] = [
    (BadgeCode::WINNER_UNIT, 1),
    (BadgeCode::PODIUM_UNIT, 3),
    (BadgeCode::TOP5_UNIT, 5),
];

/// One placement award, planned or written.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedAward {
    pub user: UserId,
    pub code: BadgeCode,
}

/// Outcome of placement awarding on one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementReport {
    pub unit: UnitRef,
    /// Awards that were (or in a dry run, would be) attempted.
    pub planned: Vec<PlannedAward>,
    /// Awards that created a new row. Always zero in a dry run.
    pub created: usize,
    /// Set when the unit was skipped as a whole.
    pub skipped: Option<SkipReason>,
}

/// Totals of a batch over every finished unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PlacementBatchReport {
    pub units: usize,
    pub created: usize,
    pub skipped: usize,
}

/// Award the placement badges of one unit.
///
/// With `dry_run` the awards are computed and returned but nothing is
/// written.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown unit and propagates storage
/// failures.
pub async fn award_unit_placements<S>(
    store: &S,
    unit: UnitRef,
    dry_run: bool,
) -> Result<PlacementReport>
where
    S: RaceReader + ScoreStore + BadgeStore,
{
    if store.unit(unit).await?.is_none() {
        return Err(Error::not_found("unit", unit));
    }

    let skipped = |reason| PlacementReport {
        unit,
        planned: Vec::new(),
        created: 0,
        skipped: Some(reason),
    };

    if !is_finished(&store.results(unit).await?) {
        debug!(unit = %unit, "Unit not finished, skipping placements");
        return Ok(skipped(SkipReason::UnitNotFinished));
    }

    let mut scored = store.scored_bets(&[unit]).await?;
    if scored.is_empty() {
        debug!(unit = %unit, "No scores, skipping placements");
        return Ok(skipped(SkipReason::NoScores));
    }
    sort_best_first(&mut scored);

    let planned: Vec<PlannedAward> = PLACEMENT_TIERS
        .iter()
        .flat_map(|(code, depth)| {
            scored.iter().take(*depth).map(|s| PlannedAward {
                user: s.user,
                code: BadgeCode::from(*code),
            })
        })
        .collect();

    let mut created = 0;
    if !dry_run {
        let context = AwardContext::placement(unit);
        for award in &planned {
            if award_badge_once(store, award.user, &award.code, context.clone()).await? {
                created += 1;
            }
        }
    }

    info!(unit = %unit, planned = planned.len(), created, dry_run, "Placement badges");
    Ok(PlacementReport {
        unit,
        planned,
        created,
        skipped: None,
    })
}

/// Run [`award_unit_placements`] over every finished unit.
///
/// # Errors
/// Propagates storage failures.
pub async fn award_all_finished_placements<S>(
    store: &S,
    dry_run: bool,
) -> Result<PlacementBatchReport>
where
    S: RaceReader + ScoreStore + BadgeStore,
{
    let mut report = PlacementBatchReport::default();
    for unit in store.finished_units().await? {
        let unit_report = award_unit_placements(store, unit, dry_run).await?;
        report.units += 1;
        report.created += unit_report.created;
        if unit_report.skipped.is_some() {
            report.skipped += 1;
        }
    }
    info!(
        units = report.units,
        created = report.created,
        skipped = report.skipped,
        dry_run,
        "Placement batch finished"
    );
    Ok(report)
}
