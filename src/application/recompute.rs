//! Unit recompute: rescore every bet of a unit, then re-run unit badges.
//!
//! # Flow
//!
//! ```text
//! record_result / remove_result
//!         |
//!         v
//! recompute_unit --(per-unit lock)--> score batch --(retry)--> replace_unit_scores
//!                                                       |
//!                                                       v
//!                                       WIN_UNIT, tour badges (best effort)
//! ```
//!
//! Recomputes of one unit run one at a time; different units proceed
//! concurrently.

use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{debug, info, warn};

use crate::application::badge::tour::evaluate_tour_badges;
use crate::application::badge::unit::evaluate_unit_winner;
use crate::application::scoring::unit_scores;
use crate::domain::badge::RuleOutcome;
use crate::domain::race::RaceResult;
use crate::domain::unit::UnitRef;
use crate::error::{Error, Result};
use crate::infrastructure::config::engine::RecomputeConfig;
use crate::port::outbound::store::EngineStore;

/// Per-unit async locks.
#[derive(Debug, Default)]
pub struct UnitLocks {
    locks: DashMap<UnitRef, Arc<Mutex<()>>>,
}

impl UnitLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `unit`.
    pub async fn lock(&self, unit: UnitRef) -> OwnedMutexGuard<()> {
        // Clone the Arc out so no DashMap shard guard is held across await.
        let lock = Arc::clone(self.locks.entry(unit).or_default().value());
        lock.lock_owned().await
    }
}

/// What a successful recompute did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecomputeSummary {
    pub unit: UnitRef,
    /// Bets whose score was written.
    pub scored: usize,
    /// Batch attempts used, at least 1.
    pub attempts: u32,
    /// Badge rule outcomes evaluated after the batch.
    pub badges: Vec<RuleOutcome>,
}

/// Rescore every bet on `unit` atomically, then evaluate its badges.
///
/// # Errors
/// Returns [`Error::NotFound`] for an unknown unit and
/// [`Error::RecomputeFailed`] when every batch attempt failed. Badge
/// failures are logged and reported in the summary.
#[tracing::instrument(skip_all, fields(unit = %unit))]
pub async fn recompute_unit<S: EngineStore>(
    store: &S,
    locks: &UnitLocks,
    config: &RecomputeConfig,
    unit: UnitRef,
) -> Result<RecomputeSummary> {
    let resolved = store
        .unit(unit)
        .await?
        .ok_or_else(|| Error::not_found("unit", unit))?;

    let _guard = locks.lock(unit).await;

    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;
    let scored = loop {
        attempt += 1;
        match score_batch(store, unit).await {
            Ok(scored) => break scored,
            Err(e) if attempt < max_attempts => {
                warn!(attempt, max_attempts, error = %e, "Score batch failed, retrying");
                tokio::time::sleep(config.retry_delay()).await;
            }
            Err(e) => {
                warn!(attempt, error = %e, "Score batch failed, giving up");
                return Err(Error::RecomputeFailed {
                    unit: unit.to_string(),
                    attempts: attempt,
                    reason: e.to_string(),
                });
            }
        }
    };

    let mut badges = vec![evaluate_unit_winner(store, unit).await];
    if let Some(tour) = resolved.tour {
        badges.extend(evaluate_tour_badges(store, tour).await);
    }
    for outcome in &badges {
        match &outcome.result {
            Ok(a) => debug!(
                badge = %outcome.code,
                user = %a.user,
                new = a.newly_awarded,
                "Badge rule applied"
            ),
            Err(reason) => debug!(badge = %outcome.code, %reason, "Badge rule skipped"),
        }
    }

    info!(scored, attempts = attempt, "Unit recomputed");
    Ok(RecomputeSummary {
        unit,
        scored,
        attempts: attempt,
        badges,
    })
}

/// One attempt: score from fresh reads and replace the whole batch.
async fn score_batch<S: EngineStore>(store: &S, unit: UnitRef) -> Result<usize> {
    let scores = unit_scores(store, unit).await?;
    store.replace_unit_scores(unit, &scores, Utc::now()).await?;
    Ok(scores.len())
}

/// A committed result write and the recompute that followed it.
///
/// The write stands even when `recompute` failed; the scores of the unit
/// are then stale until the next successful recompute.
#[derive(Debug)]
pub struct ResultWrite {
    pub unit: UnitRef,
    pub recompute: Result<RecomputeSummary>,
}

impl ResultWrite {
    async fn follow<S: EngineStore>(
        store: &S,
        locks: &UnitLocks,
        config: &RecomputeConfig,
        unit: UnitRef,
    ) -> Self {
        let recompute = recompute_unit(store, locks, config, unit).await;
        if let Err(e) = &recompute {
            warn!(unit = %unit, error = %e, "Result stored but recompute failed");
        }
        Self { unit, recompute }
    }

    /// The recompute summary, when the recompute succeeded.
    #[must_use]
    pub fn summary(&self) -> Option<&RecomputeSummary> {
        self.recompute.as_ref().ok()
    }
}

/// Insert an official result, then recompute its unit.
///
/// The recompute runs only after the insert succeeded, and its failure is
/// reported inside the returned [`ResultWrite`].
///
/// # Errors
/// Propagates the insert failure only.
pub async fn record_result<S: EngineStore>(
    store: &S,
    locks: &UnitLocks,
    config: &RecomputeConfig,
    result: &RaceResult,
) -> Result<ResultWrite> {
    store.insert_result(result).await?;
    debug!(
        unit = %result.unit(),
        position = result.position(),
        rider = %result.rider(),
        "Result recorded"
    );
    Ok(ResultWrite::follow(store, locks, config, result.unit()).await)
}

/// Delete the result at `position`, then recompute its unit.
///
/// Returns `None` when there was no such result; nothing is recomputed then.
///
/// # Errors
/// Propagates the delete failure only.
pub async fn remove_result<S: EngineStore>(
    store: &S,
    locks: &UnitLocks,
    config: &RecomputeConfig,
    unit: UnitRef,
    position: u32,
) -> Result<Option<ResultWrite>> {
    if !store.delete_result(unit, position).await? {
        return Ok(None);
    }
    debug!(unit = %unit, position, "Result removed");
    Ok(Some(ResultWrite::follow(store, locks, config, unit).await))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_unit_lock_is_exclusive() {
        let locks = UnitLocks::new();
        let unit = UnitRef::Stage(crate::domain::id::StageId::new(1));

        let guard = locks.lock(unit).await;
        let second = tokio::time::timeout(Duration::from_millis(20), locks.lock(unit)).await;
        assert!(second.is_err());
        drop(guard);
        assert!(tokio::time::timeout(Duration::from_millis(20), locks.lock(unit))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn different_units_do_not_block() {
        let locks = UnitLocks::new();
        let _a = locks.lock(UnitRef::Stage(crate::domain::id::StageId::new(1))).await;
        let other = UnitRef::OneDay(crate::domain::id::OneDayRaceId::new(1));
        assert!(tokio::time::timeout(Duration::from_millis(20), locks.lock(other))
            .await
            .is_ok());
    }
}
