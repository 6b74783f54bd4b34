//! Engine facade over a single backing store.
//!
//! [`Engine`] owns the per-unit recompute locks and the tuning sections of
//! the configuration; every operation delegates to the use-case modules.

use std::sync::Arc;

use rust_decimal::Decimal;

use crate::application::badge::catalog::{seed_default_catalog, CatalogSeedReport};
use crate::application::badge::placement::{
    award_all_finished_placements, award_unit_placements, PlacementBatchReport, PlacementReport,
};
use crate::application::badge::season::{evaluate_season_badges, SeasonBadgeReport};
use crate::application::badge::top10::award_season_top10;
use crate::application::badge::award_badge;
use crate::application::leaderboard::rank_leaderboard;
use crate::application::recompute::{self, RecomputeSummary, ResultWrite, UnitLocks};
use crate::application::scoring;
use crate::application::submission::{on_bet_submitted, SubmissionReport};
use crate::domain::badge::{AwardContext, BadgeCode};
use crate::domain::id::{BetId, UserId};
use crate::domain::leaderboard::{self, CompactRow, LeaderboardRow, Scope};
use crate::domain::race::RaceResult;
use crate::domain::unit::UnitRef;
use crate::error::Result;
use crate::infrastructure::config::engine::{BadgeConfig, LeaderboardConfig, RecomputeConfig};
use crate::infrastructure::config::settings::Config;
use crate::port::outbound::store::EngineStore;

/// Scoring and achievement engine.
pub struct Engine<S> {
    store: Arc<S>,
    locks: UnitLocks,
    recompute: RecomputeConfig,
    leaderboard: LeaderboardConfig,
    badges: BadgeConfig,
}

impl<S: EngineStore> Engine<S> {
    /// Create an engine with default tuning.
    pub fn new(store: Arc<S>) -> Self {
        Self::with_config(store, &Config::default())
    }

    /// Create an engine using the tuning sections of `config`.
    pub fn with_config(store: Arc<S>, config: &Config) -> Self {
        Self {
            store,
            locks: UnitLocks::new(),
            recompute: config.recompute.clone(),
            leaderboard: config.leaderboard,
            badges: config.badges.clone(),
        }
    }

    /// The backing store.
    #[must_use]
    pub fn store(&self) -> &Arc<S> {
        &self.store
    }

    /// Compute and persist the score of one bet.
    pub async fn score_bet(&self, bet: BetId) -> Result<Decimal> {
        scoring::score_bet(self.store.as_ref(), bet).await
    }

    /// Rescore every bet of `unit` and re-run its badge rules.
    pub async fn recompute_unit(&self, unit: UnitRef) -> Result<RecomputeSummary> {
        recompute::recompute_unit(self.store.as_ref(), &self.locks, &self.recompute, unit).await
    }

    /// Store an official result, then recompute its unit.
    ///
    /// Only a failed insert is an error; a failed recompute is reported in
    /// the returned [`ResultWrite`].
    pub async fn record_result(&self, result: &RaceResult) -> Result<ResultWrite> {
        recompute::record_result(self.store.as_ref(), &self.locks, &self.recompute, result).await
    }

    /// Delete an official result, then recompute its unit if one was removed.
    pub async fn remove_result(
        &self,
        unit: UnitRef,
        position: u32,
    ) -> Result<Option<ResultWrite>> {
        recompute::remove_result(self.store.as_ref(), &self.locks, &self.recompute, unit, position)
            .await
    }

    /// Award a badge; true only for a new award.
    pub async fn award_badge(
        &self,
        user: UserId,
        code: &BadgeCode,
        context: AwardContext,
    ) -> Result<bool> {
        award_badge(self.store.as_ref(), user, code, context).await
    }

    /// Post-submission hooks for `bet`.
    pub async fn on_bet_submitted(&self, bet: BetId) -> Result<SubmissionReport> {
        on_bet_submitted(self.store.as_ref(), bet, &self.badges).await
    }

    pub async fn evaluate_season_badges(
        &self,
        user: UserId,
        year: i32,
    ) -> Result<SeasonBadgeReport> {
        evaluate_season_badges(self.store.as_ref(), user, year, &self.badges).await
    }

    /// Full ranking of a scope.
    pub async fn rank_leaderboard(&self, scope: &Scope) -> Result<Vec<LeaderboardRow>> {
        rank_leaderboard(self.store.as_ref(), scope).await
    }

    /// Ranking of a scope compacted with the configured shape, with the
    /// requesting user's row marked.
    pub async fn compact_leaderboard(
        &self,
        scope: &Scope,
        user: Option<UserId>,
    ) -> Result<Vec<CompactRow>> {
        let mut rows = self.rank_leaderboard(scope).await?;
        leaderboard::mark_requesting_user(&mut rows, user);
        let shape = self.leaderboard;
        Ok(compact_leaderboard(
            &rows,
            user,
            shape.top_n,
            shape.bottom_n,
            shape.window,
        ))
    }

    pub async fn award_unit_placements(
        &self,
        unit: UnitRef,
        dry_run: bool,
    ) -> Result<PlacementReport> {
        award_unit_placements(self.store.as_ref(), unit, dry_run).await
    }

    pub async fn award_all_finished_placements(
        &self,
        dry_run: bool,
    ) -> Result<PlacementBatchReport> {
        award_all_finished_placements(self.store.as_ref(), dry_run).await
    }

    /// Award TOP10_GLOBAL for a season; returns newly awarded users.
    pub async fn award_season_top10(&self, year: i32) -> Result<Vec<UserId>> {
        award_season_top10(self.store.as_ref(), year).await
    }

    pub async fn seed_default_catalog(&self, year: i32) -> Result<CatalogSeedReport> {
        seed_default_catalog(self.store.as_ref(), year).await
    }
}

/// Bounded view of a ranking; see [`leaderboard::compact`].
#[must_use]
pub fn compact_leaderboard(
    rows: &[LeaderboardRow],
    user: Option<UserId>,
    top_n: usize,
    bottom_n: usize,
    window: usize,
) -> Vec<CompactRow> {
    leaderboard::compact(rows, user, top_n, bottom_n, window)
}
