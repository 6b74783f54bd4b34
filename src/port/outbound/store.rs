//! Persistence ports for race data, bets, scores and badges.
//!
//! Reads of reference data (calendar, entries, results, bets) are kept apart
//! from the two stores the engine owns: scores and badge awards.

use std::collections::HashMap;
use std::future::Future;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::domain::badge::{AwardContext, AwardWrite, Badge, BadgeCode, UserBadge};
use crate::domain::bet::{Bet, User};
use crate::domain::id::{BetId, RiderId, TourId, UserId};
use crate::domain::race::{Entry, OneDayRace, RaceResult, Stage, Tour};
use crate::domain::score::{BetScore, ScoredBet};
use crate::domain::unit::{Unit, UnitRef};
use crate::error::Result;

/// Read-only view of the race calendar, betting lines and results.
pub trait RaceReader: Send + Sync {
    /// Resolve a unit reference.
    fn unit(&self, unit: UnitRef) -> impl Future<Output = Result<Option<Unit>>> + Send;

    fn season_exists(&self, year: i32) -> impl Future<Output = Result<bool>> + Send;

    fn tour(&self, id: TourId) -> impl Future<Output = Result<Option<Tour>>> + Send;

    /// One-day races of a season.
    fn one_day_races(&self, year: i32) -> impl Future<Output = Result<Vec<OneDayRace>>> + Send;

    /// Tours of a season.
    fn tours(&self, year: i32) -> impl Future<Output = Result<Vec<Tour>>> + Send;

    /// Stages of a tour ordered by stage number.
    fn stages(&self, tour: TourId) -> impl Future<Output = Result<Vec<Stage>>> + Send;

    /// Odds per rider for a unit. Riders without an entry are absent.
    fn entry_odds(
        &self,
        unit: UnitRef,
    ) -> impl Future<Output = Result<HashMap<RiderId, Decimal>>> + Send;

    /// Official results of a unit ordered by position.
    fn results(&self, unit: UnitRef) -> impl Future<Output = Result<Vec<RaceResult>>> + Send;

    /// Units with at least three recorded results.
    fn finished_units(&self) -> impl Future<Output = Result<Vec<UnitRef>>> + Send;
}

/// Write path for official results.
pub trait ResultWriter: Send + Sync {
    /// Insert a result. Fails on a duplicate position or rider for the unit.
    fn insert_result(&self, result: &RaceResult) -> impl Future<Output = Result<()>> + Send;

    /// Delete the result at `position`. Returns whether a row was removed.
    fn delete_result(
        &self,
        unit: UnitRef,
        position: u32,
    ) -> impl Future<Output = Result<bool>> + Send;
}

/// Read-only view of bets and players.
pub trait BetReader: Send + Sync {
    fn bet(&self, id: BetId) -> impl Future<Output = Result<Option<Bet>>> + Send;

    /// Every bet on exactly this unit, drafts included.
    fn bets_for_unit(&self, unit: UnitRef) -> impl Future<Output = Result<Vec<Bet>>> + Send;

    /// Every bet of `user` on a unit of season `year`, drafts included.
    fn bets_for_user_in_season(
        &self,
        user: UserId,
        year: i32,
    ) -> impl Future<Output = Result<Vec<Bet>>> + Send;

    /// Number of submitted bets of `user` across all seasons.
    fn submitted_bet_count(&self, user: UserId) -> impl Future<Output = Result<u64>> + Send;

    fn user(&self, id: UserId) -> impl Future<Output = Result<Option<User>>> + Send;
}

/// Score store. Values are replaced on every pass, never accumulated.
pub trait ScoreStore: Send + Sync {
    /// Insert or replace the score of one bet.
    fn upsert_score(
        &self,
        bet: BetId,
        score: Decimal,
        computed_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Replace the scores of a unit's bets as one atomic batch.
    ///
    /// Either every score in `scores` is written or none is.
    fn replace_unit_scores(
        &self,
        unit: UnitRef,
        scores: &[(BetId, Decimal)],
        computed_at: DateTime<Utc>,
    ) -> impl Future<Output = Result<()>> + Send;

    fn score(&self, bet: BetId) -> impl Future<Output = Result<Option<BetScore>>> + Send;

    /// Stored scores of every bet on any of `units`, joined with the player.
    fn scored_bets(&self, units: &[UnitRef])
        -> impl Future<Output = Result<Vec<ScoredBet>>> + Send;
}

/// Badge catalog and award store.
pub trait BadgeStore: Send + Sync {
    fn badge(&self, code: &BadgeCode) -> impl Future<Output = Result<Option<Badge>>> + Send;

    /// Insert or update a catalog entry. Returns true when it was created.
    fn upsert_badge(&self, badge: &Badge) -> impl Future<Output = Result<bool>> + Send;

    /// Insert the award unless the (user, badge) pair already exists.
    ///
    /// Must be safe under concurrent calls for the same pair: exactly one
    /// caller sees [`AwardWrite::Created`], the others see the stored row.
    fn insert_user_badge_if_absent(
        &self,
        award: &UserBadge,
    ) -> impl Future<Output = Result<AwardWrite>> + Send;

    /// Overwrite the context of an existing award, keeping `awarded_at`.
    fn update_user_badge_context(
        &self,
        user: UserId,
        code: &BadgeCode,
        context: &AwardContext,
    ) -> impl Future<Output = Result<()>> + Send;

    fn user_badges(&self, user: UserId) -> impl Future<Output = Result<Vec<UserBadge>>> + Send;
}

/// Loading of reference data by import tooling and fixtures.
pub trait ReferenceDataWriter: Send + Sync {
    fn insert_season(&self, year: i32) -> impl Future<Output = Result<()>> + Send;

    fn insert_tour(&self, tour: &Tour) -> impl Future<Output = Result<()>> + Send;

    fn insert_stage(&self, stage: &Stage) -> impl Future<Output = Result<()>> + Send;

    fn insert_one_day_race(&self, race: &OneDayRace) -> impl Future<Output = Result<()>> + Send;

    fn insert_user(&self, user: &User) -> impl Future<Output = Result<()>> + Send;

    /// Insert or replace the betting line of a rider on a unit.
    fn upsert_entry(&self, entry: &Entry) -> impl Future<Output = Result<()>> + Send;

    /// Insert or replace a bet, keyed by id.
    fn upsert_bet(&self, bet: &Bet) -> impl Future<Output = Result<()>> + Send;
}

/// Everything the engine needs from a single backing store.
pub trait EngineStore:
    RaceReader + ResultWriter + BetReader + ScoreStore + BadgeStore + ReferenceDataWriter
{
}

impl<T> EngineStore for T where
    T: RaceReader + ResultWriter + BetReader + ScoreStore + BadgeStore + ReferenceDataWriter
{
}
