//! Season fixtures loaded through the reference-data port.
//!
//! Works with any store, so the same scenario can run against
//! [`MemoryStore`](crate::adapter::outbound::memory::MemoryStore) and
//! [`SqliteStore`](crate::adapter::outbound::sqlite::SqliteStore).

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Duration, TimeZone, Utc};
use rust_decimal::Decimal;

use crate::domain::bet::{Bet, Picks, User};
use crate::domain::id::{BetId, OneDayRaceId, RiderId, StageId, TourId, UserId};
use crate::domain::race::{Entry, OneDayRace, RaceResult, Stage, Tour};
use crate::domain::unit::{StageType, UnitRef};
use crate::error::Result;
use crate::port::outbound::store::{ReferenceDataWriter, ResultWriter};

/// Builder for one season of calendar, players, odds and bets.
pub struct SeasonFixture<'a, S> {
    store: &'a S,
    year: i32,
    next_bet: AtomicI64,
}

impl<'a, S: ReferenceDataWriter> SeasonFixture<'a, S> {
    /// Insert season `year` and return a builder over it.
    pub async fn new(store: &'a S, year: i32) -> Result<Self> {
        store.insert_season(year).await?;
        Ok(Self {
            store,
            year,
            next_bet: AtomicI64::new(1),
        })
    }

    /// Continue from bet id `next` when several fixtures share a store.
    #[must_use]
    pub fn with_next_bet_id(self, next: i64) -> Self {
        self.next_bet.store(next, Ordering::SeqCst);
        self
    }

    #[must_use]
    pub const fn year(&self) -> i32 {
        self.year
    }

    fn day(&self, offset: i64) -> DateTime<Utc> {
        let start = Utc
            .with_ymd_and_hms(self.year, 3, 1, 12, 0, 0)
            .single()
            .unwrap_or_else(Utc::now);
        start + Duration::days(offset)
    }

    pub async fn one_day(&self, id: i64, name: &str) -> Result<UnitRef> {
        self.store
            .insert_one_day_race(&OneDayRace {
                id: OneDayRaceId::new(id),
                season_year: self.year,
                name: name.to_string(),
                starts_at: self.day(id),
            })
            .await?;
        Ok(UnitRef::OneDay(OneDayRaceId::new(id)))
    }

    pub async fn tour(&self, id: i64, name: &str) -> Result<TourId> {
        self.store
            .insert_tour(&Tour {
                id: TourId::new(id),
                season_year: self.year,
                name: name.to_string(),
                starts_at: self.day(60 + id),
            })
            .await?;
        Ok(TourId::new(id))
    }

    pub async fn stage(
        &self,
        id: i64,
        tour: TourId,
        number: u32,
        stage_type: StageType,
    ) -> Result<UnitRef> {
        self.store
            .insert_stage(&Stage {
                id: StageId::new(id),
                tour,
                number,
                name: format!("Stage {number}"),
                starts_at: self.day(60 + tour.value()) + Duration::days(i64::from(number)),
                stage_type,
            })
            .await?;
        Ok(UnitRef::Stage(StageId::new(id)))
    }

    pub async fn user(&self, id: i64, username: &str) -> Result<UserId> {
        self.store
            .insert_user(&User {
                id: UserId::new(id),
                username: username.to_string(),
            })
            .await?;
        Ok(UserId::new(id))
    }

    /// Set odds for riders on a unit.
    pub async fn odds(&self, unit: UnitRef, lines: &[(i64, Decimal)]) -> Result<()> {
        for (rider, odds) in lines {
            self.store
                .upsert_entry(&Entry {
                    unit,
                    rider: RiderId::new(*rider),
                    odds: *odds,
                })
                .await?;
        }
        Ok(())
    }

    /// Store a bet with the next free id.
    pub async fn bet(
        &self,
        user: UserId,
        unit: UnitRef,
        picks: Picks,
        submitted_at: Option<DateTime<Utc>>,
    ) -> Result<BetId> {
        let id = BetId::new(self.next_bet.fetch_add(1, Ordering::SeqCst));
        let bet = Bet::try_new(id, user, unit, picks, submitted_at)?;
        self.store.upsert_bet(&bet).await?;
        Ok(id)
    }

    /// Store a complete submission made at `at`.
    pub async fn submit(
        &self,
        user: UserId,
        unit: UnitRef,
        picks: Picks,
        at: DateTime<Utc>,
    ) -> Result<BetId> {
        self.bet(user, unit, picks, Some(at)).await
    }
}

impl<S: ReferenceDataWriter + ResultWriter> SeasonFixture<'_, S> {
    /// Write official results directly, without triggering a recompute.
    pub async fn results(&self, unit: UnitRef, riders: &[i64]) -> Result<()> {
        for (rider, position) in riders.iter().zip(1..) {
            let result = RaceResult::try_new(unit, position, RiderId::new(*rider))?;
            self.store.insert_result(&result).await?;
        }
        Ok(())
    }
}
