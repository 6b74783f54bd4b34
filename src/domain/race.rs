//! Race calendar reference data: seasons, tours, stages, one-day races,
//! betting lines and official results.
//!
//! The engine reads these; it never creates them outside of import tooling
//! and test fixtures.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::error::DomainError;
use super::id::{OneDayRaceId, RiderId, StageId, TourId};
use super::unit::{StageType, Unit, UnitRef};

/// Number of recorded positions after which a unit counts as finished.
pub const FINISHED_RESULT_COUNT: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tour {
    pub id: TourId,
    pub season_year: i32,
    pub name: String,
    pub starts_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub id: StageId,
    pub tour: TourId,
    pub number: u32,
    pub name: String,
    pub starts_at: DateTime<Utc>,
    pub stage_type: StageType,
}

impl Stage {
    /// Resolve the stage into a [`Unit`], given its tour's season.
    #[must_use]
    pub fn to_unit(&self, season_year: i32) -> Unit {
        Unit {
            unit: UnitRef::Stage(self.id),
            name: self.name.clone(),
            season_year,
            starts_at: self.starts_at,
            tour: Some(self.tour),
            stage_type: Some(self.stage_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OneDayRace {
    pub id: OneDayRaceId,
    pub season_year: i32,
    pub name: String,
    pub starts_at: DateTime<Utc>,
}

impl OneDayRace {
    #[must_use]
    pub fn to_unit(&self) -> Unit {
        Unit {
            unit: UnitRef::OneDay(self.id),
            name: self.name.clone(),
            season_year: self.season_year,
            starts_at: self.starts_at,
            tour: None,
            stage_type: None,
        }
    }
}

/// Betting line of a rider on a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub unit: UnitRef,
    pub rider: RiderId,
    pub odds: Decimal,
}

/// Official finishing position of a rider on a unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceResult {
    unit: UnitRef,
    position: u32,
    rider: RiderId,
}

impl RaceResult {
    /// Create a result, rejecting position 0.
    ///
    /// # Errors
    /// Returns [`DomainError::InvalidPosition`] when `position` is 0.
    pub fn try_new(unit: UnitRef, position: u32, rider: RiderId) -> Result<Self, DomainError> {
        if position == 0 {
            return Err(DomainError::InvalidPosition { position });
        }
        Ok(Self {
            unit,
            position,
            rider,
        })
    }

    #[must_use]
    pub const fn unit(&self) -> UnitRef {
        self.unit
    }

    #[must_use]
    pub const fn position(&self) -> u32 {
        self.position
    }

    #[must_use]
    pub const fn rider(&self) -> RiderId {
        self.rider
    }
}

/// True once a unit has enough recorded positions to be scored.
#[must_use]
pub fn is_finished(results: &[RaceResult]) -> bool {
    results.len() >= FINISHED_RESULT_COUNT
}
