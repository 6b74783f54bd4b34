//! Bets and the players who place them.

use std::collections::HashSet;

use chrono::{DateTime, Utc};

use super::error::DomainError;
use super::id::{BetId, RiderId, UserId};
use super::unit::UnitRef;

/// Number of ranked picks in a bet.
pub const PICK_COUNT: usize = 5;

/// Ranked picks; index `i` predicts finishing position `i + 1`.
pub type Picks = [Option<RiderId>; PICK_COUNT];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: UserId,
    pub username: String,
}

/// A user's ranked top-5 prediction for one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bet {
    pub id: BetId,
    pub user: UserId,
    pub unit: UnitRef,
    pub picks: Picks,
    pub submitted_at: Option<DateTime<Utc>>,
}

impl Bet {
    /// Create a bet, rejecting a rider picked twice.
    ///
    /// # Errors
    /// Returns [`DomainError::DuplicatePick`] for a repeated rider.
    pub fn try_new(
        id: BetId,
        user: UserId,
        unit: UnitRef,
        picks: Picks,
        submitted_at: Option<DateTime<Utc>>,
    ) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for rider in picks.iter().flatten() {
            if !seen.insert(*rider) {
                return Err(DomainError::DuplicatePick {
                    rider: rider.value(),
                });
            }
        }
        Ok(Self {
            id,
            user,
            unit,
            picks,
            submitted_at,
        })
    }

    #[must_use]
    pub const fn is_submitted(&self) -> bool {
        self.submitted_at.is_some()
    }

    /// All five picks set and a submission timestamp recorded.
    ///
    /// Only complete submissions are scored and count toward participation.
    #[must_use]
    pub fn is_complete_submission(&self) -> bool {
        self.is_submitted() && self.picks.iter().all(Option::is_some)
    }
}
