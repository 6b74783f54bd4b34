//! Odds-weighted bet scoring.
//!
//! A bet is scored against the top three official finishers of its unit.
//! Each of the five picks contributes according to its slot and the rider's
//! odds: a correct slot earns `EXACT_WEIGHTS[i] / odds`, a rider who reached
//! the podium in a different slot earns `TOP3_WEIGHTS[i] / odds`. Longer
//! odds therefore pay more for the same prediction.
//!
//! # Scoring System
//!
//! | slot | exact | on podium |
//! |------|-------|-----------|
//! | 1    | 10    | 4         |
//! | 2    | 7     | 3         |
//! | 3    | 5     | 2         |
//! | 4    | 3     | 1         |
//! | 5    | 2     | 1         |
//!
//! Slots 4 and 5 can never be exact, since only the podium is scored.
//!
//! # Examples
//!
//! ```
//! use std::collections::HashMap;
//! use peloton::domain::id::{RiderId, OneDayRaceId};
//! use peloton::domain::race::RaceResult;
//! use peloton::domain::score::{score_picks, Podium};
//! use peloton::domain::unit::UnitRef;
//! use rust_decimal_macros::dec;
//!
//! let unit = UnitRef::OneDay(OneDayRaceId::new(1));
//! let results: Vec<RaceResult> = (1..=3)
//!     .map(|p| RaceResult::try_new(unit, p, RiderId::new(i64::from(p))).unwrap())
//!     .collect();
//! let podium = Podium::from_results(&results).unwrap();
//! let odds = HashMap::from([(RiderId::new(1), dec!(10.0))]);
//!
//! let picks = [Some(RiderId::new(1)), None, None, None, None];
//! assert_eq!(score_picks(&picks, &podium, &odds), dec!(1.0));
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use super::bet::{Bet, Picks, PICK_COUNT};
use super::id::{BetId, RiderId, UserId};
use super::race::{RaceResult, FINISHED_RESULT_COUNT};
use super::unit::UnitRef;

/// Slot weights for a rider finishing exactly where predicted.
pub const EXACT_WEIGHTS: [Decimal; PICK_COUNT] = [
    Decimal::TEN,
    Decimal::from_parts(7, 0, 0, false, 0),
    Decimal::from_parts(5, 0, 0, false, 0),
    Decimal::from_parts(3, 0, 0, false, 0),
    Decimal::TWO,
];

/// Slot weights for a rider on the podium but not in the predicted slot.
pub const TOP3_WEIGHTS: [Decimal; PICK_COUNT] = [
    Decimal::from_parts(4, 0, 0, false, 0),
    Decimal::from_parts(3, 0, 0, false, 0),
    Decimal::TWO,
    Decimal::ONE,
    Decimal::ONE,
];

/// Precision at which scores are persisted.
pub const SCORE_DECIMAL_PLACES: u32 = 4;

/// The three best-placed riders of a finished unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Podium([RiderId; FINISHED_RESULT_COUNT]);

impl Podium {
    /// Build the podium from official results in any order.
    ///
    /// Returns `None` while fewer than three positions are recorded.
    #[must_use]
    pub fn from_results(results: &[RaceResult]) -> Option<Self> {
        if results.len() < FINISHED_RESULT_COUNT {
            return None;
        }
        let mut ordered: Vec<&RaceResult> = results.iter().collect();
        ordered.sort_by_key(|r| r.position());
        Some(Self([
            ordered[0].rider(),
            ordered[1].rider(),
            ordered[2].rider(),
        ]))
    }

    /// Podium place (1..=3) of `rider`, if any.
    #[must_use]
    pub fn place_of(&self, rider: RiderId) -> Option<usize> {
        self.0.iter().position(|r| *r == rider).map(|i| i + 1)
    }

    #[must_use]
    pub const fn riders(&self) -> &[RiderId; FINISHED_RESULT_COUNT] {
        &self.0
    }
}

/// Contribution of a single pick in slot `index` (0-based).
///
/// Missing entries and non-positive odds contribute nothing, and so do odds
/// small enough to overflow the weighted inverse.
#[must_use]
pub fn pick_contribution(
    index: usize,
    rider: RiderId,
    podium: &Podium,
    odds: &HashMap<RiderId, Decimal>,
) -> Decimal {
    let Some(odds) = odds.get(&rider).copied().filter(|o| *o > Decimal::ZERO) else {
        return Decimal::ZERO;
    };
    let predicted = index + 1;
    let weight = match podium.place_of(rider) {
        Some(actual) if actual == predicted => EXACT_WEIGHTS[index],
        Some(_) => TOP3_WEIGHTS[index],
        None => return Decimal::ZERO,
    };

    Decimal::ONE
        .checked_div(odds)
        .and_then(|inv_odds| weight.checked_mul(inv_odds))
        .unwrap_or(Decimal::ZERO)
}

/// Sum of all pick contributions, unrounded.
#[must_use]
pub fn score_picks(picks: &Picks, podium: &Podium, odds: &HashMap<RiderId, Decimal>) -> Decimal {
    picks
        .iter()
        .enumerate()
        .filter_map(|(i, pick)| pick.map(|rider| pick_contribution(i, rider, podium, odds)))
        .fold(Decimal::ZERO, |total, c| total.checked_add(c).unwrap_or(total))
}

/// Score a bet against its unit's podium.
///
/// Drafts, incomplete picks and unfinished units score exactly zero. The
/// result is rounded to [`SCORE_DECIMAL_PLACES`] so that a recompute with
/// the same inputs stores the same value.
#[must_use]
pub fn score_bet(bet: &Bet, podium: Option<&Podium>, odds: &HashMap<RiderId, Decimal>) -> Decimal {
    match podium {
        Some(podium) if bet.is_complete_submission() => {
            score_picks(&bet.picks, podium, odds).round_dp(SCORE_DECIMAL_PLACES)
        }
        _ => Decimal::ZERO,
    }
}

/// Stored score of a bet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BetScore {
    pub bet: BetId,
    pub score: Decimal,
    pub computed_at: DateTime<Utc>,
}

/// A stored score joined with the bet and player it belongs to.
///
/// This is the read model behind leaderboards and ranking badges.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredBet {
    pub bet: BetId,
    pub user: UserId,
    pub username: String,
    pub unit: UnitRef,
    pub score: Decimal,
    pub submitted_at: Option<DateTime<Utc>>,
}

/// Order scored bets best first: score descending, then earliest
/// submission (unsubmitted last), then bet id.
pub fn sort_best_first(scored: &mut [ScoredBet]) {
    scored.sort_by(|a, b| {
        b.score
            .cmp(&a.score)
            .then_with(|| match (a.submitted_at, b.submitted_at) {
                (Some(x), Some(y)) => x.cmp(&y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            })
            .then_with(|| a.bet.cmp(&b.bet))
    });
}
