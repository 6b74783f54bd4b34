//! Achievement badges: catalog entries, awards and rule outcomes.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

use super::id::{TourId, UserId};
use super::unit::UnitRef;

/// Catalog code of a badge, e.g. `WIN_UNIT` or `SEASON_FINISHER_2026`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BadgeCode(String);

impl BadgeCode {
    pub const WIN_UNIT: &'static str = "WIN_UNIT";
    pub const WINNER_UNIT: &'static str = "WINNER_UNIT";
    pub const PODIUM_UNIT: &'static str = "PODIUM_UNIT";
    pub const TOP5_UNIT: &'static str = "TOP5_UNIT";
    pub const WIN_TOUR: &'static str = "WIN_TOUR";
    pub const RED_LANTERN_TOUR: &'static str = "RED_LANTERN_TOUR";
    pub const SEASON_FULL: &'static str = "SEASON_FULL";
    pub const FIRST_BET: &'static str = "FIRST_BET";
    pub const TOP10_GLOBAL: &'static str = "TOP10_GLOBAL";

    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into())
    }

    #[must_use]
    pub fn first_unit_played(year: i32) -> Self {
        Self(format!("FIRST_UNIT_PLAYED_{year}"))
    }

    #[must_use]
    pub fn season_finisher(year: i32) -> Self {
        Self(format!("SEASON_FINISHER_{year}"))
    }

    #[must_use]
    pub fn monument_finisher(year: i32) -> Self {
        Self(format!("MONUMENT_FINISHER_{year}"))
    }

    #[must_use]
    pub fn grandtour_finisher(year: i32) -> Self {
        Self(format!("GRANDTOUR_FINISHER_{year}"))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BadgeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BadgeCode {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for BadgeCode {
    fn from(s: String) -> Self {
        Self(s)
    }
}

/// Catalog entry; seeded outside the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    pub code: BadgeCode,
    pub name: String,
    pub description: String,
}

/// A badge held by a user.
#[derive(Debug, Clone, PartialEq)]
pub struct UserBadge {
    pub user: UserId,
    pub badge: BadgeCode,
    pub context: AwardContext,
    /// Time of the first award; later context rewrites keep it.
    pub awarded_at: DateTime<Utc>,
}

/// Free-form JSON describing what triggered an award.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AwardContext(Value);

impl AwardContext {
    /// `{"type": "one_day" | "stage", "id": N}`
    #[must_use]
    pub fn unit(unit: UnitRef) -> Self {
        Self(json!({ "type": unit.kind().as_str(), "id": unit.raw_id() }))
    }

    /// `{"kind": "one_day" | "stage", "unit_id": N}`
    #[must_use]
    pub fn placement(unit: UnitRef) -> Self {
        Self(json!({ "kind": unit.kind().as_str(), "unit_id": unit.raw_id() }))
    }

    /// `{"type": "tour", "id": N}`
    #[must_use]
    pub fn tour(tour: TourId) -> Self {
        Self(json!({ "type": "tour", "id": tour.value() }))
    }

    /// `{"season": Y}`
    #[must_use]
    pub fn season(year: i32) -> Self {
        Self(json!({ "season": year }))
    }

    /// `{"year": Y}`
    #[must_use]
    pub fn year(year: i32) -> Self {
        Self(json!({ "year": year }))
    }

    /// `{"type": "global"}`
    #[must_use]
    pub fn global() -> Self {
        Self(json!({ "type": "global" }))
    }

    #[must_use]
    pub fn from_value(value: Value) -> Self {
        Self(value)
    }

    #[must_use]
    pub fn as_value(&self) -> &Value {
        &self.0
    }
}

impl fmt::Display for AwardContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Outcome of the storage-level award attempt.
#[derive(Debug, Clone, PartialEq)]
pub enum AwardWrite {
    /// A new (user, badge) row was inserted.
    Created,
    /// The pairing already existed with the given context.
    Existing { context: AwardContext },
}

/// A rule found its user and ran the award primitive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Awarded {
    pub user: UserId,
    pub code: BadgeCode,
    /// False when the user already held the badge or the catalog lacks it.
    pub newly_awarded: bool,
}

/// Why a rule did not award anything.
///
/// Skips are logged by the caller and never fail the triggering write.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    #[error("unit has fewer than three results")]
    UnitNotFinished,

    #[error("no scored bets in scope")]
    NoScores,

    #[error("user does not meet the eligibility condition")]
    NotEligible,

    #[error("storage failure: {0}")]
    Storage(String),
}

/// Result of evaluating a single badge rule.
pub type RuleResult = Result<Awarded, SkipReason>;

/// A rule evaluation labelled with the badge it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleOutcome {
    pub code: BadgeCode,
    pub result: RuleResult,
}

impl RuleOutcome {
    #[must_use]
    pub fn new(code: BadgeCode, result: RuleResult) -> Self {
        Self { code, result }
    }

    /// True when this evaluation inserted a new award.
    #[must_use]
    pub fn is_new_award(&self) -> bool {
        matches!(&self.result, Ok(a) if a.newly_awarded)
    }

    /// Short status for logs and command output.
    #[must_use]
    pub fn status(&self) -> String {
        match &self.result {
            Ok(a) if a.newly_awarded => format!("awarded to user {}", a.user),
            Ok(a) => format!("already held by user {}", a.user),
            Err(reason) => format!("skipped: {reason}"),
        }
    }
}
