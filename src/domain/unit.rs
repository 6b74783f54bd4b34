//! Bettable race units.
//!
//! A unit is either a one-day race or one stage of a tour. [`UnitRef`] is a
//! sum type, so a reference that names both or neither cannot be built.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::DomainError;
use super::id::{OneDayRaceId, StageId, TourId};

/// Reference to exactly one bettable unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id", rename_all = "snake_case")]
pub enum UnitRef {
    /// A one-day race.
    OneDay(OneDayRaceId),
    /// A stage of a tour.
    Stage(StageId),
}

impl UnitRef {
    /// The discriminant of this reference.
    #[must_use]
    pub const fn kind(&self) -> UnitKind {
        match self {
            Self::OneDay(_) => UnitKind::OneDay,
            Self::Stage(_) => UnitKind::Stage,
        }
    }

    /// Raw key of the referenced race or stage.
    #[must_use]
    pub const fn raw_id(&self) -> i64 {
        match self {
            Self::OneDay(id) => id.value(),
            Self::Stage(id) => id.value(),
        }
    }

    #[must_use]
    pub const fn is_stage(&self) -> bool {
        matches!(self, Self::Stage(_))
    }
}

impl fmt::Display for UnitRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OneDay(id) => write!(f, "one-day:{id}"),
            Self::Stage(id) => write!(f, "stage:{id}"),
        }
    }
}

impl FromStr for UnitRef {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DomainError::InvalidUnitRef {
            input: s.to_string(),
        };
        let (kind, id) = s.split_once(':').ok_or_else(invalid)?;
        let id: i64 = id.trim().parse().map_err(|_| invalid())?;
        match kind.trim() {
            "one-day" | "one_day" | "oneday" => Ok(Self::OneDay(OneDayRaceId::new(id))),
            "stage" => Ok(Self::Stage(StageId::new(id))),
            _ => Err(invalid()),
        }
    }
}

/// Discriminant of a [`UnitRef`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitKind {
    OneDay,
    Stage,
}

impl UnitKind {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::OneDay => "one_day",
            Self::Stage => "stage",
        }
    }
}

/// Terrain profile of a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StageType {
    Flat,
    Hilly,
    Mountain,
    #[serde(rename = "TT")]
    TimeTrial,
}

impl StageType {
    /// Storage code of the stage type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Flat => "FLAT",
            Self::Hilly => "HILLY",
            Self::Mountain => "MOUNTAIN",
            Self::TimeTrial => "TT",
        }
    }
}

impl fmt::Display for StageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FLAT" => Ok(Self::Flat),
            "HILLY" => Ok(Self::Hilly),
            "MOUNTAIN" => Ok(Self::Mountain),
            "TT" => Ok(Self::TimeTrial),
            _ => Err(DomainError::UnknownStageType {
                value: s.to_string(),
            }),
        }
    }
}

/// Resolved view of a unit with its grouping context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Unit {
    pub unit: UnitRef,
    pub name: String,
    pub season_year: i32,
    pub starts_at: DateTime<Utc>,
    /// Parent tour, set for stages only.
    pub tour: Option<TourId>,
    /// Terrain profile, set for stages only.
    pub stage_type: Option<StageType>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unit_ref_display_roundtrips_through_from_str() {
        for unit in [
            UnitRef::OneDay(OneDayRaceId::new(3)),
            UnitRef::Stage(StageId::new(14)),
        ] {
            let parsed: UnitRef = unit.to_string().parse().unwrap();
            assert_eq!(parsed, unit);
        }
    }

    #[test]
    fn unit_ref_accepts_snake_case_kind() {
        let parsed: UnitRef = "one_day:8".parse().unwrap();
        assert_eq!(parsed, UnitRef::OneDay(OneDayRaceId::new(8)));
    }

    #[test]
    fn unit_ref_rejects_unknown_kind_and_bad_id() {
        assert!("race:1".parse::<UnitRef>().is_err());
        assert!("stage:abc".parse::<UnitRef>().is_err());
        assert!("stage".parse::<UnitRef>().is_err());
    }

    #[test]
    fn unit_ref_kind_and_raw_id() {
        let unit = UnitRef::Stage(StageId::new(5));
        assert_eq!(unit.kind(), UnitKind::Stage);
        assert_eq!(unit.kind().as_str(), "stage");
        assert_eq!(unit.raw_id(), 5);
        assert!(unit.is_stage());
    }

    #[test]
    fn stage_type_parses_storage_codes() {
        assert_eq!("TT".parse::<StageType>().unwrap(), StageType::TimeTrial);
        assert_eq!("mountain".parse::<StageType>().unwrap(), StageType::Mountain);
        assert!("COBBLES".parse::<StageType>().is_err());
    }

    #[test]
    fn stage_type_serde_matches_storage_codes() {
        let json = serde_json::to_string(&StageType::TimeTrial).unwrap();
        assert_eq!(json, "\"TT\"");
        let json = serde_json::to_string(&StageType::Hilly).unwrap();
        assert_eq!(json, "\"HILLY\"");
    }
}
