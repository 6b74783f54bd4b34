//! Storage-agnostic game logic: race units, bets, scoring, leaderboards
//! and badge eligibility.

pub mod badge;
pub mod bet;
pub mod error;
pub mod id;
pub mod leaderboard;
pub mod participation;
pub mod race;
pub mod score;
pub mod unit;

pub use badge::{AwardContext, Badge, BadgeCode, RuleOutcome, SkipReason, UserBadge};
pub use bet::{Bet, Picks, User, PICK_COUNT};
pub use error::DomainError;
pub use id::{BetId, OneDayRaceId, RiderId, StageId, TourId, UserId};
pub use leaderboard::{CompactRow, LeaderboardRow, Scope, TourCategory};
pub use race::{Entry, OneDayRace, RaceResult, Stage, Tour};
pub use score::{BetScore, Podium, ScoredBet};
pub use unit::{StageType, Unit, UnitKind, UnitRef};
