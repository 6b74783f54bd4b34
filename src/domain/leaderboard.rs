//! Leaderboard ranking and compaction.
//!
//! Ranking sums per-bet scores by user, orders by total descending and then
//! by username ascending, and numbers the rows 1..N. Compaction keeps the
//! top, the bottom and a window around the requesting user, with explicit
//! [`CompactRow::Gap`] markers where rows were dropped.
//!
//! # Examples
//!
//! ```
//! use peloton::domain::id::UserId;
//! use peloton::domain::leaderboard::{compact, rank_totals, CompactRow};
//! use rust_decimal::Decimal;
//!
//! let totals = (1..=100).map(|i| {
//!     (UserId::new(i), format!("user{i:03}"), Decimal::from(1000 - i))
//! });
//! let rows = rank_totals(totals);
//! let view = compact(&rows, Some(UserId::new(50)), 3, 3, 1);
//!
//! assert_eq!(view.len(), 11);
//! assert!(matches!(view[3], CompactRow::Gap));
//! ```

use std::collections::{HashMap, HashSet};

use rust_decimal::Decimal;
use serde::Serialize;

use super::error::DomainError;
use super::id::{TourId, UserId};
use super::unit::{StageType, UnitRef};

/// Sub-classification of a tour by stage terrain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TourCategory {
    /// Flat stages.
    Sprinter,
    /// Mountain stages.
    Climber,
    /// Hilly stages.
    Breakaway,
    /// Time trials.
    TimeTrialist,
}

impl TourCategory {
    /// Stage types counted by this classification.
    #[must_use]
    pub const fn stage_types(&self) -> &'static [StageType] {
        match self {
            Self::Sprinter => &[StageType::Flat],
            Self::Climber => &[StageType::Mountain],
            Self::Breakaway => &[StageType::Hilly],
            Self::TimeTrialist => &[StageType::TimeTrial],
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Sprinter => "sprinter",
            Self::Climber => "climber",
            Self::Breakaway => "breakaway",
            Self::TimeTrialist => "time-trialist",
        }
    }
}

impl std::str::FromStr for TourCategory {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sprinter" => Ok(Self::Sprinter),
            "climber" => Ok(Self::Climber),
            "breakaway" => Ok(Self::Breakaway),
            "time-trialist" | "time_trialist" | "tt" => Ok(Self::TimeTrialist),
            _ => Err(DomainError::UnknownCategory {
                value: s.to_string(),
            }),
        }
    }
}

/// Set of bets a leaderboard sums over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Scope {
    /// Every one-day race and stage of a season, optionally restricted to
    /// a member list (league leaderboards).
    Global {
        year: i32,
        members: Option<HashSet<UserId>>,
    },
    /// A single one-day race or stage.
    Unit(UnitRef),
    /// All stages of a tour.
    Tour(TourId),
    /// Stages of a tour matching a category.
    TourCategory { tour: TourId, category: TourCategory },
}

impl Scope {
    #[must_use]
    pub const fn season(year: i32) -> Self {
        Self::Global {
            year,
            members: None,
        }
    }
}

/// One ranked user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub user: UserId,
    pub username: String,
    pub total: Decimal,
    /// Set on the requesting user's row.
    pub is_me: bool,
}

/// Entry of a compacted leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CompactRow {
    Row(LeaderboardRow),
    /// Rows were omitted here.
    Gap,
}

impl CompactRow {
    #[must_use]
    pub fn row(&self) -> Option<&LeaderboardRow> {
        match self {
            Self::Row(row) => Some(row),
            Self::Gap => None,
        }
    }
}

/// Sum per-user score contributions and rank them.
///
/// Input items are `(user, username, score)`; a user may appear many times.
pub fn rank_totals(
    items: impl IntoIterator<Item = (UserId, String, Decimal)>,
) -> Vec<LeaderboardRow> {
    let mut totals: HashMap<UserId, (String, Decimal)> = HashMap::new();
    for (user, username, score) in items {
        let total = &mut totals
            .entry(user)
            .or_insert_with(|| (username, Decimal::ZERO))
            .1;
        *total = total.saturating_add(score);
    }

    let mut rows: Vec<LeaderboardRow> = totals
        .into_iter()
        .map(|(user, (username, total))| LeaderboardRow {
            rank: 0,
            user,
            username,
            total,
            is_me: false,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.username.cmp(&b.username))
            .then_with(|| a.user.cmp(&b.user))
    });
    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i + 1;
    }
    rows
}

/// Flag the requesting user's row, clearing any previous flag.
pub fn mark_requesting_user(rows: &mut [LeaderboardRow], user: Option<UserId>) {
    for row in rows {
        row.is_me = Some(row.user) == user;
    }
}

/// Bounded view of a ranking: top `top_n`, bottom `bottom_n` and `window`
/// rows either side of `user`.
///
/// Rankings no longer than `top_n + bottom_n + 2 * window + 1` are returned
/// whole. A user absent from the ranking gets no window.
#[must_use]
pub fn compact(
    rows: &[LeaderboardRow],
    user: Option<UserId>,
    top_n: usize,
    bottom_n: usize,
    window: usize,
) -> Vec<CompactRow> {
    let n = rows.len();
    let budget = top_n
        .saturating_add(bottom_n)
        .saturating_add(window.saturating_mul(2))
        .saturating_add(1);
    if n <= budget {
        return rows.iter().cloned().map(CompactRow::Row).collect();
    }

    let mut keep = vec![false; n];
    keep.iter_mut().take(top_n).for_each(|k| *k = true);
    keep.iter_mut().skip(n.saturating_sub(bottom_n)).for_each(|k| *k = true);

    if let Some(idx) = user.and_then(|u| rows.iter().position(|r| r.user == u)) {
        let start = idx.saturating_sub(window);
        let end = idx.saturating_add(window).min(n - 1);
        keep[start..=end].iter_mut().for_each(|k| *k = true);
    }

    let mut out = Vec::new();
    let mut last: Option<usize> = None;
    for (i, row) in rows.iter().enumerate().filter(|(i, _)| keep[*i]) {
        if last.is_some_and(|l| i > l + 1) {
            out.push(CompactRow::Gap);
        }
        out.push(CompactRow::Row(row.clone()));
        last = Some(i);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn hundred() -> Vec<LeaderboardRow> {
        rank_totals((1..=100).map(|i| {
            (
                UserId::new(i),
                format!("rider-fan-{i:03}"),
                Decimal::from(1000 - i),
            )
        }))
    }

    fn ranks(view: &[CompactRow]) -> Vec<Option<usize>> {
        view.iter().map(|r| r.row().map(|row| row.rank)).collect()
    }

    #[test]
    fn ties_break_by_username_not_insertion_order() {
        let rows = rank_totals(vec![
            (UserId::new(2), "zoe".to_string(), dec!(10.5)),
            (UserId::new(1), "adam".to_string(), dec!(10.5)),
        ]);
        assert_eq!(rows[0].username, "adam");
        assert_eq!(rows[0].rank, 1);
        assert_eq!(rows[1].username, "zoe");
        assert_eq!(rows[1].rank, 2);
    }

    #[test]
    fn totals_are_summed_per_user() {
        let rows = rank_totals(vec![
            (UserId::new(1), "a".to_string(), dec!(1.25)),
            (UserId::new(2), "b".to_string(), dec!(2.0)),
            (UserId::new(1), "a".to_string(), dec!(1.25)),
        ]);
        assert_eq!(rows[0].user, UserId::new(1));
        assert_eq!(rows[0].total, dec!(2.5));
        assert_eq!(rows[1].total, dec!(2.0));
    }

    #[test]
    fn mark_requesting_user_flags_one_row() {
        let mut rows = hundred();
        mark_requesting_user(&mut rows, Some(UserId::new(7)));
        assert_eq!(rows.iter().filter(|r| r.is_me).count(), 1);
        assert!(rows[6].is_me);
        mark_requesting_user(&mut rows, None);
        assert!(rows.iter().all(|r| !r.is_me));
    }

    #[test]
    fn compact_keeps_top_window_bottom_with_gaps() {
        let rows = hundred();
        let view = compact(&rows, Some(UserId::new(50)), 3, 3, 1);
        assert_eq!(
            ranks(&view),
            vec![
                Some(1),
                Some(2),
                Some(3),
                None,
                Some(49),
                Some(50),
                Some(51),
                None,
                Some(98),
                Some(99),
                Some(100)
            ]
        );
    }

    #[test]
    fn compact_without_user_keeps_top_and_bottom() {
        let rows = hundred();
        let view = compact(&rows, Some(UserId::new(999)), 3, 3, 1);
        assert_eq!(
            ranks(&view),
            vec![Some(1), Some(2), Some(3), None, Some(98), Some(99), Some(100)]
        );
    }

    #[test]
    fn compact_merges_adjacent_window_without_gap() {
        let rows = hundred();
        let view = compact(&rows, Some(UserId::new(4)), 3, 3, 1);
        assert_eq!(
            ranks(&view),
            vec![Some(1), Some(2), Some(3), Some(4), Some(5), None, Some(98), Some(99), Some(100)]
        );
    }

    #[test]
    fn short_ranking_is_returned_whole() {
        let rows: Vec<LeaderboardRow> = hundred().into_iter().take(9).collect();
        let view = compact(&rows, None, 3, 3, 1);
        assert_eq!(view.len(), 9);
        assert!(view.iter().all(|r| r.row().is_some()));
    }

    #[test]
    fn huge_view_sizes_return_the_ranking_whole() {
        let rows = hundred();
        let sizes = [
            (usize::MAX, 3, 1),
            (3, 3, usize::MAX),
            (usize::MAX, usize::MAX, usize::MAX),
        ];
        for (top, bottom, window) in sizes {
            let view = compact(&rows, Some(UserId::new(50)), top, bottom, window);
            assert_eq!(view.len(), 100, "top={top} bottom={bottom} window={window}");
        }
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let rows = rank_totals([
            (UserId::new(1), "big".to_string(), Decimal::MAX),
            (UserId::new(1), "big".to_string(), Decimal::MAX),
            (UserId::new(2), "small".to_string(), dec!(1)),
        ]);
        assert_eq!(rows[0].total, Decimal::MAX);
        assert_eq!(rows[1].username, "small");
    }

    #[test]
    fn category_parsing_and_stage_types() {
        let cat: TourCategory = "climber".parse().unwrap();
        assert_eq!(cat.stage_types(), &[StageType::Mountain]);
        assert_eq!("TT".parse::<TourCategory>().unwrap(), TourCategory::TimeTrialist);
        assert!("puncheur".parse::<TourCategory>().is_err());
    }
}
