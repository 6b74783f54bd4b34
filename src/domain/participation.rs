//! Season participation sets and the milestone conditions tested on them.
//!
//! Sets are rebuilt on every evaluation from the user's bets; nothing here
//! is cached between calls.

use std::collections::HashSet;

use super::bet::Bet;
use super::id::{OneDayRaceId, StageId};
use super::race::{OneDayRace, Tour};
use super::unit::UnitRef;

/// Number of monuments that must exist in a season for the monument badge.
pub const MONUMENT_COUNT: usize = 5;

/// Number of grand tours that must exist in a season for the grand tour badge.
pub const GRAND_TOUR_COUNT: usize = 3;

/// Calendar of one season: its one-day races and its tours with their stages.
#[derive(Debug, Clone, Default)]
pub struct SeasonLayout {
    pub one_days: Vec<OneDayRace>,
    pub tours: Vec<(Tour, Vec<StageId>)>,
}

impl SeasonLayout {
    /// Every unit of the season.
    #[must_use]
    pub fn all_units(&self) -> HashSet<UnitRef> {
        self.one_days
            .iter()
            .map(|r| UnitRef::OneDay(r.id))
            .chain(
                self.tours
                    .iter()
                    .flat_map(|(_, stages)| stages.iter().map(|s| UnitRef::Stage(*s))),
            )
            .collect()
    }

    /// One-day races whose name is in `names`.
    fn one_days_named(&self, names: &[String]) -> HashSet<OneDayRaceId> {
        self.one_days
            .iter()
            .filter(|r| names.iter().any(|n| n == &r.name))
            .map(|r| r.id)
            .collect()
    }

    /// Tours whose name is in `names`, with their stages.
    fn tours_named<'a>(
        &'a self,
        names: &'a [String],
    ) -> impl Iterator<Item = &'a (Tour, Vec<StageId>)> {
        self.tours
            .iter()
            .filter(move |(t, _)| names.iter().any(|n| n == &t.name))
    }
}

/// Units a user has played in one season.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeasonParticipation {
    pub one_days: HashSet<OneDayRaceId>,
    pub stages: HashSet<StageId>,
}

impl SeasonParticipation {
    /// Build the sets from complete submissions only.
    pub fn from_complete_bets<'a>(bets: impl IntoIterator<Item = &'a Bet>) -> Self {
        let mut sets = Self::default();
        for bet in bets.into_iter().filter(|b| b.is_complete_submission()) {
            match bet.unit {
                UnitRef::OneDay(id) => {
                    sets.one_days.insert(id);
                }
                UnitRef::Stage(id) => {
                    sets.stages.insert(id);
                }
            }
        }
        sets
    }

    #[must_use]
    pub fn played_any(&self) -> bool {
        !self.one_days.is_empty() || !self.stages.is_empty()
    }

    fn played_a_stage_of(&self, stages: &[StageId]) -> bool {
        stages.iter().any(|s| self.stages.contains(s))
    }

    /// All one-day races played and at least one stage of every tour.
    ///
    /// A season with no one-day races or no tours can't be finished, and a
    /// tour without stages blocks the badge.
    #[must_use]
    pub fn finishes_season(&self, layout: &SeasonLayout) -> bool {
        let one_days_ok = !layout.one_days.is_empty()
            && layout.one_days.iter().all(|r| self.one_days.contains(&r.id));
        let tours_ok = !layout.tours.is_empty()
            && layout
                .tours
                .iter()
                .all(|(_, stages)| self.played_a_stage_of(stages));
        one_days_ok && tours_ok
    }

    /// All five named monuments exist in the season and were played.
    #[must_use]
    pub fn finishes_monuments(&self, layout: &SeasonLayout, monuments: &[String]) -> bool {
        let ids = layout.one_days_named(monuments);
        ids.len() == MONUMENT_COUNT && ids.is_subset(&self.one_days)
    }

    /// All three named grand tours exist and each has a played stage.
    #[must_use]
    pub fn finishes_grand_tours(&self, layout: &SeasonLayout, grand_tours: &[String]) -> bool {
        let tours: Vec<&(Tour, Vec<StageId>)> = layout.tours_named(grand_tours).collect();
        tours.len() == GRAND_TOUR_COUNT
            && tours.iter().all(|(_, stages)| self.played_a_stage_of(stages))
    }
}

/// Every unit the user holds any bet on, drafts included.
///
/// The legacy full-season rule counts these rather than complete submissions.
pub fn units_with_any_bet<'a>(bets: impl IntoIterator<Item = &'a Bet>) -> HashSet<UnitRef> {
    bets.into_iter().map(|b| b.unit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::bet::PICK_COUNT;
    use crate::domain::id::{BetId, RiderId, TourId, UserId};
    use chrono::{TimeZone, Utc};

    fn race(id: i64, name: &str) -> OneDayRace {
        OneDayRace {
            id: OneDayRaceId::new(id),
            season_year: 2026,
            name: name.to_string(),
            starts_at: Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap(),
        }
    }

    fn tour(id: i64, name: &str, stages: &[i64]) -> (Tour, Vec<StageId>) {
        (
            Tour {
                id: TourId::new(id),
                season_year: 2026,
                name: name.to_string(),
                starts_at: Utc.with_ymd_and_hms(2026, 5, 1, 10, 0, 0).unwrap(),
            },
            stages.iter().map(|s| StageId::new(*s)).collect(),
        )
    }

    fn played(one_days: &[i64], stages: &[i64]) -> SeasonParticipation {
        SeasonParticipation {
            one_days: one_days.iter().map(|i| OneDayRaceId::new(*i)).collect(),
            stages: stages.iter().map(|i| StageId::new(*i)).collect(),
        }
    }

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn participation_counts_complete_submissions_only() {
        let full: [Option<RiderId>; PICK_COUNT] = [1, 2, 3, 4, 5].map(|i| Some(RiderId::new(i)));
        let complete = Bet {
            id: BetId::new(1),
            user: UserId::new(1),
            unit: UnitRef::OneDay(OneDayRaceId::new(10)),
            picks: full,
            submitted_at: Some(Utc::now()),
        };
        let draft = Bet {
            id: BetId::new(2),
            unit: UnitRef::Stage(StageId::new(20)),
            submitted_at: None,
            ..complete.clone()
        };
        let sets = SeasonParticipation::from_complete_bets([&complete, &draft]);
        assert_eq!(sets, played(&[10], &[]));
        assert!(sets.played_any());

        let any = units_with_any_bet([&complete, &draft]);
        assert_eq!(any.len(), 2);
    }

    #[test]
    fn season_finisher_needs_every_tour_touched() {
        let layout = SeasonLayout {
            one_days: vec![race(1, "A"), race(2, "B")],
            tours: vec![tour(1, "T1", &[11, 12]), tour(2, "T2", &[21, 22])],
        };
        assert!(played(&[1, 2], &[12, 21]).finishes_season(&layout));
        assert!(!played(&[1, 2], &[11, 12]).finishes_season(&layout));
        assert!(!played(&[1], &[11, 21]).finishes_season(&layout));
    }

    #[test]
    fn season_finisher_blocked_by_stageless_tour_or_empty_calendar() {
        let layout = SeasonLayout {
            one_days: vec![race(1, "A")],
            tours: vec![tour(1, "T1", &[11]), tour(2, "T2", &[])],
        };
        assert!(!played(&[1], &[11]).finishes_season(&layout));

        let no_tours = SeasonLayout {
            one_days: vec![race(1, "A")],
            tours: vec![],
        };
        assert!(!played(&[1], &[]).finishes_season(&no_tours));
    }

    #[test]
    fn monuments_need_all_five_to_exist() {
        let monuments = names(&["M1", "M2", "M3", "M4", "M5"]);
        let four = SeasonLayout {
            one_days: (1..=4).map(|i| race(i, &format!("M{i}"))).collect(),
            tours: vec![],
        };
        assert!(!played(&[1, 2, 3, 4], &[]).finishes_monuments(&four, &monuments));

        let five = SeasonLayout {
            one_days: (1..=6)
                .map(|i| race(i, &format!("M{i}")))
                .collect(),
            tours: vec![],
        };
        assert!(played(&[1, 2, 3, 4, 5], &[]).finishes_monuments(&five, &monuments));
        assert!(!played(&[1, 2, 3, 4, 6], &[]).finishes_monuments(&five, &monuments));
    }

    #[test]
    fn grand_tours_need_a_stage_of_each() {
        let gts = names(&["G1", "G2", "G3"]);
        let layout = SeasonLayout {
            one_days: vec![],
            tours: vec![
                tour(1, "G1", &[11, 12]),
                tour(2, "G2", &[21]),
                tour(3, "G3", &[31, 32]),
                tour(4, "Other", &[41]),
            ],
        };
        assert!(played(&[], &[12, 21, 31]).finishes_grand_tours(&layout, &gts));
        assert!(!played(&[], &[12, 21, 41]).finishes_grand_tours(&layout, &gts));

        let two = SeasonLayout {
            one_days: vec![],
            tours: vec![tour(1, "G1", &[11]), tour(2, "G2", &[21])],
        };
        assert!(!played(&[], &[11, 21]).finishes_grand_tours(&two, &gts));
    }

    #[test]
    fn all_units_covers_races_and_stages() {
        let layout = SeasonLayout {
            one_days: vec![race(1, "A")],
            tours: vec![tour(1, "T", &[11, 12])],
        };
        let units = layout.all_units();
        assert_eq!(units.len(), 3);
        assert!(units.contains(&UnitRef::Stage(StageId::new(12))));
    }
}
