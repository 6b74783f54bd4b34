//! In-memory store implementation for tests and embedding.
//!
//! All tables sit behind one lock, so a unit's score batch and an award
//! insert are each applied atomically.

use std::collections::{BTreeMap, HashMap, HashSet};
#[cfg(any(test, feature = "testkit"))]
use std::sync::atomic::{AtomicU32, Ordering};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use rust_decimal::Decimal;

use crate::domain::badge::{AwardContext, AwardWrite, Badge, BadgeCode, UserBadge};
use crate::domain::bet::{Bet, User};
use crate::domain::id::{BetId, OneDayRaceId, RiderId, StageId, TourId, UserId};
use crate::domain::race::{Entry, OneDayRace, RaceResult, Stage, Tour, FINISHED_RESULT_COUNT};
use crate::domain::score::{BetScore, ScoredBet};
use crate::domain::unit::{Unit, UnitRef};
use crate::error::{Error, Result};
use crate::port::outbound::store::{
    BadgeStore, BetReader, RaceReader, ReferenceDataWriter, ResultWriter, ScoreStore,
};

#[derive(Debug, Default)]
struct Tables {
    seasons: HashSet<i32>,
    tours: BTreeMap<TourId, Tour>,
    stages: BTreeMap<StageId, Stage>,
    one_days: BTreeMap<OneDayRaceId, OneDayRace>,
    users: HashMap<UserId, User>,
    entries: HashMap<(UnitRef, RiderId), Decimal>,
    results: HashMap<UnitRef, BTreeMap<u32, RiderId>>,
    bets: BTreeMap<BetId, Bet>,
    scores: HashMap<BetId, BetScore>,
    badges: BTreeMap<BadgeCode, Badge>,
    user_badges: BTreeMap<(UserId, BadgeCode), UserBadge>,
}

impl Tables {
    fn season_of(&self, unit: UnitRef) -> Option<i32> {
        match unit {
            UnitRef::OneDay(id) => self.one_days.get(&id).map(|r| r.season_year),
            UnitRef::Stage(id) => self
                .stages
                .get(&id)
                .and_then(|s| self.tours.get(&s.tour))
                .map(|t| t.season_year),
        }
    }
}

/// In-memory implementation of every storage port.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    #[cfg(any(test, feature = "testkit"))]
    failing_batches: AtomicU32,
}

impl MemoryStore {
    /// Create a new empty memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `n` unit score batches fail before writing anything.
    #[cfg(any(test, feature = "testkit"))]
    pub fn fail_next_score_batches(&self, n: u32) {
        self.failing_batches.store(n, Ordering::SeqCst);
    }

    #[cfg(any(test, feature = "testkit"))]
    fn take_injected_failure(&self) -> bool {
        self.failing_batches
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }

    #[cfg(not(any(test, feature = "testkit")))]
    fn take_injected_failure(&self) -> bool {
        false
    }
}

impl RaceReader for MemoryStore {
    async fn unit(&self, unit: UnitRef) -> Result<Option<Unit>> {
        let t = self.tables.read();
        Ok(match unit {
            UnitRef::OneDay(id) => t.one_days.get(&id).map(OneDayRace::to_unit),
            UnitRef::Stage(id) => t.stages.get(&id).and_then(|stage| {
                t.tours
                    .get(&stage.tour)
                    .map(|tour| stage.to_unit(tour.season_year))
            }),
        })
    }

    async fn season_exists(&self, year: i32) -> Result<bool> {
        Ok(self.tables.read().seasons.contains(&year))
    }

    async fn tour(&self, id: TourId) -> Result<Option<Tour>> {
        Ok(self.tables.read().tours.get(&id).cloned())
    }

    async fn one_day_races(&self, year: i32) -> Result<Vec<OneDayRace>> {
        let t = self.tables.read();
        Ok(t.one_days
            .values()
            .filter(|r| r.season_year == year)
            .cloned()
            .collect())
    }

    async fn tours(&self, year: i32) -> Result<Vec<Tour>> {
        let t = self.tables.read();
        Ok(t.tours
            .values()
            .filter(|r| r.season_year == year)
            .cloned()
            .collect())
    }

    async fn stages(&self, tour: TourId) -> Result<Vec<Stage>> {
        let t = self.tables.read();
        let mut stages: Vec<Stage> = t
            .stages
            .values()
            .filter(|s| s.tour == tour)
            .cloned()
            .collect();
        stages.sort_by_key(|s| (s.number, s.id));
        Ok(stages)
    }

    async fn entry_odds(&self, unit: UnitRef) -> Result<HashMap<RiderId, Decimal>> {
        let t = self.tables.read();
        Ok(t.entries
            .iter()
            .filter(|((u, _), _)| *u == unit)
            .map(|((_, rider), odds)| (*rider, *odds))
            .collect())
    }

    async fn results(&self, unit: UnitRef) -> Result<Vec<RaceResult>> {
        let t = self.tables.read();
        let Some(rows) = t.results.get(&unit) else {
            return Ok(Vec::new());
        };
        rows.iter()
            .map(|(position, rider)| {
                RaceResult::try_new(unit, *position, *rider).map_err(Error::from)
            })
            .collect()
    }

    async fn finished_units(&self) -> Result<Vec<UnitRef>> {
        let t = self.tables.read();
        let mut units: Vec<UnitRef> = t
            .results
            .iter()
            .filter(|(_, rows)| rows.len() >= FINISHED_RESULT_COUNT)
            .map(|(unit, _)| *unit)
            .collect();
        units.sort();
        Ok(units)
    }
}

impl ResultWriter for MemoryStore {
    async fn insert_result(&self, result: &RaceResult) -> Result<()> {
        let mut t = self.tables.write();
        if t.season_of(result.unit()).is_none() {
            return Err(Error::not_found("unit", result.unit()));
        }
        let rows = t.results.entry(result.unit()).or_default();
        if rows.contains_key(&result.position()) {
            return Err(Error::Database(format!(
                "UNIQUE constraint failed: results position {} on {}",
                result.position(),
                result.unit()
            )));
        }
        if rows.values().any(|r| *r == result.rider()) {
            return Err(Error::Database(format!(
                "UNIQUE constraint failed: results rider {} on {}",
                result.rider(),
                result.unit()
            )));
        }
        rows.insert(result.position(), result.rider());
        Ok(())
    }

    async fn delete_result(&self, unit: UnitRef, position: u32) -> Result<bool> {
        let mut t = self.tables.write();
        Ok(t.results
            .get_mut(&unit)
            .is_some_and(|rows| rows.remove(&position).is_some()))
    }
}

impl BetReader for MemoryStore {
    async fn bet(&self, id: BetId) -> Result<Option<Bet>> {
        Ok(self.tables.read().bets.get(&id).cloned())
    }

    async fn bets_for_unit(&self, unit: UnitRef) -> Result<Vec<Bet>> {
        let t = self.tables.read();
        Ok(t.bets.values().filter(|b| b.unit == unit).cloned().collect())
    }

    async fn bets_for_user_in_season(&self, user: UserId, year: i32) -> Result<Vec<Bet>> {
        let t = self.tables.read();
        Ok(t.bets
            .values()
            .filter(|b| b.user == user && t.season_of(b.unit) == Some(year))
            .cloned()
            .collect())
    }

    async fn submitted_bet_count(&self, user: UserId) -> Result<u64> {
        let t = self.tables.read();
        Ok(t.bets
            .values()
            .filter(|b| b.user == user && b.is_submitted())
            .count() as u64)
    }

    async fn user(&self, id: UserId) -> Result<Option<User>> {
        Ok(self.tables.read().users.get(&id).cloned())
    }
}

impl ScoreStore for MemoryStore {
    async fn upsert_score(
        &self,
        bet: BetId,
        score: Decimal,
        computed_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut t = self.tables.write();
        if !t.bets.contains_key(&bet) {
            return Err(Error::not_found("bet", bet));
        }
        t.scores.insert(
            bet,
            BetScore {
                bet,
                score,
                computed_at,
            },
        );
        Ok(())
    }

    async fn replace_unit_scores(
        &self,
        unit: UnitRef,
        scores: &[(BetId, Decimal)],
        computed_at: DateTime<Utc>,
    ) -> Result<()> {
        if self.take_injected_failure() {
            return Err(Error::Database(format!("injected batch failure on {unit}")));
        }
        let mut t = self.tables.write();
        if let Some((bet, _)) = scores
            .iter()
            .find(|(bet, _)| t.bets.get(bet).map(|b| b.unit) != Some(unit))
        {
            return Err(Error::Database(format!("bet {bet} is not on {unit}")));
        }
        for (bet, score) in scores {
            t.scores.insert(
                *bet,
                BetScore {
                    bet: *bet,
                    score: *score,
                    computed_at,
                },
            );
        }
        Ok(())
    }

    async fn score(&self, bet: BetId) -> Result<Option<BetScore>> {
        Ok(self.tables.read().scores.get(&bet).cloned())
    }

    async fn scored_bets(&self, units: &[UnitRef]) -> Result<Vec<ScoredBet>> {
        let wanted: HashSet<UnitRef> = units.iter().copied().collect();
        let t = self.tables.read();
        Ok(t.bets
            .values()
            .filter(|b| wanted.contains(&b.unit))
            .filter_map(|b| {
                let score = t.scores.get(&b.id)?;
                let user = t.users.get(&b.user)?;
                Some(ScoredBet {
                    bet: b.id,
                    user: b.user,
                    username: user.username.clone(),
                    unit: b.unit,
                    score: score.score,
                    submitted_at: b.submitted_at,
                })
            })
            .collect())
    }
}

impl BadgeStore for MemoryStore {
    async fn badge(&self, code: &BadgeCode) -> Result<Option<Badge>> {
        Ok(self.tables.read().badges.get(code).cloned())
    }

    async fn upsert_badge(&self, badge: &Badge) -> Result<bool> {
        let mut t = self.tables.write();
        Ok(t.badges.insert(badge.code.clone(), badge.clone()).is_none())
    }

    async fn insert_user_badge_if_absent(&self, award: &UserBadge) -> Result<AwardWrite> {
        let mut t = self.tables.write();
        let key = (award.user, award.badge.clone());
        if let Some(existing) = t.user_badges.get(&key) {
            return Ok(AwardWrite::Existing {
                context: existing.context.clone(),
            });
        }
        t.user_badges.insert(key, award.clone());
        Ok(AwardWrite::Created)
    }

    async fn update_user_badge_context(
        &self,
        user: UserId,
        code: &BadgeCode,
        context: &AwardContext,
    ) -> Result<()> {
        let mut t = self.tables.write();
        let award = t
            .user_badges
            .get_mut(&(user, code.clone()))
            .ok_or_else(|| Error::not_found("user badge", format!("{user}/{code}")))?;
        award.context = context.clone();
        Ok(())
    }

    async fn user_badges(&self, user: UserId) -> Result<Vec<UserBadge>> {
        let t = self.tables.read();
        Ok(t.user_badges
            .values()
            .filter(|b| b.user == user)
            .cloned()
            .collect())
    }
}

impl ReferenceDataWriter for MemoryStore {
    async fn insert_season(&self, year: i32) -> Result<()> {
        self.tables.write().seasons.insert(year);
        Ok(())
    }

    async fn insert_tour(&self, tour: &Tour) -> Result<()> {
        let mut t = self.tables.write();
        if !t.seasons.contains(&tour.season_year) {
            return Err(Error::not_found("season", tour.season_year));
        }
        t.tours.insert(tour.id, tour.clone());
        Ok(())
    }

    async fn insert_stage(&self, stage: &Stage) -> Result<()> {
        let mut t = self.tables.write();
        if !t.tours.contains_key(&stage.tour) {
            return Err(Error::not_found("tour", stage.tour));
        }
        t.stages.insert(stage.id, stage.clone());
        Ok(())
    }

    async fn insert_one_day_race(&self, race: &OneDayRace) -> Result<()> {
        let mut t = self.tables.write();
        if !t.seasons.contains(&race.season_year) {
            return Err(Error::not_found("season", race.season_year));
        }
        t.one_days.insert(race.id, race.clone());
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        self.tables.write().users.insert(user.id, user.clone());
        Ok(())
    }

    async fn upsert_entry(&self, entry: &Entry) -> Result<()> {
        self.tables
            .write()
            .entries
            .insert((entry.unit, entry.rider), entry.odds);
        Ok(())
    }

    async fn upsert_bet(&self, bet: &Bet) -> Result<()> {
        let mut t = self.tables.write();
        if let Some(other) = t
            .bets
            .values()
            .find(|b| b.id != bet.id && b.user == bet.user && b.unit == bet.unit)
        {
            return Err(Error::Database(format!(
                "UNIQUE constraint failed: bet {} already covers {} for user {}",
                other.id, bet.unit, bet.user
            )));
        }
        t.bets.insert(bet.id, bet.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::unit::StageType;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 21, 10, 0, 0).unwrap()
    }

    async fn seeded() -> MemoryStore {
        let store = MemoryStore::new();
        store.insert_season(2026).await.unwrap();
        store
            .insert_one_day_race(&OneDayRace {
                id: OneDayRaceId::new(1),
                season_year: 2026,
                name: "Milan-San Remo".into(),
                starts_at: start(),
            })
            .await
            .unwrap();
        store
            .insert_tour(&Tour {
                id: TourId::new(1),
                season_year: 2026,
                name: "Tour de France".into(),
                starts_at: start(),
            })
            .await
            .unwrap();
        store
            .insert_stage(&Stage {
                id: StageId::new(10),
                tour: TourId::new(1),
                number: 1,
                name: "Stage 1".into(),
                starts_at: start(),
                stage_type: StageType::Flat,
            })
            .await
            .unwrap();
        store
            .insert_user(&User {
                id: UserId::new(1),
                username: "ana".into(),
            })
            .await
            .unwrap();
        store
    }

    fn bet(id: i64, unit: UnitRef) -> Bet {
        Bet {
            id: BetId::new(id),
            user: UserId::new(1),
            unit,
            picks: [1, 2, 3, 4, 5].map(|r| Some(RiderId::new(r))),
            submitted_at: Some(start()),
        }
    }

    #[tokio::test]
    async fn stage_unit_resolves_season_through_tour() {
        let store = seeded().await;
        let unit = store
            .unit(UnitRef::Stage(StageId::new(10)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unit.season_year, 2026);
        assert_eq!(unit.tour, Some(TourId::new(1)));
    }

    #[tokio::test]
    async fn duplicate_result_position_is_rejected() {
        let store = seeded().await;
        let unit = UnitRef::OneDay(OneDayRaceId::new(1));
        store
            .insert_result(&RaceResult::try_new(unit, 1, RiderId::new(1)).unwrap())
            .await
            .unwrap();
        let dup = store
            .insert_result(&RaceResult::try_new(unit, 1, RiderId::new(2)).unwrap())
            .await;
        assert!(dup.is_err());
        assert!(store.delete_result(unit, 1).await.unwrap());
        assert!(!store.delete_result(unit, 1).await.unwrap());
    }

    #[tokio::test]
    async fn second_award_insert_sees_existing_context() {
        let store = seeded().await;
        let award = UserBadge {
            user: UserId::new(1),
            badge: BadgeCode::from(BadgeCode::FIRST_BET),
            context: AwardContext::global(),
            awarded_at: start(),
        };
        assert_eq!(
            store.insert_user_badge_if_absent(&award).await.unwrap(),
            AwardWrite::Created
        );
        assert_eq!(
            store.insert_user_badge_if_absent(&award).await.unwrap(),
            AwardWrite::Existing {
                context: AwardContext::global()
            }
        );
        assert_eq!(store.user_badges(UserId::new(1)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failed_batch_writes_nothing() {
        let store = seeded().await;
        let unit = UnitRef::OneDay(OneDayRaceId::new(1));
        store.upsert_bet(&bet(1, unit)).await.unwrap();
        store.fail_next_score_batches(1);

        let batch = [(BetId::new(1), dec!(1.5))];
        assert!(store.replace_unit_scores(unit, &batch, start()).await.is_err());
        assert!(store.score(BetId::new(1)).await.unwrap().is_none());

        store.replace_unit_scores(unit, &batch, start()).await.unwrap();
        assert_eq!(store.score(BetId::new(1)).await.unwrap().unwrap().score, dec!(1.5));
    }

    #[tokio::test]
    async fn batch_rejects_bet_from_another_unit() {
        let store = seeded().await;
        let one_day = UnitRef::OneDay(OneDayRaceId::new(1));
        let stage = UnitRef::Stage(StageId::new(10));
        store.upsert_bet(&bet(1, one_day)).await.unwrap();
        store.upsert_bet(&bet(2, stage)).await.unwrap();

        let batch = [(BetId::new(1), dec!(1)), (BetId::new(2), dec!(2))];
        assert!(store.replace_unit_scores(one_day, &batch, start()).await.is_err());
        assert!(store.score(BetId::new(1)).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn season_bets_cover_one_days_and_stages() {
        let store = seeded().await;
        store
            .upsert_bet(&bet(1, UnitRef::OneDay(OneDayRaceId::new(1))))
            .await
            .unwrap();
        store
            .upsert_bet(&bet(2, UnitRef::Stage(StageId::new(10))))
            .await
            .unwrap();
        let bets = store
            .bets_for_user_in_season(UserId::new(1), 2026)
            .await
            .unwrap();
        assert_eq!(bets.len(), 2);
        assert!(store
            .bets_for_user_in_season(UserId::new(1), 2025)
            .await
            .unwrap()
            .is_empty());
        assert_eq!(store.submitted_bet_count(UserId::new(1)).await.unwrap(), 2);
    }
}
