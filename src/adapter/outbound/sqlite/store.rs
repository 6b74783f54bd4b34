//! SQLite store implementation.
//!
//! Unit-bearing rows carry a nullable `one_day_race_id` / `stage_id` pair;
//! rows are decoded into [`UnitRef`] and a pair with both or neither column
//! set is reported as [`Error::Parse`].

use std::collections::{HashMap, HashSet};
use std::str::FromStr;

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, PooledConnection};
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use rust_decimal::Decimal;

use super::database::connection::DbPool;
use super::database::model::{
    BadgeRow, BetRow, BetScoreRow, NewEntryRow, NewResultRow, NewUserBadgeRow, OneDayRaceRow,
    ResultRow, SeasonRow, StageRow, TourRow, UserBadgeRow, UserRow,
};
use super::database::schema::{
    badges, bet_scores, bets, entries, one_day_races, results, seasons, stages, tours,
    user_badges, users,
};
use crate::domain::badge::{AwardContext, AwardWrite, Badge, BadgeCode, UserBadge};
use crate::domain::bet::{Bet, User};
use crate::domain::id::{BetId, OneDayRaceId, RiderId, StageId, TourId, UserId};
use crate::domain::race::{Entry, OneDayRace, RaceResult, Stage, Tour, FINISHED_RESULT_COUNT};
use crate::domain::score::{BetScore, ScoredBet};
use crate::domain::unit::{StageType, Unit, UnitRef};
use crate::error::{Error, Result};
use crate::port::outbound::store::{
    BadgeStore, BetReader, RaceReader, ReferenceDataWriter, ResultWriter, ScoreStore,
};

type Conn = PooledConnection<ConnectionManager<SqliteConnection>>;

/// Row shape of the scored-bet join.
type ScoredRow = (
    i64,
    i64,
    String,
    Option<i64>,
    Option<i64>,
    String,
    Option<String>,
);

/// SQLite-backed implementation of every storage port.
pub struct SqliteStore {
    pool: DbPool,
}

impl SqliteStore {
    /// Create a new SQLite store with the given connection pool.
    #[must_use]
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> Result<Conn> {
        self.pool.get().map_err(|e| Error::Connection(e.to_string()))
    }

    fn unit_columns(unit: UnitRef) -> (Option<i64>, Option<i64>) {
        match unit {
            UnitRef::OneDay(id) => (Some(id.value()), None),
            UnitRef::Stage(id) => (None, Some(id.value())),
        }
    }

    fn unit_from_columns(one_day: Option<i64>, stage: Option<i64>) -> Result<UnitRef> {
        match (one_day, stage) {
            (Some(id), None) => Ok(UnitRef::OneDay(OneDayRaceId::new(id))),
            (None, Some(id)) => Ok(UnitRef::Stage(StageId::new(id))),
            (od, st) => Err(Error::Parse(format!(
                "row must reference exactly one unit, got one_day_race_id={od:?} stage_id={st:?}"
            ))),
        }
    }

    /// Split unit references into one-day and stage key lists.
    fn split_units(units: &[UnitRef]) -> (Vec<i64>, Vec<i64>) {
        let mut one_days = Vec::new();
        let mut stages = Vec::new();
        for unit in units {
            match unit {
                UnitRef::OneDay(id) => one_days.push(id.value()),
                UnitRef::Stage(id) => stages.push(id.value()),
            }
        }
        (one_days, stages)
    }

    fn parse_time(value: &str) -> Result<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| Error::Parse(e.to_string()))
    }

    fn parse_decimal(value: &str) -> Result<Decimal> {
        Decimal::from_str(value).map_err(|e| Error::Parse(e.to_string()))
    }

    fn tour_from_row(row: TourRow) -> Result<Tour> {
        Ok(Tour {
            id: TourId::new(row.id),
            season_year: row.season_year,
            name: row.name,
            starts_at: Self::parse_time(&row.starts_at)?,
        })
    }

    fn stage_from_row(row: StageRow) -> Result<Stage> {
        Ok(Stage {
            id: StageId::new(row.id),
            tour: TourId::new(row.tour_id),
            number: u32::try_from(row.number).map_err(|e| Error::Parse(e.to_string()))?,
            name: row.name,
            starts_at: Self::parse_time(&row.starts_at)?,
            stage_type: StageType::from_str(&row.stage_type)?,
        })
    }

    fn one_day_from_row(row: OneDayRaceRow) -> Result<OneDayRace> {
        Ok(OneDayRace {
            id: OneDayRaceId::new(row.id),
            season_year: row.season_year,
            name: row.name,
            starts_at: Self::parse_time(&row.starts_at)?,
        })
    }

    fn result_from_row(row: ResultRow) -> Result<RaceResult> {
        let unit = Self::unit_from_columns(row.one_day_race_id, row.stage_id)?;
        let position = u32::try_from(row.position).map_err(|e| Error::Parse(e.to_string()))?;
        Ok(RaceResult::try_new(unit, position, RiderId::new(row.rider_id))?)
    }

    fn bet_to_row(bet: &Bet) -> BetRow {
        let (one_day_race_id, stage_id) = Self::unit_columns(bet.unit);
        let [pick1, pick2, pick3, pick4, pick5] = bet.picks.map(|p| p.map(|r| r.value()));
        BetRow {
            id: bet.id.value(),
            user_id: bet.user.value(),
            one_day_race_id,
            stage_id,
            pick1,
            pick2,
            pick3,
            pick4,
            pick5,
            submitted_at: bet.submitted_at.map(|t| t.to_rfc3339()),
        }
    }

    fn bet_from_row(row: BetRow) -> Result<Bet> {
        let unit = Self::unit_from_columns(row.one_day_race_id, row.stage_id)?;
        let picks = [row.pick1, row.pick2, row.pick3, row.pick4, row.pick5]
            .map(|p| p.map(RiderId::new));
        let submitted_at = row
            .submitted_at
            .as_deref()
            .map(Self::parse_time)
            .transpose()?;
        Ok(Bet::try_new(
            BetId::new(row.id),
            UserId::new(row.user_id),
            unit,
            picks,
            submitted_at,
        )?)
    }

    fn user_badge_from_row(row: UserBadgeRow) -> Result<UserBadge> {
        Ok(UserBadge {
            user: UserId::new(row.user_id),
            badge: BadgeCode::from(row.badge_code),
            context: AwardContext::from_value(serde_json::from_str(&row.context)?),
            awarded_at: Self::parse_time(&row.awarded_at)?,
        })
    }

    fn load_bet_rows_for_unit(
        conn: &mut SqliteConnection,
        unit: UnitRef,
    ) -> QueryResult<Vec<BetRow>> {
        match unit {
            UnitRef::OneDay(id) => bets::table
                .filter(bets::one_day_race_id.eq(id.value()))
                .select(BetRow::as_select())
                .load(conn),
            UnitRef::Stage(id) => bets::table
                .filter(bets::stage_id.eq(id.value()))
                .select(BetRow::as_select())
                .load(conn),
        }
    }
}

impl RaceReader for SqliteStore {
    async fn unit(&self, unit: UnitRef) -> Result<Option<Unit>> {
        let mut conn = self.conn()?;
        match unit {
            UnitRef::OneDay(id) => {
                let row: Option<OneDayRaceRow> = one_day_races::table
                    .find(id.value())
                    .select(OneDayRaceRow::as_select())
                    .first(&mut conn)
                    .optional()
                    .map_err(|e| Error::Database(e.to_string()))?;
                row.map(|r| Self::one_day_from_row(r).map(|race| race.to_unit()))
                    .transpose()
            }
            UnitRef::Stage(id) => {
                let row: Option<(StageRow, i32)> = stages::table
                    .inner_join(tours::table)
                    .filter(stages::id.eq(id.value()))
                    .select((StageRow::as_select(), tours::season_year))
                    .first(&mut conn)
                    .optional()
                    .map_err(|e| Error::Database(e.to_string()))?;
                row.map(|(stage, year)| Self::stage_from_row(stage).map(|s| s.to_unit(year)))
                    .transpose()
            }
        }
    }

    async fn season_exists(&self, year: i32) -> Result<bool> {
        let mut conn = self.conn()?;
        let found: Option<i32> = seasons::table
            .find(year)
            .select(seasons::year)
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(found.is_some())
    }

    async fn tour(&self, id: TourId) -> Result<Option<Tour>> {
        let mut conn = self.conn()?;
        let row: Option<TourRow> = tours::table
            .find(id.value())
            .select(TourRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        row.map(Self::tour_from_row).transpose()
    }

    async fn one_day_races(&self, year: i32) -> Result<Vec<OneDayRace>> {
        let mut conn = self.conn()?;
        let rows: Vec<OneDayRaceRow> = one_day_races::table
            .filter(one_day_races::season_year.eq(year))
            .order(one_day_races::starts_at.asc())
            .select(OneDayRaceRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.into_iter().map(Self::one_day_from_row).collect()
    }

    async fn tours(&self, year: i32) -> Result<Vec<Tour>> {
        let mut conn = self.conn()?;
        let rows: Vec<TourRow> = tours::table
            .filter(tours::season_year.eq(year))
            .order(tours::starts_at.asc())
            .select(TourRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.into_iter().map(Self::tour_from_row).collect()
    }

    async fn stages(&self, tour: TourId) -> Result<Vec<Stage>> {
        let mut conn = self.conn()?;
        let rows: Vec<StageRow> = stages::table
            .filter(stages::tour_id.eq(tour.value()))
            .order((stages::number.asc(), stages::id.asc()))
            .select(StageRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.into_iter().map(Self::stage_from_row).collect()
    }

    async fn entry_odds(&self, unit: UnitRef) -> Result<HashMap<RiderId, Decimal>> {
        let mut conn = self.conn()?;
        let rows: Vec<(i64, String)> = match unit {
            UnitRef::OneDay(id) => entries::table
                .filter(entries::one_day_race_id.eq(id.value()))
                .select((entries::rider_id, entries::odds))
                .load(&mut conn),
            UnitRef::Stage(id) => entries::table
                .filter(entries::stage_id.eq(id.value()))
                .select((entries::rider_id, entries::odds))
                .load(&mut conn),
        }
        .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter()
            .map(|(rider, odds)| Ok((RiderId::new(rider), Self::parse_decimal(&odds)?)))
            .collect()
    }

    async fn results(&self, unit: UnitRef) -> Result<Vec<RaceResult>> {
        let mut conn = self.conn()?;
        let rows: Vec<ResultRow> = match unit {
            UnitRef::OneDay(id) => results::table
                .filter(results::one_day_race_id.eq(id.value()))
                .order(results::position.asc())
                .select(ResultRow::as_select())
                .load(&mut conn),
            UnitRef::Stage(id) => results::table
                .filter(results::stage_id.eq(id.value()))
                .order(results::position.asc())
                .select(ResultRow::as_select())
                .load(&mut conn),
        }
        .map_err(|e| Error::Database(e.to_string()))?;
        rows.into_iter().map(Self::result_from_row).collect()
    }

    async fn finished_units(&self) -> Result<Vec<UnitRef>> {
        let mut conn = self.conn()?;
        let rows: Vec<(Option<i64>, Option<i64>)> = results::table
            .select((results::one_day_race_id, results::stage_id))
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        let mut counts: HashMap<UnitRef, usize> = HashMap::new();
        for (one_day, stage) in rows {
            *counts
                .entry(Self::unit_from_columns(one_day, stage)?)
                .or_default() += 1;
        }
        let mut units: Vec<UnitRef> = counts
            .into_iter()
            .filter(|(_, n)| *n >= FINISHED_RESULT_COUNT)
            .map(|(unit, _)| unit)
            .collect();
        units.sort();
        Ok(units)
    }
}

impl ResultWriter for SqliteStore {
    async fn insert_result(&self, result: &RaceResult) -> Result<()> {
        let (one_day_race_id, stage_id) = Self::unit_columns(result.unit());
        let row = NewResultRow {
            one_day_race_id,
            stage_id,
            position: i32::try_from(result.position()).map_err(|e| Error::Parse(e.to_string()))?,
            rider_id: result.rider().value(),
        };
        let mut conn = self.conn()?;
        diesel::insert_into(results::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| match e {
                DieselError::DatabaseError(kind, info)
                    if matches!(kind, DatabaseErrorKind::ForeignKeyViolation)
                        || info.message().contains("FOREIGN KEY") =>
                {
                    Error::not_found("unit", result.unit())
                }
                e => Error::Database(e.to_string()),
            })?;
        Ok(())
    }

    async fn delete_result(&self, unit: UnitRef, position: u32) -> Result<bool> {
        let position = i32::try_from(position).map_err(|e| Error::Parse(e.to_string()))?;
        let mut conn = self.conn()?;
        let deleted = match unit {
            UnitRef::OneDay(id) => diesel::delete(
                results::table
                    .filter(results::one_day_race_id.eq(id.value()))
                    .filter(results::position.eq(position)),
            )
            .execute(&mut conn),
            UnitRef::Stage(id) => diesel::delete(
                results::table
                    .filter(results::stage_id.eq(id.value()))
                    .filter(results::position.eq(position)),
            )
            .execute(&mut conn),
        }
        .map_err(|e| Error::Database(e.to_string()))?;
        Ok(deleted > 0)
    }
}

impl BetReader for SqliteStore {
    async fn bet(&self, id: BetId) -> Result<Option<Bet>> {
        let mut conn = self.conn()?;
        let row: Option<BetRow> = bets::table
            .find(id.value())
            .select(BetRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        row.map(Self::bet_from_row).transpose()
    }

    async fn bets_for_unit(&self, unit: UnitRef) -> Result<Vec<Bet>> {
        let mut conn = self.conn()?;
        let rows = Self::load_bet_rows_for_unit(&mut conn, unit)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.into_iter().map(Self::bet_from_row).collect()
    }

    async fn bets_for_user_in_season(&self, user: UserId, year: i32) -> Result<Vec<Bet>> {
        let mut conn = self.conn()?;
        let one_day_ids: Vec<i64> = one_day_races::table
            .filter(one_day_races::season_year.eq(year))
            .select(one_day_races::id)
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        let stage_ids: Vec<i64> = stages::table
            .inner_join(tours::table)
            .filter(tours::season_year.eq(year))
            .select(stages::id)
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        let rows: Vec<BetRow> = bets::table
            .filter(bets::user_id.eq(user.value()))
            .filter(
                bets::one_day_race_id
                    .eq_any(one_day_ids)
                    .or(bets::stage_id.eq_any(stage_ids)),
            )
            .select(BetRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.into_iter().map(Self::bet_from_row).collect()
    }

    async fn submitted_bet_count(&self, user: UserId) -> Result<u64> {
        let mut conn = self.conn()?;
        let count: i64 = bets::table
            .filter(bets::user_id.eq(user.value()))
            .filter(bets::submitted_at.is_not_null())
            .count()
            .get_result(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        u64::try_from(count).map_err(|e| Error::Parse(e.to_string()))
    }

    async fn user(&self, id: UserId) -> Result<Option<User>> {
        let mut conn = self.conn()?;
        let row: Option<UserRow> = users::table
            .find(id.value())
            .select(UserRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row.map(|r| User {
            id: UserId::new(r.id),
            username: r.username,
        }))
    }
}

impl ScoreStore for SqliteStore {
    async fn upsert_score(
        &self,
        bet: BetId,
        score: Decimal,
        computed_at: DateTime<Utc>,
    ) -> Result<()> {
        let row = BetScoreRow {
            bet_id: bet.value(),
            score: score.to_string(),
            computed_at: computed_at.to_rfc3339(),
        };
        let mut conn = self.conn()?;
        diesel::replace_into(bet_scores::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    async fn replace_unit_scores(
        &self,
        unit: UnitRef,
        scores: &[(BetId, Decimal)],
        computed_at: DateTime<Utc>,
    ) -> Result<()> {
        let computed_at = computed_at.to_rfc3339();
        let mut pooled = self.conn()?;
        let conn: &mut SqliteConnection = &mut pooled;
        conn.transaction::<_, Error, _>(|conn| {
            let on_unit: HashSet<i64> = Self::load_bet_rows_for_unit(conn, unit)?
                .into_iter()
                .map(|row| row.id)
                .collect();
            for (bet, score) in scores {
                if !on_unit.contains(&bet.value()) {
                    return Err(Error::Database(format!("bet {bet} is not on {unit}")));
                }
                diesel::replace_into(bet_scores::table)
                    .values(&BetScoreRow {
                        bet_id: bet.value(),
                        score: score.to_string(),
                        computed_at: computed_at.clone(),
                    })
                    .execute(conn)?;
            }
            Ok(())
        })
    }

    async fn score(&self, bet: BetId) -> Result<Option<BetScore>> {
        let mut conn = self.conn()?;
        let row: Option<BetScoreRow> = bet_scores::table
            .find(bet.value())
            .select(BetScoreRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        row.map(|r| {
            Ok(BetScore {
                bet: BetId::new(r.bet_id),
                score: Self::parse_decimal(&r.score)?,
                computed_at: Self::parse_time(&r.computed_at)?,
            })
        })
        .transpose()
    }

    async fn scored_bets(&self, units: &[UnitRef]) -> Result<Vec<ScoredBet>> {
        let (one_day_ids, stage_ids) = Self::split_units(units);
        let mut conn = self.conn()?;
        let rows: Vec<ScoredRow> = bets::table
            .inner_join(bet_scores::table)
            .inner_join(users::table)
            .filter(
                bets::one_day_race_id
                    .eq_any(one_day_ids)
                    .or(bets::stage_id.eq_any(stage_ids)),
            )
            .select((
                bets::id,
                bets::user_id,
                users::username,
                bets::one_day_race_id,
                bets::stage_id,
                bet_scores::score,
                bets::submitted_at,
            ))
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter()
            .map(|(bet, user, username, one_day, stage, score, submitted_at)| {
                Ok(ScoredBet {
                    bet: BetId::new(bet),
                    user: UserId::new(user),
                    username,
                    unit: Self::unit_from_columns(one_day, stage)?,
                    score: Self::parse_decimal(&score)?,
                    submitted_at: submitted_at.as_deref().map(Self::parse_time).transpose()?,
                })
            })
            .collect()
    }
}

impl BadgeStore for SqliteStore {
    async fn badge(&self, code: &BadgeCode) -> Result<Option<Badge>> {
        let mut conn = self.conn()?;
        let row: Option<BadgeRow> = badges::table
            .find(code.as_str())
            .select(BadgeRow::as_select())
            .first(&mut conn)
            .optional()
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(row.map(|r| Badge {
            code: BadgeCode::from(r.code),
            name: r.name,
            description: r.description,
        }))
    }

    async fn upsert_badge(&self, badge: &Badge) -> Result<bool> {
        let row = BadgeRow {
            code: badge.code.to_string(),
            name: badge.name.clone(),
            description: badge.description.clone(),
        };
        let mut pooled = self.conn()?;
        let conn: &mut SqliteConnection = &mut pooled;
        conn.transaction::<_, Error, _>(|conn| {
            let exists = badges::table
                .find(&row.code)
                .select(badges::code)
                .first::<String>(conn)
                .optional()?
                .is_some();
            if exists {
                diesel::update(badges::table.find(&row.code))
                    .set((badges::name.eq(&row.name), badges::description.eq(&row.description)))
                    .execute(conn)?;
            } else {
                diesel::insert_into(badges::table).values(&row).execute(conn)?;
            }
            Ok(!exists)
        })
    }

    async fn insert_user_badge_if_absent(&self, award: &UserBadge) -> Result<AwardWrite> {
        let row = NewUserBadgeRow {
            user_id: award.user.value(),
            badge_code: award.badge.to_string(),
            context: serde_json::to_string(&award.context)?,
            awarded_at: award.awarded_at.to_rfc3339(),
        };
        let mut conn = self.conn()?;

        // The UNIQUE (user_id, badge_code) constraint arbitrates racing writers.
        let inserted = diesel::insert_or_ignore_into(user_badges::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        if inserted > 0 {
            return Ok(AwardWrite::Created);
        }

        let stored: String = user_badges::table
            .filter(user_badges::user_id.eq(row.user_id))
            .filter(user_badges::badge_code.eq(&row.badge_code))
            .select(user_badges::context)
            .first(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(AwardWrite::Existing {
            context: AwardContext::from_value(serde_json::from_str(&stored)?),
        })
    }

    async fn update_user_badge_context(
        &self,
        user: UserId,
        code: &BadgeCode,
        context: &AwardContext,
    ) -> Result<()> {
        let context = serde_json::to_string(context)?;
        let mut conn = self.conn()?;
        let updated = diesel::update(
            user_badges::table
                .filter(user_badges::user_id.eq(user.value()))
                .filter(user_badges::badge_code.eq(code.as_str())),
        )
        .set(user_badges::context.eq(context))
        .execute(&mut conn)
        .map_err(|e| Error::Database(e.to_string()))?;
        if updated == 0 {
            return Err(Error::not_found("user badge", format!("{user}/{code}")));
        }
        Ok(())
    }

    async fn user_badges(&self, user: UserId) -> Result<Vec<UserBadge>> {
        let mut conn = self.conn()?;
        let rows: Vec<UserBadgeRow> = user_badges::table
            .filter(user_badges::user_id.eq(user.value()))
            .order(user_badges::badge_code.asc())
            .select(UserBadgeRow::as_select())
            .load(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        rows.into_iter().map(Self::user_badge_from_row).collect()
    }
}

impl ReferenceDataWriter for SqliteStore {
    async fn insert_season(&self, year: i32) -> Result<()> {
        let mut conn = self.conn()?;
        diesel::insert_or_ignore_into(seasons::table)
            .values(&SeasonRow { year })
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    async fn insert_tour(&self, tour: &Tour) -> Result<()> {
        let row = TourRow {
            id: tour.id.value(),
            season_year: tour.season_year,
            name: tour.name.clone(),
            starts_at: tour.starts_at.to_rfc3339(),
        };
        let mut conn = self.conn()?;
        diesel::insert_into(tours::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    async fn insert_stage(&self, stage: &Stage) -> Result<()> {
        let row = StageRow {
            id: stage.id.value(),
            tour_id: stage.tour.value(),
            number: i32::try_from(stage.number).map_err(|e| Error::Parse(e.to_string()))?,
            name: stage.name.clone(),
            starts_at: stage.starts_at.to_rfc3339(),
            stage_type: stage.stage_type.as_str().to_string(),
        };
        let mut conn = self.conn()?;
        diesel::insert_into(stages::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    async fn insert_one_day_race(&self, race: &OneDayRace) -> Result<()> {
        let row = OneDayRaceRow {
            id: race.id.value(),
            season_year: race.season_year,
            name: race.name.clone(),
            starts_at: race.starts_at.to_rfc3339(),
        };
        let mut conn = self.conn()?;
        diesel::insert_into(one_day_races::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    async fn insert_user(&self, user: &User) -> Result<()> {
        let row = UserRow {
            id: user.id.value(),
            username: user.username.clone(),
        };
        let mut conn = self.conn()?;
        diesel::insert_into(users::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    async fn upsert_entry(&self, entry: &Entry) -> Result<()> {
        let (one_day_race_id, stage_id) = Self::unit_columns(entry.unit);
        let row = NewEntryRow {
            one_day_race_id,
            stage_id,
            rider_id: entry.rider.value(),
            odds: entry.odds.to_string(),
        };
        let mut conn = self.conn()?;
        diesel::replace_into(entries::table)
            .values(&row)
            .execute(&mut conn)
            .map_err(|e| Error::Database(e.to_string()))?;
        Ok(())
    }

    async fn upsert_bet(&self, bet: &Bet) -> Result<()> {
        let row = Self::bet_to_row(bet);
        let mut pooled = self.conn()?;
        let conn: &mut SqliteConnection = &mut pooled;
        conn.transaction::<_, Error, _>(|conn| {
            let exists = bets::table
                .find(row.id)
                .select(bets::id)
                .first::<i64>(conn)
                .optional()?
                .is_some();
            if exists {
                diesel::update(bets::table.find(row.id)).set(&row).execute(conn)?;
            } else {
                diesel::insert_into(bets::table).values(&row).execute(conn)?;
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::sqlite::database::connection::open;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 4, 12, 10, 0, 0).unwrap()
    }

    async fn seeded() -> SqliteStore {
        let store = SqliteStore::new(open(":memory:").unwrap());
        store.insert_season(2026).await.unwrap();
        store
            .insert_one_day_race(&OneDayRace {
                id: OneDayRaceId::new(1),
                season_year: 2026,
                name: "Paris-Roubaix".into(),
                starts_at: start(),
            })
            .await
            .unwrap();
        store
            .insert_tour(&Tour {
                id: TourId::new(1),
                season_year: 2026,
                name: "Tour d'Italie".into(),
                starts_at: start(),
            })
            .await
            .unwrap();
        store
            .insert_stage(&Stage {
                id: StageId::new(5),
                tour: TourId::new(1),
                number: 1,
                name: "Stage 1".into(),
                starts_at: start(),
                stage_type: StageType::Mountain,
            })
            .await
            .unwrap();
        for (id, name) in [(1, "ana"), (2, "bo")] {
            store
                .insert_user(&User {
                    id: UserId::new(id),
                    username: name.into(),
                })
                .await
                .unwrap();
        }
        store
    }

    fn bet(id: i64, user: i64, unit: UnitRef, submitted: bool) -> Bet {
        Bet {
            id: BetId::new(id),
            user: UserId::new(user),
            unit,
            picks: [1, 2, 3, 4, 5].map(|r| Some(RiderId::new(r))),
            submitted_at: submitted.then(start),
        }
    }

    #[tokio::test]
    async fn stage_unit_carries_tour_season_and_type() {
        let store = seeded().await;
        let unit = store
            .unit(UnitRef::Stage(StageId::new(5)))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(unit.season_year, 2026);
        assert_eq!(unit.stage_type, Some(StageType::Mountain));
        assert!(store
            .unit(UnitRef::Stage(StageId::new(99)))
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn bet_round_trips_through_rows() {
        let store = seeded().await;
        let mut draft = bet(1, 1, UnitRef::OneDay(OneDayRaceId::new(1)), false);
        draft.picks[4] = None;
        store.upsert_bet(&draft).await.unwrap();
        assert_eq!(store.bet(BetId::new(1)).await.unwrap(), Some(draft.clone()));

        let submitted = bet(1, 1, UnitRef::OneDay(OneDayRaceId::new(1)), true);
        store.upsert_bet(&submitted).await.unwrap();
        assert_eq!(store.bet(BetId::new(1)).await.unwrap(), Some(submitted));
        assert_eq!(store.submitted_bet_count(UserId::new(1)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn second_bet_on_same_unit_is_rejected() {
        let store = seeded().await;
        let unit = UnitRef::Stage(StageId::new(5));
        store.upsert_bet(&bet(1, 1, unit, true)).await.unwrap();
        assert!(store.upsert_bet(&bet(2, 1, unit, true)).await.is_err());
    }

    #[tokio::test]
    async fn results_come_back_ordered_and_count_as_finished() {
        let store = seeded().await;
        let unit = UnitRef::OneDay(OneDayRaceId::new(1));
        for (position, rider) in [(3, 30), (1, 10), (2, 20)] {
            store
                .insert_result(&RaceResult::try_new(unit, position, RiderId::new(rider)).unwrap())
                .await
                .unwrap();
        }
        let positions: Vec<u32> = store
            .results(unit)
            .await
            .unwrap()
            .iter()
            .map(RaceResult::position)
            .collect();
        assert_eq!(positions, vec![1, 2, 3]);
        assert_eq!(store.finished_units().await.unwrap(), vec![unit]);

        assert!(store.delete_result(unit, 2).await.unwrap());
        assert!(store.finished_units().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn entry_upsert_replaces_odds() {
        let store = seeded().await;
        let unit = UnitRef::Stage(StageId::new(5));
        let mut entry = Entry {
            unit,
            rider: RiderId::new(7),
            odds: dec!(4.5),
        };
        store.upsert_entry(&entry).await.unwrap();
        entry.odds = dec!(6.25);
        store.upsert_entry(&entry).await.unwrap();
        let odds = store.entry_odds(unit).await.unwrap();
        assert_eq!(odds.len(), 1);
        assert_eq!(odds[&RiderId::new(7)], dec!(6.25));
    }

    #[tokio::test]
    async fn unit_batch_is_all_or_nothing() {
        let store = seeded().await;
        let one_day = UnitRef::OneDay(OneDayRaceId::new(1));
        let stage = UnitRef::Stage(StageId::new(5));
        store.upsert_bet(&bet(1, 1, one_day, true)).await.unwrap();
        store.upsert_bet(&bet(2, 2, stage, true)).await.unwrap();

        let bad = [(BetId::new(1), dec!(1.25)), (BetId::new(2), dec!(3))];
        assert!(store.replace_unit_scores(one_day, &bad, start()).await.is_err());
        assert!(store.score(BetId::new(1)).await.unwrap().is_none());

        store
            .replace_unit_scores(one_day, &bad[..1], start())
            .await
            .unwrap();
        let scored = store.scored_bets(&[one_day, stage]).await.unwrap();
        assert_eq!(scored.len(), 1);
        assert_eq!(scored[0].score, dec!(1.25));
        assert_eq!(scored[0].username, "ana");
    }

    #[tokio::test]
    async fn award_insert_is_idempotent_and_context_updatable() {
        let store = seeded().await;
        store
            .upsert_badge(&Badge {
                code: BadgeCode::from(BadgeCode::WIN_UNIT),
                name: "Winner".into(),
                description: "Best score on a unit".into(),
            })
            .await
            .unwrap();
        let first = UserBadge {
            user: UserId::new(1),
            badge: BadgeCode::from(BadgeCode::WIN_UNIT),
            context: AwardContext::unit(UnitRef::OneDay(OneDayRaceId::new(1))),
            awarded_at: start(),
        };
        assert_eq!(
            store.insert_user_badge_if_absent(&first).await.unwrap(),
            AwardWrite::Created
        );
        assert!(matches!(
            store.insert_user_badge_if_absent(&first).await.unwrap(),
            AwardWrite::Existing { .. }
        ));

        let moved = AwardContext::unit(UnitRef::Stage(StageId::new(5)));
        store
            .update_user_badge_context(UserId::new(1), &first.badge, &moved)
            .await
            .unwrap();
        let held = store.user_badges(UserId::new(1)).await.unwrap();
        assert_eq!(held.len(), 1);
        assert_eq!(held[0].context, moved);
        assert_eq!(held[0].awarded_at, start());
    }

    #[tokio::test]
    async fn badge_upsert_reports_creation_once() {
        let store = seeded().await;
        let mut badge = Badge {
            code: BadgeCode::from(BadgeCode::FIRST_BET),
            name: "First".into(),
            description: "First bet".into(),
        };
        assert!(store.upsert_badge(&badge).await.unwrap());
        badge.name = "First pick".into();
        assert!(!store.upsert_badge(&badge).await.unwrap());
        assert_eq!(
            store.badge(&badge.code).await.unwrap().unwrap().name,
            "First pick"
        );
    }
}
