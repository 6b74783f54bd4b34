//! Database model types for Diesel ORM.

use diesel::prelude::*;

use super::schema::{
    badges, bet_scores, bets, entries, one_day_races, results, seasons, stages, tours,
    user_badges, users,
};

#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = seasons)]
pub struct SeasonRow {
    pub year: i32,
}

/// Database row for a tour.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = tours)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct TourRow {
    pub id: i64,
    pub season_year: i32,
    pub name: String,
    pub starts_at: String,
}

/// Database row for a tour stage.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = stages)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct StageRow {
    pub id: i64,
    pub tour_id: i64,
    pub number: i32,
    pub name: String,
    pub starts_at: String,
    pub stage_type: String,
}

/// Database row for a one-day race.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = one_day_races)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct OneDayRaceRow {
    pub id: i64,
    pub season_year: i32,
    pub name: String,
    pub starts_at: String,
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserRow {
    pub id: i64,
    pub username: String,
}

/// Database row for an entry (insertable; the key is generated).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = entries)]
pub struct NewEntryRow {
    pub one_day_race_id: Option<i64>,
    pub stage_id: Option<i64>,
    pub rider_id: i64,
    pub odds: String,
}

/// Database row for a result (insertable; the key is generated).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = results)]
pub struct NewResultRow {
    pub one_day_race_id: Option<i64>,
    pub stage_id: Option<i64>,
    pub position: i32,
    pub rider_id: i64,
}

/// Database row for a result (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = results)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ResultRow {
    pub id: i64,
    pub one_day_race_id: Option<i64>,
    pub stage_id: Option<i64>,
    pub position: i32,
    pub rider_id: i64,
}

/// Database row for a bet.
#[derive(Queryable, Selectable, Insertable, AsChangeset, Debug, Clone)]
#[diesel(table_name = bets)]
#[diesel(treat_none_as_null = true)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BetRow {
    pub id: i64,
    pub user_id: i64,
    pub one_day_race_id: Option<i64>,
    pub stage_id: Option<i64>,
    pub pick1: Option<i64>,
    pub pick2: Option<i64>,
    pub pick3: Option<i64>,
    pub pick4: Option<i64>,
    pub pick5: Option<i64>,
    pub submitted_at: Option<String>,
}

/// Database row for a bet score. Scores are stored as decimal text.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = bet_scores)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BetScoreRow {
    pub bet_id: i64,
    pub score: String,
    pub computed_at: String,
}

/// Database row for a badge catalog entry.
#[derive(Queryable, Selectable, Insertable, Debug, Clone)]
#[diesel(table_name = badges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct BadgeRow {
    pub code: String,
    pub name: String,
    pub description: String,
}

/// Database row for an award (insertable; the key is generated).
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = user_badges)]
pub struct NewUserBadgeRow {
    pub user_id: i64,
    pub badge_code: String,
    pub context: String,
    pub awarded_at: String,
}

/// Database row for an award (queryable).
#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = user_badges)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct UserBadgeRow {
    pub id: i64,
    pub user_id: i64,
    pub badge_code: String,
    pub context: String,
    pub awarded_at: String,
}
