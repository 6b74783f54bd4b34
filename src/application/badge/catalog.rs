//! Default badge catalog.
//!
//! The engine only reads the catalog when awarding; seeding is an
//! operator action.

use serde::Serialize;
use tracing::info;

use crate::domain::badge::{Badge, BadgeCode};
use crate::error::Result;
use crate::port::outbound::store::BadgeStore;

/// Counts from a catalog seed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogSeedReport {
    pub created: usize,
    pub updated: usize,
}

fn badge(code: BadgeCode, name: &str, description: &str) -> Badge {
    Badge {
        code,
        name: name.to_string(),
        description: description.to_string(),
    }
}

/// Catalog entries every deployment needs, with the milestones of `year`.
#[must_use]
pub fn default_catalog(year: i32) -> Vec<Badge> {
    vec![
        badge(BadgeCode::WIN_UNIT.into(), "Winner", "Best score on a race or stage."),
        badge(BadgeCode::WINNER_UNIT.into(), "Unit winner", "Finished first on a race or stage."),
        badge(BadgeCode::PODIUM_UNIT.into(), "Podium", "Finished in the top 3 on a race or stage."),
        badge(BadgeCode::TOP5_UNIT.into(), "Top 5", "Finished in the top 5 on a race or stage."),
        badge(BadgeCode::WIN_TOUR.into(), "Tour winner", "Best total over the stages of a tour."),
        badge(
            BadgeCode::RED_LANTERN_TOUR.into(),
            "Red lantern",
            "Lowest total over the stages of a tour.",
        ),
        badge(BadgeCode::FIRST_BET.into(), "First pick", "Submitted a first top 5."),
        badge(BadgeCode::SEASON_FULL.into(), "Full season", "Bet on every race of the season."),
        badge(BadgeCode::TOP10_GLOBAL.into(), "Season top 10", "Top 10 of the global leaderboard."),
        badge(
            BadgeCode::first_unit_played(year),
            "First participation",
            &format!("Submitted at least one top 5 in {year}."),
        ),
        badge(
            BadgeCode::season_finisher(year),
            "Season finisher",
            &format!("Played every one-day race and a stage of every tour in {year}."),
        ),
        badge(
            BadgeCode::monument_finisher(year),
            "Monuments",
            &format!("Played the five monuments of {year}."),
        ),
        badge(
            BadgeCode::grandtour_finisher(year),
            "Grand tours",
            &format!("Played a stage of each grand tour of {year}."),
        ),
    ]
}

/// Insert or refresh the default catalog for `year`.
///
/// # Errors
/// Propagates storage failures.
pub async fn seed_default_catalog<S: BadgeStore>(
    store: &S,
    year: i32,
) -> Result<CatalogSeedReport> {
    let mut report = CatalogSeedReport::default();
    for badge in default_catalog(year) {
        if store.upsert_badge(&badge).await? {
            report.created += 1;
        } else {
            report.updated += 1;
        }
    }
    info!(year, created = report.created, updated = report.updated, "Badge catalog seeded");
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::outbound::memory::MemoryStore;
    use std::collections::HashSet;

    #[test]
    fn catalog_codes_are_unique() {
        let codes: HashSet<BadgeCode> = default_catalog(2026).into_iter().map(|b| b.code).collect();
        assert_eq!(codes.len(), default_catalog(2026).len());
        assert!(codes.contains(&BadgeCode::monument_finisher(2026)));
    }

    #[tokio::test]
    async fn reseeding_updates_instead_of_creating() {
        let store = MemoryStore::new();
        let first = seed_default_catalog(&store, 2026).await.unwrap();
        assert_eq!(first.updated, 0);
        assert_eq!(first.created, default_catalog(2026).len());

        let second = seed_default_catalog(&store, 2026).await.unwrap();
        assert_eq!(second.created, 0);
        assert_eq!(second.updated, first.created);
    }
}
