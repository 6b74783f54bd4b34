//! Season calendar lookups shared by badge rules and leaderboards.

use crate::domain::id::TourId;
use crate::domain::participation::SeasonLayout;
use crate::domain::unit::{StageType, UnitRef};
use crate::error::{Error, Result};
use crate::port::outbound::store::RaceReader;

/// Load every one-day race and every tour with its stages for `year`.
///
/// An unknown season yields an empty layout; callers that need the season
/// to exist check [`RaceReader::season_exists`] first.
pub async fn season_layout<S: RaceReader>(store: &S, year: i32) -> Result<SeasonLayout> {
    let one_days = store.one_day_races(year).await?;
    let mut tours = Vec::new();
    for tour in store.tours(year).await? {
        let stages = store.stages(tour.id).await?;
        tours.push((tour, stages.into_iter().map(|s| s.id).collect()));
    }
    Ok(SeasonLayout { one_days, tours })
}

/// Stage units of a tour, optionally restricted to some stage types.
///
/// # Errors
/// Returns [`Error::NotFound`] when the tour does not exist.
pub async fn tour_stage_units<S: RaceReader>(
    store: &S,
    tour: TourId,
    types: Option<&[StageType]>,
) -> Result<Vec<UnitRef>> {
    if store.tour(tour).await?.is_none() {
        return Err(Error::not_found("tour", tour));
    }
    Ok(store
        .stages(tour)
        .await?
        .into_iter()
        .filter(|s| types.map_or(true, |t| t.contains(&s.stage_type)))
        .map(|s| UnitRef::Stage(s.id))
        .collect())
}
