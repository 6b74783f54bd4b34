//! Builders for domain primitives used across tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::bet::{Picks, PICK_COUNT};
use crate::domain::id::RiderId;

/// A timestamp in April 2026.
///
/// # Panics
/// Panics for an invalid day or hour.
pub fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, day, hour, 0, 0)
        .single()
        .expect("valid test timestamp")
}

/// Five filled picks from raw rider ids.
pub fn picks(riders: [i64; PICK_COUNT]) -> Picks {
    riders.map(|r| Some(RiderId::new(r)))
}

/// Picks with `None` for every zero id.
pub fn partial_picks(riders: [i64; PICK_COUNT]) -> Picks {
    riders.map(|r| (r != 0).then(|| RiderId::new(r)))
}
