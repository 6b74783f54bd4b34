//! Domain identifier types with proper encapsulation.
//!
//! Every identifier wraps the integer primary key used by the backing
//! store. The inner value is private so that a `StageId` can never be
//! passed where a `OneDayRaceId` is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            #[doc = concat!("Create a new `", stringify!($name), "` from a raw key.")]
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// Get the underlying value.
            #[must_use]
            pub const fn value(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self(id)
            }
        }
    };
}

integer_id!(
    /// Registered player.
    UserId
);
integer_id!(
    /// Professional rider that can be picked.
    RiderId
);
integer_id!(
    /// One-day race (classic).
    OneDayRaceId
);
integer_id!(
    /// Multi-stage tour.
    TourId
);
integer_id!(
    /// Single stage of a tour.
    StageId
);
integer_id!(
    /// Bet placed by a user on a unit.
    BetId
);
