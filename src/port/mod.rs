//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! ```text
//!                 ┌──────────────────────────┐
//!                 │        Application       │
//!                 │  scoring, badges, ranks  │
//!                 └────────────┬─────────────┘
//!                              │ outbound ports
//!                 ┌────────────┴─────────────┐
//!                 ▼                          ▼
//!          ┌─────────────┐           ┌──────────────┐
//!          │   SQLite    │           │   In-memory  │
//!          │   adapter   │           │    adapter   │
//!          └─────────────┘           └──────────────┘
//! ```

pub mod outbound;

pub use outbound::store::{
    BadgeStore, BetReader, EngineStore, RaceReader, ReferenceDataWriter, ResultWriter, ScoreStore,
};
