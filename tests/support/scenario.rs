//! The reference race: results B, A, C with odds A=3, B=5, C=8.

use peloton::domain::id::{BetId, UserId};
use peloton::domain::race::RaceResult;
use peloton::domain::unit::UnitRef;
use peloton::domain::RiderId;
use peloton::port::EngineStore;
use peloton::testkit::domain::{at, picks};
use peloton::testkit::fixture::SeasonFixture;
use rust_decimal_macros::dec;

pub const A: i64 = 1;
pub const B: i64 = 2;
pub const C: i64 = 3;
pub const D: i64 = 4;
pub const E: i64 = 5;

pub struct ClassicRace {
    pub unit: UnitRef,
    pub alice: UserId,
    pub bob: UserId,
    /// Alice: B, A, C, D, E (scores 4.9583).
    pub perfect: BetId,
    /// Bob's draft with the same picks (scores 0).
    pub draft: BetId,
}

/// Season 2026 with one classic, two players and their bets; no results.
pub async fn classic_race<S: EngineStore>(store: &S) -> ClassicRace {
    let season = SeasonFixture::new(store, 2026).await.expect("season");
    let unit = season.one_day(1, "Paris-Roubaix").await.expect("race");
    season
        .odds(unit, &[(A, dec!(3.0)), (B, dec!(5.0)), (C, dec!(8.0))])
        .await
        .expect("odds");
    let alice = season.user(1, "alice").await.expect("alice");
    let bob = season.user(2, "bob").await.expect("bob");

    let perfect = season
        .submit(alice, unit, picks([B, A, C, D, E]), at(5, 9))
        .await
        .expect("alice bet");
    let draft = season
        .bet(bob, unit, picks([B, A, C, D, E]), None)
        .await
        .expect("bob draft");

    ClassicRace {
        unit,
        alice,
        bob,
        perfect,
        draft,
    }
}

/// Official podium B, A, C for `unit`.
pub fn podium(unit: UnitRef) -> Vec<RaceResult> {
    [B, A, C]
        .iter()
        .zip(1..)
        .map(|(rider, position)| {
            RaceResult::try_new(unit, position, RiderId::new(*rider)).expect("valid result")
        })
        .collect()
}
