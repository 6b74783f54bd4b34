mod support;

use std::sync::Arc;

use peloton::adapter::outbound::memory::MemoryStore;
use peloton::application::Engine;
use peloton::error::Error;
use peloton::infrastructure::config::engine::RecomputeConfig;
use peloton::infrastructure::config::settings::Config;
use peloton::port::{ResultWriter, ScoreStore};
use peloton::testkit::config;
use peloton::testkit::domain::{at, picks};
use peloton::testkit::fixture::SeasonFixture;
use rust_decimal_macros::dec;
use tokio::sync::Barrier;

use support::scenario::{classic_race, podium};

async fn finished_race(store: &MemoryStore) -> support::scenario::ClassicRace {
    let race = classic_race(store).await;
    for result in podium(race.unit) {
        store.insert_result(&result).await.unwrap();
    }
    race
}

#[tokio::test]
async fn transient_batch_failures_are_retried() {
    let store = MemoryStore::new();
    let race = finished_race(&store).await;
    store.fail_next_score_batches(2);

    let engine = Engine::with_config(Arc::new(store), &config::engine());
    let summary = engine.recompute_unit(race.unit).await.unwrap();

    assert_eq!(summary.attempts, 3);
    let score = engine.store().score(race.perfect).await.unwrap().unwrap();
    assert_eq!(score.score, dec!(4.9583));
}

#[tokio::test]
async fn exhausted_retries_fail_and_write_nothing() {
    let store = MemoryStore::new();
    let race = finished_race(&store).await;
    store.fail_next_score_batches(3);

    let engine = Engine::with_config(Arc::new(store), &config::engine());
    let err = engine.recompute_unit(race.unit).await.unwrap_err();

    match err {
        Error::RecomputeFailed { attempts, unit, .. } => {
            assert_eq!(attempts, 3);
            assert_eq!(unit, race.unit.to_string());
        }
        other => panic!("expected RecomputeFailed, got {other}"),
    }
    assert!(engine.store().score(race.perfect).await.unwrap().is_none());
    assert!(engine.store().score(race.draft).await.unwrap().is_none());
}

#[tokio::test]
async fn single_attempt_policy_does_not_retry() {
    let store = MemoryStore::new();
    let race = finished_race(&store).await;
    store.fail_next_score_batches(1);

    let settings = Config {
        recompute: RecomputeConfig {
            max_attempts: 1,
            retry_delay_ms: 0,
        },
        ..Config::default()
    };
    let engine = Engine::with_config(Arc::new(store), &settings);
    let err = engine.recompute_unit(race.unit).await.unwrap_err();
    assert!(matches!(err, Error::RecomputeFailed { attempts: 1, .. }));

    // The injected failure is spent; the next call succeeds.
    engine.recompute_unit(race.unit).await.unwrap();
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_recomputes_of_one_unit_agree() {
    const RACERS: usize = 8;
    let store = MemoryStore::new();
    let race = finished_race(&store).await;
    let engine = Arc::new(Engine::with_config(Arc::new(store), &config::engine()));
    let unit = race.unit;
    let start = Arc::new(Barrier::new(RACERS));

    let handles: Vec<_> = (0..RACERS)
        .map(|_| {
            let engine = Arc::clone(&engine);
            let start = Arc::clone(&start);
            tokio::spawn(async move {
                start.wait().await;
                engine.recompute_unit(unit).await
            })
        })
        .collect();
    for handle in handles {
        let summary = handle.await.unwrap().unwrap();
        assert_eq!(summary.scored, 2);
        assert_eq!(summary.attempts, 1);
    }

    let score = engine.store().score(race.perfect).await.unwrap().unwrap();
    assert_eq!(score.score, dec!(4.9583));
}

#[tokio::test]
async fn tiny_odds_score_without_aborting_the_recompute() {
    let store = Arc::new(MemoryStore::new());
    let season = SeasonFixture::new(store.as_ref(), 2026).await.unwrap();
    let unit = season.one_day(1, "Paris-Roubaix").await.unwrap();
    season
        .odds(unit, &[(1, dec!(0.0000000000000000000000000001)), (2, dec!(5.0))])
        .await
        .unwrap();
    let user = season.user(1, "longshot").await.unwrap();
    let bet = season.submit(user, unit, picks([1, 2, 6, 7, 8]), at(5, 9)).await.unwrap();
    season.results(unit, &[1, 2, 3]).await.unwrap();

    let engine = Engine::with_config(Arc::clone(&store), &config::engine());
    engine.recompute_unit(unit).await.unwrap();

    // The overflowing slot-one pick drops out; slot two still pays 7 / 5.
    let score = store.score(bet).await.unwrap().unwrap();
    assert_eq!(score.score, dec!(1.4));
}
