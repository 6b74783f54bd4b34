mod support;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use assert_cmd::Command;
use peloton::application::Engine;
use predicates::prelude::*;
use serde_json::Value;

use support::scenario::{classic_race, podium};
use support::temp_db::TempDb;

fn peloton(db: &TempDb) -> Command {
    let mut cmd = Command::cargo_bin("peloton").expect("peloton binary");
    cmd.env_remove("PELOTON_DATABASE")
        .env("RUST_LOG", "warn")
        .arg("--config")
        .arg(missing_config(db.path()))
        .arg("--db")
        .arg(db.url());
    cmd
}

/// A config path next to the database that is never created.
fn missing_config(db: &Path) -> PathBuf {
    db.with_extension("toml")
}

async fn finished_race(db: &TempDb) {
    let store = db.store();
    let race = classic_race(&store).await;
    let engine = Engine::new(Arc::new(store));
    engine.seed_default_catalog(2026).await.unwrap();
    for result in podium(race.unit) {
        engine.record_result(&result).await.unwrap();
    }
}

#[test]
fn config_validate_rejects_zero_attempts() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("peloton.toml");
    fs::write(
        &path,
        concat!(
            "database = \"peloton.db\"\n",
            "\n",
            "[recompute]\n",
            "max_attempts = 0\n",
        ),
    )
    .unwrap();

    Command::cargo_bin("peloton")
        .unwrap()
        .env_remove("PELOTON_DATABASE")
        .args(["config", "validate", "--config"])
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("max_attempts"));
}

#[test]
fn config_validate_accepts_a_minimal_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("peloton.toml");
    fs::write(&path, "[logging]\nlevel = \"debug\"\n").unwrap();

    let output = Command::cargo_bin("peloton")
        .unwrap()
        .env_remove("PELOTON_DATABASE")
        .args(["--json", "config", "validate", "--config"])
        .arg(&path)
        .output()
        .unwrap();
    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["valid"], true);
}

#[test]
fn config_show_requires_the_file() {
    let dir = tempfile::tempdir().unwrap();
    Command::cargo_bin("peloton")
        .unwrap()
        .args(["config", "show", "--config"])
        .arg(dir.path().join("absent.toml"))
        .assert()
        .failure();
}

#[test]
fn migrate_then_seed_badges() {
    let db = TempDb::create("cli-seed");

    peloton(&db).arg("migrate").assert().success();

    let output = peloton(&db)
        .args(["--json", "seed-badges", "--year", "2026"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let report: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(report["created"], 13);
    assert_eq!(report["updated"], 0);
}

#[tokio::test]
async fn unit_leaderboard_as_json() {
    let db = TempDb::create("cli-board");
    finished_race(&db).await;

    let output = peloton(&db)
        .args(["--json", "leaderboard", "unit", "--unit", "one-day:1", "--user", "1"])
        .output()
        .unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    let rows = body["rows"].as_array().unwrap();
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0]["kind"], "row");
    assert_eq!(rows[0]["rank"], 1);
    assert_eq!(rows[0]["username"], "alice");
    assert_eq!(rows[0]["is_me"], true);
    assert_eq!(rows[1]["username"], "bob");
}

#[tokio::test]
async fn recompute_reports_scored_bets() {
    let db = TempDb::create("cli-recompute");
    finished_race(&db).await;

    peloton(&db)
        .args(["recompute", "--unit", "one-day:1"])
        .assert()
        .success()
        .stdout(predicate::str::contains("WIN_UNIT"));
}

#[test]
fn unknown_season_leaderboard_fails() {
    let db = TempDb::create("cli-missing");

    peloton(&db)
        .args(["leaderboard", "global", "--year", "1999"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn placements_need_a_target() {
    let db = TempDb::create("cli-placements");

    peloton(&db).arg("award-placements").assert().failure();
}

#[tokio::test]
async fn placement_dry_run_plans_without_writing() {
    let db = TempDb::create("cli-dry-run");
    finished_race(&db).await;

    let output = peloton(&db)
        .args(["--json", "award-placements", "--unit", "one-day:1", "--dry-run"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let body: Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(body["dry_run"], true);
    assert_eq!(body["planned"].as_array().unwrap().len(), 5);
    assert_eq!(body["created"], 0);
    assert!(body["skipped"].is_null());
}
