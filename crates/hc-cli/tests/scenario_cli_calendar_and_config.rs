use assert_cmd::Command;
use predicates::prelude::*;

const MOEX: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/calendar/moex.yaml");

fn hc() -> Command {
    let mut cmd = Command::cargo_bin("hc").expect("hc binary must build");
    cmd.env_remove("HC_CONFIG").env_remove("RUST_LOG");
    cmd
}

#[test]
fn classify_holiday_has_no_window() {
    hc().args(["classify", "--date", "2025-06-12", "--config", MOEX])
        .assert()
        .success()
        .stdout(predicate::str::contains("class=holiday"))
        .stdout(predicate::str::contains("window=none"));
}

#[test]
fn shipped_config_runs_without_warnings() {
    hc().args(["classify", "--date", "2025-06-16", "--config", MOEX])
        .assert()
        .success()
        .stderr(predicate::str::is_empty());
}

#[test]
fn classify_weekend_and_weekday() {
    hc().args(["classify", "--date", "2025-06-14"])
        .assert()
        .success()
        .stdout(predicate::str::contains("class=non_trading"))
        .stdout(predicate::str::contains("window=09:00:00-18:59:59"));

    hc().args(["classify", "--date", "2025-06-16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("class=ordinary"))
        .stdout(predicate::str::contains("window=06:00:00-23:59:59"));
}

#[test]
fn classify_reads_layers_from_env() {
    let dir = tempfile::tempdir().unwrap();
    let extra = dir.path().join("extra.yaml");
    std::fs::write(&extra, "calendar:\n  holidays: ['2025-06-16']\n").unwrap();

    hc().env("HC_CONFIG", format!("{MOEX},{}", extra.display()))
        .args(["classify", "--date", "2025-06-16"])
        .assert()
        .success()
        .stdout(predicate::str::contains("class=holiday"));
}

#[test]
fn classify_rejects_bad_date() {
    hc().args(["classify", "--date", "2025-02-30"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("2025-02-30"));
}

#[test]
fn config_hash_prints_hash_and_canonical_json() {
    hc().args(["config-hash", MOEX])
        .assert()
        .success()
        .stdout(predicate::str::is_match("^config_hash=[0-9a-f]{64}\n").unwrap())
        .stdout(predicate::str::contains("\"max_search_days\":400"));
}

#[test]
fn unused_key_is_warned_on_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let typo = dir.path().join("typo.yaml");
    std::fs::write(&typo, "calendar:\n  holiday: ['2025-06-16']\n").unwrap();

    hc().args(["classify", "--date", "2025-06-16", "--config", typo.to_str().unwrap()])
        .assert()
        .success()
        .stdout(predicate::str::contains("class=ordinary"))
        .stderr(predicate::str::contains("/calendar/holiday"));
}
