use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;

fn hc() -> Command {
    let mut cmd = Command::cargo_bin("hc").expect("hc binary must build");
    cmd.env_remove("HC_CONFIG").env_remove("RUST_LOG");
    cmd
}

/// 22 hourly candles on Wed 2025-06-11 from 02:00; the newest ends at `last_end`.
fn write_candles(dir: &std::path::Path, last_end: &str) -> std::path::PathBuf {
    let mut data = Vec::new();
    for i in 0..22u32 {
        let h = 2 + i;
        let end = if i == 21 {
            last_end.to_string()
        } else {
            format!("2025-06-11 {h:02}:59:59")
        };
        data.push(json!([100.0 + i as f64, format!("2025-06-11 {h:02}:00:00"), end]));
    }
    let doc = json!({"candles": {"columns": ["close", "begin", "end"], "data": data}});
    let path = dir.join("candles.json");
    std::fs::write(&path, serde_json::to_vec(&doc).unwrap()).unwrap();
    path
}

#[test]
fn prepare_keeps_complete_newest_candle() {
    let dir = tempfile::tempdir().unwrap();
    let candles = write_candles(dir.path(), "2025-06-11 23:45:00");

    let out = hc()
        .args(["prepare", "--candles", candles.to_str().unwrap()])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v["start_next_hour"], true);
    assert_eq!(v["last_date_end"], "2025-06-11 23:45:00");
    assert_eq!(v["data"].as_array().unwrap().len(), 21);
    assert_eq!(v["data"][0], 101.0);
}

#[test]
fn forecast_places_predictions_after_holiday() {
    let dir = tempfile::tempdir().unwrap();
    let candles = write_candles(dir.path(), "2025-06-11 23:45:00");
    let preds = dir.path().join("preds.json");
    std::fs::write(&preds, "[1.0, 2.0]").unwrap();

    let out = hc()
        .args([
            "forecast",
            "--candles",
            candles.to_str().unwrap(),
            "--predictions",
            preds.to_str().unwrap(),
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();
    let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(v[0]["begin"], "2025-06-13 06:00:00");
    assert_eq!(v[1]["begin"], "2025-06-13 07:00:00");
}

#[test]
fn prepare_with_short_history_fails() {
    let dir = tempfile::tempdir().unwrap();
    // The forming newest candle is dropped, so history_len + 1 are required.
    let candles = write_candles(dir.path(), "2025-06-11 23:05:00");
    let cfg = dir.path().join("long.yaml");
    std::fs::write(&cfg, "forecast:\n  history_len: 22\n").unwrap();

    hc().args([
        "prepare",
        "--candles",
        candles.to_str().unwrap(),
        "--config",
        cfg.to_str().unwrap(),
    ])
    .assert()
    .failure()
    .stderr(predicate::str::contains("need 23 candle(s) of history, got 22"));
}
