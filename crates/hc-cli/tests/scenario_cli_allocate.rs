use assert_cmd::Command;
use predicates::prelude::*;
use std::io::Write;

fn hc() -> Command {
    let mut cmd = Command::cargo_bin("hc").expect("hc binary must build");
    cmd.env_remove("HC_CONFIG").env_remove("RUST_LOG");
    cmd
}

fn stdout_json(cmd: &mut Command) -> serde_json::Value {
    let out = cmd.assert().success().get_output().stdout.clone();
    serde_json::from_slice(&out).expect("stdout must be JSON")
}

#[test]
fn allocate_rolls_friday_close_to_saturday_session() {
    // Fri 2025-06-20 23:30 with next-hour lands on Saturday 00:30; the weekend session opens at 09:00.
    let v = stdout_json(hc().args([
        "allocate",
        "--anchor",
        "2025-06-20 23:30:00",
        "--next-hour",
        "--values",
        "1,2",
    ]));
    assert_eq!(
        v,
        serde_json::json!([
            {"begin": "2025-06-21 09:00:00", "end": "2025-06-21 09:59:59", "close": 1.0},
            {"begin": "2025-06-21 10:00:00", "end": "2025-06-21 10:59:59", "close": 2.0}
        ])
    );
}

#[test]
fn allocate_skips_shipped_holiday() {
    let cfg = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/calendar/moex.yaml");
    let v = stdout_json(hc().args([
        "allocate",
        "--anchor",
        "2025-06-11 23:59:59",
        "--next-hour",
        "--values",
        "7.5",
        "--config",
        cfg,
    ]));
    assert_eq!(v[0]["begin"], "2025-06-13 06:00:00");
}

#[test]
fn rfc3339_anchor_is_read_in_exchange_time() {
    // 08:15Z is 11:15 in Moscow; own hour is 11:00.
    let v = stdout_json(hc().args([
        "allocate",
        "--anchor",
        "2025-06-11T08:15:00Z",
        "--values",
        "3",
    ]));
    assert_eq!(v[0]["begin"], "2025-06-11 11:00:00");
}

#[test]
fn values_file_is_accepted() {
    let mut f = tempfile::NamedTempFile::new().unwrap();
    write!(f, "[10.0, 11.5, 12.25]").unwrap();

    let v = stdout_json(hc().args([
        "allocate",
        "--anchor",
        "2025-06-11 10:05:00",
        "--values-file",
        f.path().to_str().unwrap(),
    ]));
    let arr = v.as_array().unwrap();
    assert_eq!(arr.len(), 3);
    assert_eq!(arr[2]["begin"], "2025-06-11 12:00:00");
    assert_eq!(arr[2]["close"], 12.25);
}

#[test]
fn empty_values_print_empty_list() {
    let v = stdout_json(hc().args(["allocate", "--anchor", "2025-06-11 10:05:00", "--values", ""]));
    assert_eq!(v, serde_json::json!([]));
}

#[test]
fn bad_anchor_fails() {
    hc().args(["allocate", "--anchor", "yesterday", "--values", "1"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("yesterday"));
}

#[test]
fn exhausted_search_fails_without_partial_output() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("closed.yaml");
    let mut days = Vec::new();
    for d in 1..=30u32 {
        days.push(format!("\"2025-06-{d:02}\""));
    }
    std::fs::write(
        &path,
        format!("calendar:\n  max_search_days: 10\n  holidays: [{}]\n", days.join(", ")),
    )
    .unwrap();

    hc().args([
        "allocate",
        "--anchor",
        "2025-06-01 12:00:00",
        "--values",
        "1,2,3",
        "--config",
        path.to_str().unwrap(),
    ])
    .assert()
    .failure()
    .stdout(predicate::str::is_empty())
    .stderr(predicate::str::contains("no valid trading start within 10 day(s)"));
}
