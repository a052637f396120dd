use std::io::Write;

use chrono::{NaiveDate, NaiveTime};
use hc_config::{load_layered_yaml_from_strings, AppConfig, CalendarSettings};
use hc_schedule::{TradingCalendar, TradingDayClass};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn t(h: u32, m: u32, s: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, s).unwrap()
}

#[test]
fn shipped_moex_config_matches_builtin_defaults() {
    let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/calendar/moex.yaml");
    let cfg = AppConfig::load(&[path]).expect("shipped config must load");

    assert_eq!(cfg.calendar, CalendarSettings::default());
    assert_eq!(cfg.forecast, hc_md::ForecastPolicy::default());

    let cal = cfg.calendar.build_calendar().unwrap();
    assert_eq!(cal.classify(d(2025, 6, 12)), TradingDayClass::Holiday);
    assert_eq!(cal.classify(d(2025, 6, 14)), TradingDayClass::NonTrading);
    assert_eq!(cal.classify(d(2025, 6, 11)), TradingDayClass::Ordinary);
}

#[test]
fn overlay_replaces_holidays_and_windows() {
    let base = r#"
calendar:
  holidays: ["2025-05-09", "2025-06-12"]
"#;
    let over = r#"
calendar:
  holidays: ["2026-01-02"]
  ordinary:
    open: "07:00:00"
    close: "22:59:59"
  max_search_days: 30
forecast:
  history_len: 10
daemon:
  addr: "127.0.0.1:8899"
"#;
    let loaded = load_layered_yaml_from_strings(&[base, over]).unwrap();
    let cfg = AppConfig::from_loaded(loaded).unwrap();

    assert_eq!(cfg.calendar.ordinary.open, t(7, 0, 0));
    assert_eq!(cfg.calendar.ordinary.close, t(22, 59, 59));
    // Untouched window keeps its default.
    assert_eq!(cfg.calendar.non_trading.open, t(9, 0, 0));
    assert_eq!(cfg.calendar.max_search_days, 30);
    assert_eq!(cfg.forecast.history_len, 10);
    assert_eq!(cfg.forecast.late_minute_threshold, 30);
    assert_eq!(cfg.daemon_addr.unwrap().port(), 8899);

    let cal = cfg.calendar.build_calendar().unwrap();
    assert_eq!(cal.classify(d(2025, 6, 12)), TradingDayClass::Ordinary);
    assert_eq!(cal.classify(d(2026, 1, 2)), TradingDayClass::Holiday);
    assert_eq!(cal.max_search_days(), 30);
}

#[test]
fn inverted_window_fails_when_building_the_calendar() {
    let yaml = r#"
calendar:
  non_trading:
    open: "19:00:00"
    close: "09:00:00"
"#;
    let cfg = AppConfig::from_loaded(load_layered_yaml_from_strings(&[yaml]).unwrap()).unwrap();
    let err = cfg.calendar.build_calendar().unwrap_err();
    assert!(err.to_string().contains("non_trading"), "got: {err}");
}

#[test]
fn unquoted_yaml_times_are_read_as_strings() {
    let yaml = "calendar:\n  ordinary:\n    open: 07:00:00\n    close: 22:30:00\n";
    let cfg = AppConfig::from_loaded(load_layered_yaml_from_strings(&[yaml]).unwrap()).unwrap();
    assert_eq!(cfg.calendar.ordinary.open, t(7, 0, 0));
    assert_eq!(cfg.calendar.ordinary.close, t(22, 30, 0));
}

#[test]
fn bad_holiday_literal_is_an_error() {
    let yaml = "calendar:\n  holidays: ['2025-02-30']\n";
    let err = AppConfig::from_loaded(load_layered_yaml_from_strings(&[yaml]).unwrap()).unwrap_err();
    assert!(err.to_string().contains("2025-02-30"), "got: {err}");
}

#[test]
fn unknown_forecast_key_is_an_error() {
    let yaml = "forecast:\n  history_lenght: 5\n";
    assert!(AppConfig::from_loaded(load_layered_yaml_from_strings(&[yaml]).unwrap()).is_err());
}

#[test]
fn load_reads_files_in_order() {
    let mut base = tempfile::NamedTempFile::new().unwrap();
    writeln!(base, "calendar:\n  max_search_days: 50").unwrap();
    let mut over = tempfile::NamedTempFile::new().unwrap();
    writeln!(over, "calendar:\n  max_search_days: 60").unwrap();

    let paths = [
        base.path().to_str().unwrap(),
        over.path().to_str().unwrap(),
    ];
    let cfg = AppConfig::load(&paths).unwrap();
    assert_eq!(cfg.calendar.max_search_days, 60);

    assert!(AppConfig::load(&["/definitely/not/here.yaml"]).is_err());
}
