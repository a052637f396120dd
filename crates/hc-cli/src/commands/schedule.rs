//! `hc classify` and `hc allocate`.

use anyhow::{Context, Result};
use chrono::Datelike;
use hc_config::AppConfig;
use hc_md::{format_ts, parse_date, parse_exchange_ts, validate_values};
use hc_schedule::{allocate_series, TradingCalendar};
use tracing::info;

pub fn classify(cfg: &AppConfig, date: &str) -> Result<()> {
    let cal = cfg.calendar.build_calendar()?;
    let date = parse_date(date)?;
    let class = cal.classify(date);

    println!("date={} weekday={}", date, date.weekday());
    println!("class={}", class);
    match cal.window_for(class) {
        Some(w) => println!("window={}-{}", w.open, w.close),
        None => println!("window=none"),
    }
    Ok(())
}

pub fn allocate(cfg: &AppConfig, anchor: &str, next_hour: bool, values: &[f64]) -> Result<()> {
    let cal = cfg.calendar.build_calendar()?;
    let anchor = parse_exchange_ts(anchor, cfg.calendar.timezone)?;
    validate_values(values)?;

    let slots = allocate_series(&cal, anchor, next_hour, values)
        .with_context(|| format!("allocation from {} failed", format_ts(anchor)))?;
    info!(anchor = %format_ts(anchor), next_hour, count = slots.len(), "allocated");

    println!("{}", serde_json::to_string_pretty(&slots)?);
    Ok(())
}
