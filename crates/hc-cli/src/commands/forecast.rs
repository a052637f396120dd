//! `hc prepare` and `hc forecast`.
//!
//! Both read an ISS candles payload from disk; the model itself runs
//! elsewhere, so `forecast` takes its output as a JSON array file.

use anyhow::{Context, Result};
use hc_config::AppConfig;
use hc_md::{
    assemble_forecast, format_ts, parse_candles, prepare_forecast_input, CandlesResponse,
    ForecastInput,
};
use tracing::info;

use super::read_json_file;

fn input_from_candles(cfg: &AppConfig, candles_path: &str) -> Result<ForecastInput> {
    let resp: CandlesResponse = read_json_file(candles_path)?;
    let candles = parse_candles(&resp.candles)
        .with_context(|| format!("{candles_path}: malformed candles table"))?;
    let input = prepare_forecast_input(&candles, &cfg.forecast)?;
    info!(
        candles = candles.len(),
        last_date_end = %format_ts(input.last_date_end),
        start_next_hour = input.start_next_hour,
        "forecast input prepared"
    );
    Ok(input)
}

pub fn prepare(cfg: &AppConfig, candles_path: &str) -> Result<()> {
    let input = input_from_candles(cfg, candles_path)?;
    println!("{}", serde_json::to_string_pretty(&input)?);
    Ok(())
}

pub fn forecast(cfg: &AppConfig, candles_path: &str, predictions_path: &str) -> Result<()> {
    let cal = cfg.calendar.build_calendar()?;
    let input = input_from_candles(cfg, candles_path)?;
    let predictions: Vec<f64> = read_json_file(predictions_path)?;

    let out = assemble_forecast(&cal, &input, &predictions)?;
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
