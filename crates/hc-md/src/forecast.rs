//! Forecast input preparation and assembly.
//!
//! The model consumes the closes of the last `history_len` hourly candles and
//! returns one value per future trading hour. This module decides which
//! candles to hand over, which hour the forecast starts from, and then maps
//! the returned values onto trading slots.
//!
//! # Forming candle rule
//!
//! The newest candle of an intraday history is usually still forming; its
//! `end` is the time of the last trade. If that minute is past
//! `late_minute_threshold` the candle counts as representative: it is kept
//! and the forecast starts at the next hour. Otherwise it is dropped and the
//! forecast is aligned to the hour of the newest candle actually handed over.
//!
//! Either way the allocator is anchored on `last_date_end`, the end of the
//! newest candle in `data`.

use std::fmt;

use chrono::{NaiveDateTime, Timelike};
use hc_schedule::{allocate_series, ts_format, PredictedSlot, ScheduleError, TradingCalendar};
use serde::{Deserialize, Serialize};

use crate::iss::Candle;

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ForecastPolicy {
    /// Number of closes handed to the model.
    pub history_len: usize,
    /// Minute of the newest candle's `end` above which it counts as complete.
    pub late_minute_threshold: u32,
}

impl Default for ForecastPolicy {
    fn default() -> Self {
        Self {
            history_len: 21,
            late_minute_threshold: 30,
        }
    }
}

impl ForecastPolicy {
    pub fn validate(&self) -> Result<(), ForecastError> {
        if self.history_len == 0 {
            return Err(ForecastError::InvalidPolicy("history_len must be > 0".into()));
        }
        if self.late_minute_threshold > 59 {
            return Err(ForecastError::InvalidPolicy(
                "late_minute_threshold must be within 0..=59".into(),
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// What goes to the model plus how the schedule is aligned to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastInput {
    /// `end` of the newest candle handed to the model. Allocator anchor.
    #[serde(with = "ts_format")]
    pub last_date_end: NaiveDateTime,
    /// Closes, oldest first.
    pub data: Vec<f64>,
    pub start_next_hour: bool,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum ForecastError {
    InvalidPolicy(String),
    InsufficientHistory { needed: usize, got: usize },
    NonFiniteValue { index: usize },
    Schedule(ScheduleError),
}

impl fmt::Display for ForecastError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ForecastError::InvalidPolicy(msg) => write!(f, "invalid forecast policy: {msg}"),
            ForecastError::InsufficientHistory { needed, got } => {
                write!(f, "need {needed} candle(s) of history, got {got}")
            }
            ForecastError::NonFiniteValue { index } => {
                write!(f, "value at index {index} is not a finite number")
            }
            ForecastError::Schedule(e) => write!(f, "unable to compute schedule: {e}"),
        }
    }
}

impl std::error::Error for ForecastError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ForecastError::Schedule(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ScheduleError> for ForecastError {
    fn from(e: ScheduleError) -> Self {
        ForecastError::Schedule(e)
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Pick the model input from an ordered candle history (oldest first).
pub fn prepare_forecast_input(
    candles: &[Candle],
    policy: &ForecastPolicy,
) -> Result<ForecastInput, ForecastError> {
    policy.validate()?;
    let n = policy.history_len;

    let Some(newest) = candles.last() else {
        return Err(ForecastError::InsufficientHistory { needed: n, got: 0 });
    };

    let keep_newest = newest.end.minute() > policy.late_minute_threshold;
    let needed = if keep_newest { n } else { n + 1 };
    if candles.len() < needed {
        return Err(ForecastError::InsufficientHistory {
            needed,
            got: candles.len(),
        });
    }

    let upto = if keep_newest {
        candles.len()
    } else {
        candles.len() - 1
    };
    let taken = &candles[upto - n..upto];
    let last_date_end = taken[taken.len() - 1].end;

    Ok(ForecastInput {
        last_date_end,
        data: taken.iter().map(|c| c.close).collect(),
        start_next_hour: keep_newest,
    })
}

/// Reject NaN / infinities before they reach the allocator.
pub fn validate_values(values: &[f64]) -> Result<(), ForecastError> {
    match values.iter().position(|v| !v.is_finite()) {
        Some(index) => Err(ForecastError::NonFiniteValue { index }),
        None => Ok(()),
    }
}

/// Map model output onto trading slots.
pub fn assemble_forecast<C: TradingCalendar + ?Sized>(
    cal: &C,
    input: &ForecastInput,
    predictions: &[f64],
) -> Result<Vec<PredictedSlot>, ForecastError> {
    validate_values(predictions)?;
    Ok(allocate_series(
        cal,
        input.last_date_end,
        input.start_next_hour,
        predictions,
    )?)
}
