//! Timestamp parsing at the service boundary.
//!
//! Everything inside the workspace is exchange-local `NaiveDateTime`. Callers
//! may send either the fixed `YYYY-MM-DD HH:MM:SS` layout (taken as already
//! exchange-local) or an RFC 3339 instant, which is converted to the
//! exchange's zone.

use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use hc_schedule::{DATE_FORMAT, TS_FORMAT};

/// MOEX quotes in Moscow time.
pub const DEFAULT_EXCHANGE_TZ: Tz = chrono_tz::Europe::Moscow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimestampError {
    Unparseable(String),
    UnparseableDate(String),
}

impl fmt::Display for TimestampError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TimestampError::Unparseable(raw) => write!(
                f,
                "timestamp '{raw}' is neither 'YYYY-MM-DD HH:MM:SS' nor RFC 3339"
            ),
            TimestampError::UnparseableDate(raw) => {
                write!(f, "date '{raw}' is not YYYY-MM-DD")
            }
        }
    }
}

impl std::error::Error for TimestampError {}

pub fn parse_exchange_ts(raw: &str, tz: Tz) -> Result<NaiveDateTime, TimestampError> {
    let raw = raw.trim();
    if let Ok(ts) = NaiveDateTime::parse_from_str(raw, TS_FORMAT) {
        return Ok(ts);
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&tz).naive_local())
        .map_err(|_| TimestampError::Unparseable(raw.to_string()))
}

pub fn parse_date(raw: &str) -> Result<NaiveDate, TimestampError> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, DATE_FORMAT)
        .map_err(|_| TimestampError::UnparseableDate(raw.to_string()))
}

pub fn format_ts(ts: NaiveDateTime) -> String {
    ts.format(TS_FORMAT).to_string()
}
