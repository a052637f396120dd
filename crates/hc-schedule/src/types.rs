use std::collections::BTreeSet;
use std::fmt;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Fixed textual layout for every timestamp crossing a serialization boundary.
pub const TS_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Date layout used by holiday tables.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

// ---------------------------------------------------------------------------
// Day classification
// ---------------------------------------------------------------------------

/// Class of a calendar day. Recomputed on demand, never stored.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TradingDayClass {
    /// Monday–Friday, not a holiday.
    Ordinary,
    /// Saturday or Sunday, not a holiday. Abbreviated "day-off" session.
    NonTrading,
    /// Member of the configured holiday set. No session at all.
    Holiday,
}

impl TradingDayClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            TradingDayClass::Ordinary => "ordinary",
            TradingDayClass::NonTrading => "non_trading",
            TradingDayClass::Holiday => "holiday",
        }
    }
}

impl fmt::Display for TradingDayClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// TradingWindow
// ---------------------------------------------------------------------------

/// Inclusive time-of-day range during which a session is open.
///
/// `open` and `close` are compared at second resolution when normalizing a
/// start time, but slot emission only looks at the hour component (see
/// [`TradingWindow::admits_hour`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradingWindow {
    pub open: NaiveTime,
    pub close: NaiveTime,
}

impl TradingWindow {
    pub fn new(open: NaiveTime, close: NaiveTime) -> Result<Self, CalendarError> {
        if open > close {
            return Err(CalendarError::InvertedWindow { open, close });
        }
        Ok(Self { open, close })
    }

    /// Weekday session: 06:00:00 through 23:59:59.
    pub const fn ordinary_default() -> Self {
        Self {
            open: ORDINARY_OPEN,
            close: ORDINARY_CLOSE,
        }
    }

    /// Weekend session: 09:00:00 through 18:59:59.
    pub const fn non_trading_default() -> Self {
        Self {
            open: NON_TRADING_OPEN,
            close: NON_TRADING_CLOSE,
        }
    }

    pub fn open_hour(&self) -> u32 {
        self.open.hour()
    }

    pub fn close_hour(&self) -> u32 {
        self.close.hour()
    }

    /// Hour-granularity gate: may a slot start at `hour`?
    pub fn admits_hour(&self, hour: u32) -> bool {
        self.open_hour() <= hour && hour <= self.close_hour()
    }

    /// Second-granularity gate used by start-time normalization.
    pub fn contains_time(&self, t: NaiveTime) -> bool {
        self.open <= t && t <= self.close
    }
}

const ORDINARY_OPEN: NaiveTime = const_hms(6, 0, 0);
const ORDINARY_CLOSE: NaiveTime = const_hms(23, 59, 59);
const NON_TRADING_OPEN: NaiveTime = const_hms(9, 0, 0);
const NON_TRADING_CLOSE: NaiveTime = const_hms(18, 59, 59);

// Evaluated in const items only, so a bad literal fails the build.
const fn const_hms(h: u32, m: u32, s: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(h, m, s) {
        Some(t) => t,
        None => panic!("time literal out of range"),
    }
}

// ---------------------------------------------------------------------------
// HolidaySet
// ---------------------------------------------------------------------------

/// Immutable set of exchange holidays. Exact date match only.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HolidaySet {
    days: BTreeSet<NaiveDate>,
}

impl HolidaySet {
    pub fn new<I: IntoIterator<Item = NaiveDate>>(days: I) -> Self {
        Self {
            days: days.into_iter().collect(),
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse `YYYY-MM-DD` literals.
    pub fn parse<S: AsRef<str>>(raw: &[S]) -> Result<Self, CalendarError> {
        let mut days = BTreeSet::new();
        for r in raw {
            let r = r.as_ref().trim();
            let d = NaiveDate::parse_from_str(r, DATE_FORMAT)
                .map_err(|_| CalendarError::InvalidHoliday(r.to_string()))?;
            days.insert(d);
        }
        Ok(Self { days })
    }

    /// MOEX non-working days observed in 2025.
    pub fn moex_2025() -> Self {
        const DAYS: &[(i32, u32, u32)] = &[
            (2025, 5, 9),   // Victory Day
            (2025, 6, 12),  // Russia Day
            (2025, 11, 4),  // Unity Day
            (2025, 12, 31), // New Year's Eve
        ];
        Self::new(
            DAYS.iter()
                .filter_map(|&(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
        )
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.days.contains(&date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &NaiveDate> {
        self.days.iter()
    }
}

// ---------------------------------------------------------------------------
// Slots
// ---------------------------------------------------------------------------

/// One trading hour. `end = begin + 1h - 1s`, `begin` is on the hour.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TimeSlot {
    #[serde(with = "ts_format")]
    pub begin: NaiveDateTime,
    #[serde(with = "ts_format")]
    pub end: NaiveDateTime,
}

impl TimeSlot {
    /// Build the slot starting at `begin`. Caller guarantees `begin` is on the hour.
    pub fn starting_at(begin: NaiveDateTime) -> Option<Self> {
        let end = begin.checked_add_signed(Duration::seconds(3599))?;
        Some(Self { begin, end })
    }
}

/// A slot carrying the predicted value assigned to it.
///
/// Serialized as `{"begin", "end", "close"}`, the shape downstream consumers
/// match against real candles.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredictedSlot {
    #[serde(with = "ts_format")]
    pub begin: NaiveDateTime,
    #[serde(with = "ts_format")]
    pub end: NaiveDateTime,
    #[serde(rename = "close")]
    pub value: f64,
}

impl PredictedSlot {
    pub fn new(slot: TimeSlot, value: f64) -> Self {
        Self {
            begin: slot.begin,
            end: slot.end,
            value,
        }
    }

    pub fn slot(&self) -> TimeSlot {
        TimeSlot {
            begin: self.begin,
            end: self.end,
        }
    }
}

/// Serde adapter for `YYYY-MM-DD HH:MM:SS` timestamps.
pub mod ts_format {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    use super::TS_FORMAT;

    pub fn serialize<S: Serializer>(ts: &NaiveDateTime, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(TS_FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(raw.trim(), TS_FORMAT).map_err(serde::de::Error::custom)
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Invalid calendar configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CalendarError {
    /// Window opens after it closes.
    InvertedWindow { open: NaiveTime, close: NaiveTime },
    /// Holiday literal is not `YYYY-MM-DD`.
    InvalidHoliday(String),
    /// Day-advance ceiling must be at least one day.
    ZeroSearchCeiling,
}

impl fmt::Display for CalendarError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CalendarError::InvertedWindow { open, close } => {
                write!(f, "trading window opens at {open} after it closes at {close}")
            }
            CalendarError::InvalidHoliday(raw) => {
                write!(f, "holiday '{raw}' is not a YYYY-MM-DD date")
            }
            CalendarError::ZeroSearchCeiling => write!(f, "max_search_days must be > 0"),
        }
    }
}

impl std::error::Error for CalendarError {}

/// Failures of the slot allocator.
///
/// Both variants are internal-consistency faults: well-formed inputs with a
/// sane calendar never produce them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    /// No valid start found within the day-advance ceiling.
    SearchExhausted { from: NaiveDateTime, days: u32 },
    /// Timestamp arithmetic left chrono's representable range.
    OutOfRange { at: NaiveDateTime },
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::SearchExhausted { from, days } => write!(
                f,
                "no valid trading start within {days} day(s) of {}; calendar configuration is inconsistent",
                from.format(TS_FORMAT)
            ),
            ScheduleError::OutOfRange { at } => {
                write!(f, "timestamp arithmetic overflow near {}", at.format(TS_FORMAT))
            }
        }
    }
}

impl std::error::Error for ScheduleError {}
