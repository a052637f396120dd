//! Exchange trading calendar.
//!
//! Deterministic, pure logic. No IO, no wall-clock.
//!
//! # Rules
//!
//! Classification, in priority order:
//! 1. date in the configured [`HolidaySet`] → [`TradingDayClass::Holiday`]
//! 2. Saturday / Sunday → [`TradingDayClass::NonTrading`]
//! 3. otherwise → [`TradingDayClass::Ordinary`]
//!
//! Each non-holiday class maps to exactly one [`TradingWindow`]; holidays have
//! none. The mapping is an exhaustive `match`, so adding a class forces a
//! decision about its window.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::{CalendarError, HolidaySet, TradingDayClass, TradingWindow};

/// Default ceiling on day advances while searching for a valid start.
pub const DEFAULT_MAX_SEARCH_DAYS: u32 = 400;

// ---------------------------------------------------------------------------
// TradingCalendar
// ---------------------------------------------------------------------------

/// What the slot allocator needs from a calendar.
///
/// `Send + Sync` so one calendar can serve concurrent allocations.
pub trait TradingCalendar: Send + Sync {
    fn classify(&self, date: NaiveDate) -> TradingDayClass;

    /// `None` for [`TradingDayClass::Holiday`].
    fn window_for(&self, class: TradingDayClass) -> Option<TradingWindow>;

    /// Maximum number of day advances before start-time normalization gives up.
    fn max_search_days(&self) -> u32 {
        DEFAULT_MAX_SEARCH_DAYS
    }
}

// ---------------------------------------------------------------------------
// Calendar
// ---------------------------------------------------------------------------

/// Holiday table plus the two session windows. Immutable once built.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Calendar {
    holidays: HolidaySet,
    ordinary: TradingWindow,
    non_trading: TradingWindow,
    max_search_days: u32,
}

impl Calendar {
    /// Calendar with default session windows and the given holidays.
    pub fn new(holidays: HolidaySet) -> Self {
        Self {
            holidays,
            ordinary: TradingWindow::ordinary_default(),
            non_trading: TradingWindow::non_trading_default(),
            max_search_days: DEFAULT_MAX_SEARCH_DAYS,
        }
    }

    /// MOEX defaults: 2025 holiday table, 06:00–23:59:59 weekdays,
    /// 09:00–18:59:59 weekends.
    pub fn moex_default() -> Self {
        Self::new(HolidaySet::moex_2025())
    }

    pub fn with_windows(mut self, ordinary: TradingWindow, non_trading: TradingWindow) -> Self {
        self.ordinary = ordinary;
        self.non_trading = non_trading;
        self
    }

    pub fn with_max_search_days(mut self, days: u32) -> Result<Self, CalendarError> {
        if days == 0 {
            return Err(CalendarError::ZeroSearchCeiling);
        }
        self.max_search_days = days;
        Ok(self)
    }

    pub fn holidays(&self) -> &HolidaySet {
        &self.holidays
    }

    pub fn ordinary_window(&self) -> TradingWindow {
        self.ordinary
    }

    pub fn non_trading_window(&self) -> TradingWindow {
        self.non_trading
    }

    /// Convenience: classify a date and look up its window in one call.
    pub fn session(&self, date: NaiveDate) -> (TradingDayClass, Option<TradingWindow>) {
        let class = self.classify(date);
        (class, self.window_for(class))
    }
}

impl Default for Calendar {
    fn default() -> Self {
        Self::moex_default()
    }
}

impl TradingCalendar for Calendar {
    fn classify(&self, date: NaiveDate) -> TradingDayClass {
        if self.holidays.contains(date) {
            return TradingDayClass::Holiday;
        }
        match date.weekday() {
            Weekday::Sat | Weekday::Sun => TradingDayClass::NonTrading,
            _ => TradingDayClass::Ordinary,
        }
    }

    fn window_for(&self, class: TradingDayClass) -> Option<TradingWindow> {
        match class {
            TradingDayClass::Ordinary => Some(self.ordinary),
            TradingDayClass::NonTrading => Some(self.non_trading),
            TradingDayClass::Holiday => None,
        }
    }

    fn max_search_days(&self) -> u32 {
        self.max_search_days
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
