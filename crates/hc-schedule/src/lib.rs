//! hc-schedule
//!
//! Trading-calendar classification and hourly slot allocation.
//!
//! Given an anchor timestamp (end of the last real candle) and N predicted
//! values, produce N consecutive one-hour slots that fall inside the
//! exchange's trading windows, skipping holidays, after-hours periods and the
//! closed part of weekend sessions.
//!
//! Pure deterministic logic. No IO, no wall-clock. Callers supply the anchor
//! and the calendar configuration.

mod calendar;
mod engine;
mod types;

pub use calendar::{Calendar, TradingCalendar, DEFAULT_MAX_SEARCH_DAYS};
pub use engine::{
    advance_hour, allocate, allocate_series, initial_candidate, next_valid_start, skip_hour,
    SlotWalk,
};
pub use types::*;
