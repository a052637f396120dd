use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::{PredictedSlot, ScheduleError, TimeSlot, TradingCalendar, TradingWindow};

fn one_hour() -> Duration {
    Duration::hours(1)
}

fn at_hour(date: NaiveDate, hour: u32, near: NaiveDateTime) -> Result<NaiveDateTime, ScheduleError> {
    NaiveTime::from_hms_opt(hour, 0, 0)
        .map(|t| date.and_time(t))
        .ok_or(ScheduleError::OutOfRange { at: near })
}

fn floor_to_hour(ts: NaiveDateTime) -> Result<NaiveDateTime, ScheduleError> {
    at_hour(ts.date(), ts.hour(), ts)
}

fn start_of_next_day(ts: NaiveDateTime) -> Result<NaiveDateTime, ScheduleError> {
    ts.date()
        .succ_opt()
        .map(|d| d.and_time(NaiveTime::MIN))
        .ok_or(ScheduleError::OutOfRange { at: ts })
}

fn plus_one_hour(ts: NaiveDateTime) -> Result<NaiveDateTime, ScheduleError> {
    ts.checked_add_signed(one_hour())
        .ok_or(ScheduleError::OutOfRange { at: ts })
}

/// First allocator candidate for `anchor`, floored to the top of its hour.
///
/// With `start_next_hour` the anchor is shifted forward one hour first.
pub fn initial_candidate(
    anchor: NaiveDateTime,
    start_next_hour: bool,
) -> Result<NaiveDateTime, ScheduleError> {
    let base = if start_next_hour {
        plus_one_hour(anchor)?
    } else {
        anchor
    };
    floor_to_hour(base)
}

/// Nearest timestamp at or after `ts` that lies inside a trading window,
/// on the hour.
///
/// - before the day's open → the open hour of the same day
/// - within `[open, close]` (second resolution) → `ts` floored to the hour
/// - after close, or a holiday → retry from 00:00:00 of the next day
///
/// Fails with [`ScheduleError::SearchExhausted`] after
/// [`TradingCalendar::max_search_days`] day advances.
pub fn next_valid_start<C: TradingCalendar + ?Sized>(
    cal: &C,
    ts: NaiveDateTime,
) -> Result<NaiveDateTime, ScheduleError> {
    let ceiling = cal.max_search_days();
    let mut current = ts;
    let mut days_advanced = 0u32;

    loop {
        let class = cal.classify(current.date());
        if let Some(window) = cal.window_for(class) {
            let tod = current.time();
            if tod < window.open {
                return at_hour(current.date(), window.open_hour(), current);
            }
            if tod <= window.close {
                return floor_to_hour(current);
            }
        }

        if days_advanced >= ceiling {
            return Err(ScheduleError::SearchExhausted {
                from: ts,
                days: ceiling,
            });
        }
        current = start_of_next_day(current)?;
        days_advanced += 1;
    }
}

/// Transition after a candidate hour has been considered: step one hour and
/// re-normalize when the new hour is outside `window` (the window of the day
/// just considered).
pub fn advance_hour<C: TradingCalendar + ?Sized>(
    cal: &C,
    candidate: NaiveDateTime,
    window: TradingWindow,
) -> Result<NaiveDateTime, ScheduleError> {
    let next = plus_one_hour(candidate)?;
    if window.admits_hour(next.hour()) {
        Ok(next)
    } else {
        next_valid_start(cal, next)
    }
}

/// Transition for a candidate that landed on a holiday: move past it without
/// emitting.
pub fn skip_hour<C: TradingCalendar + ?Sized>(
    cal: &C,
    candidate: NaiveDateTime,
) -> Result<NaiveDateTime, ScheduleError> {
    next_valid_start(cal, plus_one_hour(candidate)?)
}

// ---------------------------------------------------------------------------
// SlotWalk
// ---------------------------------------------------------------------------

/// Forward walk over valid trading hours.
///
/// State is the candidate start plus the window of the day it was last
/// considered under. Each [`SlotWalk::step`] first moves off the previously
/// considered candidate, then either emits the slot at the new candidate or
/// skips it. Moving lazily means a walk never looks past the last slot it
/// was asked for.
pub struct SlotWalk<'a, C: TradingCalendar + ?Sized> {
    cal: &'a C,
    candidate: NaiveDateTime,
    considered: Option<TradingWindow>,
}

impl<'a, C: TradingCalendar + ?Sized> SlotWalk<'a, C> {
    pub fn start(
        cal: &'a C,
        anchor: NaiveDateTime,
        start_next_hour: bool,
    ) -> Result<Self, ScheduleError> {
        let candidate = next_valid_start(cal, initial_candidate(anchor, start_next_hour)?)?;
        Ok(Self {
            cal,
            candidate,
            considered: None,
        })
    }

    /// Candidate the next [`SlotWalk::step`] will consider (before any
    /// pending advance).
    pub fn candidate(&self) -> NaiveDateTime {
        self.candidate
    }

    /// Advance off the last considered hour, then consider the new
    /// candidate. Returns the emitted slot, if any.
    pub fn step(&mut self) -> Result<Option<TimeSlot>, ScheduleError> {
        if let Some(window) = self.considered.take() {
            self.candidate = advance_hour(self.cal, self.candidate, window)?;
        }

        let class = self.cal.classify(self.candidate.date());
        let Some(window) = self.cal.window_for(class) else {
            self.candidate = skip_hour(self.cal, self.candidate)?;
            return Ok(None);
        };

        self.considered = Some(window);
        if !window.admits_hour(self.candidate.hour()) {
            return Ok(None);
        }
        TimeSlot::starting_at(self.candidate)
            .map(Some)
            .ok_or(ScheduleError::OutOfRange { at: self.candidate })
    }
}

impl<C: TradingCalendar + ?Sized> Iterator for SlotWalk<'_, C> {
    type Item = Result<TimeSlot, ScheduleError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.step() {
                Ok(Some(slot)) => return Some(Ok(slot)),
                Ok(None) => continue,
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Public entry points
// ---------------------------------------------------------------------------

/// Produce exactly `count` consecutive trading-hour slots following `anchor`.
///
/// All-or-nothing: either `count` slots or an error, never a partial list.
/// `count == 0` returns immediately without touching the calendar.
pub fn allocate<C: TradingCalendar + ?Sized>(
    cal: &C,
    anchor: NaiveDateTime,
    start_next_hour: bool,
    count: usize,
) -> Result<Vec<TimeSlot>, ScheduleError> {
    if count == 0 {
        return Ok(Vec::new());
    }
    SlotWalk::start(cal, anchor, start_next_hour)?
        .take(count)
        .collect()
}

/// Allocate one slot per value and attach the values in order.
pub fn allocate_series<C: TradingCalendar + ?Sized>(
    cal: &C,
    anchor: NaiveDateTime,
    start_next_hour: bool,
    values: &[f64],
) -> Result<Vec<PredictedSlot>, ScheduleError> {
    let slots = allocate(cal, anchor, start_next_hour, values.len())?;
    Ok(slots
        .into_iter()
        .zip(values.iter().copied())
        .map(|(slot, value)| PredictedSlot::new(slot, value))
        .collect())
}
