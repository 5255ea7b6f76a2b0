//! Lookback window derived from the reference date.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Number of days between the window start and the reference date.
pub const LOOKBACK_DAYS: i64 = 20;

/// Inclusive calendar window `[start, end]` in UTC days.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    /// Window ending on `reference` and starting [`LOOKBACK_DAYS`] days earlier.
    ///
    /// `None` when the start or the day after `reference` falls outside the
    /// supported calendar range.
    pub fn checked_ending_on(reference: NaiveDate) -> Option<Self> {
        let start = reference.checked_sub_signed(Duration::days(LOOKBACK_DAYS))?;
        reference.succ_opt()?;
        Some(Self {
            start,
            end: reference,
        })
    }

    /// Like [`TimeWindow::checked_ending_on`], clamping the start to the
    /// earliest supported date at the edge of the calendar.
    pub fn ending_on(reference: NaiveDate) -> Self {
        Self::checked_ending_on(reference).unwrap_or(Self {
            start: reference
                .checked_sub_signed(Duration::days(LOOKBACK_DAYS))
                .unwrap_or(NaiveDate::MIN),
            end: reference,
        })
    }

    /// Number of days from start to end.
    pub fn width_days(&self) -> i64 {
        (self.end - self.start).num_days()
    }

    /// First instant of the window.
    pub fn start_instant(&self) -> DateTime<Utc> {
        self.start.and_time(NaiveTime::MIN).and_utc()
    }

    /// First instant after the window, i.e. midnight following `end`.
    ///
    /// Remote date filters take a half-open range, so the whole reference
    /// day is included by passing this as the exclusive bound.
    pub fn end_exclusive_instant(&self) -> DateTime<Utc> {
        match self.end.succ_opt() {
            Some(next) => next.and_time(NaiveTime::MIN).and_utc(),
            None => DateTime::<Utc>::MAX_UTC,
        }
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        let day = instant.date_naive();
        day >= self.start && day <= self.end
    }
}

impl std::fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} – {}", self.start, self.end)
    }
}
