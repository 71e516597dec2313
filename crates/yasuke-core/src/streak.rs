//! Consecutive-day streaks over timestamped events.
//!
//! Two events are continuous when the day gap between them is 0 or 1. How the
//! gap is measured is chosen by [`DayBoundary`]:
//!
//! - [`DayBoundary::Elapsed`] floors the elapsed time between the two
//!   timestamps to whole 24h periods. Events at T and T+47h59m are continuous,
//!   and every event extends the run (three entries in one day count as 3).
//! - [`DayBoundary::Calendar`] compares local calendar dates at a fixed UTC
//!   offset. Events on the same date collapse into one active day.
//!
//! The current streak only counts when the newest event is within one day of
//! `now`; the longest streak is the best run anywhere in the history.

use chrono::{DateTime, FixedOffset, Offset, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayBoundary {
    #[default]
    Elapsed,
    Calendar,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StreakSummary {
    pub current: u32,
    pub longest: u32,
}

/// Pure streak computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakCalculator {
    boundary: DayBoundary,
    offset: FixedOffset,
}

impl Default for StreakCalculator {
    fn default() -> Self {
        Self::new(DayBoundary::Elapsed)
    }
}

impl StreakCalculator {
    pub fn new(boundary: DayBoundary) -> Self {
        Self {
            boundary,
            offset: Utc.fix(),
        }
    }

    /// Calendar dates are taken at `utc_offset_minutes` east of UTC.
    ///
    /// # Errors
    /// Returns an error if the offset is a day or more.
    pub fn with_utc_offset_minutes(mut self, minutes: i32) -> Result<Self, ValidationError> {
        self.offset = minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or(ValidationError::OutOfRange {
                field: "utc_offset_minutes".into(),
                value: i64::from(minutes),
                min: -1439,
                max: 1439,
            })?;
        Ok(self)
    }

    pub fn boundary(&self) -> DayBoundary {
        self.boundary
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    /// Day gap from `earlier` to `later`. Negative when `later` is actually
    /// earlier.
    pub fn gap_days(&self, later: DateTime<Utc>, earlier: DateTime<Utc>) -> i64 {
        match self.boundary {
            DayBoundary::Elapsed => (later - earlier)
                .num_milliseconds()
                .div_euclid(MILLIS_PER_DAY),
            DayBoundary::Calendar => {
                let later = later.with_timezone(&self.offset).date_naive();
                let earlier = earlier.with_timezone(&self.offset).date_naive();
                (later - earlier).num_days()
            }
        }
    }

    /// Current and longest streak over `events`, in any order.
    pub fn compute(&self, events: &[DateTime<Utc>], now: DateTime<Utc>) -> StreakSummary {
        let mut sorted = events.to_vec();
        sorted.sort_unstable();

        let mut tracker = StreakTracker::new(*self);
        for at in sorted {
            tracker.record(at);
        }
        tracker.summary(now)
    }

    /// Longest run only; does not depend on the current time.
    pub fn longest(&self, events: &[DateTime<Utc>]) -> u32 {
        match events.iter().max() {
            Some(newest) => self.compute(events, *newest).longest,
            None => 0,
        }
    }
}

/// Incremental streak accumulator.
///
/// Feed events oldest first; each call is O(1), so a caller can keep one of
/// these next to the event log instead of rescanning it.
#[derive(Debug, Clone)]
pub struct StreakTracker {
    calculator: StreakCalculator,
    last: Option<DateTime<Utc>>,
    run: u32,
    longest: u32,
}

impl StreakTracker {
    pub fn new(calculator: StreakCalculator) -> Self {
        Self {
            calculator,
            last: None,
            run: 0,
            longest: 0,
        }
    }

    /// Record an event. Returns `false` (and ignores it) if it is older than
    /// the last recorded one.
    pub fn record(&mut self, at: DateTime<Utc>) -> bool {
        match self.last {
            None => self.run = 1,
            Some(last) if at < last => {
                tracing::debug!(%at, %last, "out-of-order streak event ignored");
                return false;
            }
            Some(last) => {
                let gap = self.calculator.gap_days(at, last);
                let same_day = gap == 0 && self.calculator.boundary == DayBoundary::Calendar;
                if same_day {
                    // already counted
                } else if gap <= 1 {
                    self.run += 1;
                } else {
                    self.run = 1;
                }
            }
        }
        self.last = Some(at);
        self.longest = self.longest.max(self.run);
        true
    }

    pub fn last_event(&self) -> Option<DateTime<Utc>> {
        self.last
    }

    pub fn summary(&self, now: DateTime<Utc>) -> StreakSummary {
        let current = match self.last {
            Some(last) if self.calculator.gap_days(now, last) <= 1 => self.run,
            _ => 0,
        };
        StreakSummary {
            current,
            longest: self.longest,
        }
    }
}

/// Timestamps parsed from stored RFC 3339 strings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedTimestamps {
    pub timestamps: Vec<DateTime<Utc>>,
    /// Number of malformed values dropped.
    pub skipped: usize,
}

/// Parse RFC 3339 timestamps, skipping (and logging) malformed ones.
pub fn parse_timestamps<S: AsRef<str>>(raw: &[S]) -> ParsedTimestamps {
    let mut parsed = ParsedTimestamps::default();
    for value in raw {
        let value = value.as_ref();
        match DateTime::parse_from_rfc3339(value) {
            Ok(dt) => parsed.timestamps.push(dt.with_timezone(&Utc)),
            Err(e) => {
                tracing::warn!(value, error = %e, "skipping malformed timestamp");
                parsed.skipped += 1;
            }
        }
    }
    parsed
}
