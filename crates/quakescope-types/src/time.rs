//! Calendar-month anchors, time windows, and temporal granularity.
//!
//! All calendar arithmetic is done in UTC. A [`MonthAnchor`] is the unit the
//! range slider and playback loop step through; a [`TimeRange`] is the
//! inclusive window the time predicate filters on.

use chrono::{DateTime, Datelike, Months, NaiveDate, NaiveTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Seconds in one day, used to express window spans in days.
const SECONDS_PER_DAY: f64 = 86_400.0;

/// First day of a calendar month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct MonthAnchor {
    /// The first day of the month.
    first_day: NaiveDate,
}

impl MonthAnchor {
    /// The month containing `timestamp`.
    pub fn containing(timestamp: DateTime<Utc>) -> Self {
        let date = timestamp.date_naive();
        Self {
            first_day: date.with_day(1).unwrap_or(date),
        }
    }

    /// The month with the given year and 1-based month number, if valid.
    pub fn from_ymd(year: i32, month: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, 1).map(|first_day| Self { first_day })
    }

    /// Calendar year.
    pub fn year(self) -> i32 {
        self.first_day.year()
    }

    /// Calendar month, 1-based.
    pub fn month(self) -> u32 {
        self.first_day.month()
    }

    /// First instant of the month (00:00:00 on day 1).
    pub fn start(self) -> DateTime<Utc> {
        self.first_day.and_time(NaiveTime::MIN).and_utc()
    }

    /// Last instant of the month (23:59:59.999 on its last calendar day).
    pub fn end(self) -> DateTime<Utc> {
        let next = self
            .first_day
            .checked_add_months(Months::new(1))
            .unwrap_or(NaiveDate::MAX);
        let next_start = next.and_time(NaiveTime::MIN).and_utc();
        next_start
            .checked_sub_signed(TimeDelta::milliseconds(1))
            .unwrap_or(next_start)
    }

    /// Label in `YYYY-MM` form.
    pub fn label(self) -> String {
        self.first_day.format("%Y-%m").to_string()
    }
}

/// Inclusive time window `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct TimeRange {
    /// First instant included.
    pub start: DateTime<Utc>,
    /// Last instant included.
    pub end: DateTime<Utc>,
}

impl TimeRange {
    /// Create a window; callers are responsible for `start <= end`.
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Window covering whole months from `first` through `last`.
    pub fn months(first: MonthAnchor, last: MonthAnchor) -> Self {
        Self {
            start: first.start(),
            end: last.end(),
        }
    }

    /// Whether `start <= end`.
    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    /// Whether `timestamp` lies inside the window (both ends inclusive).
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Length of the window in (fractional) days.
    pub fn span_days(&self) -> f64 {
        let span = self.end.signed_duration_since(self.start);
        let seconds = span.num_milliseconds() as f64 / 1000.0;
        seconds / SECONDS_PER_DAY
    }
}

/// Temporal bucket width of the time histogram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// One bin per calendar day, keyed `YYYY-MM-DD`.
    Daily,
    /// One bin per calendar month, keyed `YYYY-MM`.
    Monthly,
    /// One bin per calendar year, keyed `YYYY`.
    Yearly,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn month(year: i32, m: u32) -> MonthAnchor {
        MonthAnchor::from_ymd(year, m).unwrap_or_else(|| MonthAnchor::containing(Utc::now()))
    }

    #[test]
    fn month_end_is_last_instant_of_last_day() {
        let feb = month(2020, 2);
        assert_eq!(feb.end().to_rfc3339(), "2020-02-29T23:59:59.999+00:00");
        let dec = month(2021, 12);
        assert_eq!(dec.end().to_rfc3339(), "2021-12-31T23:59:59.999+00:00");
        assert_eq!(dec.start().to_rfc3339(), "2021-12-01T00:00:00+00:00");
    }

    #[test]
    fn containing_truncates_to_first_day() {
        let ts = month(2020, 3).start() + TimeDelta::days(17);
        let anchor = MonthAnchor::containing(ts);
        assert_eq!(anchor, month(2020, 3));
        assert_eq!(anchor.label(), "2020-03");
        assert_eq!((anchor.year(), anchor.month()), (2020, 3));
    }

    #[test]
    fn range_is_inclusive_on_both_ends() {
        let range = TimeRange::months(month(2020, 1), month(2020, 1));
        assert!(range.contains(range.start));
        assert!(range.contains(range.end));
        assert!(!range.contains(month(2020, 2).start()));
        assert!(range.span_days() < 31.0);
        assert!(range.span_days() > 30.9);
    }

    #[test]
    fn anchors_order_chronologically() {
        assert!(month(2019, 12) < month(2020, 1));
        assert!(month(2020, 1) < month(2020, 3));
    }
}
