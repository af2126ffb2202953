//! Pure bucketing and histogram functions.
//!
//! Nothing here holds state: every function maps an event sequence (or a
//! single value) to its aggregate. The coordinator calls these on the
//! filtered set after each predicate change.
//!
//! Only events whose latitude, longitude, depth, and magnitude are all finite
//! are counted. Other events pass through the filter untouched but never
//! reach a histogram bin.

use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, Utc};
use quakescope_types::{
    BucketCount, DepthBucket, Event, Granularity, MagnitudeBucket, MonthAnchor, PeriodCount,
    TimeRange,
};

/// Windows up to this many days are binned per day.
const DAILY_MAX_DAYS: f64 = 31.0;

/// Windows up to this many days are binned per month; longer ones per year.
const MONTHLY_MAX_DAYS: f64 = 730.0;

/// Classify a magnitude. `None` is the unbucketed sentinel (below 3.0 or
/// non-finite).
pub fn magnitude_bucket(magnitude: f64) -> Option<MagnitudeBucket> {
    if !magnitude.is_finite() || magnitude < 3.0 {
        None
    } else if magnitude < 4.0 {
        Some(MagnitudeBucket::M3)
    } else if magnitude < 5.0 {
        Some(MagnitudeBucket::M4)
    } else if magnitude < 6.0 {
        Some(MagnitudeBucket::M5)
    } else if magnitude < 7.0 {
        Some(MagnitudeBucket::M6)
    } else if magnitude < 8.0 {
        Some(MagnitudeBucket::M7)
    } else {
        Some(MagnitudeBucket::M8Plus)
    }
}

/// Classify a depth in kilometers. `None` is the unbucketed sentinel
/// (negative or non-finite).
pub fn depth_bucket(depth_km: f64) -> Option<DepthBucket> {
    if !depth_km.is_finite() || depth_km < 0.0 {
        None
    } else if depth_km < 10.0 {
        Some(DepthBucket::Shallow)
    } else if depth_km < 30.0 {
        Some(DepthBucket::Upper)
    } else if depth_km < 70.0 {
        Some(DepthBucket::Middle)
    } else if depth_km < 300.0 {
        Some(DepthBucket::Intermediate)
    } else {
        Some(DepthBucket::Deep)
    }
}

/// Pick the temporal bin width for a window.
///
/// Must be called with the active window every time it changes; the choice
/// depends only on the window's span, never on the data inside it.
pub fn temporal_granularity(range: &TimeRange) -> Granularity {
    let days = range.span_days();
    if days <= DAILY_MAX_DAYS {
        Granularity::Daily
    } else if days <= MONTHLY_MAX_DAYS {
        Granularity::Monthly
    } else {
        Granularity::Yearly
    }
}

/// First instant of the period containing `timestamp`.
pub fn period_start(granularity: Granularity, timestamp: DateTime<Utc>) -> DateTime<Utc> {
    match granularity {
        Granularity::Daily => timestamp.date_naive().and_time(NaiveTime::MIN).and_utc(),
        Granularity::Monthly => MonthAnchor::containing(timestamp).start(),
        Granularity::Yearly => {
            let date = timestamp.date_naive();
            NaiveDate::from_ymd_opt(date.year(), 1, 1)
                .unwrap_or(date)
                .and_time(NaiveTime::MIN)
                .and_utc()
        }
    }
}

/// Format a period start as its histogram key.
pub fn period_key(granularity: Granularity, start: DateTime<Utc>) -> String {
    let pattern = match granularity {
        Granularity::Daily => "%Y-%m-%d",
        Granularity::Monthly => "%Y-%m",
        Granularity::Yearly => "%Y",
    };
    start.format(pattern).to_string()
}

/// Count events per bucket, emitting every bucket of `order` exactly once
/// and in that order, empty ones included. Events mapped to `None` are
/// skipped.
pub fn histogram<'a, B, I, F>(events: I, bucket_fn: F, order: &[B]) -> Vec<BucketCount<B>>
where
    B: Copy + PartialEq,
    I: IntoIterator<Item = &'a Event>,
    F: Fn(&Event) -> Option<B>,
{
    let mut bins: Vec<BucketCount<B>> = order
        .iter()
        .map(|&bucket| BucketCount { bucket, count: 0 })
        .collect();

    for bucket in events.into_iter().filter_map(&bucket_fn) {
        if let Some(bin) = bins.iter_mut().find(|bin| bin.bucket == bucket) {
            bin.count = bin.count.saturating_add(1);
        }
    }
    bins
}

/// Magnitude histogram over the eligible events.
pub fn magnitude_histogram(events: &[Event]) -> Vec<BucketCount<MagnitudeBucket>> {
    histogram(
        events.iter().filter(|event| event.has_finite_fields()),
        |event| magnitude_bucket(event.magnitude),
        &MagnitudeBucket::ALL,
    )
}

/// Depth histogram over the eligible events.
pub fn depth_histogram(events: &[Event]) -> Vec<BucketCount<DepthBucket>> {
    histogram(
        events.iter().filter(|event| event.has_finite_fields()),
        |event| depth_bucket(event.depth_km),
        &DepthBucket::ALL,
    )
}

/// Count eligible events per period, sorted ascending by period start.
///
/// Only periods containing at least one event are emitted.
pub fn temporal_histogram(events: &[Event], granularity: Granularity) -> Vec<PeriodCount> {
    let mut periods: BTreeMap<DateTime<Utc>, usize> = BTreeMap::new();
    for event in events.iter().filter(|event| event.has_finite_fields()) {
        let count = periods
            .entry(period_start(granularity, event.timestamp))
            .or_insert(0);
        *count = count.saturating_add(1);
    }

    periods
        .into_iter()
        .map(|(start, count)| PeriodCount {
            key: period_key(granularity, start),
            start,
            count,
        })
        .collect()
}
