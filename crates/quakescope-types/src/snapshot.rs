//! Aggregate snapshots published to rendering collaborators.
//!
//! A snapshot is recomputed wholesale after every predicate mutation and is
//! never patched in place. Every field of one snapshot is derived from the
//! same filter state.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::buckets::{DepthBucket, MagnitudeBucket};
use crate::event::Event;
use crate::time::{Granularity, TimeRange};

/// Count of events in one fixed bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BucketCount<B> {
    /// The bucket.
    pub bucket: B,
    /// Number of events in it.
    pub count: usize,
}

/// Count of events in one temporal period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PeriodCount {
    /// Formatted period key (`YYYY-MM-DD`, `YYYY-MM`, or `YYYY`).
    pub key: String,
    /// First instant of the period.
    pub start: DateTime<Utc>,
    /// Number of events in the period.
    pub count: usize,
}

/// Header counters shown above the views.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct SnapshotSummary {
    /// Number of filtered events, including malformed ones.
    pub total: usize,
    /// Largest finite magnitude among filtered events.
    pub max_magnitude: Option<f64>,
    /// The active time window.
    pub time_range: TimeRange,
}

/// Everything the views render, derived from one filter state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct AggregateSnapshot {
    /// Events passing the composed predicate, in ingestion order.
    pub filtered_events: Vec<Event>,
    /// Magnitude histogram in fixed bucket order, empty buckets included.
    pub magnitude_histogram: Vec<BucketCount<MagnitudeBucket>>,
    /// Depth histogram in fixed bucket order, empty buckets included.
    pub depth_histogram: Vec<BucketCount<DepthBucket>>,
    /// Temporal histogram sorted by period start.
    pub temporal_histogram: Vec<PeriodCount>,
    /// Granularity chosen for the active time window.
    pub granularity: Granularity,
    /// Header counters.
    pub summary: SnapshotSummary,
}

impl AggregateSnapshot {
    /// Sum of the magnitude histogram counts.
    pub fn magnitude_total(&self) -> usize {
        self.magnitude_histogram
            .iter()
            .fold(0_usize, |acc, bin| acc.saturating_add(bin.count))
    }

    /// Sum of the depth histogram counts.
    pub fn depth_total(&self) -> usize {
        self.depth_histogram
            .iter()
            .fold(0_usize, |acc, bin| acc.saturating_add(bin.count))
    }

    /// Count recorded for one magnitude bucket.
    pub fn magnitude_count(&self, bucket: MagnitudeBucket) -> usize {
        self.magnitude_histogram
            .iter()
            .find(|bin| bin.bucket == bucket)
            .map_or(0, |bin| bin.count)
    }

    /// Count recorded for one depth bucket.
    pub fn depth_count(&self, bucket: DepthBucket) -> usize {
        self.depth_histogram
            .iter()
            .find(|bin| bin.bucket == bucket)
            .map_or(0, |bin| bin.count)
    }
}
