//! The composable filter predicate.
//!
//! An event passes when it satisfies every constraint category: the time
//! window, the magnitude bucket set, the depth bucket set, and the spatial
//! bounds. Categories combine with AND. Buckets within one category combine
//! with OR, and an empty bucket set places no constraint on its category.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use quakescope_types::{BoundingBox, BucketCategory, DepthBucket, Event, MagnitudeBucket, TimeRange};

use crate::aggregate;

/// Errors raised while mutating the filter predicate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    /// The window start lies after its end. The previous window is kept.
    #[error("invalid time range: start {start} is after end {end}")]
    InvalidRange {
        /// Requested start.
        start: DateTime<Utc>,
        /// Requested end.
        end: DateTime<Utc>,
    },

    /// A bucket label does not name any bucket of its category.
    #[error("unknown {category} bucket label: {label}")]
    UnknownBucket {
        /// Category the label was looked up in.
        category: BucketCategory,
        /// The rejected label.
        label: String,
    },
}

/// Current predicate state, owned exclusively by the coordinator.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterState {
    /// Inclusive time window.
    time_range: TimeRange,
    /// Selected magnitude buckets; empty means unconstrained.
    magnitude_buckets: BTreeSet<MagnitudeBucket>,
    /// Selected depth buckets; empty means unconstrained.
    depth_buckets: BTreeSet<DepthBucket>,
    /// Optional spatial constraint.
    spatial_bounds: Option<BoundingBox>,
}

impl FilterState {
    /// A predicate constraining only the time window.
    pub const fn new(time_range: TimeRange) -> Self {
        Self {
            time_range,
            magnitude_buckets: BTreeSet::new(),
            depth_buckets: BTreeSet::new(),
            spatial_bounds: None,
        }
    }

    /// The active time window.
    pub const fn time_range(&self) -> TimeRange {
        self.time_range
    }

    /// Selected magnitude buckets.
    pub const fn magnitude_buckets(&self) -> &BTreeSet<MagnitudeBucket> {
        &self.magnitude_buckets
    }

    /// Selected depth buckets.
    pub const fn depth_buckets(&self) -> &BTreeSet<DepthBucket> {
        &self.depth_buckets
    }

    /// Active spatial bounds.
    pub const fn spatial_bounds(&self) -> Option<BoundingBox> {
        self.spatial_bounds
    }

    /// Replace the time window, rejecting `start > end` without change.
    pub(crate) fn set_time_range(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), FilterError> {
        let range = TimeRange::new(start, end);
        if !range.is_ordered() {
            return Err(FilterError::InvalidRange { start, end });
        }
        self.time_range = range;
        Ok(())
    }

    /// Add the bucket if absent, remove it if present. Returns whether it
    /// is selected afterward.
    pub(crate) fn toggle_magnitude(&mut self, bucket: MagnitudeBucket) -> bool {
        if self.magnitude_buckets.remove(&bucket) {
            false
        } else {
            self.magnitude_buckets.insert(bucket)
        }
    }

    /// Add the bucket if absent, remove it if present. Returns whether it
    /// is selected afterward.
    pub(crate) fn toggle_depth(&mut self, bucket: DepthBucket) -> bool {
        if self.depth_buckets.remove(&bucket) {
            false
        } else {
            self.depth_buckets.insert(bucket)
        }
    }

    pub(crate) const fn set_spatial_bounds(&mut self, bounds: Option<BoundingBox>) {
        self.spatial_bounds = bounds;
    }

    /// Drop every constraint except the window, which becomes `time_range`.
    pub(crate) fn reset(&mut self, time_range: TimeRange) {
        *self = Self::new(time_range);
    }

    /// Whether `event` satisfies the composed predicate.
    pub fn matches(&self, event: &Event) -> bool {
        self.time_range.contains(event.timestamp)
            && (self.magnitude_buckets.is_empty()
                || aggregate::magnitude_bucket(event.magnitude)
                    .is_some_and(|bucket| self.magnitude_buckets.contains(&bucket)))
            && (self.depth_buckets.is_empty()
                || aggregate::depth_bucket(event.depth_km)
                    .is_some_and(|bucket| self.depth_buckets.contains(&bucket)))
            && self
                .spatial_bounds
                .is_none_or(|bounds| bounds.contains(event.location()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::testing::{event_at, located_event, timestamp};
    use quakescope_types::GeoPoint;

    fn year_2020() -> FilterState {
        FilterState::new(TimeRange::new(
            timestamp("2020-01-01T00:00:00Z"),
            timestamp("2020-12-31T23:59:59Z"),
        ))
    }

    #[test]
    fn inverted_range_is_rejected_and_kept() {
        let mut filter = year_2020();
        let before = filter.time_range();
        let result = filter.set_time_range(
            timestamp("2020-05-01T00:00:00Z"),
            timestamp("2020-04-01T00:00:00Z"),
        );
        assert!(matches!(result, Err(FilterError::InvalidRange { .. })));
        assert_eq!(filter.time_range(), before);
    }

    #[test]
    fn toggle_adds_then_removes() {
        let mut filter = year_2020();
        assert!(filter.toggle_magnitude(MagnitudeBucket::M5));
        assert!(filter.magnitude_buckets().contains(&MagnitudeBucket::M5));
        assert!(!filter.toggle_magnitude(MagnitudeBucket::M5));
        assert!(filter.magnitude_buckets().is_empty());
    }

    #[test]
    fn buckets_or_within_category_and_across_categories() {
        let mut filter = year_2020();
        let m5_deep = event_at("a", "2020-02-01T00:00:00Z", 5.2, 350.0);
        let m6_deep = event_at("b", "2020-02-01T00:00:00Z", 6.2, 350.0);
        let m5_shallow = event_at("c", "2020-02-01T00:00:00Z", 5.2, 5.0);
        let small = event_at("d", "2020-02-01T00:00:00Z", 2.0, 350.0);

        filter.toggle_magnitude(MagnitudeBucket::M5);
        filter.toggle_magnitude(MagnitudeBucket::M6);
        assert!(filter.matches(&m5_deep));
        assert!(filter.matches(&m6_deep));
        assert!(filter.matches(&m5_shallow));
        assert!(!filter.matches(&small));

        filter.toggle_depth(DepthBucket::Deep);
        assert!(filter.matches(&m5_deep));
        assert!(filter.matches(&m6_deep));
        assert!(!filter.matches(&m5_shallow));
    }

    #[test]
    fn unconstrained_categories_admit_malformed_events() {
        let filter = year_2020();
        let mut malformed = event_at("a", "2020-02-01T00:00:00Z", f64::NAN, 10.0);
        malformed.depth_km = f64::INFINITY;
        assert!(filter.matches(&malformed));
    }

    #[test]
    fn spatial_bounds_constrain_location() {
        let mut filter = year_2020();
        filter.set_spatial_bounds(Some(BoundingBox::from_corners(
            GeoPoint::new(30.0, 130.0),
            GeoPoint::new(45.0, 145.0),
        )));
        let inside = located_event("a", "2020-02-01T00:00:00Z", 5.0, 10.0, 35.6, 139.7);
        let outside = located_event("b", "2020-02-01T00:00:00Z", 5.0, 10.0, -33.4, -70.6);
        assert!(filter.matches(&inside));
        assert!(!filter.matches(&outside));

        filter.reset(filter.time_range());
        assert!(filter.matches(&outside));
    }

    #[test]
    fn time_window_is_inclusive() {
        let filter = year_2020();
        assert!(filter.matches(&event_at("a", "2020-01-01T00:00:00Z", 4.0, 1.0)));
        assert!(filter.matches(&event_at("b", "2020-12-31T23:59:59Z", 4.0, 1.0)));
        assert!(!filter.matches(&event_at("c", "2021-01-01T00:00:00Z", 4.0, 1.0)));
    }
}
