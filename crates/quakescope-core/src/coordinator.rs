//! Cross-filter coordinator.
//!
//! [`CrossFilterCoordinator`] owns the filter predicate and a shared
//! reference to the [`EventStore`]. Every mutation follows the same cycle:
//! update the predicate, recompute the filtered set and all aggregates into a
//! fresh [`AggregateSnapshot`], swap it in, then invoke each subscriber
//! synchronously with the new snapshot. Because the whole cycle runs under
//! `&mut self`, no reader can observe a predicate whose aggregates have not
//! been recomputed yet.
//!
//! Subscribers are plain callbacks so the core stays independent of any
//! rendering technology. [`broadcast_listener`] adapts a
//! [`tokio::sync::broadcast`] channel for asynchronous consumers.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use quakescope_types::{
    AggregateSnapshot, BoundingBox, BucketCategory, DepthBucket, Event, MagnitudeBucket,
    SnapshotSummary, SubscriptionId, TimeRange,
};
use tokio::sync::broadcast;
use tracing::{debug, warn};

use crate::aggregate;
use crate::filter::{FilterError, FilterState};
use crate::store::EventStore;

/// Callback invoked with every newly published snapshot.
pub type Listener = Box<dyn FnMut(&Arc<AggregateSnapshot>) + Send>;

/// Owns the predicate and the derived aggregates, and publishes snapshots.
pub struct CrossFilterCoordinator {
    /// The dataset being filtered.
    store: Arc<EventStore>,
    /// Current predicate.
    filter: FilterState,
    /// Aggregates derived from `filter`; replaced wholesale on recompute.
    snapshot: Arc<AggregateSnapshot>,
    /// Registered subscribers, invoked in registration order.
    listeners: Vec<(SubscriptionId, Listener)>,
}

impl core::fmt::Debug for CrossFilterCoordinator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CrossFilterCoordinator")
            .field("events", &self.store.len())
            .field("filter", &self.filter)
            .field("filtered", &self.snapshot.filtered_events.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

impl CrossFilterCoordinator {
    /// Create a coordinator whose window covers the whole dataset.
    ///
    /// An empty store gets a zero-length window at the Unix epoch.
    pub fn new(store: Arc<EventStore>) -> Self {
        let filter = FilterState::new(default_window(&store));
        let snapshot = Arc::new(compute_snapshot(store.all(), &filter));
        Self {
            store,
            filter,
            snapshot,
            listeners: Vec::new(),
        }
    }

    /// The dataset being filtered.
    pub const fn store(&self) -> &Arc<EventStore> {
        &self.store
    }

    /// Read-only view of the current predicate.
    pub const fn filter_state(&self) -> &FilterState {
        &self.filter
    }

    /// The most recently published snapshot. Never triggers a recompute.
    pub fn snapshot(&self) -> Arc<AggregateSnapshot> {
        Arc::clone(&self.snapshot)
    }

    /// Set the time window and recompute.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidRange`] if `start > end`; the previous
    /// window stays in effect and nothing is published.
    pub fn apply_time_range(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<(), FilterError> {
        if let Err(err) = self.filter.set_time_range(start, end) {
            warn!(%start, %end, "Rejected inverted time range");
            return Err(err);
        }
        self.recompute();
        Ok(())
    }

    /// Toggle a magnitude bucket and recompute. Returns whether the bucket
    /// is selected afterward.
    pub fn toggle_magnitude_bucket(&mut self, bucket: MagnitudeBucket) -> bool {
        let selected = self.filter.toggle_magnitude(bucket);
        self.recompute();
        selected
    }

    /// Toggle a depth bucket and recompute. Returns whether the bucket is
    /// selected afterward.
    pub fn toggle_depth_bucket(&mut self, bucket: DepthBucket) -> bool {
        let selected = self.filter.toggle_depth(bucket);
        self.recompute();
        selected
    }

    /// Toggle a bucket identified by its axis label.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::UnknownBucket`] if `label` names no bucket of
    /// `category`; the predicate is left unchanged.
    pub fn toggle_bucket(
        &mut self,
        category: BucketCategory,
        label: &str,
    ) -> Result<bool, FilterError> {
        let unknown = || FilterError::UnknownBucket {
            category,
            label: label.to_owned(),
        };
        match category {
            BucketCategory::Magnitude => MagnitudeBucket::from_label(label)
                .map(|bucket| self.toggle_magnitude_bucket(bucket))
                .ok_or_else(unknown),
            BucketCategory::Depth => DepthBucket::from_label(label)
                .map(|bucket| self.toggle_depth_bucket(bucket))
                .ok_or_else(unknown),
        }
    }

    /// Constrain events to a bounding box and recompute.
    pub fn apply_spatial_bounds(&mut self, bounds: BoundingBox) {
        self.filter.set_spatial_bounds(Some(bounds));
        self.recompute();
    }

    /// Remove the spatial constraint and recompute.
    pub fn clear_spatial_bounds(&mut self) {
        self.filter.set_spatial_bounds(None);
        self.recompute();
    }

    /// Restore the whole-dataset window, clear every bucket selection and
    /// the spatial bounds, then recompute once.
    pub fn reset_filters(&mut self) {
        self.filter.reset(default_window(&self.store));
        self.recompute();
    }

    /// Clear every bucket selection and the spatial bounds, set the window
    /// to `window`, then recompute once.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidRange`] if `window` is inverted; the
    /// predicate is left unchanged and nothing is published.
    pub fn reset_filters_to(&mut self, window: TimeRange) -> Result<(), FilterError> {
        if !window.is_ordered() {
            warn!(start = %window.start, end = %window.end, "Rejected inverted reset window");
            return Err(FilterError::InvalidRange {
                start: window.start,
                end: window.end,
            });
        }
        self.filter.reset(window);
        self.recompute();
        Ok(())
    }

    /// Register a listener invoked synchronously after every recompute.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Arc<AggregateSnapshot>) + Send + 'static,
    {
        let id = SubscriptionId::new();
        self.listeners.push((id, Box::new(listener)));
        debug!(subscription = %id, subscribers = self.listeners.len(), "Listener subscribed");
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(registered, _)| *registered != id);
        before != self.listeners.len()
    }

    /// Number of registered listeners.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }

    /// Rebuild the snapshot from the current predicate and publish it.
    fn recompute(&mut self) {
        let snapshot = Arc::new(compute_snapshot(self.store.all(), &self.filter));
        debug!(
            filtered = snapshot.filtered_events.len(),
            granularity = ?snapshot.granularity,
            subscribers = self.listeners.len(),
            "Recomputed aggregates"
        );
        self.snapshot = Arc::clone(&snapshot);
        for (_, listener) in &mut self.listeners {
            listener(&snapshot);
        }
    }
}

/// Filter `events` by `filter` and derive every aggregate.
///
/// Granularity comes from the predicate's window, not from the span of the
/// events that survived filtering.
pub fn compute_snapshot(events: &[Event], filter: &FilterState) -> AggregateSnapshot {
    let filtered_events: Vec<_> = events
        .iter()
        .filter(|event| filter.matches(event))
        .cloned()
        .collect();

    let time_range = filter.time_range();
    let granularity = aggregate::temporal_granularity(&time_range);
    let max_magnitude = filtered_events
        .iter()
        .map(|event| event.magnitude)
        .filter(|magnitude| magnitude.is_finite())
        .reduce(f64::max);

    AggregateSnapshot {
        magnitude_histogram: aggregate::magnitude_histogram(&filtered_events),
        depth_histogram: aggregate::depth_histogram(&filtered_events),
        temporal_histogram: aggregate::temporal_histogram(&filtered_events, granularity),
        granularity,
        summary: SnapshotSummary {
            total: filtered_events.len(),
            max_magnitude,
            time_range,
        },
        filtered_events,
    }
}

/// Listener forwarding snapshots into a broadcast channel.
///
/// A send with no receivers is normal when no client is connected and is
/// silently ignored.
pub fn broadcast_listener(
    tx: broadcast::Sender<Arc<AggregateSnapshot>>,
) -> impl FnMut(&Arc<AggregateSnapshot>) + Send + 'static {
    move |snapshot| {
        let _ = tx.send(Arc::clone(snapshot));
    }
}

fn default_window(store: &EventStore) -> TimeRange {
    store
        .full_range()
        .unwrap_or_else(|| TimeRange::new(DateTime::UNIX_EPOCH, DateTime::UNIX_EPOCH))
}
