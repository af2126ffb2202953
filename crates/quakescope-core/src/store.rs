//! Immutable event collection.
//!
//! The store is populated once by the ingestion collaborator and never
//! changes afterward. Everything derived from the whole dataset (the month
//! index and the overall time span) is computed at construction.

use std::collections::BTreeSet;

use quakescope_types::{Event, MonthAnchor, TimeRange};

/// Read-only event collection shared by the coordinator and the range
/// selector.
#[derive(Debug, Clone, Default)]
pub struct EventStore {
    /// Events in ingestion order.
    events: Vec<Event>,
    /// Distinct calendar months containing at least one event, ascending.
    months: Vec<MonthAnchor>,
    /// Earliest and latest event timestamps, `None` for an empty store.
    full_range: Option<TimeRange>,
}

impl EventStore {
    /// Build a store from already type-coerced events.
    pub fn new(events: Vec<Event>) -> Self {
        let months: BTreeSet<MonthAnchor> = events
            .iter()
            .map(|event| MonthAnchor::containing(event.timestamp))
            .collect();

        let full_range = events
            .iter()
            .map(|event| event.timestamp)
            .min()
            .zip(events.iter().map(|event| event.timestamp).max())
            .map(|(start, end)| TimeRange::new(start, end));

        Self {
            events,
            months: months.into_iter().collect(),
            full_range,
        }
    }

    /// All events in ingestion order.
    pub fn all(&self) -> &[Event] {
        &self.events
    }

    /// Distinct calendar months, sorted ascending.
    pub fn months_index(&self) -> &[MonthAnchor] {
        &self.months
    }

    /// Span from the earliest to the latest event.
    pub const fn full_range(&self) -> Option<TimeRange> {
        self.full_range
    }

    /// Number of events.
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the store holds no events.
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl FromIterator<Event> for EventStore {
    fn from_iter<I: IntoIterator<Item = Event>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
