//! Month range selector.
//!
//! The selector walks the dataset's distinct calendar months. It is either
//! on a single month or spans an inclusive pair of months (dual-thumb mode).
//! Every transition that changes the effective window pushes the new window
//! into the coordinator before the selector's own state is committed, so a
//! rejected window leaves the selector where it was.
//!
//! # Transitions
//!
//! - `pick(j)`: select `Single(j)` from any state.
//! - `expand()`: `Single(i)` becomes `Range(i-1, i+1)`, clamped to the
//!   month list.
//! - `drag_start(k)` / `drag_end(k)`: move one thumb of a `Range`; the moving
//!   thumb cannot cross the stationary one.
//! - A `Range` whose thumbs meet collapses to `Single` in the same step.
//!
//! Indices beyond the last month are clamped, never rejected.

use quakescope_types::{MonthAnchor, RangeSelection, RangeView, Thumb, TimeRange};
use tracing::debug;

use crate::coordinator::CrossFilterCoordinator;
use crate::filter::FilterError;

/// Errors that can occur in the range selector.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RangeError {
    /// The dataset has no months to select from.
    #[error("no calendar months to select from")]
    NoMonths,

    /// The coordinator rejected the window.
    #[error("filter error: {source}")]
    Filter {
        /// The underlying filter error.
        #[from]
        source: FilterError,
    },
}

/// State machine over the sorted, deduplicated month list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeSelector {
    /// Month anchors, ascending and non-empty.
    months: Vec<MonthAnchor>,
    /// Current selection; a `Range` always has `start < end`.
    selection: RangeSelection,
}

impl RangeSelector {
    /// Create a selector on the most recent month.
    ///
    /// The initial window is not pushed anywhere; call
    /// [`apply_current`](Self::apply_current) to sync a coordinator.
    ///
    /// # Errors
    ///
    /// Returns [`RangeError::NoMonths`] if `months` is empty.
    pub fn new(months: Vec<MonthAnchor>) -> Result<Self, RangeError> {
        let last = months.len().checked_sub(1).ok_or(RangeError::NoMonths)?;
        Ok(Self {
            months,
            selection: RangeSelection::Single { index: last },
        })
    }

    /// Index of the most recent month.
    pub fn last_index(&self) -> usize {
        self.months.len().saturating_sub(1)
    }

    /// The month list.
    pub fn months(&self) -> &[MonthAnchor] {
        &self.months
    }

    /// Current selection.
    pub const fn selection(&self) -> RangeSelection {
        self.selection
    }

    /// Time window of the current selection.
    pub fn window(&self) -> TimeRange {
        self.window_of(self.selection)
    }

    /// Selection with the labels the slider widgets display.
    pub fn view(&self) -> RangeView {
        let (start, end) = self.selection.bounds();
        RangeView {
            selection: self.selection,
            start_label: self.month(start).label(),
            end_label: self.month(end).label(),
        }
    }

    /// Push the current window into `coordinator`.
    pub fn apply_current(&self, coordinator: &mut CrossFilterCoordinator) -> Result<(), RangeError> {
        let window = self.window();
        coordinator.apply_time_range(window.start, window.end)?;
        Ok(())
    }

    /// Select a single month, leaving dual-thumb mode if active.
    pub fn pick(
        &mut self,
        index: usize,
        coordinator: &mut CrossFilterCoordinator,
    ) -> Result<RangeSelection, RangeError> {
        let index = self.clamp(index);
        self.transition(RangeSelection::Single { index }, coordinator)
    }

    /// Enter dual-thumb mode around the current month. A no-op in
    /// dual-thumb mode.
    pub fn expand(
        &mut self,
        coordinator: &mut CrossFilterCoordinator,
    ) -> Result<RangeSelection, RangeError> {
        match self.selection {
            RangeSelection::Single { index } => {
                let start = index.saturating_sub(1);
                let end = self.clamp(index.saturating_add(1));
                self.transition(RangeSelection::Range { start, end }, coordinator)
            }
            RangeSelection::Range { .. } => Ok(self.selection),
        }
    }

    /// Move the lower thumb. In single mode this is a [`pick`](Self::pick).
    pub fn drag_start(
        &mut self,
        index: usize,
        coordinator: &mut CrossFilterCoordinator,
    ) -> Result<RangeSelection, RangeError> {
        match self.selection {
            RangeSelection::Single { .. } => self.pick(index, coordinator),
            RangeSelection::Range { end, .. } => {
                let start = self.clamp(index).min(end);
                self.transition(RangeSelection::Range { start, end }, coordinator)
            }
        }
    }

    /// Move the upper thumb. In single mode this is a [`pick`](Self::pick).
    pub fn drag_end(
        &mut self,
        index: usize,
        coordinator: &mut CrossFilterCoordinator,
    ) -> Result<RangeSelection, RangeError> {
        match self.selection {
            RangeSelection::Single { .. } => self.pick(index, coordinator),
            RangeSelection::Range { start, .. } => {
                let end = self.clamp(index).max(start);
                self.transition(RangeSelection::Range { start, end }, coordinator)
            }
        }
    }

    /// Move either thumb.
    pub fn drag(
        &mut self,
        thumb: Thumb,
        index: usize,
        coordinator: &mut CrossFilterCoordinator,
    ) -> Result<RangeSelection, RangeError> {
        match thumb {
            Thumb::Start => self.drag_start(index, coordinator),
            Thumb::End => self.drag_end(index, coordinator),
        }
    }

    /// Span every month without pushing a window. Used when the caller
    /// resets the coordinator to the whole dataset itself.
    pub(crate) fn select_all_months(&mut self) -> RangeSelection {
        self.selection = collapse(RangeSelection::Range {
            start: 0,
            end: self.last_index(),
        });
        self.selection
    }

    /// Normalize `next`, push its window if it differs from the current one,
    /// then commit it.
    fn transition(
        &mut self,
        next: RangeSelection,
        coordinator: &mut CrossFilterCoordinator,
    ) -> Result<RangeSelection, RangeError> {
        let next = collapse(next);
        if next == self.selection {
            return Ok(next);
        }

        let window = self.window_of(next);
        coordinator.apply_time_range(window.start, window.end)?;
        debug!(from = ?self.selection, to = ?next, "Range selection changed");
        self.selection = next;
        Ok(next)
    }

    fn window_of(&self, selection: RangeSelection) -> TimeRange {
        let (start, end) = selection.bounds();
        TimeRange::months(self.month(start), self.month(end))
    }

    fn month(&self, index: usize) -> MonthAnchor {
        // `months` is non-empty by construction and indices are clamped.
        let index = self.clamp(index);
        self.months
            .get(index)
            .or_else(|| self.months.last())
            .copied()
            .unwrap_or_else(|| MonthAnchor::containing(chrono::DateTime::UNIX_EPOCH))
    }

    fn clamp(&self, index: usize) -> usize {
        index.min(self.last_index())
    }
}

/// A range whose thumbs meet is a single month.
const fn collapse(selection: RangeSelection) -> RangeSelection {
    match selection {
        RangeSelection::Range { start, end } if start >= end => {
            RangeSelection::Single { index: start }
        }
        other => other,
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::store::EventStore;
    use crate::testing::{event_at, month};

    /// One event in each of `count` consecutive months starting January 2020.
    fn fixture(count: u32) -> (RangeSelector, CrossFilterCoordinator) {
        let events = (0..count)
            .map(|i| {
                let anchor = month(2020 + i32::try_from(i / 12).unwrap(), i % 12 + 1);
                event_at(&format!("e{i}"), &anchor.start().to_rfc3339(), 4.0, 10.0)
            })
            .collect();
        let store = Arc::new(EventStore::new(events));
        let selector = RangeSelector::new(store.months_index().to_vec()).unwrap();
        let mut coordinator = CrossFilterCoordinator::new(store);
        selector.apply_current(&mut coordinator).unwrap();
        (selector, coordinator)
    }

    fn single(index: usize) -> RangeSelection {
        RangeSelection::Single { index }
    }

    fn range(start: usize, end: usize) -> RangeSelection {
        RangeSelection::Range { start, end }
    }

    #[test]
    fn empty_month_list_is_rejected() {
        assert_eq!(RangeSelector::new(Vec::new()), Err(RangeError::NoMonths));
    }

    #[test]
    fn starts_on_most_recent_month() {
        let (selector, coordinator) = fixture(6);
        assert_eq!(selector.selection(), single(5));
        assert_eq!(selector.view().start_label, "2020-06");
        assert_eq!(coordinator.filter_state().time_range(), selector.window());
    }

    #[test]
    fn pick_pushes_whole_month_window() {
        let (mut selector, mut coordinator) = fixture(6);
        selector.pick(2, &mut coordinator).unwrap();
        let window = coordinator.filter_state().time_range();
        assert_eq!(window.start.to_rfc3339(), "2020-03-01T00:00:00+00:00");
        assert_eq!(window.end.to_rfc3339(), "2020-03-31T23:59:59.999+00:00");
        assert_eq!(coordinator.snapshot().filtered_events.len(), 1);
    }

    #[test]
    fn expand_seeds_plus_minus_one_and_clamps() {
        let (mut selector, mut coordinator) = fixture(6);
        selector.pick(3, &mut coordinator).unwrap();
        assert_eq!(selector.expand(&mut coordinator).unwrap(), range(2, 4));

        selector.pick(0, &mut coordinator).unwrap();
        assert_eq!(selector.expand(&mut coordinator).unwrap(), range(0, 1));

        selector.pick(5, &mut coordinator).unwrap();
        assert_eq!(selector.expand(&mut coordinator).unwrap(), range(4, 5));
        // Expanding again changes nothing.
        assert_eq!(selector.expand(&mut coordinator).unwrap(), range(4, 5));
    }

    #[test]
    fn expand_on_single_month_dataset_stays_single() {
        let (mut selector, mut coordinator) = fixture(1);
        assert_eq!(selector.expand(&mut coordinator).unwrap(), single(0));
    }

    #[test]
    fn thumbs_cannot_cross() {
        let (mut selector, mut coordinator) = fixture(10);
        selector.pick(5, &mut coordinator).unwrap();
        selector.expand(&mut coordinator).unwrap();
        selector.drag_end(8, &mut coordinator).unwrap();
        assert_eq!(selector.selection(), range(4, 8));

        // Start thumb dragged past the end thumb stops on it and collapses.
        assert_eq!(selector.drag_start(9, &mut coordinator).unwrap(), single(8));
    }

    #[test]
    fn out_of_bounds_indices_are_clamped() {
        let (mut selector, mut coordinator) = fixture(4);
        assert_eq!(selector.pick(99, &mut coordinator).unwrap(), single(3));
        selector.pick(1, &mut coordinator).unwrap();
        selector.expand(&mut coordinator).unwrap();
        assert_eq!(
            selector.drag(Thumb::End, usize::MAX, &mut coordinator).unwrap(),
            range(0, 3)
        );
        assert_eq!(selector.view().end_label, "2020-04");
    }

    #[test]
    fn start_never_exceeds_end_under_arbitrary_drags() {
        let (mut selector, mut coordinator) = fixture(7);
        selector.pick(3, &mut coordinator).unwrap();
        selector.expand(&mut coordinator).unwrap();

        let drags = [
            (Thumb::Start, 6),
            (Thumb::End, 0),
            (Thumb::End, 100),
            (Thumb::Start, 0),
            (Thumb::End, 2),
            (Thumb::Start, 50),
            (Thumb::End, 4),
        ];
        for (thumb, index) in drags {
            let selection = selector.drag(thumb, index, &mut coordinator).unwrap();
            let (start, end) = selection.bounds();
            assert!(start <= end);
            assert!(end <= selector.last_index());
            if let RangeSelection::Range { start, end } = selection {
                assert!(start < end);
            }
        }
    }

    #[test]
    fn collapse_law_publishes_single_exactly_once() {
        let (mut selector, mut coordinator) = fixture(8);
        selector.pick(6, &mut coordinator).unwrap();
        selector.expand(&mut coordinator).unwrap();
        selector.drag_start(2, &mut coordinator).unwrap();
        assert_eq!(selector.selection(), range(2, 7));

        let windows = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&windows);
        coordinator.subscribe(move |snapshot| {
            sink.lock().unwrap().push(snapshot.summary.time_range);
        });

        let mut observed = Vec::new();
        for index in [6, 5, 4, 3, 2, 2] {
            observed.push(selector.drag_end(index, &mut coordinator).unwrap());
        }

        assert!(observed.iter().all(|s| *s != range(2, 2)));
        assert_eq!(
            observed,
            vec![range(2, 6), range(2, 5), range(2, 4), range(2, 3), single(2), single(2)]
        );
        assert_eq!(selector.selection(), single(2));

        // 6, 5, 4, 3 then the collapse to 2; repeated drags at 2 publish nothing.
        let published = windows.lock().unwrap().clone();
        assert_eq!(published.len(), 5);
        let single_window = TimeRange::months(month(2020, 3), month(2020, 3));
        assert_eq!(published.iter().filter(|w| **w == single_window).count(), 1);
        assert_eq!(published.last(), Some(&single_window));
    }

    #[test]
    fn repicking_the_same_month_does_not_recompute() {
        let (mut selector, mut coordinator) = fixture(3);
        let count = Arc::new(Mutex::new(0_usize));
        let sink = Arc::clone(&count);
        coordinator.subscribe(move |_| *sink.lock().unwrap() += 1);

        selector.pick(1, &mut coordinator).unwrap();
        selector.pick(1, &mut coordinator).unwrap();
        assert_eq!(*count.lock().unwrap(), 1);
    }

    #[test]
    fn range_window_spans_whole_end_month() {
        let (mut selector, mut coordinator) = fixture(3);
        selector.pick(1, &mut coordinator).unwrap();
        selector.expand(&mut coordinator).unwrap();
        let window = selector.window();
        assert_eq!(window.start.to_rfc3339(), "2020-01-01T00:00:00+00:00");
        assert_eq!(window.end.to_rfc3339(), "2020-03-31T23:59:59.999+00:00");
        assert_eq!(coordinator.snapshot().filtered_events.len(), 3);
    }
}
