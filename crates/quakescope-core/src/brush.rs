//! Spatial brush lifecycle.
//!
//! Arming the brush records a baseline: the coordinator's snapshot and the
//! map camera at that moment. A drag then defines a bounding box from its
//! origin to the pointer; committing it applies the box as the spatial
//! predicate. Resetting clears the predicate and hands the baseline back so
//! the map can return to exactly the pre-brush view instead of the
//! unfiltered dataset.
//!
//! Preview rectangles are drawn by the map collaborator from the box
//! returned by [`SpatialBrush::update_drag`].

use std::sync::Arc;

use quakescope_types::{AggregateSnapshot, BoundingBox, CameraView, GeoPoint};
use tracing::debug;

use crate::coordinator::CrossFilterCoordinator;

/// Errors raised by out-of-order brush gestures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BrushError {
    /// A drag began before brush mode was armed.
    #[error("brush mode is not armed")]
    NotArmed,

    /// A drag update or commit arrived without a drag in progress.
    #[error("no brush drag in progress")]
    NotDragging,
}

/// State captured when brush mode is armed.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushBaseline {
    /// Snapshot published before any brushing.
    pub snapshot: Arc<AggregateSnapshot>,
    /// Map camera before any brushing.
    pub camera: CameraView,
}

#[derive(Debug, Clone, Default, PartialEq)]
enum BrushPhase {
    #[default]
    Disarmed,
    Armed {
        baseline: BrushBaseline,
    },
    Dragging {
        baseline: BrushBaseline,
        origin: GeoPoint,
    },
}

/// Pointer-driven bounding-box gesture.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpatialBrush {
    phase: BrushPhase,
}

impl SpatialBrush {
    /// A disarmed brush.
    pub const fn new() -> Self {
        Self {
            phase: BrushPhase::Disarmed,
        }
    }

    /// Whether brush mode is armed (including while dragging).
    pub const fn is_armed(&self) -> bool {
        !matches!(self.phase, BrushPhase::Disarmed)
    }

    /// Whether a drag is in progress.
    pub const fn is_dragging(&self) -> bool {
        matches!(self.phase, BrushPhase::Dragging { .. })
    }

    /// The recorded baseline, if armed.
    pub const fn baseline(&self) -> Option<&BrushBaseline> {
        match &self.phase {
            BrushPhase::Disarmed => None,
            BrushPhase::Armed { baseline } | BrushPhase::Dragging { baseline, .. } => Some(baseline),
        }
    }

    /// Enter brush mode, recording the current snapshot and `camera`.
    ///
    /// Arming an already armed brush keeps the first baseline.
    pub fn arm(&mut self, coordinator: &CrossFilterCoordinator, camera: CameraView) {
        if self.is_armed() {
            return;
        }
        let baseline = BrushBaseline {
            snapshot: coordinator.snapshot(),
            camera,
        };
        debug!(
            filtered = baseline.snapshot.filtered_events.len(),
            zoom = camera.zoom,
            "Brush mode armed"
        );
        self.phase = BrushPhase::Armed { baseline };
    }

    /// Start a drag at `origin`. Restarting while dragging moves the origin.
    ///
    /// # Errors
    ///
    /// Returns [`BrushError::NotArmed`] if brush mode is not armed.
    pub fn begin_drag(&mut self, origin: GeoPoint) -> Result<(), BrushError> {
        let baseline = self.baseline().cloned().ok_or(BrushError::NotArmed)?;
        self.phase = BrushPhase::Dragging { baseline, origin };
        Ok(())
    }

    /// Preview box from the drag origin to `current`.
    ///
    /// # Errors
    ///
    /// Returns [`BrushError::NotDragging`] without a drag in progress.
    pub fn update_drag(&self, current: GeoPoint) -> Result<BoundingBox, BrushError> {
        match &self.phase {
            BrushPhase::Dragging { origin, .. } => Ok(BoundingBox::from_corners(*origin, current)),
            _ => Err(BrushError::NotDragging),
        }
    }

    /// Finish the drag at `current` and apply its box as the spatial
    /// predicate. The brush stays armed with the same baseline.
    ///
    /// # Errors
    ///
    /// Returns [`BrushError::NotDragging`] without a drag in progress.
    pub fn commit_drag(
        &mut self,
        current: GeoPoint,
        coordinator: &mut CrossFilterCoordinator,
    ) -> Result<BoundingBox, BrushError> {
        let bounds = self.update_drag(current)?;
        if let BrushPhase::Dragging { baseline, .. } = std::mem::take(&mut self.phase) {
            self.phase = BrushPhase::Armed { baseline };
        }
        coordinator.apply_spatial_bounds(bounds);
        debug!(?bounds, "Brush committed");
        Ok(bounds)
    }

    /// Abandon a drag without touching the predicate.
    pub fn cancel_drag(&mut self) {
        if let BrushPhase::Dragging { baseline, .. } = &self.phase {
            let baseline = baseline.clone();
            self.phase = BrushPhase::Armed { baseline };
        }
    }

    /// Clear the spatial predicate, disarm, and return the baseline so the
    /// caller can restore the pre-brush camera.
    pub fn reset(&mut self, coordinator: &mut CrossFilterCoordinator) -> Option<BrushBaseline> {
        coordinator.clear_spatial_bounds();
        let baseline = match std::mem::take(&mut self.phase) {
            BrushPhase::Disarmed => None,
            BrushPhase::Armed { baseline } | BrushPhase::Dragging { baseline, .. } => Some(baseline),
        };
        debug!(restored = baseline.is_some(), "Brush reset");
        baseline
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::store::EventStore;
    use crate::testing::located_event;
    use quakescope_types::MagnitudeBucket;

    fn coordinator() -> CrossFilterCoordinator {
        CrossFilterCoordinator::new(Arc::new(EventStore::new(vec![
            located_event("tokyo", "2020-01-01T00:00:00Z", 5.0, 10.0, 35.6, 139.7),
            located_event("osaka", "2020-01-02T00:00:00Z", 6.0, 10.0, 34.7, 135.5),
            located_event("santiago", "2020-01-03T00:00:00Z", 5.0, 10.0, -33.4, -70.6),
        ])))
    }

    fn camera() -> CameraView {
        CameraView {
            center: GeoPoint::new(20.0, 140.0),
            zoom: 3.0,
        }
    }

    #[test]
    fn drag_requires_armed_brush() {
        let mut brush = SpatialBrush::new();
        assert_eq!(brush.begin_drag(GeoPoint::new(0.0, 0.0)), Err(BrushError::NotArmed));
        assert_eq!(brush.update_drag(GeoPoint::new(0.0, 0.0)), Err(BrushError::NotDragging));
    }

    #[test]
    fn commit_applies_bounds_from_both_corners() {
        let mut coord = coordinator();
        let mut brush = SpatialBrush::new();
        brush.arm(&coord, camera());
        brush.begin_drag(GeoPoint::new(36.0, 140.0)).unwrap();

        let preview = brush.update_drag(GeoPoint::new(34.0, 134.0)).unwrap();
        assert_eq!(preview.south, 34.0);
        assert_eq!(preview.east, 140.0);
        // Previews never touch the predicate.
        assert_eq!(coord.snapshot().filtered_events.len(), 3);

        let bounds = brush.commit_drag(GeoPoint::new(34.0, 134.0), &mut coord).unwrap();
        assert_eq!(coord.filter_state().spatial_bounds(), Some(bounds));
        assert_eq!(coord.snapshot().filtered_events.len(), 2);
        assert!(brush.is_armed());
        assert!(!brush.is_dragging());
    }

    #[test]
    fn commit_without_drag_is_rejected() {
        let mut coord = coordinator();
        let mut brush = SpatialBrush::new();
        brush.arm(&coord, camera());
        let result = brush.commit_drag(GeoPoint::new(0.0, 0.0), &mut coord);
        assert_eq!(result, Err(BrushError::NotDragging));
        assert_eq!(coord.filter_state().spatial_bounds(), None);
    }

    #[test]
    fn reset_restores_pre_brush_state_not_unfiltered_dataset() {
        let mut coord = coordinator();
        coord.toggle_magnitude_bucket(MagnitudeBucket::M5);
        let pre_brush = coord.snapshot();
        assert_eq!(pre_brush.filtered_events.len(), 2);

        let mut brush = SpatialBrush::new();
        brush.arm(&coord, camera());
        brush.begin_drag(GeoPoint::new(30.0, 130.0)).unwrap();
        brush.commit_drag(GeoPoint::new(40.0, 145.0), &mut coord).unwrap();
        assert_eq!(coord.snapshot().filtered_events.len(), 1);

        // Re-arming mid-session keeps the first baseline.
        brush.arm(
            &coord,
            CameraView {
                center: GeoPoint::new(35.0, 139.0),
                zoom: 9.0,
            },
        );

        let baseline = brush.reset(&mut coord).unwrap();
        assert_eq!(baseline.camera, camera());
        assert!(Arc::ptr_eq(&baseline.snapshot, &pre_brush));
        assert_eq!(coord.filter_state().spatial_bounds(), None);
        assert_eq!(*coord.snapshot(), *pre_brush);
        assert!(!brush.is_armed());
    }

    #[test]
    fn reset_without_arming_still_clears_bounds() {
        let mut coord = coordinator();
        coord.apply_spatial_bounds(BoundingBox::from_corners(
            GeoPoint::new(0.0, 0.0),
            GeoPoint::new(1.0, 1.0),
        ));
        let mut brush = SpatialBrush::new();
        assert!(brush.reset(&mut coord).is_none());
        assert_eq!(coord.snapshot().filtered_events.len(), 3);
    }

    #[test]
    fn cancel_drag_returns_to_armed() {
        let coord = coordinator();
        let mut brush = SpatialBrush::new();
        brush.arm(&coord, camera());
        brush.begin_drag(GeoPoint::new(1.0, 1.0)).unwrap();
        brush.cancel_drag();
        assert!(brush.is_armed());
        assert!(!brush.is_dragging());
        assert_eq!(coord.filter_state().spatial_bounds(), None);
    }
}
