//! Gesture facade over the coordination core.
//!
//! [`Explorer`] bundles the coordinator with the components that drive it
//! (range selector, spatial brush, playback state) and exposes the discrete
//! gesture calls the UI collaborators make. The explorer is shared as a
//! [`SharedExplorer`]; every gesture and every playback tick holds the lock
//! for its whole mutate, recompute, and publish cycle, so concurrent callers
//! are serialized and subscribers never see an intermediate state.

use std::sync::{Arc, Mutex};

use quakescope_types::{
    AggregateSnapshot, BoundingBox, BucketCategory, CameraView, GeoPoint, PlaybackStatus,
    RangeSelection, RangeView, SubscriptionId, Thumb,
};
use tracing::{info, warn};

use crate::brush::{BrushBaseline, BrushError, SpatialBrush};
use crate::config::PlaybackConfig;
use crate::coordinator::CrossFilterCoordinator;
use crate::filter::FilterError;
use crate::playback::{PlaybackError, PlaybackState, TickOutcome};
use crate::range::{RangeError, RangeSelector};
use crate::store::EventStore;

/// An explorer shared between UI gesture handlers and the playback timer.
pub type SharedExplorer = Arc<Mutex<Explorer>>;

/// Coordinator plus the components that mutate it.
#[derive(Debug)]
pub struct Explorer {
    /// Owns the predicate and publishes snapshots.
    coordinator: CrossFilterCoordinator,
    /// Month slider; `None` when the dataset has no events.
    range: Option<RangeSelector>,
    /// Map brush.
    brush: SpatialBrush,
    /// Playback loop state.
    playback: PlaybackState,
    /// Month index last shown by playback, kept after it stops.
    playback_position: Option<usize>,
    /// Incremented whenever a playback timer is started or cancelled, so a
    /// tick from a superseded timer is ignored.
    playback_generation: u64,
    /// Interval used by the next start, and by a running loop.
    playback_interval_ms: u64,
}

impl Explorer {
    /// Build an explorer over `store`, selecting the most recent month.
    ///
    /// An empty store yields an explorer without a month slider; range
    /// gestures and playback then fail with `NoMonths`.
    pub fn new(store: Arc<EventStore>, playback: &PlaybackConfig) -> Result<Self, RangeError> {
        let mut coordinator = CrossFilterCoordinator::new(Arc::clone(&store));
        let range = match RangeSelector::new(store.months_index().to_vec()) {
            Ok(selector) => {
                selector.apply_current(&mut coordinator)?;
                Some(selector)
            }
            Err(RangeError::NoMonths) => {
                warn!("Dataset has no events; month slider disabled");
                None
            }
            Err(err) => return Err(err),
        };

        info!(
            events = store.len(),
            months = store.months_index().len(),
            "Explorer initialized"
        );

        Ok(Self {
            coordinator,
            range,
            brush: SpatialBrush::new(),
            playback: PlaybackState::Idle,
            playback_position: None,
            playback_generation: 0,
            playback_interval_ms: playback.tick_interval_ms,
        })
    }

    /// Wrap the explorer for sharing with a playback scheduler.
    pub fn into_shared(self) -> SharedExplorer {
        Arc::new(Mutex::new(self))
    }

    /// The coordinator, for read-only queries.
    pub const fn coordinator(&self) -> &CrossFilterCoordinator {
        &self.coordinator
    }

    /// The most recently published snapshot.
    pub fn snapshot(&self) -> Arc<AggregateSnapshot> {
        self.coordinator.snapshot()
    }

    /// Register a snapshot listener.
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: FnMut(&Arc<AggregateSnapshot>) + Send + 'static,
    {
        self.coordinator.subscribe(listener)
    }

    /// Remove a snapshot listener.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        self.coordinator.unsubscribe(id)
    }

    // -----------------------------------------------------------------------
    // Month slider
    // -----------------------------------------------------------------------

    /// Current slider selection.
    pub fn range_selection(&self) -> Option<RangeSelection> {
        self.range.as_ref().map(RangeSelector::selection)
    }

    /// Slider selection with its month labels.
    pub fn range_view(&self) -> Option<RangeView> {
        self.range.as_ref().map(RangeSelector::view)
    }

    /// Select a single month.
    pub fn pick_month(&mut self, index: usize) -> Result<RangeSelection, RangeError> {
        let range = self.range.as_mut().ok_or(RangeError::NoMonths)?;
        range.pick(index, &mut self.coordinator)
    }

    /// Enter dual-thumb mode around the current month.
    pub fn expand_range(&mut self) -> Result<RangeSelection, RangeError> {
        let range = self.range.as_mut().ok_or(RangeError::NoMonths)?;
        range.expand(&mut self.coordinator)
    }

    /// Move one slider thumb.
    pub fn drag_range_thumb(
        &mut self,
        thumb: Thumb,
        index: usize,
    ) -> Result<RangeSelection, RangeError> {
        let range = self.range.as_mut().ok_or(RangeError::NoMonths)?;
        range.drag(thumb, index, &mut self.coordinator)
    }

    // -----------------------------------------------------------------------
    // Histogram buckets
    // -----------------------------------------------------------------------

    /// Toggle a histogram bucket by its axis label.
    pub fn toggle_bucket(
        &mut self,
        category: BucketCategory,
        label: &str,
    ) -> Result<bool, FilterError> {
        self.coordinator.toggle_bucket(category, label)
    }

    /// Clear every bucket selection and the spatial bounds, disarm the
    /// brush, and move the slider to span every month. The coordinator's
    /// window becomes the slider's window in the same recompute.
    ///
    /// # Errors
    ///
    /// Returns [`FilterError::InvalidRange`] if the slider window is
    /// inverted, which month anchors never produce.
    pub fn reset_filters(&mut self) -> Result<(), FilterError> {
        self.brush = SpatialBrush::new();
        match self.range.as_mut() {
            Some(range) => {
                range.select_all_months();
                self.coordinator.reset_filters_to(range.window())
            }
            None => {
                self.coordinator.reset_filters();
                Ok(())
            }
        }
    }

    // -----------------------------------------------------------------------
    // Spatial brush
    // -----------------------------------------------------------------------

    /// Arm brush mode, recording the current snapshot and camera.
    pub fn arm_brush(&mut self, camera: CameraView) {
        self.brush.arm(&self.coordinator, camera);
    }

    /// Start a brush drag.
    pub fn begin_brush(&mut self, origin: GeoPoint) -> Result<(), BrushError> {
        self.brush.begin_drag(origin)
    }

    /// Preview box of the drag in progress.
    pub fn update_brush(&self, current: GeoPoint) -> Result<BoundingBox, BrushError> {
        self.brush.update_drag(current)
    }

    /// Commit the drag as the spatial predicate.
    pub fn commit_brush(&mut self, current: GeoPoint) -> Result<BoundingBox, BrushError> {
        self.brush.commit_drag(current, &mut self.coordinator)
    }

    /// Abandon the drag in progress.
    pub fn cancel_brush(&mut self) {
        self.brush.cancel_drag();
    }

    /// Clear the spatial predicate and return the pre-brush baseline.
    pub fn reset_brush(&mut self) -> Option<BrushBaseline> {
        self.brush.reset(&mut self.coordinator)
    }

    // -----------------------------------------------------------------------
    // Playback
    // -----------------------------------------------------------------------

    /// Current playback state.
    pub const fn playback_state(&self) -> PlaybackState {
        self.playback
    }

    /// Playback state for the animate/stop button.
    pub const fn playback_status(&self) -> PlaybackStatus {
        PlaybackStatus {
            is_playing: matches!(self.playback, PlaybackState::Playing { .. }),
            current_index: self.playback_position,
            tick_interval_ms: self.playback_interval_ms,
        }
    }

    /// Enter `Playing(0)` and show the first month. Returns the generation
    /// and interval the new timer must run with.
    pub(crate) fn start_playback(&mut self) -> Result<(u64, u64), PlaybackError> {
        if matches!(self.playback, PlaybackState::Playing { .. }) {
            return Err(PlaybackError::AlreadyPlaying);
        }
        let range = self.range.as_mut().ok_or(PlaybackError::NoMonths)?;
        range.pick(0, &mut self.coordinator)?;

        self.playback_generation = self.playback_generation.wrapping_add(1);
        self.playback = PlaybackState::Playing {
            current_index: 0,
            tick_interval_ms: self.playback_interval_ms,
        };
        self.playback_position = Some(0);
        info!(
            months = range.months().len(),
            tick_interval_ms = self.playback_interval_ms,
            "Playback started"
        );
        Ok((self.playback_generation, self.playback_interval_ms))
    }

    /// Advance playback by one month if `generation` is still current.
    pub(crate) fn playback_tick(&mut self, generation: u64) -> Result<TickOutcome, PlaybackError> {
        let PlaybackState::Playing {
            current_index,
            tick_interval_ms,
        } = self.playback
        else {
            return Ok(TickOutcome::Stale);
        };
        if generation != self.playback_generation {
            return Ok(TickOutcome::Stale);
        }

        let Some(range) = self.range.as_mut() else {
            self.playback = PlaybackState::Idle;
            return Err(PlaybackError::NoMonths);
        };

        if current_index >= range.last_index() {
            self.playback = PlaybackState::Idle;
            info!(index = current_index, "Playback reached the last month");
            return Ok(TickOutcome::Finished);
        }

        let next = current_index.saturating_add(1);
        if let Err(err) = range.pick(next, &mut self.coordinator) {
            self.playback = PlaybackState::Idle;
            return Err(err.into());
        }
        self.playback = PlaybackState::Playing {
            current_index: next,
            tick_interval_ms,
        };
        self.playback_position = Some(next);
        Ok(TickOutcome::Advanced { index: next })
    }

    /// Return to `Idle`, invalidating any pending tick. Returns whether
    /// playback was running.
    pub(crate) const fn stop_playback(&mut self) -> bool {
        let was_playing = matches!(self.playback, PlaybackState::Playing { .. });
        self.playback = PlaybackState::Idle;
        self.playback_generation = self.playback_generation.wrapping_add(1);
        was_playing
    }

    /// Change the tick interval. While playing, the current index is kept
    /// and a new generation is returned for the replacement timer.
    pub(crate) const fn set_playback_interval(&mut self, interval_ms: u64) -> Option<u64> {
        self.playback_interval_ms = interval_ms;
        match self.playback {
            PlaybackState::Playing { current_index, .. } => {
                self.playback = PlaybackState::Playing {
                    current_index,
                    tick_interval_ms: interval_ms,
                };
                self.playback_generation = self.playback_generation.wrapping_add(1);
                Some(self.playback_generation)
            }
            PlaybackState::Idle => None,
        }
    }
}
