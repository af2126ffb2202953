//! Cross-filter coordination core for the Quakescope seismic explorer.
//!
//! Every interactive view (map, histograms, time series, summary) reads one
//! shared, consistent [`AggregateSnapshot`]. Gestures mutate a single filter
//! predicate through the [`CrossFilterCoordinator`], which recomputes the
//! filtered set and every aggregate before any subscriber is notified.
//!
//! # Modules
//!
//! - [`store`] -- Immutable event dataset and its calendar-month index.
//! - [`aggregate`] -- Bucket classification and histogram construction.
//! - [`filter`] -- The composable filter predicate.
//! - [`coordinator`] -- Predicate owner, snapshot recompute, and publish.
//! - [`range`] -- Single and dual-thumb month slider state machine.
//! - [`brush`] -- Spatial bounding-box brush with pre-brush baseline.
//! - [`explorer`] -- Gesture facade shared between UI and playback.
//! - [`playback`] -- Timed month-by-month playback.
//! - [`config`] -- YAML configuration.
//! - [`telemetry`] -- `tracing` subscriber setup.
//!
//! [`AggregateSnapshot`]: quakescope_types::AggregateSnapshot
//! [`CrossFilterCoordinator`]: coordinator::CrossFilterCoordinator

pub mod aggregate;
pub mod brush;
pub mod config;
pub mod coordinator;
pub mod explorer;
pub mod filter;
pub mod playback;
pub mod range;
pub mod store;
pub mod telemetry;

#[cfg(test)]
mod testing;

pub use brush::{BrushBaseline, BrushError, SpatialBrush};
pub use config::{ConfigError, ExplorerConfig, LoggingConfig, PlaybackConfig};
pub use coordinator::{CrossFilterCoordinator, Listener, broadcast_listener, compute_snapshot};
pub use explorer::{Explorer, SharedExplorer};
pub use filter::{FilterError, FilterState};
pub use playback::{PlaybackError, PlaybackScheduler, PlaybackState, TickOutcome};
pub use range::{RangeError, RangeSelector};
pub use store::EventStore;
pub use telemetry::{TelemetryError, init_tracing};
