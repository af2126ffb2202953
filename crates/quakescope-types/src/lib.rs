//! Shared type definitions for the Quakescope seismic explorer.
//!
//! This crate is the single source of truth for the data exchanged between
//! the coordination core and its rendering collaborators. Types defined here
//! flow downstream to `TypeScript` via `ts-rs` for the dashboard front end.
//!
//! # Modules
//!
//! - [`ids`] -- Identifier wrappers for events and subscriptions
//! - [`event`] -- Seismic events and geographic primitives
//! - [`buckets`] -- Fixed magnitude and depth buckets
//! - [`time`] -- Calendar-month anchors, time windows, and granularity
//! - [`snapshot`] -- Aggregate snapshots published after every recompute
//! - [`selection`] -- Range selector and playback state exposed to widgets

pub mod buckets;
pub mod event;
pub mod ids;
pub mod selection;
pub mod snapshot;
pub mod time;

// Re-export all public types at crate root for convenience.
pub use buckets::{BucketCategory, DepthBucket, MagnitudeBucket};
pub use event::{BoundingBox, CameraView, Event, GeoPoint};
pub use ids::{EventId, SubscriptionId};
pub use selection::{PlaybackStatus, RangeSelection, RangeView, Thumb};
pub use snapshot::{AggregateSnapshot, BucketCount, PeriodCount, SnapshotSummary};
pub use time::{Granularity, MonthAnchor, TimeRange};

#[cfg(test)]
mod tests {
    //! `TypeScript` binding generation for the dashboard.

    #[test]
    fn export_bindings() {
        // The files are written to the `bindings/` directory relative to
        // the crate root.
        use ts_rs::TS;

        let _ = crate::ids::EventId::export_all();
        let _ = crate::event::Event::export_all();
        let _ = crate::event::BoundingBox::export_all();
        let _ = crate::event::CameraView::export_all();
        let _ = crate::buckets::MagnitudeBucket::export_all();
        let _ = crate::buckets::DepthBucket::export_all();
        let _ = crate::buckets::BucketCategory::export_all();
        let _ = crate::time::Granularity::export_all();
        let _ = crate::time::TimeRange::export_all();
        let _ = crate::snapshot::AggregateSnapshot::export_all();
        let _ = crate::selection::RangeView::export_all();
        let _ = crate::selection::PlaybackStatus::export_all();
        let _ = crate::selection::Thumb::export_all();
    }
}
