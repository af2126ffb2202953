//! Seismic events and the geographic primitives used by the map view.
//!
//! Coordinates are already in geographic degrees when they reach this
//! crate; projection to and from screen space belongs to the map
//! collaborator.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::ids::EventId;

/// A single seismic event as delivered by the ingestion collaborator.
///
/// Immutable once loaded. Numeric fields may be non-finite when the source
/// record was malformed; such events are still listed and mapped, but never
/// counted in the bucketed histograms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Event {
    /// Catalog identifier.
    pub id: EventId,
    /// Origin time (UTC).
    pub timestamp: DateTime<Utc>,
    /// Latitude in degrees, north positive.
    pub latitude: f64,
    /// Longitude in degrees, east positive.
    pub longitude: f64,
    /// Hypocenter depth in kilometers.
    pub depth_km: f64,
    /// Event magnitude.
    pub magnitude: f64,
}

impl Event {
    /// Epicenter as a geographic point.
    pub const fn location(&self) -> GeoPoint {
        GeoPoint {
            lat: self.latitude,
            lon: self.longitude,
        }
    }

    /// Whether every numeric field is finite.
    ///
    /// Only such events participate in the magnitude, depth, and temporal
    /// histograms.
    pub fn has_finite_fields(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.depth_km.is_finite()
            && self.magnitude.is_finite()
    }
}

/// A geographic point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct GeoPoint {
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a point from latitude and longitude.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// An axis-aligned geographic bounding box, inclusive on every edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct BoundingBox {
    /// Southern edge (minimum latitude).
    pub south: f64,
    /// Western edge (minimum longitude).
    pub west: f64,
    /// Northern edge (maximum latitude).
    pub north: f64,
    /// Eastern edge (maximum longitude).
    pub east: f64,
}

impl BoundingBox {
    /// Smallest box spanning two opposite corners given in any order.
    pub fn from_corners(a: GeoPoint, b: GeoPoint) -> Self {
        Self {
            south: a.lat.min(b.lat),
            west: a.lon.min(b.lon),
            north: a.lat.max(b.lat),
            east: a.lon.max(b.lon),
        }
    }

    /// Whether `point` lies inside the box. Non-finite points never do.
    pub fn contains(&self, point: GeoPoint) -> bool {
        point.lat >= self.south
            && point.lat <= self.north
            && point.lon >= self.west
            && point.lon <= self.east
    }
}

/// Map camera position reported by the map collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct CameraView {
    /// Center of the viewport.
    pub center: GeoPoint,
    /// Tile zoom level.
    pub zoom: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn corners_in_any_order_give_same_box() {
        let a = GeoPoint::new(10.0, -20.0);
        let b = GeoPoint::new(-5.0, 30.0);
        assert_eq!(BoundingBox::from_corners(a, b), BoundingBox::from_corners(b, a));

        let bbox = BoundingBox::from_corners(a, b);
        assert!(bbox.contains(GeoPoint::new(0.0, 0.0)));
        assert!(bbox.contains(GeoPoint::new(10.0, 30.0)));
        assert!(!bbox.contains(GeoPoint::new(11.0, 0.0)));
    }

    #[test]
    fn nan_point_is_never_inside() {
        let bbox = BoundingBox::from_corners(GeoPoint::new(-90.0, -180.0), GeoPoint::new(90.0, 180.0));
        assert!(!bbox.contains(GeoPoint::new(f64::NAN, 0.0)));
    }
}
