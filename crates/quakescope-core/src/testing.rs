//! Fixtures shared by the unit tests.

#![allow(clippy::unwrap_used)]

use chrono::{DateTime, Utc};
use quakescope_types::{Event, EventId, MonthAnchor};

/// Parse an RFC 3339 timestamp.
pub fn timestamp(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc)
}

/// Month anchor for `year`/`month`.
pub fn month(year: i32, month: u32) -> MonthAnchor {
    MonthAnchor::from_ymd(year, month).unwrap()
}

/// An event at the origin with the given time, magnitude, and depth.
pub fn event_at(id: &str, rfc3339: &str, magnitude: f64, depth_km: f64) -> Event {
    located_event(id, rfc3339, magnitude, depth_km, 0.0, 0.0)
}

/// An event with every field given.
pub fn located_event(
    id: &str,
    rfc3339: &str,
    magnitude: f64,
    depth_km: f64,
    latitude: f64,
    longitude: f64,
) -> Event {
    Event {
        id: EventId::from(id),
        timestamp: timestamp(rfc3339),
        latitude,
        longitude,
        depth_km,
        magnitude,
    }
}

/// Three events in January 2020 and five in March 2020.
pub fn jan_mar_2020() -> Vec<Event> {
    vec![
        event_at("j1", "2020-01-03T04:00:00Z", 3.2, 5.0),
        event_at("j2", "2020-01-15T10:30:00Z", 4.6, 35.0),
        event_at("j3", "2020-01-31T23:30:00Z", 5.4, 320.0),
        event_at("m1", "2020-03-01T00:00:00Z", 5.0, 301.0),
        event_at("m2", "2020-03-09T08:00:00Z", 6.1, 12.0),
        event_at("m3", "2020-03-17T16:00:00Z", 5.9, 650.0),
        event_at("m4", "2020-03-22T02:00:00Z", 7.3, 80.0),
        event_at("m5", "2020-03-31T22:45:00Z", 2.5, 8.0),
    ]
}
