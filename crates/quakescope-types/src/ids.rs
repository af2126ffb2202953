//! Identifier wrappers.
//!
//! Event identifiers come from the upstream seismic catalog and are opaque
//! strings (e.g. `us7000abcd`). Subscription identifiers are generated
//! locally with UUID v7 so handles sort in registration order.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Catalog identifier of a seismic event.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct EventId(pub String);

impl EventId {
    /// Wrap a catalog identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl core::fmt::Display for EventId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EventId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Handle returned by a snapshot subscription, used to unsubscribe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubscriptionId(pub Uuid);

impl SubscriptionId {
    /// Create a new identifier using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for SubscriptionId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn subscription_ids_are_unique() {
        let a = SubscriptionId::new();
        let b = SubscriptionId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn event_id_serializes_as_plain_string() {
        let id = EventId::from("us7000abcd");
        let json = serde_json::to_string(&id).unwrap_or_default();
        assert_eq!(json, "\"us7000abcd\"");
        assert_eq!(id.to_string(), "us7000abcd");
    }

    #[test]
    fn event_id_accepts_owned_and_borrowed_strings() {
        let owned = EventId::new(String::from("ci40123456"));
        assert_eq!(owned, EventId::new("ci40123456"));
        assert_eq!(owned.as_str(), "ci40123456");
    }
}
