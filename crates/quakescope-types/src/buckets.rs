//! Fixed magnitude and depth buckets.
//!
//! Both bucket families are closed sets with a fixed display order. Labels
//! are the exact strings shown on the histogram axes and sent over the wire.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Magnitude bucket, each a half-open interval `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum MagnitudeBucket {
    /// `[3, 4)`
    #[serde(rename = "3.0–3.9")]
    M3,
    /// `[4, 5)`
    #[serde(rename = "4.0–4.9")]
    M4,
    /// `[5, 6)`
    #[serde(rename = "5.0–5.9")]
    M5,
    /// `[6, 7)`
    #[serde(rename = "6.0–6.9")]
    M6,
    /// `[7, 8)`
    #[serde(rename = "7.0–7.9")]
    M7,
    /// `[8, ∞)`
    #[serde(rename = "8.0+")]
    M8Plus,
}

impl MagnitudeBucket {
    /// All buckets in display order.
    pub const ALL: [Self; 6] = [Self::M3, Self::M4, Self::M5, Self::M6, Self::M7, Self::M8Plus];

    /// Axis label for this bucket.
    pub const fn label(self) -> &'static str {
        match self {
            Self::M3 => "3.0–3.9",
            Self::M4 => "4.0–4.9",
            Self::M5 => "5.0–5.9",
            Self::M6 => "6.0–6.9",
            Self::M7 => "7.0–7.9",
            Self::M8Plus => "8.0+",
        }
    }

    /// Look up a bucket by its axis label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.label() == label)
    }
}

/// Depth bucket in kilometers, each a half-open interval `[lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum DepthBucket {
    /// `[0, 10)` km
    #[serde(rename = "0–10km")]
    Shallow,
    /// `[10, 30)` km
    #[serde(rename = "10–30km")]
    Upper,
    /// `[30, 70)` km
    #[serde(rename = "30–70km")]
    Middle,
    /// `[70, 300)` km
    #[serde(rename = "70–300km")]
    Intermediate,
    /// `[300, ∞)` km
    #[serde(rename = "300km+")]
    Deep,
}

impl DepthBucket {
    /// All buckets in display order.
    pub const ALL: [Self; 5] = [
        Self::Shallow,
        Self::Upper,
        Self::Middle,
        Self::Intermediate,
        Self::Deep,
    ];

    /// Axis label for this bucket.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Shallow => "0–10km",
            Self::Upper => "10–30km",
            Self::Middle => "30–70km",
            Self::Intermediate => "70–300km",
            Self::Deep => "300km+",
        }
    }

    /// Look up a bucket by its axis label.
    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|bucket| bucket.label() == label)
    }
}

/// The two categorical predicates a bucket toggle can target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum BucketCategory {
    /// Magnitude histogram buckets.
    Magnitude,
    /// Depth histogram buckets.
    Depth,
}

impl core::fmt::Display for BucketCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Magnitude => f.write_str("magnitude"),
            Self::Depth => f.write_str("depth"),
        }
    }
}
