//! Range selector and playback state exposed to the slider and the
//! animate/stop button.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Which month indices the range slider currently selects.
///
/// A `Range` always has `start < end`; an equal pair is represented as
/// `Single`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RangeSelection {
    /// One month selected.
    Single {
        /// Index into the month list.
        index: usize,
    },
    /// An inclusive span of months.
    Range {
        /// First selected month index.
        start: usize,
        /// Last selected month index.
        end: usize,
    },
}

impl RangeSelection {
    /// The selected indices as an inclusive `(start, end)` pair.
    pub const fn bounds(self) -> (usize, usize) {
        match self {
            Self::Single { index } => (index, index),
            Self::Range { start, end } => (start, end),
        }
    }

    /// Whether the dual-thumb mode is active.
    pub const fn is_range(self) -> bool {
        matches!(self, Self::Range { .. })
    }
}

/// The two thumbs of the dual-thumb slider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
#[serde(rename_all = "snake_case")]
pub enum Thumb {
    /// The thumb bounding the window from below.
    Start,
    /// The thumb bounding the window from above.
    End,
}

/// Selection plus the month labels the slider widgets display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct RangeView {
    /// Current selection.
    pub selection: RangeSelection,
    /// `YYYY-MM` label of the first selected month.
    pub start_label: String,
    /// `YYYY-MM` label of the last selected month.
    pub end_label: String,
}

/// State shown by the animate/stop button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct PlaybackStatus {
    /// Whether the playback loop is running.
    pub is_playing: bool,
    /// Month index last shown by playback, kept after stopping.
    pub current_index: Option<usize>,
    /// Interval between ticks in milliseconds.
    pub tick_interval_ms: u64,
}
