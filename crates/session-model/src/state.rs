//! State groups shared between the transport and the presentation layer.
//!
//! These are plain data: every transition lives in `syncview-transport`.
//! They serialize so a UI can snapshot them, not so they can be persisted.

use serde::{Deserialize, Serialize};

/// Playback state applied uniformly to every registered stream.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TransportState {
    /// Optimistic: set as soon as play requests are dispatched.
    pub is_playing: bool,

    /// Canonical group position in seconds.
    pub current_time: f64,

    /// Last duration reported by the rendering layer, in seconds.
    pub duration: f64,

    /// Optimistic: flipped whether or not the windowing request succeeded.
    pub is_fullscreen: bool,
}

/// In/out point selection on the shared timeline.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrimState {
    pub is_trim_mode: bool,
    pub trim_start: Option<f64>,
    pub trim_end: Option<f64>,
}

/// Where the trim selection protocol currently stands.
///
/// The phase is derived from the mode flag and which marks are set. It is
/// not a separately stored state. Entering trim mode seeds the in-point from
/// the playhead, so a freshly entered selection reports `AwaitingEnd`: the
/// next click places the out-point, or becomes the in-point if it lies
/// before the seeded one. `AwaitingStart` is reported only while trim mode
/// is on and no in-point exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrimPhase {
    /// Trim mode off. Marks may still be present.
    Idle,
    /// Trim mode on, no in-point.
    AwaitingStart,
    /// In-point set (seeded or clicked), waiting for the out-point.
    AwaitingEnd,
    /// Both marks set; the next click restarts the selection.
    Complete,
}

impl TrimState {
    /// Current phase of the selection protocol.
    pub fn phase(&self) -> TrimPhase {
        if !self.is_trim_mode {
            return TrimPhase::Idle;
        }
        match (self.trim_start, self.trim_end) {
            (None, _) => TrimPhase::AwaitingStart,
            (Some(_), None) => TrimPhase::AwaitingEnd,
            (Some(_), Some(_)) => TrimPhase::Complete,
        }
    }

    /// The selected range when both marks are set.
    pub fn range(&self) -> Option<(f64, f64)> {
        match (self.trim_start, self.trim_end) {
            (Some(start), Some(end)) => Some((start, end)),
            _ => None,
        }
    }

    /// Length of the selected range in seconds.
    pub fn selected_secs(&self) -> Option<f64> {
        self.range().map(|(start, end)| end - start)
    }
}

/// Read-only view of every state group in a session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub transport: TransportState,
    pub trim: TrimState,
    pub trim_phase: TrimPhase,
    pub selected_stream_index: Option<usize>,
    pub stream_count: usize,
    pub controls_visible: bool,
}
