//! Clock and timing utilities for the shared playback timeline.
//!
//! The controls auto-hide timer and the CLI simulator are driven by
//! millisecond timestamps relative to a session epoch. This module provides:
//! - Capturing the epoch
//! - Converting between seconds and milliseconds
//! - Measuring how far a stream has wandered from the group clock

use std::time::Instant;

/// A monotonic clock anchored at the moment a multi-view session opened.
#[derive(Debug, Clone)]
pub struct SessionClock {
    /// The instant the session opened.
    epoch: Instant,

    /// Wall-clock time at epoch (RFC 3339 string).
    epoch_wall: String,
}

impl SessionClock {
    /// Create a new clock anchored to now.
    pub fn start() -> Self {
        Self {
            epoch: Instant::now(),
            epoch_wall: chrono::Utc::now().to_rfc3339(),
        }
    }

    /// Milliseconds elapsed since the session opened.
    pub fn elapsed_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    /// Seconds elapsed since the session opened.
    pub fn elapsed_secs(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64()
    }

    /// Wall-clock time at session start.
    pub fn epoch_wall(&self) -> &str {
        &self.epoch_wall
    }

    /// Convert a millisecond value to seconds.
    pub fn ms_to_secs(ms: u64) -> f64 {
        ms as f64 / 1_000.0
    }

    /// Convert seconds to milliseconds. Negative input saturates to zero.
    pub fn secs_to_ms(secs: f64) -> u64 {
        (secs.max(0.0) * 1_000.0) as u64
    }
}

/// Position drift of one stream against the group transport clock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DriftMeasurement {
    /// Canonical group position (seconds).
    pub reference_secs: f64,
    /// Position reported by the stream (seconds).
    pub measured_secs: f64,
}

impl DriftMeasurement {
    /// Drift in seconds (positive = stream is ahead).
    pub fn drift_secs(&self) -> f64 {
        self.measured_secs - self.reference_secs
    }

    /// Drift in milliseconds.
    pub fn drift_ms(&self) -> f64 {
        self.drift_secs() * 1_000.0
    }

    /// Whether drift exceeds an acceptable threshold.
    pub fn exceeds_threshold_ms(&self, threshold_ms: f64) -> bool {
        self.drift_ms().abs() > threshold_ms
    }
}
