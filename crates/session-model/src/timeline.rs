//! Timeline geometry: pointer and time conversions for the shared scrubber.
//!
//! Every division by the duration goes through [`usable_duration`]. A zero,
//! negative, or non-finite duration yields `0.0` positions and no markers so
//! NaN never reaches layout.

use serde::{Deserialize, Serialize};

use crate::state::{TransportState, TrimState};

/// Seconds per hour marker on the timeline.
pub const SECS_PER_HOUR: f64 = 3600.0;

/// Upper bound on hour markers for one timeline. Hours past this are not
/// marked; `skip_to_hour` still reaches them.
pub const MAX_HOUR_MARKERS: u32 = 1000;

/// Horizontal geometry of the clickable timeline track, in client pixels.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimelineRect {
    /// Left edge of the track.
    pub left: f64,
    /// Track width.
    pub width: f64,
}

impl TimelineRect {
    pub fn new(left: f64, width: f64) -> Self {
        Self { left, width }
    }
}

/// A clickable hour boundary on the timeline.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HourMarker {
    /// Hour index, suitable for `skip_to_hour`.
    pub hour: u32,
    /// Position along the track in `[0.0, 1.0]`.
    pub position: f64,
}

/// Positions of the trim marks along the track.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TrimMarkers {
    pub start: Option<f64>,
    pub end: Option<f64>,
}

/// Everything the controls overlay needs to draw the timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineView {
    /// Progress bar width, `0.0..=100.0`.
    pub progress_percent: f64,
    pub hour_markers: Vec<HourMarker>,
    pub trim_markers: TrimMarkers,
}

impl TimelineView {
    pub fn compute(transport: &TransportState, trim: &TrimState) -> Self {
        Self {
            progress_percent: progress_percent(transport.current_time, transport.duration),
            hour_markers: hour_markers(transport.duration),
            trim_markers: trim_marker_positions(trim, transport.duration),
        }
    }
}

/// The duration if it can safely be divided by.
pub fn usable_duration(duration: f64) -> Option<f64> {
    (duration.is_finite() && duration > 0.0).then_some(duration)
}

/// Map a pointer x-coordinate onto the track, clamped to `[0.0, 1.0]`.
pub fn fractional_position(client_x: f64, rect: TimelineRect) -> f64 {
    if !(rect.width.is_finite() && rect.width > 0.0) {
        return 0.0;
    }
    let fraction = (client_x - rect.left) / rect.width;
    if fraction.is_nan() {
        return 0.0;
    }
    fraction.clamp(0.0, 1.0)
}

/// Absolute time for a track fraction.
pub fn time_from_fraction(fraction: f64, duration: f64) -> f64 {
    match usable_duration(duration) {
        Some(duration) if fraction.is_finite() => fraction * duration,
        _ => 0.0,
    }
}

/// Track fraction for an absolute time, clamped to `[0.0, 1.0]`.
pub fn fraction_of(secs: f64, duration: f64) -> f64 {
    match usable_duration(duration) {
        Some(duration) if secs.is_finite() => (secs / duration).clamp(0.0, 1.0),
        _ => 0.0,
    }
}

/// Progress bar width as a percentage.
pub fn progress_percent(current_time: f64, duration: f64) -> f64 {
    fraction_of(current_time, duration) * 100.0
}

/// Track positions of the trim marks; unset marks stay `None`.
pub fn trim_marker_positions(trim: &TrimState, duration: f64) -> TrimMarkers {
    if usable_duration(duration).is_none() {
        return TrimMarkers::default();
    }
    TrimMarkers {
        start: trim.trim_start.map(|t| fraction_of(t, duration)),
        end: trim.trim_end.map(|t| fraction_of(t, duration)),
    }
}

/// One marker per started hour: `i * 3600 / duration` for
/// `i in 0..ceil(duration / 3600)`, at most [`MAX_HOUR_MARKERS`].
pub fn hour_markers(duration: f64) -> Vec<HourMarker> {
    let Some(duration) = usable_duration(duration) else {
        return Vec::new();
    };
    let count = ((duration / SECS_PER_HOUR).ceil() as u32).min(MAX_HOUR_MARKERS);
    (0..count)
        .map(|hour| HourMarker {
            hour,
            position: f64::from(hour) * SECS_PER_HOUR / duration,
        })
        .collect()
}

/// Human readable transport time: `H:MM:SS`, or `M:SS` under an hour.
pub fn format_clock(secs: f64) -> String {
    let total = if secs.is_finite() && secs > 0.0 {
        secs.floor() as u64
    } else {
        0
    };
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    if hours > 0 {
        format!("{hours}:{minutes:02}:{seconds:02}")
    } else {
        format!("{minutes}:{seconds:02}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_fractional_position_clamps() {
        let rect = TimelineRect::new(100.0, 400.0);
        assert!((fractional_position(300.0, rect) - 0.5).abs() < 1e-9);
        assert_eq!(fractional_position(50.0, rect), 0.0);
        assert_eq!(fractional_position(900.0, rect), 1.0);
    }

    #[test]
    fn test_zero_width_track_maps_to_start() {
        let rect = TimelineRect::new(10.0, 0.0);
        assert_eq!(fractional_position(10.0, rect), 0.0);
        assert_eq!(fractional_position(f64::NAN, TimelineRect::new(0.0, 10.0)), 0.0);
    }

    #[test]
    fn test_time_from_fraction() {
        assert!((time_from_fraction(0.25, 200.0) - 50.0).abs() < 1e-9);
        assert_eq!(time_from_fraction(0.5, 0.0), 0.0);
    }

    #[test]
    fn test_progress_percent() {
        assert!((progress_percent(30.0, 120.0) - 25.0).abs() < 1e-9);
        assert_eq!(progress_percent(30.0, 0.0), 0.0);
        assert_eq!(progress_percent(30.0, f64::NAN), 0.0);
    }

    #[test]
    fn test_hour_markers() {
        let markers = hour_markers(9000.0);
        assert_eq!(markers.len(), 3);
        assert_eq!(markers[0].hour, 0);
        assert_eq!(markers[0].position, 0.0);
        assert!((markers[1].position - 0.4).abs() < 1e-9);
        assert!((markers[2].position - 0.8).abs() < 1e-9);

        assert_eq!(hour_markers(7200.0).len(), 2);
        assert_eq!(hour_markers(90.0).len(), 1);
    }

    #[test]
    fn test_degenerate_duration_renders_nothing() {
        assert!(hour_markers(0.0).is_empty());
        assert!(hour_markers(f64::INFINITY).is_empty());
    }

    #[test]
    fn test_hour_markers_bounded_for_huge_durations() {
        let markers = hour_markers(1e20);
        assert_eq!(markers.len(), MAX_HOUR_MARKERS as usize);
        assert!(markers.iter().all(|m| m.position < 1e-9));

        assert_eq!(hour_markers(3.6e10).len(), MAX_HOUR_MARKERS as usize);
        assert_eq!(hour_markers(f64::MAX).len(), MAX_HOUR_MARKERS as usize);

        let exact = f64::from(MAX_HOUR_MARKERS) * SECS_PER_HOUR;
        assert_eq!(hour_markers(exact).len(), MAX_HOUR_MARKERS as usize);
        assert_eq!(hour_markers(exact - 1.0).len(), MAX_HOUR_MARKERS as usize);

        let trim = TrimState {
            is_trim_mode: true,
            trim_start: Some(5.0),
            trim_end: Some(8.0),
        };
        assert_eq!(trim_marker_positions(&trim, 0.0), TrimMarkers::default());

        let view = TimelineView::compute(&TransportState::default(), &trim);
        assert_eq!(view.progress_percent, 0.0);
        assert!(view.hour_markers.is_empty());
        assert!(view.trim_markers.start.is_none());
    }

    #[test]
    fn test_trim_markers_only_for_set_marks() {
        let trim = TrimState {
            is_trim_mode: true,
            trim_start: Some(25.0),
            trim_end: None,
        };
        let markers = trim_marker_positions(&trim, 100.0);
        assert_eq!(markers.start, Some(0.25));
        assert_eq!(markers.end, None);
    }

    #[test]
    fn test_format_clock() {
        assert_eq!(format_clock(0.0), "0:00");
        assert_eq!(format_clock(65.9), "1:05");
        assert_eq!(format_clock(3725.0), "1:02:05");
        assert_eq!(format_clock(-4.0), "0:00");
    }

    proptest! {
        #[test]
        fn prop_fraction_in_unit_range(
            x in -1.0e6f64..1.0e6,
            left in -1.0e4f64..1.0e4,
            width in 0.0f64..1.0e4,
        ) {
            let f = fractional_position(x, TimelineRect::new(left, width));
            prop_assert!((0.0..=1.0).contains(&f));
        }

        #[test]
        fn prop_progress_never_nan(current in any::<f64>(), duration in any::<f64>()) {
            let p = progress_percent(current, duration);
            prop_assert!(p.is_finite());
            prop_assert!((0.0..=100.0).contains(&p));
        }
    }
}
