//! Group transport: play, pause, and seek fanned out to every stream.
//!
//! Each per-stream call is isolated. A failing stream is logged and
//! reported on the [`EventBus`], and the command still reaches the rest of
//! the group and still updates the group state.

use syncview_common::clock::DriftMeasurement;
use syncview_common::error::{SyncviewError, SyncviewResult};
use syncview_session_model::timeline::{usable_duration, SECS_PER_HOUR};
use syncview_session_model::TransportState;
use syncview_stream_core::{FullscreenSurface, ReadyState};

use crate::events::{EventBus, RequestTarget, TransportEvent};
use crate::registry::StreamRegistry;

/// How a fanned-out command went, stream by stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Streams the request was sent to.
    pub issued: usize,
    /// Streams skipped before sending (not ready to play).
    pub skipped: usize,
    /// Streams that rejected the request synchronously.
    pub failed: usize,
}

/// Drift of one stream against the group position.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDrift {
    pub stream: String,
    pub measurement: DriftMeasurement,
}

/// Clamp a seek target into `[0, duration]`. Non-finite targets go to 0.
pub fn clamp_time(target: f64, duration: f64) -> f64 {
    let upper = if duration.is_nan() || duration < 0.0 {
        0.0
    } else {
        duration
    };
    if !target.is_finite() {
        return 0.0;
    }
    target.clamp(0.0, upper)
}

/// The duration if the timeline can be drawn, otherwise a
/// `DegenerateTimeline` error.
pub fn ensure_timeline(duration: f64) -> SyncviewResult<f64> {
    usable_duration(duration).ok_or_else(|| SyncviewError::degenerate_timeline(duration))
}

/// Owns the canonical group transport state.
#[derive(Debug, Clone)]
pub struct TransportController {
    state: TransportState,
    ready_threshold: ReadyState,
    events: EventBus,
}

impl TransportController {
    pub fn new(ready_threshold: ReadyState, events: EventBus) -> Self {
        Self {
            state: TransportState::default(),
            ready_threshold,
            events,
        }
    }

    pub fn state(&self) -> &TransportState {
        &self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state.is_playing
    }

    pub fn current_time(&self) -> f64 {
        self.state.current_time
    }

    pub fn duration(&self) -> f64 {
        self.state.duration
    }

    pub fn ready_threshold(&self) -> ReadyState {
        self.ready_threshold
    }

    /// Ask every sufficiently buffered stream to play.
    ///
    /// Does not wait for any stream to confirm; `is_playing` is set as soon
    /// as the requests are out.
    pub fn play(&mut self, streams: &StreamRegistry) -> DispatchReport {
        let mut report = DispatchReport::default();
        for stream in streams.live_streams() {
            let source = stream.source();
            let ready_state = stream.ready_state();
            if !ready_state.meets(self.ready_threshold) {
                tracing::debug!(stream = %source, ?ready_state, "Stream not ready; play skipped");
                self.events.publish(TransportEvent::StreamNotReady {
                    stream: source,
                    ready_state,
                });
                report.skipped += 1;
                continue;
            }
            self.events
                .observe(stream.play(), RequestTarget::Stream(source));
            report.issued += 1;
        }
        self.state.is_playing = true;
        tracing::debug!(
            issued = report.issued,
            skipped = report.skipped,
            time = self.state.current_time,
            "Playback started"
        );
        report
    }

    /// Pause every stream.
    pub fn pause(&mut self, streams: &StreamRegistry) -> DispatchReport {
        let mut report = DispatchReport::default();
        for stream in streams.live_streams() {
            report.issued += 1;
            if let Err(err) = stream.pause() {
                self.events
                    .report_failure(&RequestTarget::Stream(stream.source()), &err);
                report.failed += 1;
            }
        }
        self.state.is_playing = false;
        tracing::debug!(
            issued = report.issued,
            failed = report.failed,
            time = self.state.current_time,
            "Playback paused"
        );
        report
    }

    /// Move every stream to `target`, clamped into `[0, duration]`.
    /// Returns the clamped position.
    pub fn seek(&mut self, streams: &StreamRegistry, target: f64) -> f64 {
        let time = clamp_time(target, self.state.duration);
        let mut failed = 0usize;
        for stream in streams.live_streams() {
            if let Err(err) = stream.set_current_time(time) {
                self.events
                    .report_failure(&RequestTarget::Stream(stream.source()), &err);
                failed += 1;
            }
        }
        self.state.current_time = time;
        tracing::debug!(target, time, failed, "Seeked");
        time
    }

    /// Seek relative to the current position.
    pub fn skip_time(&mut self, streams: &StreamRegistry, delta_secs: f64) -> f64 {
        self.seek(streams, self.state.current_time + delta_secs)
    }

    /// Seek to the start of hour `hour`.
    pub fn skip_to_hour(&mut self, streams: &StreamRegistry, hour: u32) -> f64 {
        self.seek(streams, f64::from(hour) * SECS_PER_HOUR)
    }

    pub fn toggle_play(&mut self, streams: &StreamRegistry) -> DispatchReport {
        if self.state.is_playing {
            self.pause(streams)
        } else {
            self.play(streams)
        }
    }

    /// Enter or leave fullscreen on the grid container.
    ///
    /// The flag flips regardless of the outcome; failures are only reported.
    pub fn toggle_fullscreen(&mut self, surface: Option<&dyn FullscreenSurface>) -> bool {
        match surface {
            Some(surface) if surface.is_fullscreen() => {
                if let Err(err) = surface.exit_fullscreen() {
                    self.events.report_failure(&RequestTarget::Fullscreen, &err);
                }
            }
            Some(surface) => {
                self.events
                    .observe(surface.request_fullscreen(), RequestTarget::Fullscreen);
            }
            None => {
                tracing::debug!("No fullscreen surface attached");
            }
        }
        self.state.is_fullscreen = !self.state.is_fullscreen;
        tracing::debug!(fullscreen = self.state.is_fullscreen, "Fullscreen toggled");
        self.state.is_fullscreen
    }

    /// Position reported by the rendering layer's time updates. Unclamped.
    pub fn set_current_time(&mut self, secs: f64) {
        self.state.current_time = secs;
    }

    /// Duration reported by the rendering layer. Unclamped, never derived.
    pub fn set_duration(&mut self, secs: f64) {
        self.state.duration = secs;
        tracing::debug!(duration = secs, "Duration set");
    }

    /// How far each live stream has wandered from the group position.
    pub fn drift_report(&self, streams: &StreamRegistry) -> Vec<StreamDrift> {
        streams
            .live_streams()
            .into_iter()
            .map(|stream| StreamDrift {
                stream: stream.source(),
                measurement: DriftMeasurement {
                    reference_secs: self.state.current_time,
                    measured_secs: stream.current_time(),
                },
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use syncview_stream_core::{MediaStream, MemoryFullscreen, MemoryStream, StreamOperation};

    use crate::registry::StreamHandle;

    fn setup(names: &[&str]) -> (StreamRegistry, Vec<Arc<MemoryStream>>) {
        let mut registry = StreamRegistry::new();
        let streams: Vec<Arc<MemoryStream>> = names
            .iter()
            .map(|name| Arc::new(MemoryStream::new(*name, 120.0)))
            .collect();
        for stream in &streams {
            let handle: StreamHandle = stream.clone();
            registry.register(&handle);
        }
        (registry, streams)
    }

    fn controller() -> TransportController {
        let mut controller = TransportController::new(ReadyState::HaveFutureData, EventBus::new());
        controller.set_duration(120.0);
        controller
    }

    #[test]
    fn play_skips_unready_streams() {
        let (registry, streams) = setup(&["a.mp4", "b.mp4", "c.mp4"]);
        streams[1].set_ready_state(ReadyState::HaveMetadata);
        let mut transport = controller();

        let report = transport.play(&registry);
        assert_eq!(report.issued, 2);
        assert_eq!(report.skipped, 1);
        assert!(transport.is_playing());
        assert!(streams[0].is_playing());
        assert!(!streams[1].is_playing());
        assert_eq!(streams[1].calls(StreamOperation::Play), 0);
        assert!(streams[2].is_playing());
    }

    #[test]
    fn play_is_optimistic_when_every_stream_rejects() {
        let mut registry = StreamRegistry::new();
        let failing: StreamHandle =
            Arc::new(MemoryStream::new("bad.mp4", 120.0).failing(StreamOperation::Play, "nope"));
        registry.register(&failing);
        let mut transport = controller();
        let mut rx = transport.events.subscribe();

        transport.play(&registry);
        assert!(transport.is_playing());
        assert!(matches!(
            rx.try_recv().unwrap(),
            TransportEvent::StreamFailed { ref stream, .. } if stream == "bad.mp4"
        ));
    }

    #[test]
    fn pause_continues_past_failures() {
        let (mut registry, streams) = setup(&["a.mp4", "c.mp4"]);
        let failing: StreamHandle =
            Arc::new(MemoryStream::new("b.mp4", 120.0).failing(StreamOperation::Pause, "stuck"));
        registry.register(&failing);
        let mut transport = controller();
        transport.play(&registry);

        let report = transport.pause(&registry);
        assert_eq!(report.issued, 3);
        assert_eq!(report.failed, 1);
        assert!(!transport.is_playing());
        assert!(!streams[0].is_playing());
        assert!(!streams[1].is_playing());
    }

    #[test]
    fn seek_clamps_and_fans_out() {
        let (mut registry, streams) = setup(&["a.mp4", "b.mp4"]);
        let failing: StreamHandle =
            Arc::new(MemoryStream::new("x.mp4", 120.0).failing(StreamOperation::Seek, "no"));
        registry.register(&failing);
        let mut transport = controller();

        assert_eq!(transport.seek(&registry, 500.0), 120.0);
        assert_eq!(transport.current_time(), 120.0);
        assert_eq!(streams[0].current_time(), 120.0);
        assert_eq!(streams[1].current_time(), 120.0);

        assert_eq!(transport.seek(&registry, -3.0), 0.0);
        assert_eq!(transport.seek(&registry, f64::NAN), 0.0);
        assert_eq!(transport.seek(&registry, f64::INFINITY), 0.0);
    }

    #[test]
    fn skip_helpers_route_through_seek() {
        let (registry, _streams) = setup(&["a.mp4"]);
        let mut transport = controller();
        transport.set_duration(3.0 * SECS_PER_HOUR);

        transport.seek(&registry, 100.0);
        assert_eq!(transport.skip_time(&registry, -10.0), 90.0);
        assert_eq!(transport.skip_time(&registry, -1000.0), 0.0);
        assert_eq!(transport.skip_to_hour(&registry, 2), 7200.0);
        assert_eq!(transport.skip_to_hour(&registry, 9), 3.0 * SECS_PER_HOUR);
    }

    #[test]
    fn toggle_play_alternates() {
        let (registry, streams) = setup(&["a.mp4"]);
        let mut transport = controller();
        transport.toggle_play(&registry);
        assert!(transport.is_playing());
        transport.toggle_play(&registry);
        assert!(!transport.is_playing());
        assert!(!streams[0].is_playing());
    }

    #[test]
    fn fullscreen_flag_flips_even_when_denied() {
        let mut transport = controller();
        let denied = MemoryFullscreen::denied("user gesture required");
        assert!(transport.toggle_fullscreen(Some(&denied)));
        assert!(!denied.is_fullscreen());
        assert!(!transport.toggle_fullscreen(Some(&denied)));

        let surface = MemoryFullscreen::new();
        assert!(transport.toggle_fullscreen(Some(&surface)));
        assert!(surface.is_fullscreen());
        assert!(!transport.toggle_fullscreen(Some(&surface)));
        assert!(!surface.is_fullscreen());

        assert!(transport.toggle_fullscreen(None));
    }

    #[test]
    fn setters_do_not_clamp() {
        let mut transport = controller();
        transport.set_current_time(500.0);
        assert_eq!(transport.current_time(), 500.0);
        transport.set_duration(-1.0);
        assert_eq!(transport.duration(), -1.0);
    }

    #[test]
    fn drift_report_compares_against_group_clock() {
        let (registry, streams) = setup(&["a.mp4", "b.mp4"]);
        let mut transport = controller();
        transport.seek(&registry, 10.0);
        transport.play(&registry);
        streams[1].advance(0.5);

        let drift = transport.drift_report(&registry);
        assert_eq!(drift.len(), 2);
        assert_eq!(drift[0].measurement.drift_secs(), 0.0);
        assert!(drift[1].measurement.exceeds_threshold_ms(250.0));
    }

    #[test]
    fn ensure_timeline_rejects_degenerate_durations() {
        assert!(ensure_timeline(60.0).is_ok());
        assert!(matches!(
            ensure_timeline(0.0),
            Err(SyncviewError::DegenerateTimeline { .. })
        ));
        assert!(ensure_timeline(f64::NAN).is_err());
    }
}
