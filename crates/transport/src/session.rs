//! Multi-view session: one transport shared by every tile of a grid.
//!
//! A session is created by whoever opens the multi-view and passed
//! explicitly to everything that renders controls or tiles. Independent
//! sessions do not share any state.

use std::sync::Arc;

use syncview_common::config::AppConfig;
use syncview_common::error::SyncviewResult;
use syncview_session_model::timeline::{fractional_position, time_from_fraction};
use syncview_session_model::{
    SessionSnapshot, TimelineRect, TimelineView, TransportState, TrimPhase, TrimState,
};
use syncview_stream_core::FullscreenSurface;
use tokio::sync::broadcast;

use crate::controller::{DispatchReport, StreamDrift, TransportController};
use crate::controls::ControlsVisibility;
use crate::events::{EventBus, TransportEvent};
use crate::export::{build_export_request, ExportRequest, ExportSink, NotifyExportSink};
use crate::registry::{StreamHandle, StreamRegistry};
use crate::trim::TrimSelector;

/// What a click on the timeline did.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TimelineClick {
    /// Trim mode was off; the group seeked to this time.
    Seeked(f64),
    /// Trim mode was on; a mark was placed.
    Marked { time: f64, phase: TrimPhase },
}

pub struct MultiViewSession {
    registry: StreamRegistry,
    transport: TransportController,
    trim: TrimSelector,
    controls: ControlsVisibility,
    export_sink: Box<dyn ExportSink>,
    fullscreen: Option<Arc<dyn FullscreenSurface>>,
    events: EventBus,
    skip_secs: f64,
    fallback_filename: String,
}

impl std::fmt::Debug for MultiViewSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultiViewSession")
            .field("registry", &self.registry)
            .field("transport", self.transport.state())
            .field("trim", self.trim.state())
            .field("export_sink", &self.export_sink.name())
            .finish_non_exhaustive()
    }
}

impl MultiViewSession {
    /// Create a session with the notification export sink and no
    /// fullscreen surface.
    pub fn new(config: &AppConfig) -> Self {
        let events = EventBus::new();
        Self {
            registry: StreamRegistry::new(),
            transport: TransportController::new(
                config.transport.ready_threshold,
                events.clone(),
            ),
            trim: TrimSelector::new(),
            controls: ControlsVisibility::new(config.controls.hide_delay_ms),
            export_sink: Box::new(NotifyExportSink::new()),
            fullscreen: None,
            events,
            skip_secs: config.transport.skip_secs,
            fallback_filename: config.export.fallback_filename.clone(),
        }
    }

    pub fn with_export_sink(mut self, sink: Box<dyn ExportSink>) -> Self {
        self.export_sink = sink;
        self
    }

    pub fn with_fullscreen_surface(mut self, surface: Arc<dyn FullscreenSurface>) -> Self {
        self.fullscreen = Some(surface);
        self
    }

    /// Receive failures and export notices as they happen.
    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.events.subscribe()
    }

    // Registry

    pub fn register(&mut self, stream: &StreamHandle) -> bool {
        self.registry.register(stream)
    }

    pub fn unregister(&mut self, stream: &StreamHandle) -> bool {
        self.registry.unregister(stream)
    }

    /// Set the selected stream directly; validated only at export time.
    pub fn select(&mut self, index: Option<usize>) {
        self.registry.select(index);
    }

    pub fn selected_stream_index(&self) -> Option<usize> {
        self.registry.selected_index()
    }

    pub fn stream_count(&self) -> usize {
        self.registry.len()
    }

    pub fn registry(&self) -> &StreamRegistry {
        &self.registry
    }

    // Transport

    pub fn transport(&self) -> &TransportState {
        self.transport.state()
    }

    pub fn play(&mut self) -> DispatchReport {
        self.transport.play(&self.registry)
    }

    pub fn pause(&mut self) -> DispatchReport {
        self.transport.pause(&self.registry)
    }

    pub fn toggle_play(&mut self) -> DispatchReport {
        self.transport.toggle_play(&self.registry)
    }

    pub fn seek(&mut self, target: f64) -> f64 {
        self.transport.seek(&self.registry, target)
    }

    pub fn skip_time(&mut self, delta_secs: f64) -> f64 {
        self.transport.skip_time(&self.registry, delta_secs)
    }

    /// Skip ahead by the configured step.
    pub fn skip_forward(&mut self) -> f64 {
        self.skip_time(self.skip_secs)
    }

    /// Skip back by the configured step.
    pub fn skip_back(&mut self) -> f64 {
        self.skip_time(-self.skip_secs)
    }

    pub fn skip_to_hour(&mut self, hour: u32) -> f64 {
        self.transport.skip_to_hour(&self.registry, hour)
    }

    pub fn toggle_fullscreen(&mut self) -> bool {
        self.transport.toggle_fullscreen(self.fullscreen.as_deref())
    }

    pub fn set_current_time(&mut self, secs: f64) {
        self.transport.set_current_time(secs);
    }

    pub fn set_duration(&mut self, secs: f64) {
        self.transport.set_duration(secs);
    }

    pub fn drift_report(&self) -> Vec<StreamDrift> {
        self.transport.drift_report(&self.registry)
    }

    // Trim

    pub fn trim(&self) -> &TrimState {
        self.trim.state()
    }

    pub fn trim_phase(&self) -> TrimPhase {
        self.trim.phase()
    }

    pub fn toggle_trim_mode(&mut self) -> TrimPhase {
        self.trim.toggle_mode(self.transport.current_time())
    }

    pub fn reset_trim(&mut self) {
        self.trim.reset();
    }

    /// Handle a click at `client_x` on a timeline track laid out at `rect`.
    pub fn click_timeline(&mut self, client_x: f64, rect: TimelineRect) -> TimelineClick {
        let fraction = fractional_position(client_x, rect);
        let time = time_from_fraction(fraction, self.transport.duration());
        self.click_time(time)
    }

    /// Handle a timeline click already converted to a time.
    pub fn click_time(&mut self, time: f64) -> TimelineClick {
        if self.trim.is_active() {
            let phase = self.trim.handle_click(time);
            TimelineClick::Marked { time, phase }
        } else {
            TimelineClick::Seeked(self.seek(time))
        }
    }

    // Export

    /// Hand a clip of the selected stream to the export sink.
    ///
    /// A completed trimmed export clears the trim selection. A sink failure
    /// leaves it in place.
    pub fn request_export(&mut self) -> SyncviewResult<ExportRequest> {
        let request =
            build_export_request(&self.registry, self.trim.state(), &self.fallback_filename)?;

        self.export_sink.export(&request).map_err(|e| {
            tracing::warn!(sink = self.export_sink.name(), error = %e, "Export sink failed");
            e
        })?;

        self.events.publish(TransportEvent::ExportRequested {
            filename: request.filename.clone(),
            range: request.range,
        });
        if request.range.is_some() {
            self.trim.reset();
        }
        Ok(request)
    }

    /// Select `index` and export it in one step, as the stream picker does.
    pub fn export_stream(&mut self, index: usize) -> SyncviewResult<ExportRequest> {
        self.select(Some(index));
        self.request_export()
    }

    // Controls overlay

    pub fn controls_visible(&self) -> bool {
        self.controls.is_visible()
    }

    pub fn on_pointer_move(&mut self, now_ms: u64) {
        self.controls
            .on_pointer_move(now_ms, self.transport.is_playing());
    }

    pub fn tick(&mut self, now_ms: u64) -> bool {
        self.controls.tick(now_ms, self.transport.is_playing())
    }

    // Read access

    pub fn timeline_view(&self) -> TimelineView {
        TimelineView::compute(self.transport.state(), self.trim.state())
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            transport: *self.transport.state(),
            trim: *self.trim.state(),
            trim_phase: self.trim.phase(),
            selected_stream_index: self.registry.selected_index(),
            stream_count: self.registry.len(),
            controls_visible: self.controls.is_visible(),
        }
    }

    /// Stop the controls timer before the player goes away.
    pub fn teardown(&mut self) {
        self.controls.teardown();
        tracing::debug!(streams = self.registry.len(), "Session torn down");
    }
}
