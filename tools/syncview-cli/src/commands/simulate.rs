//! Run a scripted multi-view session against in-memory streams.

use std::str::FromStr;
use std::sync::Arc;

use serde::Serialize;
use syncview_common::clock::SessionClock;
use syncview_common::config::AppConfig;
use syncview_session_model::{format_clock, SessionSnapshot, TimelineRect};
use syncview_stream_core::{
    MediaStream, MemoryFullscreen, MemoryStream, ReadyState, StreamOperation,
};
use syncview_transport::{MultiViewSession, StreamHandle, TimelineClick, TransportEvent};
use tokio::sync::broadcast::{self, error::TryRecvError};

/// One scripted command.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    Play,
    Pause,
    Toggle,
    Seek(f64),
    Skip(f64),
    Forward,
    Back,
    Hour(u32),
    Fullscreen,
    Trim,
    Mark(f64),
    Click(f64),
    Reset,
    Select(usize),
    Export,
    ExportStream(usize),
    Wait(u64),
    Unready(usize),
    Fail(usize, StreamOperation),
    Drop(usize),
    Drift,
}

impl FromStr for Step {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        let mut parts = s.split(':');
        let name = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();

        let step = match (name, args.as_slice()) {
            ("play", []) => Step::Play,
            ("pause", []) => Step::Pause,
            ("toggle", []) => Step::Toggle,
            ("seek", [secs]) => Step::Seek(secs.parse()?),
            ("skip", [secs]) => Step::Skip(secs.parse()?),
            ("forward", []) => Step::Forward,
            ("back", []) => Step::Back,
            ("hour", [hour]) => Step::Hour(hour.parse()?),
            ("fullscreen", []) => Step::Fullscreen,
            ("trim", []) => Step::Trim,
            ("mark", [secs]) => Step::Mark(secs.parse()?),
            ("click", [x]) => Step::Click(x.parse()?),
            ("reset", []) => Step::Reset,
            ("select", [index]) => Step::Select(index.parse()?),
            ("export", []) => Step::Export,
            ("export", [index]) => Step::ExportStream(index.parse()?),
            ("wait", [ms]) => Step::Wait(ms.parse()?),
            ("unready", [index]) => Step::Unready(index.parse()?),
            ("fail", [index, operation]) => Step::Fail(index.parse()?, parse_operation(operation)?),
            ("drop", [index]) => Step::Drop(index.parse()?),
            ("drift", []) => Step::Drift,
            _ => anyhow::bail!("Unknown step: {s}"),
        };
        Ok(step)
    }
}

fn parse_operation(name: &str) -> anyhow::Result<StreamOperation> {
    serde_json::from_value(serde_json::Value::String(name.to_string()))
        .map_err(|_| anyhow::anyhow!("Unknown stream operation: {name}"))
}

#[derive(Debug, Serialize)]
struct DriftLine {
    stream: String,
    drift_ms: f64,
}

/// What one step did, printed after it runs.
#[derive(Debug, Serialize)]
struct StepReport {
    step: String,
    snapshot: SessionSnapshot,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    events: Vec<TransportEvent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    export: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    drift: Option<Vec<DriftLine>>,
}

/// In-memory tiles plus the session driving them.
struct Simulation {
    session: MultiViewSession,
    streams: Vec<Option<Arc<MemoryStream>>>,
    events: broadcast::Receiver<TransportEvent>,
    rect: TimelineRect,
    now_ms: u64,
}

impl Simulation {
    fn new(config: &AppConfig, sources: &[String], duration: f64, track_width: f64) -> Self {
        let mut session = MultiViewSession::new(config)
            .with_fullscreen_surface(Arc::new(MemoryFullscreen::new()));
        let events = session.subscribe();

        let streams: Vec<Option<Arc<MemoryStream>>> = sources
            .iter()
            .map(|source| Some(Arc::new(MemoryStream::new(source.as_str(), duration))))
            .collect();
        for stream in streams.iter().flatten() {
            let handle: StreamHandle = stream.clone();
            session.register(&handle);
        }
        session.set_duration(duration);

        Self {
            session,
            streams,
            events,
            rect: TimelineRect::new(0.0, track_width),
            now_ms: 0,
        }
    }

    fn stream(&self, index: usize) -> anyhow::Result<&Arc<MemoryStream>> {
        self.streams
            .get(index)
            .and_then(Option::as_ref)
            .ok_or_else(|| anyhow::anyhow!("No live stream at index {index}"))
    }

    async fn apply(&mut self, step: &Step) -> StepReport {
        let mut report = StepReport {
            step: format!("{step:?}"),
            snapshot: self.session.snapshot(),
            events: Vec::new(),
            export: None,
            error: None,
            drift: None,
        };

        if let Err(e) = self.dispatch(step, &mut report) {
            report.error = Some(e.to_string());
        }

        // Let spawned play/fullscreen observers finish before draining.
        for _ in 0..self.streams.len() + 1 {
            tokio::task::yield_now().await;
        }
        loop {
            match self.events.try_recv() {
                Ok(event) => report.events.push(event),
                Err(TryRecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Simulation fell behind the event bus");
                }
                Err(_) => break,
            }
        }

        report.snapshot = self.session.snapshot();
        report
    }

    fn dispatch(&mut self, step: &Step, report: &mut StepReport) -> anyhow::Result<()> {
        match *step {
            Step::Play => {
                self.session.play();
            }
            Step::Pause => {
                self.session.pause();
            }
            Step::Toggle => {
                self.session.toggle_play();
            }
            Step::Seek(secs) => {
                self.session.seek(secs);
            }
            Step::Skip(delta) => {
                self.session.skip_time(delta);
            }
            Step::Forward => {
                self.session.skip_forward();
            }
            Step::Back => {
                self.session.skip_back();
            }
            Step::Hour(hour) => {
                self.session.skip_to_hour(hour);
            }
            Step::Fullscreen => {
                self.session.toggle_fullscreen();
            }
            Step::Trim => {
                self.session.toggle_trim_mode();
            }
            Step::Mark(secs) => {
                self.session.click_time(secs);
            }
            Step::Click(x) => {
                if let TimelineClick::Seeked(time) = self.session.click_timeline(x, self.rect) {
                    tracing::debug!(time, "Timeline click seeked");
                }
            }
            Step::Reset => self.session.reset_trim(),
            Step::Select(index) => self.session.select(Some(index)),
            Step::Export => {
                report.export = Some(self.session.request_export()?.filename);
            }
            Step::ExportStream(index) => {
                report.export = Some(self.session.export_stream(index)?.filename);
            }
            Step::Wait(ms) => self.wait(ms),
            Step::Unready(index) => {
                self.stream(index)?.set_ready_state(ReadyState::HaveMetadata);
            }
            Step::Fail(index, operation) => {
                self.stream(index)?.fail(operation, "scripted failure");
            }
            Step::Drop(index) => {
                let slot = self
                    .streams
                    .get_mut(index)
                    .ok_or_else(|| anyhow::anyhow!("No stream at index {index}"))?;
                *slot = None;
            }
            Step::Drift => {
                report.drift = Some(
                    self.session
                        .drift_report()
                        .into_iter()
                        .map(|d| DriftLine {
                            stream: d.stream,
                            drift_ms: d.measurement.drift_ms(),
                        })
                        .collect(),
                );
            }
        }
        Ok(())
    }

    /// Let `ms` of wall time pass: playing streams advance, the first live
    /// stream reports its position, and the controls timer ticks.
    fn wait(&mut self, ms: u64) {
        self.now_ms = self.now_ms.saturating_add(ms);
        let secs = SessionClock::ms_to_secs(ms);
        for stream in self.streams.iter().flatten() {
            stream.advance(secs);
        }
        if let Some(first) = self.streams.iter().flatten().next() {
            self.session.set_current_time(first.current_time());
        }
        self.session.tick(self.now_ms);
    }
}

pub async fn run(
    config: &AppConfig,
    sources: Vec<String>,
    duration: f64,
    track_width: f64,
    json: bool,
    strict: bool,
    steps: Vec<String>,
) -> anyhow::Result<()> {
    if sources.is_empty() {
        anyhow::bail!("At least one stream source is required");
    }
    let script = steps
        .iter()
        .map(|s| s.parse::<Step>())
        .collect::<anyhow::Result<Vec<_>>>()?;

    let clock = SessionClock::start();
    let mut sim = Simulation::new(config, &sources, duration, track_width);
    tracing::info!(
        streams = sources.len(),
        steps = script.len(),
        started = clock.epoch_wall(),
        "Simulation started"
    );

    for (n, step) in script.iter().enumerate() {
        let report = sim.apply(step).await;
        if json {
            println!("{}", serde_json::to_string(&report)?);
        } else {
            print_report(n + 1, &report);
        }
        if strict {
            if let Some(err) = report.events.iter().find_map(TransportEvent::as_error) {
                sim.session.teardown();
                return Err(err.into());
            }
        }
    }

    sim.session.teardown();
    tracing::info!(elapsed_ms = clock.elapsed_ms(), "Simulation finished");
    Ok(())
}

fn print_report(n: usize, report: &StepReport) {
    let snap = &report.snapshot;
    println!(
        "[{n}] {:<16} {} {} / {}  streams: {}  selected: {:?}  trim: {:?}",
        report.step,
        if snap.transport.is_playing { "playing" } else { "paused " },
        format_clock(snap.transport.current_time),
        format_clock(snap.transport.duration),
        snap.stream_count,
        snap.selected_stream_index,
        snap.trim_phase,
    );
    if let Some((start, end)) = snap.trim.range() {
        println!("      trim range: {} - {}", format_clock(start), format_clock(end));
    }
    if let Some(filename) = &report.export {
        println!("      export: {filename}");
    }
    if let Some(error) = &report.error {
        println!("      error: {error}");
    }
    for event in &report.events {
        println!("      event: {event:?}");
    }
    for line in report.drift.iter().flatten() {
        println!("      drift {}: {:+.1}ms", line.stream, line.drift_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_steps() {
        assert_eq!("play".parse::<Step>().unwrap(), Step::Play);
        assert_eq!("seek:120.5".parse::<Step>().unwrap(), Step::Seek(120.5));
        assert_eq!("export".parse::<Step>().unwrap(), Step::Export);
        assert_eq!("export:2".parse::<Step>().unwrap(), Step::ExportStream(2));
        assert_eq!(
            "fail:1:play".parse::<Step>().unwrap(),
            Step::Fail(1, StreamOperation::Play)
        );
        assert_eq!(
            "fail:0:enter_fullscreen".parse::<Step>().unwrap(),
            Step::Fail(0, StreamOperation::EnterFullscreen)
        );
    }

    #[test]
    fn rejects_malformed_steps() {
        assert!("jump".parse::<Step>().is_err());
        assert!("seek".parse::<Step>().is_err());
        assert!("seek:soon".parse::<Step>().is_err());
        assert!("fail:1:rewind".parse::<Step>().is_err());
    }

    #[tokio::test]
    async fn trimmed_export_through_script() {
        let config = AppConfig::default();
        let sources = vec!["camera1.mp4".to_string(), "camera2.mp4".to_string()];
        let mut sim = Simulation::new(&config, &sources, 600.0, 1000.0);

        sim.apply(&Step::Seek(120.0)).await;
        sim.apply(&Step::Trim).await;
        sim.apply(&Step::Mark(185.0)).await;
        let report = sim.apply(&Step::Export).await;

        assert_eq!(report.export.as_deref(), Some("camera1_2m0s-3m5s.mp4"));
        assert!(report.snapshot.trim.range().is_none());
    }

    #[tokio::test]
    async fn rejected_play_surfaces_as_event() {
        let config = AppConfig::default();
        let sources = vec!["camera1.mp4".to_string(), "camera2.mp4".to_string()];
        let mut sim = Simulation::new(&config, &sources, 600.0, 1000.0);

        sim.apply(&Step::Fail(1, StreamOperation::Play)).await;
        let report = sim.apply(&Step::Play).await;

        assert!(report.snapshot.transport.is_playing);
        assert!(report
            .events
            .iter()
            .any(|e| matches!(e, TransportEvent::StreamFailed { stream, .. } if stream == "camera2.mp4")));
    }

    #[tokio::test]
    async fn wait_follows_first_stream() {
        let config = AppConfig::default();
        let sources = vec!["camera1.mp4".to_string()];
        let mut sim = Simulation::new(&config, &sources, 600.0, 1000.0);

        sim.apply(&Step::Play).await;
        let report = sim.apply(&Step::Wait(2_500)).await;
        assert!((report.snapshot.transport.current_time - 2.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn export_without_live_selection_reports_error() {
        let config = AppConfig::default();
        let sources = vec!["camera1.mp4".to_string()];
        let mut sim = Simulation::new(&config, &sources, 600.0, 1000.0);

        sim.apply(&Step::Drop(0)).await;
        let report = sim.apply(&Step::Export).await;
        assert!(report.export.is_none());
        assert!(report.error.is_some());
    }
}
