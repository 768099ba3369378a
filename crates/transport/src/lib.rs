//! SyncView Transport
//!
//! Drives any number of independently buffering video streams as one unit.
//!
//! - **Registry:** weak, ordered membership of the streams in a grid plus
//!   the selected stream
//! - **Controller:** play/pause/seek/skip fanned out to every stream, with
//!   per-stream failure isolation
//! - **Trim:** in/out point selection on the shared timeline
//! - **Export:** clip naming and hand-off to an export sink
//! - **Controls:** auto-hide timer for the overlay
//! - **Session:** the single explicit instance that ties them together
//!
//! # Command flow
//!
//! ```text
//! click/keys ──► MultiViewSession ──► TransportController ──► stream 1
//!                      │                     │            ├─► stream 2
//!                      │                     │            └─► stream N
//!                      │                     ▼
//!                      │               EventBus ◄── deferred play results
//!                      ▼
//!                TrimSelector ──► build_export_request ──► ExportSink
//! ```

pub mod controller;
pub mod controls;
pub mod events;
pub mod export;
pub mod registry;
pub mod session;
pub mod trim;

pub use controller::{clamp_time, ensure_timeline, DispatchReport, StreamDrift, TransportController};
pub use controls::ControlsVisibility;
pub use events::{EventBus, RequestTarget, TransportEvent};
pub use export::{ExportRequest, ExportSink, NotifyExportSink};
pub use registry::{StreamHandle, StreamRegistry};
pub use session::{MultiViewSession, TimelineClick};
pub use trim::TrimSelector;
