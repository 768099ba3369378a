//! SyncView Session Model
//!
//! Defines the core data contracts for a multi-view playback session:
//! - **State:** Group transport flags and times, stream selection, trim marks
//! - **Timeline:** Pointer/time conversions and render positions for the
//!   progress bar, hour markers, and trim markers
//!
//! Timeline positions are normalized to the `[0.0, 1.0]` range of the
//! clickable track so they survive resizing of the controls overlay.

pub mod state;
pub mod timeline;

pub use state::*;
pub use timeline::*;
