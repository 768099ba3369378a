//! SyncView Common Utilities
//!
//! Shared infrastructure for all SyncView crates:
//! - Error types and result aliases
//! - Clock utilities for the shared playback timeline
//! - Tracing/logging initialization
//! - Configuration loading

pub mod clock;
pub mod config;
pub mod error;
pub mod logging;

pub use clock::*;
pub use config::*;
pub use error::*;
