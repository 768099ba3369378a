//! SyncView stream contracts.
//!
//! This crate contains the interfaces the transport consumes from the
//! rendering layer (one [`MediaStream`] per video tile, one
//! [`FullscreenSurface`] for the grid container) without coupling to a
//! concrete player backend.

pub mod memory;

use std::fmt;
use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

pub use memory::{MemoryFullscreen, MemoryStream};

/// How much media a stream has buffered, in increasing order.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    #[default]
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

impl ReadyState {
    /// Whether this level meets the given threshold.
    pub fn meets(self, threshold: ReadyState) -> bool {
        self >= threshold
    }
}

/// The per-stream operations the transport fans out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StreamOperation {
    Play,
    Pause,
    Seek,
    EnterFullscreen,
    ExitFullscreen,
}

impl fmt::Display for StreamOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            StreamOperation::Play => "play",
            StreamOperation::Pause => "pause",
            StreamOperation::Seek => "seek",
            StreamOperation::EnterFullscreen => "enter fullscreen",
            StreamOperation::ExitFullscreen => "exit fullscreen",
        };
        f.write_str(name)
    }
}

/// Failure reported by a single stream or surface.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum StreamError {
    #[error("{operation} rejected: {reason}")]
    Rejected {
        operation: StreamOperation,
        reason: String,
    },

    #[error("{operation} not supported")]
    Unsupported { operation: StreamOperation },
}

impl StreamError {
    pub fn rejected(operation: StreamOperation, reason: impl Into<String>) -> Self {
        Self::Rejected {
            operation,
            reason: reason.into(),
        }
    }

    /// The operation that failed.
    pub fn operation(&self) -> StreamOperation {
        match self {
            StreamError::Rejected { operation, .. } | StreamError::Unsupported { operation } => {
                *operation
            }
        }
    }
}

pub type StreamResult<T> = Result<T, StreamError>;

/// Deferred outcome of a request that has already been issued.
///
/// Dropping it does not cancel the request; it only gives up on learning
/// whether it succeeded.
pub type PendingResult = Pin<Box<dyn Future<Output = StreamResult<()>> + Send + 'static>>;

/// A pending result that has already succeeded.
pub fn resolved() -> PendingResult {
    Box::pin(std::future::ready(Ok(())))
}

/// A pending result that has already failed.
pub fn rejected(err: StreamError) -> PendingResult {
    Box::pin(std::future::ready(Err(err)))
}

/// A playable media source owned by the rendering layer.
///
/// Methods take `&self`: the rendering layer keeps ownership and the
/// transport only borrows through a weak registration.
pub trait MediaStream: Send + Sync {
    /// Source identifier (URL or path), used to name exported clips.
    fn source(&self) -> String;

    /// Current buffering level.
    fn ready_state(&self) -> ReadyState;

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    /// Intrinsic duration in seconds.
    fn duration(&self) -> f64;

    /// Assign a new playback position.
    fn set_current_time(&self, secs: f64) -> StreamResult<()>;

    /// Begin playback. The request is issued immediately; the returned
    /// future only reports whether the stream accepted it.
    fn play(&self) -> PendingResult;

    /// Pause playback.
    fn pause(&self) -> StreamResult<()>;
}

/// The container element that hosts the whole multi-view grid.
pub trait FullscreenSurface: Send + Sync {
    /// Whether the surface is currently the fullscreen element.
    fn is_fullscreen(&self) -> bool;

    /// Ask the windowing layer to make the surface fullscreen.
    fn request_fullscreen(&self) -> PendingResult;

    /// Leave fullscreen.
    fn exit_fullscreen(&self) -> StreamResult<()>;
}
