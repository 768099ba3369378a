//! Error types shared across SyncView crates.

use syncview_stream_core::StreamOperation;

/// Top-level error type for SyncView operations.
///
/// None of these are fatal to the process: each one is contained to the
/// operation that raised it and reported through logging or a transport
/// event.
#[derive(Debug, thiserror::Error)]
pub enum SyncviewError {
    /// A single stream rejected a play/pause/seek request.
    #[error("Stream '{stream}' failed to {operation}: {message}")]
    StreamOperation {
        stream: String,
        operation: StreamOperation,
        message: String,
    },

    /// Export attempted without a valid selected stream.
    #[error("No stream selected for export")]
    NoSelection,

    /// The shared timeline has no usable duration.
    #[error("Degenerate timeline: duration {duration} is not positive and finite")]
    DegenerateTimeline { duration: f64 },

    #[error("Export failed: {message}")]
    ExportFailed { message: String },

    #[error("Fullscreen request failed: {message}")]
    Fullscreen { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using SyncviewError.
pub type SyncviewResult<T> = Result<T, SyncviewError>;

impl SyncviewError {
    pub fn export(msg: impl Into<String>) -> Self {
        Self::ExportFailed {
            message: msg.into(),
        }
    }

    pub fn fullscreen(msg: impl Into<String>) -> Self {
        Self::Fullscreen {
            message: msg.into(),
        }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    pub fn degenerate_timeline(duration: f64) -> Self {
        Self::DegenerateTimeline { duration }
    }
}
