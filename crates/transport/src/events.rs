//! Transport events and deferred-result observation.
//!
//! Group flags are optimistic. Anything that later turns out to have failed
//! is logged and published here so a stricter front end can reconcile.

use std::sync::Arc;
use std::task::{Context, Poll, Wake, Waker};

use serde::Serialize;
use syncview_common::error::SyncviewError;
use syncview_stream_core::{PendingResult, ReadyState, StreamError, StreamOperation};
use tokio::sync::broadcast;

const EVENT_CAPACITY: usize = 64;

/// Something the transport learned after the fact.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransportEvent {
    /// A stream rejected play, pause, or seek.
    StreamFailed {
        stream: String,
        operation: StreamOperation,
        message: String,
    },

    /// A stream was skipped by `play()` because it had not buffered enough.
    StreamNotReady {
        stream: String,
        ready_state: ReadyState,
    },

    /// The container refused to enter or leave fullscreen.
    FullscreenFailed {
        operation: StreamOperation,
        message: String,
    },

    /// A clip export was handed to the export sink.
    ExportRequested {
        filename: String,
        range: Option<(f64, f64)>,
    },
}

impl TransportEvent {
    /// The failure this event reports, if it reports one.
    pub fn as_error(&self) -> Option<SyncviewError> {
        match self {
            TransportEvent::StreamFailed {
                stream,
                operation,
                message,
            } => Some(SyncviewError::StreamOperation {
                stream: stream.clone(),
                operation: *operation,
                message: message.clone(),
            }),
            TransportEvent::FullscreenFailed { message, .. } => {
                Some(SyncviewError::fullscreen(message.clone()))
            }
            TransportEvent::StreamNotReady { .. } | TransportEvent::ExportRequested { .. } => None,
        }
    }
}

/// Who a deferred request was sent to.
#[derive(Debug, Clone)]
pub enum RequestTarget {
    Stream(String),
    Fullscreen,
}

impl RequestTarget {
    fn failure(&self, err: &StreamError) -> TransportEvent {
        match self {
            RequestTarget::Stream(stream) => TransportEvent::StreamFailed {
                stream: stream.clone(),
                operation: err.operation(),
                message: err.to_string(),
            },
            RequestTarget::Fullscreen => TransportEvent::FullscreenFailed {
                operation: err.operation(),
                message: err.to_string(),
            },
        }
    }
}

/// Fan-out channel for [`TransportEvent`]s. Publishing never blocks and
/// never fails, even with no subscribers.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<TransportEvent>,
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<TransportEvent> {
        self.sender.subscribe()
    }

    pub fn publish(&self, event: TransportEvent) {
        // Err only means nobody is listening.
        let _ = self.sender.send(event);
    }

    /// Log and publish an isolated failure.
    pub fn report_failure(&self, target: &RequestTarget, err: &StreamError) {
        match target {
            RequestTarget::Stream(stream) => {
                tracing::warn!(stream = %stream, operation = %err.operation(), error = %err, "Stream operation failed");
            }
            RequestTarget::Fullscreen => {
                tracing::warn!(operation = %err.operation(), error = %err, "Fullscreen request failed");
            }
        }
        self.publish(target.failure(err));
    }

    /// Watch a request that has already been issued, without waiting for it.
    ///
    /// Inside a tokio runtime the outcome is awaited on a spawned task.
    /// Outside one, the result is checked once in place: an already-settled
    /// rejection is still reported, a still-pending one is let go.
    pub fn observe(&self, pending: PendingResult, target: RequestTarget) {
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let bus = self.clone();
                handle.spawn(async move {
                    if let Err(err) = pending.await {
                        bus.report_failure(&target, &err);
                    }
                });
            }
            Err(_) => match poll_once(pending) {
                Some(Err(err)) => self.report_failure(&target, &err),
                Some(Ok(())) => {}
                None => {
                    tracing::trace!(?target, "Request still pending without a runtime; outcome not observed");
                }
            },
        }
    }
}

struct NoopWake;

impl Wake for NoopWake {
    fn wake(self: Arc<Self>) {}
}

fn poll_once(mut pending: PendingResult) -> Option<Result<(), StreamError>> {
    let waker = Waker::from(Arc::new(NoopWake));
    let mut cx = Context::from_waker(&waker);
    match pending.as_mut().poll(&mut cx) {
        Poll::Ready(result) => Some(result),
        Poll::Pending => None,
    }
}
