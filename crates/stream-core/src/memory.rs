//! In-memory stream and surface implementations.
//!
//! These stand in for real players in the CLI simulator and in tests. Each
//! one can be told to reject a specific operation so partial-failure paths
//! can be exercised.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use crate::{
    rejected, resolved, FullscreenSurface, MediaStream, PendingResult, ReadyState, StreamError,
    StreamOperation, StreamResult,
};

#[derive(Debug, Default)]
struct StreamInner {
    ready_state: ReadyState,
    current_time: f64,
    duration: f64,
    playing: bool,
    failures: HashMap<StreamOperation, String>,
    calls: HashMap<StreamOperation, usize>,
}

/// A media stream whose state lives entirely in memory.
#[derive(Debug)]
pub struct MemoryStream {
    source: String,
    inner: Mutex<StreamInner>,
}

impl MemoryStream {
    /// A stream with enough data buffered to play immediately.
    pub fn new(source: impl Into<String>, duration: f64) -> Self {
        Self {
            source: source.into(),
            inner: Mutex::new(StreamInner {
                ready_state: ReadyState::HaveEnoughData,
                duration,
                ..StreamInner::default()
            }),
        }
    }

    pub fn with_ready_state(self, ready_state: ReadyState) -> Self {
        self.set_ready_state(ready_state);
        self
    }

    /// Make every future `operation` on this stream fail with `reason`.
    pub fn failing(self, operation: StreamOperation, reason: impl Into<String>) -> Self {
        self.fail(operation, reason);
        self
    }

    /// Start rejecting `operation` on a stream that is already shared.
    pub fn fail(&self, operation: StreamOperation, reason: impl Into<String>) {
        self.lock().failures.insert(operation, reason.into());
    }

    pub fn set_ready_state(&self, ready_state: ReadyState) {
        self.lock().ready_state = ready_state;
    }

    /// Stop rejecting `operation`.
    pub fn recover(&self, operation: StreamOperation) {
        self.lock().failures.remove(&operation);
    }

    pub fn is_playing(&self) -> bool {
        self.lock().playing
    }

    /// How many times `operation` was requested, successful or not.
    pub fn calls(&self, operation: StreamOperation) -> usize {
        self.lock().calls.get(&operation).copied().unwrap_or(0)
    }

    /// Advance the position as if `secs` of media had played.
    pub fn advance(&self, secs: f64) {
        let mut inner = self.lock();
        if inner.playing {
            inner.current_time = (inner.current_time + secs).min(inner.duration);
        }
    }

    fn lock(&self) -> MutexGuard<'_, StreamInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, operation: StreamOperation) -> Option<StreamError> {
        let mut inner = self.lock();
        *inner.calls.entry(operation).or_default() += 1;
        inner
            .failures
            .get(&operation)
            .map(|reason| StreamError::rejected(operation, reason.clone()))
    }
}

impl MediaStream for MemoryStream {
    fn source(&self) -> String {
        self.source.clone()
    }

    fn ready_state(&self) -> ReadyState {
        self.lock().ready_state
    }

    fn current_time(&self) -> f64 {
        self.lock().current_time
    }

    fn duration(&self) -> f64 {
        self.lock().duration
    }

    fn set_current_time(&self, secs: f64) -> StreamResult<()> {
        if let Some(err) = self.record(StreamOperation::Seek) {
            return Err(err);
        }
        self.lock().current_time = secs;
        Ok(())
    }

    fn play(&self) -> PendingResult {
        if let Some(err) = self.record(StreamOperation::Play) {
            return rejected(err);
        }
        self.lock().playing = true;
        resolved()
    }

    fn pause(&self) -> StreamResult<()> {
        if let Some(err) = self.record(StreamOperation::Pause) {
            return Err(err);
        }
        self.lock().playing = false;
        Ok(())
    }
}

/// A fullscreen container that remembers its state in memory.
#[derive(Debug, Default)]
pub struct MemoryFullscreen {
    inner: Mutex<(bool, Option<String>)>,
}

impl MemoryFullscreen {
    pub fn new() -> Self {
        Self::default()
    }

    /// A surface that rejects every fullscreen request.
    pub fn denied(reason: impl Into<String>) -> Self {
        Self {
            inner: Mutex::new((false, Some(reason.into()))),
        }
    }

    fn lock(&self) -> MutexGuard<'_, (bool, Option<String>)> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl FullscreenSurface for MemoryFullscreen {
    fn is_fullscreen(&self) -> bool {
        self.lock().0
    }

    fn request_fullscreen(&self) -> PendingResult {
        let mut inner = self.lock();
        if let Some(reason) = &inner.1 {
            return rejected(StreamError::rejected(
                StreamOperation::EnterFullscreen,
                reason.clone(),
            ));
        }
        inner.0 = true;
        resolved()
    }

    fn exit_fullscreen(&self) -> StreamResult<()> {
        self.lock().0 = false;
        Ok(())
    }
}
