//! Registry of the streams participating in a session.
//!
//! Membership is weak: the rendering layer owns each stream and must
//! unregister it explicitly before tearing the tile down. A stream dropped
//! without unregistering stays listed and is skipped by fan-out until then.

use std::sync::{Arc, Weak};

use syncview_stream_core::MediaStream;

/// Shared handle to a stream owned by the rendering layer.
pub type StreamHandle = Arc<dyn MediaStream>;

/// Ordered list of registered streams plus the selected one.
#[derive(Default)]
pub struct StreamRegistry {
    entries: Vec<Weak<dyn MediaStream>>,
    selected: Option<usize>,
}

impl std::fmt::Debug for StreamRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StreamRegistry")
            .field("len", &self.entries.len())
            .field("selected", &self.selected)
            .finish()
    }
}

fn same_stream(entry: &Weak<dyn MediaStream>, handle: &StreamHandle) -> bool {
    std::ptr::eq(
        entry.as_ptr() as *const (),
        Arc::as_ptr(handle) as *const (),
    )
}

impl StreamRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a stream. Returns `false` if it was already registered.
    ///
    /// The first stream registered into an unselected registry becomes the
    /// selection.
    pub fn register(&mut self, handle: &StreamHandle) -> bool {
        if self.contains(handle) {
            return false;
        }
        self.entries.push(Arc::downgrade(handle));
        if self.selected.is_none() {
            self.selected = Some(0);
        }
        tracing::debug!(
            source = %handle.source(),
            count = self.entries.len(),
            "Stream registered"
        );
        true
    }

    /// Remove a stream and reindex the selection. Returns `false` if it was
    /// not registered.
    pub fn unregister(&mut self, handle: &StreamHandle) -> bool {
        let Some(removed) = self.position(handle) else {
            return false;
        };
        self.entries.remove(removed);

        self.selected = match self.selected {
            _ if self.entries.is_empty() => None,
            Some(selected) if selected == removed => Some(0),
            Some(selected) if removed < selected => Some(selected - 1),
            other => other,
        };
        tracing::debug!(
            source = %handle.source(),
            count = self.entries.len(),
            selected = ?self.selected,
            "Stream unregistered"
        );
        true
    }

    /// Set the selection directly. No bounds check here; consumers validate.
    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index;
    }

    pub fn selected_index(&self) -> Option<usize> {
        self.selected
    }

    /// The selected stream, if the selection is in bounds and still alive.
    pub fn selected_stream(&self) -> Option<StreamHandle> {
        self.selected
            .and_then(|index| self.entries.get(index))
            .and_then(Weak::upgrade)
    }

    pub fn contains(&self, handle: &StreamHandle) -> bool {
        self.position(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Registered streams that are still alive, in registration order.
    pub fn live_streams(&self) -> Vec<StreamHandle> {
        let live: Vec<StreamHandle> = self.entries.iter().filter_map(Weak::upgrade).collect();
        if live.len() < self.entries.len() {
            tracing::debug!(
                dropped = self.entries.len() - live.len(),
                "Skipping streams dropped without unregistering"
            );
        }
        live
    }

    fn position(&self, handle: &StreamHandle) -> Option<usize> {
        self.entries.iter().position(|entry| same_stream(entry, handle))
    }
}
