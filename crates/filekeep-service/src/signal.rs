//! Shared "something changed" flag for idle views.
//!
//! One signal is created per process and cloned into every service that
//! mutates data. Any successful mutation marks it dirty; a view that regains
//! focus checks it, reloads, and clears it. Concurrent clears are tolerated:
//! the worst case is one extra reload.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::watch;
use tracing::trace;

/// Observable state of an [`InvalidationSignal`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignalState {
    /// Whether a mutation happened since the last clear.
    pub dirty: bool,
    /// When the signal was last marked dirty.
    pub marked_at: Option<DateTime<Utc>>,
    /// Number of times the signal has been marked dirty.
    pub generation: u64,
}

/// Cloneable handle to a shared dirty flag.
#[derive(Debug, Clone)]
pub struct InvalidationSignal {
    tx: Arc<watch::Sender<SignalState>>,
}

impl InvalidationSignal {
    /// Create a clean signal.
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(SignalState::default());
        Self { tx: Arc::new(tx) }
    }

    /// Record that something changed.
    pub fn mark_dirty(&self) {
        self.tx.send_modify(|state| {
            state.dirty = true;
            state.marked_at = Some(Utc::now());
            state.generation += 1;
        });
        trace!(generation = self.tx.borrow().generation, "Invalidation signal marked dirty");
    }

    /// Whether a mutation happened since the last clear.
    pub fn is_dirty(&self) -> bool {
        self.tx.borrow().dirty
    }

    /// When the signal was last marked dirty.
    pub fn marked_at(&self) -> Option<DateTime<Utc>> {
        self.tx.borrow().marked_at
    }

    /// Reset the flag. The timestamp and generation are kept.
    pub fn clear(&self) {
        self.tx.send_if_modified(|state| std::mem::replace(&mut state.dirty, false));
    }

    /// Clear the flag and report whether it was set.
    pub fn take(&self) -> bool {
        self.tx.send_if_modified(|state| std::mem::replace(&mut state.dirty, false))
    }

    /// Current state.
    pub fn state(&self) -> SignalState {
        *self.tx.borrow()
    }

    /// Watch the signal. Receivers wake on every mark and on effective clears.
    pub fn subscribe(&self) -> watch::Receiver<SignalState> {
        self.tx.subscribe()
    }
}

impl Default for InvalidationSignal {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mark_and_clear() {
        let signal = InvalidationSignal::new();
        assert!(!signal.is_dirty());
        assert!(signal.marked_at().is_none());

        signal.mark_dirty();
        assert!(signal.is_dirty());
        assert!(signal.marked_at().is_some());

        signal.clear();
        assert!(!signal.is_dirty());
        assert!(signal.marked_at().is_some());
    }

    #[test]
    fn test_clones_share_state() {
        let signal = InvalidationSignal::new();
        let view = signal.clone();
        signal.mark_dirty();
        signal.mark_dirty();
        assert!(view.is_dirty());
        assert_eq!(view.state().generation, 2);
    }

    #[test]
    fn test_take_consumes_once() {
        let signal = InvalidationSignal::new();
        let (a, b) = (signal.clone(), signal.clone());
        signal.mark_dirty();
        assert!(a.take());
        assert!(!b.take());
    }

    #[tokio::test]
    async fn test_subscribers_wake_on_mark() {
        let signal = InvalidationSignal::new();
        let mut rx = signal.subscribe();
        signal.mark_dirty();
        rx.changed().await.expect("sender alive");
        assert!(rx.borrow_and_update().dirty);
    }
}
