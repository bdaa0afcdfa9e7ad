//! Feed delivery counters.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Feed-level metrics counters.
#[derive(Debug, Default)]
pub struct FeedMetrics {
    /// Events handed to the feed
    pub published: AtomicU64,
    /// Events delivered to at least one subscriber
    pub delivered: AtomicU64,
    /// Events dropped because nobody was listening
    pub dropped: AtomicU64,
    /// Subscribe operations
    pub subscriptions: AtomicU64,
}

impl FeedMetrics {
    /// Create new zeroed metrics
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the outcome of one publish
    pub fn record_publish(&self, receivers: usize) {
        self.published.fetch_add(1, Ordering::Relaxed);
        if receivers > 0 {
            self.delivered.fetch_add(1, Ordering::Relaxed);
        } else {
            self.dropped.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a subscription
    pub fn record_subscribe(&self) {
        self.subscriptions.fetch_add(1, Ordering::Relaxed);
    }

    /// Get a snapshot of all metrics
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            delivered: self.delivered.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            subscriptions: self.subscriptions.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`FeedMetrics`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// Events handed to the feed
    pub published: u64,
    /// Events delivered to at least one subscriber
    pub delivered: u64,
    /// Events dropped because nobody was listening
    pub dropped: u64,
    /// Subscribe operations
    pub subscriptions: u64,
}
