//! In-memory change feed for single-process deployments.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;
use tokio::sync::broadcast;
use tracing::trace;

use filekeep_core::events::ChangeEvent;
use filekeep_core::traits::ChangeFeed;
use filekeep_core::types::WorkspaceId;

use crate::channel::ChannelType;
use crate::metrics::{FeedMetrics, MetricsSnapshot};

/// In-memory change feed: one broadcast channel per workspace.
#[derive(Debug)]
pub struct MemoryChangeFeed {
    /// Channel name → broadcast sender
    channels: RwLock<HashMap<String, broadcast::Sender<ChangeEvent>>>,
    /// Buffer size for channels
    buffer_size: usize,
    metrics: FeedMetrics,
}

impl MemoryChangeFeed {
    /// Create a new in-memory feed
    pub fn new(buffer_size: usize) -> Self {
        Self {
            channels: RwLock::new(HashMap::new()),
            buffer_size: buffer_size.max(1),
            metrics: FeedMetrics::new(),
        }
    }

    /// Number of live subscribers for a workspace
    pub async fn subscriber_count(&self, workspace_id: WorkspaceId) -> usize {
        let name = ChannelType::Workspace(workspace_id).to_channel_string();
        self.channels
            .read()
            .await
            .get(&name)
            .map_or(0, broadcast::Sender::receiver_count)
    }

    /// Delivery counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

impl Default for MemoryChangeFeed {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl ChangeFeed for MemoryChangeFeed {
    async fn publish(&self, event: ChangeEvent) {
        let name = ChannelType::Workspace(event.workspace_id).to_channel_string();
        let channels = self.channels.read().await;
        let receivers = match channels.get(&name) {
            Some(tx) => tx.send(event).unwrap_or(0),
            None => 0,
        };
        trace!(channel = %name, receivers, "Published change event");
        self.metrics.record_publish(receivers);
    }

    async fn subscribe(&self, workspace_id: WorkspaceId) -> broadcast::Receiver<ChangeEvent> {
        let name = ChannelType::Workspace(workspace_id).to_channel_string();
        let mut channels = self.channels.write().await;
        let tx = channels
            .entry(name)
            .or_insert_with(|| broadcast::channel(self.buffer_size).0);
        self.metrics.record_subscribe();
        tx.subscribe()
    }
}
