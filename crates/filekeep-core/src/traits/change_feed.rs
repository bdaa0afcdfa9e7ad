//! Change-notification feed trait.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::events::ChangeEvent;
use crate::types::WorkspaceId;

/// A best-effort feed of row-level changes, scoped by workspace.
///
/// Subscribers receive events published after they subscribed. Slow
/// subscribers may observe `RecvError::Lagged`, which callers should treat
/// as "something changed".
#[async_trait]
pub trait ChangeFeed: Send + Sync + std::fmt::Debug + 'static {
    /// Publish an event to the subscribers of its workspace.
    async fn publish(&self, event: ChangeEvent);

    /// Subscribe to changes in one workspace.
    async fn subscribe(&self, workspace_id: WorkspaceId) -> broadcast::Receiver<ChangeEvent>;
}
