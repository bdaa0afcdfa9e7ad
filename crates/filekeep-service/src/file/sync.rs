//! Push-driven reloading of a file collection from the change feed.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast::Receiver;
use tokio::sync::broadcast::error::{RecvError, TryRecvError};
use tokio::task::JoinHandle;
use tokio::time;
use tracing::{debug, trace, warn};

use filekeep_core::events::ChangeEvent;
use filekeep_core::traits::ChangeFeed;
use filekeep_core::types::WorkspaceId;
use filekeep_entity::Record;
use filekeep_entity::file::FileRecord;

use super::collection::{FileCollection, LoadOutcome};

/// Background task reloading a collection when its workspace's files change.
///
/// A burst of events is folded into one reload: after the first relevant
/// event the task waits for the coalescing delay, drops everything queued
/// meanwhile, then reloads. The task follows workspace switches of the
/// collection and stops when dropped.
#[derive(Debug)]
pub struct CollectionSync {
    handle: JoinHandle<()>,
}

impl CollectionSync {
    /// Subscribe to the collection's current workspace and start listening.
    ///
    /// The subscription is in place when this returns.
    pub async fn start(
        collection: FileCollection,
        feed: Arc<dyn ChangeFeed>,
        coalesce_delay: Duration,
    ) -> Self {
        let mut scopes = collection.subscribe_scope();
        let workspace_id = scopes.borrow_and_update().workspace_id;
        let events = feed.subscribe(workspace_id).await;

        debug!(%workspace_id, delay_ms = coalesce_delay.as_millis() as u64, "Collection sync started");

        let handle = tokio::spawn(async move {
            let mut worker = SyncWorker {
                collection,
                feed,
                delay: coalesce_delay,
                workspace_id,
                events,
            };
            loop {
                tokio::select! {
                    changed = scopes.changed() => {
                        if changed.is_err() {
                            break;
                        }
                        let next = scopes.borrow_and_update().workspace_id;
                        worker.follow(next).await;
                    }
                    received = worker.events.recv() => {
                        if !worker.handle(received).await {
                            break;
                        }
                    }
                }
            }
            debug!(workspace_id = %worker.workspace_id, "Collection sync stopped");
        });

        Self { handle }
    }

    /// Whether the task has ended (feed closed or task aborted).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Stop listening.
    pub fn stop(self) {
        self.handle.abort();
    }
}

impl Drop for CollectionSync {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

struct SyncWorker {
    collection: FileCollection,
    feed: Arc<dyn ChangeFeed>,
    delay: Duration,
    workspace_id: WorkspaceId,
    events: Receiver<ChangeEvent>,
}

impl SyncWorker {
    async fn follow(&mut self, workspace_id: WorkspaceId) {
        if workspace_id == self.workspace_id {
            return;
        }
        debug!(from = %self.workspace_id, to = %workspace_id, "Resubscribing change feed");
        self.workspace_id = workspace_id;
        self.events = self.feed.subscribe(workspace_id).await;
    }

    fn is_relevant(&self, event: &ChangeEvent) -> bool {
        event.workspace_id == self.workspace_id && event.is_for_table(FileRecord::TABLE)
    }

    /// Handle one receive result. Returns `false` when the feed closed.
    async fn handle(&mut self, received: Result<ChangeEvent, RecvError>) -> bool {
        match received {
            Ok(event) if self.is_relevant(&event) => {
                trace!(record_id = %event.record_id, kind = ?event.kind, "File change received");
            }
            Ok(_) => return true,
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "Change feed lagged, treating as a change");
            }
            Err(RecvError::Closed) => {
                debug!("Change feed closed");
                return false;
            }
        }

        time::sleep(self.delay).await;
        let folded = self.drain();
        if folded.closed {
            return false;
        }

        match self.collection.reload().await {
            Ok(LoadOutcome::Loaded(info)) => debug!(
                folded = folded.events,
                page = info.page,
                total = info.total_items,
                "Collection reloaded after remote change"
            ),
            Ok(outcome) => debug!(?outcome, "Push reload not applied"),
            Err(e) => warn!(error = %e, "Push reload failed"),
        }
        true
    }

    fn drain(&mut self) -> Drained {
        let mut drained = Drained::default();
        loop {
            match self.events.try_recv() {
                Ok(_) => drained.events += 1,
                Err(TryRecvError::Lagged(skipped)) => drained.events += skipped as usize,
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Closed) => {
                    drained.closed = true;
                    break;
                }
            }
        }
        drained
    }
}

#[derive(Debug, Default)]
struct Drained {
    events: usize,
    closed: bool,
}

#[cfg(test)]
mod tests {
    use filekeep_core::config::CollectionConfig;
    use filekeep_core::events::ChangeKind;
    use filekeep_core::traits::RecordStore;
    use filekeep_entity::file::{FileLocation, NewFileRecord};
    use filekeep_realtime::MemoryChangeFeed;
    use filekeep_store::{MemoryObjectStorage, MemoryRecordStore};
    use uuid::Uuid;

    use super::*;
    use crate::file::scope::Scope;
    use crate::signal::InvalidationSignal;

    fn file(ws: WorkspaceId, n: usize) -> FileRecord {
        NewFileRecord {
            workspace_id: ws,
            location: FileLocation::workspace_root(),
            name: format!("upload-{n}.bin"),
            size_bytes: 8,
            mime_type: None,
            storage_path: format!("objects/{n}"),
            tags: vec![],
        }
        .into_record()
        .expect("valid record")
    }

    async fn setup(ws: WorkspaceId) -> (Arc<MemoryChangeFeed>, Arc<dyn RecordStore>, FileCollection) {
        let feed = Arc::new(MemoryChangeFeed::new(64));
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::with_feed(feed.clone()));
        let collection = FileCollection::new(
            store.clone(),
            Arc::new(MemoryObjectStorage::new()),
            InvalidationSignal::new(),
            &CollectionConfig::default(),
            Scope::workspace(ws),
        );
        collection.load(1).await.expect("initial load");
        (feed, store, collection)
    }

    async fn insert(store: &dyn RecordStore, record: &FileRecord) {
        store
            .insert(FileRecord::TABLE, vec![record.to_row().expect("row")])
            .await
            .expect("insert");
    }

    #[tokio::test(start_paused = true)]
    async fn test_burst_is_folded_into_one_reload() {
        let ws = WorkspaceId::new();
        let (feed, store, collection) = setup(ws).await;
        let _sync = CollectionSync::start(collection.clone(), feed, Duration::from_millis(300)).await;

        for n in 0..3 {
            insert(store.as_ref(), &file(ws, n)).await;
            time::sleep(Duration::from_millis(50)).await;
        }
        time::sleep(Duration::from_millis(500)).await;

        assert_eq!(collection.load_count(), 2);
        assert_eq!(collection.items().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_other_tables_are_ignored() {
        let ws = WorkspaceId::new();
        let (feed, _store, collection) = setup(ws).await;
        let _sync =
            CollectionSync::start(collection.clone(), feed.clone(), Duration::from_millis(100)).await;

        feed.publish(ChangeEvent::new(ws, "folders", ChangeKind::Insert, Uuid::new_v4()))
            .await;
        time::sleep(Duration::from_millis(300)).await;
        assert_eq!(collection.load_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_follows_workspace_switch() {
        let (ws_a, ws_b) = (WorkspaceId::new(), WorkspaceId::new());
        let (feed, store, collection) = setup(ws_a).await;
        let _sync = CollectionSync::start(collection.clone(), feed, Duration::from_millis(100)).await;

        collection.select_workspace(ws_b).await.expect("switch");
        // let the task observe the scope change
        time::sleep(Duration::from_millis(10)).await;
        let loads = collection.load_count();

        insert(store.as_ref(), &file(ws_a, 1)).await;
        time::sleep(Duration::from_millis(300)).await;
        assert_eq!(collection.load_count(), loads);

        insert(store.as_ref(), &file(ws_b, 2)).await;
        time::sleep(Duration::from_millis(300)).await;
        assert_eq!(collection.load_count(), loads + 1);
        assert_eq!(collection.items().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_stops_the_task() {
        let ws = WorkspaceId::new();
        let (feed, store, collection) = setup(ws).await;
        let sync = CollectionSync::start(collection.clone(), feed, Duration::from_millis(100)).await;
        drop(sync);

        insert(store.as_ref(), &file(ws, 1)).await;
        time::sleep(Duration::from_millis(300)).await;
        assert_eq!(collection.load_count(), 1);
    }
}
