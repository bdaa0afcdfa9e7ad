//! Collaborators shared by every CLI command.

use std::sync::Arc;

use filekeep_core::config::AppConfig;
use filekeep_core::result::AppResult;
use filekeep_core::traits::{ObjectStorage, RecordStore};
use filekeep_core::types::{ProjectId, WorkspaceId};
use filekeep_service::{
    FileCollection, FolderTree, InvalidationSignal, Scope, TagTaxonomy, WorkspaceService,
};
use filekeep_store::{LocalObjectStorage, SnapshotStore};

/// Opened stores plus the configuration they came from.
#[derive(Debug, Clone)]
pub struct CliContext {
    /// Loaded configuration.
    pub config: AppConfig,
    /// Snapshot-backed record store.
    pub store: Arc<SnapshotStore>,
    /// Local object storage.
    pub objects: Arc<LocalObjectStorage>,
    /// Invalidation signal shared by the services of this run.
    pub signal: InvalidationSignal,
}

impl CliContext {
    /// Open the record snapshot and object root named in `config`.
    pub async fn open(config: AppConfig) -> AppResult<Self> {
        let store = SnapshotStore::open(&config.store.snapshot_path, None).await?;
        let objects = LocalObjectStorage::new(&config.store.object_root).await?;
        tracing::debug!(
            snapshot = %config.store.snapshot_path,
            objects = %config.store.object_root,
            "CLI context opened"
        );
        Ok(Self {
            config,
            store: Arc::new(store),
            objects: Arc::new(objects),
            signal: InvalidationSignal::new(),
        })
    }

    /// The record store as a trait object.
    pub fn records(&self) -> Arc<dyn RecordStore> {
        self.store.clone()
    }

    /// Workspace and project management.
    pub fn workspaces(&self) -> WorkspaceService {
        WorkspaceService::new(self.records(), self.signal.clone())
    }

    /// An unloaded file collection over `scope`.
    pub fn collection(&self, scope: Scope) -> FileCollection {
        let objects: Arc<dyn ObjectStorage> = self.objects.clone();
        FileCollection::new(
            self.records(),
            objects,
            self.signal.clone(),
            &self.config.collection,
            scope,
        )
    }

    /// The folder tree of a project.
    pub async fn tree(&self, project_id: ProjectId) -> AppResult<FolderTree> {
        FolderTree::load(self.records(), self.signal.clone(), project_id).await
    }

    /// The tag taxonomy of a workspace.
    pub fn taxonomy(&self, workspace_id: WorkspaceId) -> TagTaxonomy {
        TagTaxonomy::new(
            self.records(),
            self.signal.clone(),
            self.config.taxonomy.clone(),
            workspace_id,
        )
    }
}
