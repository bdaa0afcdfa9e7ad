//! Shared test helpers for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{Duration, Utc};

use filekeep_core::config::{CollectionConfig, TaxonomyConfig};
use filekeep_core::traits::{ChangeFeed, RecordStore};
use filekeep_core::types::{FilterField, Query, Row, WorkspaceId};
use filekeep_entity::Record;
use filekeep_entity::file::{FileLocation, FileRecord, NewFileRecord};
use filekeep_entity::project::Project;
use filekeep_entity::workspace::Workspace;
use filekeep_realtime::MemoryChangeFeed;
use filekeep_service::{
    FileCollection, FolderTree, InvalidationSignal, Scope, TagTaxonomy, WorkspaceService,
};
use filekeep_store::{MemoryObjectStorage, MemoryRecordStore};

/// In-process application: memory store wired to a memory change feed.
pub struct TestApp {
    pub store: Arc<dyn RecordStore>,
    pub feed: Arc<MemoryChangeFeed>,
    pub objects: MemoryObjectStorage,
    pub signal: InvalidationSignal,
    pub workspace: Workspace,
    pub project: Project,
}

impl TestApp {
    /// Create an app with one workspace holding one project.
    pub async fn new() -> Self {
        Self::with_store(|inner| inner).await
    }

    /// Create an app whose record store is wrapped by `wrap`.
    pub async fn with_store<F>(wrap: F) -> Self
    where
        F: FnOnce(Arc<dyn RecordStore>) -> Arc<dyn RecordStore>,
    {
        let feed = Arc::new(MemoryChangeFeed::new(64));
        let inner: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::with_feed(
            feed.clone() as Arc<dyn ChangeFeed>
        ));
        let store = wrap(inner);
        let signal = InvalidationSignal::new();

        let service = WorkspaceService::new(store.clone(), signal.clone());
        let workspace = service
            .create_workspace("Acme", Some("#336699"))
            .await
            .expect("Failed to create workspace");
        let project = service
            .create_project(workspace.id, "Website", None, None)
            .await
            .expect("Failed to create project");
        signal.clear();

        Self {
            store,
            feed,
            objects: MemoryObjectStorage::new(),
            signal,
            workspace,
            project,
        }
    }

    pub fn ws(&self) -> WorkspaceId {
        self.workspace.id
    }

    pub fn workspaces(&self) -> WorkspaceService {
        WorkspaceService::new(self.store.clone(), self.signal.clone())
    }

    pub fn collection(&self, scope: Scope) -> FileCollection {
        FileCollection::new(
            self.store.clone(),
            Arc::new(self.objects.clone()),
            self.signal.clone(),
            &CollectionConfig::default(),
            scope,
        )
    }

    pub async fn tree(&self) -> FolderTree {
        FolderTree::load(self.store.clone(), self.signal.clone(), self.project.id)
            .await
            .expect("Failed to load folder tree")
    }

    pub fn taxonomy(&self) -> TagTaxonomy {
        let config = TaxonomyConfig {
            batch_size: 2,
            batch_delay_ms: 10,
        };
        TagTaxonomy::new(self.store.clone(), self.signal.clone(), config, self.ws())
    }

    /// Build a file record `n` minutes after a fixed base time.
    pub fn file(&self, location: FileLocation, n: i64, tags: &[&str]) -> FileRecord {
        let mut record = NewFileRecord {
            workspace_id: self.ws(),
            location,
            name: format!("file-{n:02}.txt"),
            size_bytes: 128,
            mime_type: Some("text/plain".into()),
            storage_path: format!("{}/{n}", self.ws()),
            tags: tags.iter().map(|t| t.to_string()).collect(),
        }
        .into_record()
        .expect("Failed to build record");
        record.created_at = Utc::now() - Duration::days(1) + Duration::minutes(n);
        record
    }

    /// Insert records straight into the store.
    pub async fn seed(&self, files: &[FileRecord]) {
        let rows: Vec<Row> = files
            .iter()
            .map(|f| f.to_row().expect("Failed to encode record"))
            .collect();
        self.store
            .insert(FileRecord::TABLE, rows)
            .await
            .expect("Failed to seed files");
    }

    /// Read one file back from the store, deleted or not.
    pub async fn stored(&self, file: &FileRecord) -> FileRecord {
        let query = Query::new().filter(FilterField::eq_id("id", file.id));
        let rows = self
            .store
            .query(FileRecord::TABLE, &query)
            .await
            .expect("Failed to query file");
        FileRecord::from_rows(rows)
            .expect("Failed to decode file")
            .pop()
            .expect("File missing from store")
    }
}
