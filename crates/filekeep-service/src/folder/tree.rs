//! Folder hierarchy of one project: tree reads and structural mutations.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{debug, error, info, warn};

use filekeep_core::error::AppError;
use filekeep_core::result::AppResult;
use filekeep_core::traits::RecordStore;
use filekeep_core::types::{FilterField, FolderId, ProjectId, Query, SortField};
use filekeep_entity::Record;
use filekeep_entity::file::FileRecord;
use filekeep_entity::folder::model::validate_folder_name;
use filekeep_entity::folder::{Folder, FolderIndex, FolderNode};
use filekeep_entity::record::tables;

use super::validator::{MoveRejection, MoveValidator};
use crate::records::{fetch_all, fields, insert_one};
use crate::signal::InvalidationSignal;

/// Result of a folder move.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOutcome {
    /// The folder was reparented; carries the folder with its new path.
    Moved(Folder),
    /// The folder already sat under the requested parent. Nothing was written.
    Unchanged,
}

/// What a folder deletion did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FolderDeletion {
    /// The removed folder.
    pub folder: Folder,
    /// Where its contents went (`None` for project root).
    pub new_parent: Option<FolderId>,
    /// Files moved up to the new parent.
    pub files_reparented: u64,
    /// Subfolders moved up to the new parent.
    pub folders_reparented: u64,
}

impl FolderDeletion {
    /// Where a view positioned at `current` should navigate after the deletion.
    pub fn next_position(&self, current: Option<FolderId>) -> Option<FolderId> {
        if current == Some(self.folder.id) {
            self.new_parent
        } else {
            current
        }
    }
}

/// The folders of one project, held locally and kept in step with the store.
///
/// Paths are recomputed from the parent chain on every reload; any stored
/// path that drifted is written back after structural changes.
#[derive(Debug)]
pub struct FolderTree {
    store: Arc<dyn RecordStore>,
    signal: InvalidationSignal,
    project_id: ProjectId,
    index: FolderIndex,
    file_counts: HashMap<FolderId, u64>,
    /// Folders whose stored path differs from the computed one.
    stale_paths: Vec<FolderId>,
}

impl FolderTree {
    /// Load the folder hierarchy of a project.
    pub async fn load(
        store: Arc<dyn RecordStore>,
        signal: InvalidationSignal,
        project_id: ProjectId,
    ) -> AppResult<Self> {
        let mut tree = Self {
            store,
            signal,
            project_id,
            index: FolderIndex::default(),
            file_counts: HashMap::new(),
            stale_paths: Vec::new(),
        };
        tree.reload().await?;
        Ok(tree)
    }

    /// Re-read folders and file counts from the store.
    pub async fn reload(&mut self) -> AppResult<()> {
        let query = Query::new()
            .filter(FilterField::eq_id("project_id", self.project_id))
            .order_by(SortField::asc("created_at"));
        let folders: Vec<Folder> = fetch_all(self.store.as_ref(), &query).await?;

        let file_query = Query::new()
            .filter(FilterField::eq_id("project_id", self.project_id))
            .filter(FilterField::is_not_null("folder_id"))
            .filter(FilterField::is_null("deleted_at"));
        let files: Vec<FileRecord> = fetch_all(self.store.as_ref(), &file_query).await?;
        let mut counts = HashMap::new();
        for folder_id in files.iter().filter_map(|f| f.folder_id) {
            *counts.entry(folder_id).or_insert(0) += 1;
        }

        let mut index = FolderIndex::new(&folders);
        self.stale_paths = index.materialize_paths();
        self.index = index;
        self.file_counts = counts;

        debug!(
            project_id = %self.project_id,
            folders = self.index.len(),
            stale_paths = self.stale_paths.len(),
            "Folder tree loaded"
        );
        Ok(())
    }

    /// The project this tree belongs to.
    pub fn project_id(&self) -> ProjectId {
        self.project_id
    }

    /// The loaded folder index.
    pub fn index(&self) -> &FolderIndex {
        &self.index
    }

    /// Look up a loaded folder.
    pub fn get(&self, id: FolderId) -> Option<&Folder> {
        self.index.get(id)
    }

    /// Root nodes with children and file counts populated.
    pub fn build(&self) -> Vec<FolderNode> {
        self.index.build(&self.file_counts)
    }

    /// Direct children of `parent` (`None` for project root).
    pub fn children(&self, parent: Option<FolderId>) -> Vec<&Folder> {
        self.index.children_of(parent)
    }

    /// Number of live files directly inside a folder.
    pub fn file_count(&self, id: FolderId) -> u64 {
        self.file_counts.get(&id).copied().unwrap_or(0)
    }

    /// Breadcrumb names from the project root down to `id` inclusive.
    ///
    /// `None` is the project root and yields an empty list.
    pub fn path_of(&self, id: Option<FolderId>) -> AppResult<Vec<String>> {
        match id {
            None => Ok(Vec::new()),
            Some(id) if self.index.contains(id) => Ok(self.index.path_names(id)),
            Some(id) => Err(AppError::not_found(format!("Folder {id} not found"))),
        }
    }

    /// Create a folder under `parent` (`None` for project root).
    pub async fn create(&mut self, name: &str, parent: Option<FolderId>) -> AppResult<Folder> {
        let name = validate_folder_name(name)?;
        if let Some(parent_id) = parent {
            if !self.index.contains(parent_id) {
                return Err(AppError::not_found(format!("Parent folder {parent_id} not found")));
            }
        }
        self.ensure_unique_name(parent, &name, None)?;

        let mut folder = Folder::new(self.project_id, parent, &name)?;
        let mut names = self.path_of(parent)?;
        names.push(name);
        folder.path = names.join("/");

        let created = insert_one(self.store.as_ref(), &folder).await?;
        self.refresh_after_change().await;

        info!(
            project_id = %self.project_id,
            folder_id = %created.id,
            path = %created.path,
            "Folder created"
        );
        Ok(self.index.get(created.id).cloned().unwrap_or(created))
    }

    /// Rename a folder. Paths of the folder and its descendants are recomputed.
    pub async fn rename(&mut self, id: FolderId, new_name: &str) -> AppResult<Folder> {
        let name = validate_folder_name(new_name)?;
        let folder = self.require(id)?.clone();
        if folder.name == name {
            return Ok(folder);
        }
        self.ensure_unique_name(self.index.effective_parent(id), &name, Some(id))?;

        self.store
            .update(
                Folder::TABLE,
                id.into_uuid(),
                fields(json!({ "name": name, "updated_at": Utc::now() })),
            )
            .await?;
        self.refresh_after_change().await;

        info!(
            project_id = %self.project_id,
            folder_id = %id,
            old_name = %folder.name,
            new_name = %name,
            "Folder renamed"
        );
        self.require(id).cloned()
    }

    /// Move a folder under `target` (`None` for project root).
    ///
    /// Illegal moves are rejected with an invalid-move error before any write.
    pub async fn move_folder(
        &mut self,
        id: FolderId,
        target: Option<FolderId>,
    ) -> AppResult<MoveOutcome> {
        match MoveValidator::new(&self.index).check_folder_move(id, target) {
            Ok(()) => {}
            Err(MoveRejection::Unchanged) => return Ok(MoveOutcome::Unchanged),
            Err(rejection) => {
                warn!(folder_id = %id, target = ?target, %rejection, "Folder move rejected");
                return Err(rejection.into_error());
            }
        }

        self.store
            .update(
                Folder::TABLE,
                id.into_uuid(),
                fields(json!({ "parent_id": target, "updated_at": Utc::now() })),
            )
            .await?;
        self.refresh_after_change().await;

        info!(
            project_id = %self.project_id,
            folder_id = %id,
            new_parent = ?target,
            "Folder moved"
        );
        self.require(id).cloned().map(MoveOutcome::Moved)
    }

    /// Delete a folder, moving its files and subfolders up to its parent.
    ///
    /// Steps run in the order files, subfolders, folder row. The first
    /// failing step aborts the rest, leaving the folder in place.
    pub async fn delete(&mut self, id: FolderId) -> AppResult<FolderDeletion> {
        let folder = self.require(id)?.clone();
        let new_parent = self.index.effective_parent(id);
        let now = Utc::now();

        let (files_reparented, folders_reparented) = match self.cascade(id, new_parent, now).await {
            Ok(counts) => counts,
            Err(e) => {
                // Earlier steps may have moved contents already.
                self.refresh_after_change().await;
                return Err(e);
            }
        };

        self.refresh_after_change().await;
        info!(
            project_id = %self.project_id,
            folder_id = %id,
            new_parent = ?new_parent,
            files_reparented,
            folders_reparented,
            "Folder deleted"
        );

        Ok(FolderDeletion {
            folder,
            new_parent,
            files_reparented,
            folders_reparented,
        })
    }

    async fn cascade(
        &self,
        id: FolderId,
        new_parent: Option<FolderId>,
        now: chrono::DateTime<Utc>,
    ) -> AppResult<(u64, u64)> {
        let files = self
            .store
            .update_where(
                tables::FILES,
                &[FilterField::eq_id("folder_id", id)],
                fields(json!({ "folder_id": new_parent, "updated_at": now })),
            )
            .await
            .inspect_err(|e| error!(folder_id = %id, error = %e, "Failed to reparent files"))?;

        let folders = self
            .store
            .update_where(
                tables::FOLDERS,
                &[FilterField::eq_id("parent_id", id)],
                fields(json!({ "parent_id": new_parent, "updated_at": now })),
            )
            .await
            .inspect_err(|e| error!(folder_id = %id, error = %e, "Failed to reparent subfolders"))?;

        let removed = self
            .store
            .delete(tables::FOLDERS, id.into_uuid())
            .await
            .inspect_err(|e| error!(folder_id = %id, error = %e, "Failed to delete folder row"))?;
        if !removed {
            return Err(AppError::not_found(format!("Folder {id} not found")));
        }

        Ok((files, folders))
    }

    /// Reload after a write, persist drifted paths, and raise the signal.
    async fn refresh_after_change(&mut self) {
        self.signal.mark_dirty();
        if let Err(e) = self.reload().await {
            warn!(project_id = %self.project_id, error = %e, "Failed to reload folder tree");
            return;
        }
        self.write_back_paths().await;
    }

    /// Store computed paths for folders whose stored path drifted.
    async fn write_back_paths(&mut self) {
        let stale = std::mem::take(&mut self.stale_paths);
        for id in stale {
            let Some(path) = self.index.get(id).map(|f| f.path.clone()) else {
                continue;
            };
            let result = self
                .store
                .update(Folder::TABLE, id.into_uuid(), fields(json!({ "path": path })))
                .await;
            if let Err(e) = result {
                warn!(folder_id = %id, error = %e, "Failed to store folder path");
                self.stale_paths.push(id);
            }
        }
    }

    fn require(&self, id: FolderId) -> AppResult<&Folder> {
        self.index
            .get(id)
            .ok_or_else(|| AppError::not_found(format!("Folder {id} not found")))
    }

    fn ensure_unique_name(
        &self,
        parent: Option<FolderId>,
        name: &str,
        except: Option<FolderId>,
    ) -> AppResult<()> {
        let taken = self
            .index
            .children_of(parent)
            .iter()
            .any(|f| Some(f.id) != except && f.name.eq_ignore_ascii_case(name));
        if taken {
            return Err(AppError::conflict(format!(
                "A folder named '{name}' already exists here"
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use filekeep_core::types::{Row, WorkspaceId};
    use filekeep_entity::file::{FileLocation, NewFileRecord};
    use filekeep_store::{FailingStore, FailureRule, MemoryRecordStore};

    use super::*;

    async fn tree_with(store: Arc<dyn RecordStore>) -> (FolderTree, InvalidationSignal) {
        let signal = InvalidationSignal::new();
        let tree = FolderTree::load(store, signal.clone(), ProjectId::new())
            .await
            .expect("load");
        (tree, signal)
    }

    async fn add_file(store: &dyn RecordStore, project: ProjectId, folder: FolderId) -> FileRecord {
        let record = NewFileRecord {
            workspace_id: WorkspaceId::new(),
            location: FileLocation::folder(project, folder),
            name: "scan.png".into(),
            size_bytes: 3,
            mime_type: Some("image/png".into()),
            storage_path: "objects/scan.png".into(),
            tags: vec![],
        }
        .into_record()
        .expect("record");
        let row: Row = record.to_row().expect("row");
        store.insert(tables::FILES, vec![row]).await.expect("insert");
        record
    }

    #[tokio::test]
    async fn test_create_materializes_path_and_marks_dirty() {
        let (mut tree, signal) = tree_with(Arc::new(MemoryRecordStore::new())).await;
        let docs = tree.create("Docs", None).await.expect("docs");
        let reports = tree.create("Reports", Some(docs.id)).await.expect("reports");

        assert_eq!(reports.path, "Docs/Reports");
        assert_eq!(tree.path_of(Some(reports.id)).expect("path"), vec!["Docs", "Reports"]);
        assert!(tree.path_of(None).expect("root").is_empty());
        assert!(signal.is_dirty());

        let err = tree.create("docs", None).await.expect_err("duplicate");
        assert_eq!(err.kind, filekeep_core::ErrorKind::Conflict);
        let err = tree.create("a/b", None).await.expect_err("separator");
        assert_eq!(err.kind, filekeep_core::ErrorKind::Validation);
    }

    #[tokio::test]
    async fn test_rename_refreshes_descendant_paths() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        let (mut tree, _) = tree_with(store.clone()).await;
        let docs = tree.create("Docs", None).await.expect("docs");
        let reports = tree.create("Reports", Some(docs.id)).await.expect("reports");
        let q1 = tree.create("Q1", Some(reports.id)).await.expect("q1");

        tree.rename(docs.id, "Archive").await.expect("rename");
        assert_eq!(tree.get(q1.id).map(|f| f.path.as_str()), Some("Archive/Reports/Q1"));

        let reloaded = FolderTree::load(store, InvalidationSignal::new(), tree.project_id())
            .await
            .expect("reload");
        assert!(reloaded.stale_paths.is_empty());
    }

    #[tokio::test]
    async fn test_illegal_move_writes_nothing() {
        let inner: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        let failing = FailingStore::new(inner);
        let (mut tree, signal) = tree_with(Arc::new(failing.clone())).await;
        let a = tree.create("a", None).await.expect("a");
        let b = tree.create("b", Some(a.id)).await.expect("b");
        signal.clear();
        let writes = failing.write_count();

        let err = tree.move_folder(a.id, Some(b.id)).await.expect_err("cycle");
        assert_eq!(err.kind, filekeep_core::ErrorKind::InvalidMove);
        assert_eq!(
            tree.move_folder(b.id, Some(a.id)).await.expect("no-op"),
            MoveOutcome::Unchanged
        );
        assert_eq!(failing.write_count(), writes);
        assert!(!signal.is_dirty());

        let moved = tree.move_folder(b.id, None).await.expect("move to root");
        assert_eq!(moved, MoveOutcome::Moved(tree.get(b.id).cloned().expect("b")));
        assert_eq!(tree.get(b.id).map(|f| f.path.as_str()), Some("b"));
    }

    #[tokio::test]
    async fn test_delete_nested_folder_cascades_to_parent() {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        let (mut tree, _) = tree_with(store.clone()).await;
        let docs = tree.create("Docs", None).await.expect("docs");
        let reports = tree.create("Reports", Some(docs.id)).await.expect("reports");
        let q1 = tree.create("Q1", Some(reports.id)).await.expect("q1");
        let file = add_file(store.as_ref(), tree.project_id(), reports.id).await;
        tree.reload().await.expect("reload");
        assert_eq!(tree.file_count(reports.id), 1);

        let deletion = tree.delete(reports.id).await.expect("delete");
        assert_eq!(deletion.new_parent, Some(docs.id));
        assert_eq!(deletion.files_reparented, 1);
        assert_eq!(deletion.folders_reparented, 1);
        assert_eq!(deletion.next_position(Some(reports.id)), Some(docs.id));
        assert_eq!(deletion.next_position(Some(q1.id)), Some(q1.id));

        assert!(tree.get(reports.id).is_none());
        assert_eq!(tree.get(q1.id).and_then(|f| f.parent_id), Some(docs.id));
        assert_eq!(tree.get(q1.id).map(|f| f.path.as_str()), Some("Docs/Q1"));
        assert_eq!(tree.file_count(docs.id), 1);

        let stored: Vec<FileRecord> = fetch_all(
            store.as_ref(),
            &Query::new().filter(FilterField::eq_id("id", file.id)),
        )
        .await
        .expect("file");
        assert_eq!(stored[0].folder_id, Some(docs.id));
    }

    #[tokio::test]
    async fn test_failed_cascade_keeps_folder() {
        let inner: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        let failing = FailingStore::new(inner);
        let (mut tree, _) = tree_with(Arc::new(failing.clone())).await;
        let docs = tree.create("Docs", None).await.expect("docs");
        let child = tree.create("Child", Some(docs.id)).await.expect("child");

        failing.fail(FailureRule::UpdateWhereOn(tables::FOLDERS.to_string()));
        let err = tree.delete(docs.id).await.expect_err("cascade fails");
        assert_eq!(err.kind, filekeep_core::ErrorKind::Store);
        assert!(tree.get(docs.id).is_some());
        assert_eq!(tree.get(child.id).and_then(|f| f.parent_id), Some(docs.id));
    }
}
