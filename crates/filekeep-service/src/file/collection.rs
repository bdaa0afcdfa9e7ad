//! Paginated, optimistic view over the file records of one scope.
//!
//! Local edits are mirrored into the held page before the store confirms
//! them and rolled back if the write fails. Loads are guarded twice: a
//! second load of the same scope while one is outstanding is skipped, and a
//! response whose request sequence was superseded is discarded.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use serde_json::json;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use filekeep_core::config::CollectionConfig;
use filekeep_core::error::AppError;
use filekeep_core::result::AppResult;
use filekeep_core::traits::{ObjectStorage, RecordStore};
use filekeep_core::types::{
    FileId, FolderId, PageInfo, PageRequest, ProjectId, Query, SortField, WorkspaceId,
};
use filekeep_entity::Record;
use filekeep_entity::file::{FileLocation, FilePatch, FileRecord};
use filekeep_entity::folder::Folder;
use filekeep_entity::project::Project;
use filekeep_entity::workspace::validate_name;

use super::scope::{ContentFilter, Scope};
use crate::folder::MoveValidator;
use crate::records::{fields, find_by_id, update_one};
use crate::signal::InvalidationSignal;
use crate::tag::{TagStat, clean, contains_tag, dedup_tags, normalize, stats};

/// What a load call did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The page was fetched and applied.
    Loaded(PageInfo),
    /// Nothing was fetched: a load of this scope is already running, or
    /// there is no page in the requested direction.
    Skipped,
    /// The response arrived after the scope changed and was discarded.
    Stale,
}

/// Result of a tag edit on one file.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum TagEdit {
    /// The tag set changed and was written.
    Changed(FileRecord),
    /// The tag set already had the requested shape.
    Unchanged(FileRecord),
}

impl TagEdit {
    pub(crate) fn into_record(self) -> FileRecord {
        match self {
            Self::Changed(record) | Self::Unchanged(record) => record,
        }
    }
}

#[derive(Debug)]
struct InFlight {
    sequence: u64,
    scope: Scope,
}

#[derive(Debug)]
struct CollectionState {
    scope: Scope,
    page: u64,
    items: Vec<FileRecord>,
    total: u64,
    loaded: bool,
    /// Bumped by every load start and every scope change.
    sequence: u64,
    in_flight: Option<InFlight>,
    loads: u64,
}

/// A page of file records for one scope, kept in step with the store.
///
/// Cheap to clone; clones share state.
#[derive(Debug, Clone)]
pub struct FileCollection {
    store: Arc<dyn RecordStore>,
    storage: Arc<dyn ObjectStorage>,
    signal: InvalidationSignal,
    page_size: u64,
    state: Arc<Mutex<CollectionState>>,
    scope_tx: Arc<watch::Sender<Scope>>,
}

impl FileCollection {
    /// Creates an unloaded collection over `scope`.
    pub fn new(
        store: Arc<dyn RecordStore>,
        storage: Arc<dyn ObjectStorage>,
        signal: InvalidationSignal,
        config: &CollectionConfig,
        scope: Scope,
    ) -> Self {
        let (scope_tx, _rx) = watch::channel(scope.clone());
        Self {
            store,
            storage,
            signal,
            page_size: config.effective_page_size(),
            state: Arc::new(Mutex::new(CollectionState {
                scope,
                page: 1,
                items: Vec::new(),
                total: 0,
                loaded: false,
                sequence: 0,
                in_flight: None,
                loads: 0,
            })),
            scope_tx: Arc::new(scope_tx),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CollectionState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Current scope.
    pub fn scope(&self) -> Scope {
        self.lock().scope.clone()
    }

    /// Watch scope changes.
    pub fn subscribe_scope(&self) -> watch::Receiver<Scope> {
        self.scope_tx.subscribe()
    }

    /// Records on the current page.
    pub fn items(&self) -> Vec<FileRecord> {
        self.lock().items.clone()
    }

    /// A record held on the current page.
    pub fn get(&self, id: FileId) -> Option<FileRecord> {
        self.lock().items.iter().find(|r| r.id == id).cloned()
    }

    /// Current page number (1-based).
    pub fn page(&self) -> u64 {
        self.lock().page
    }

    /// Records per page.
    pub fn page_size(&self) -> u64 {
        self.page_size
    }

    /// Total records in scope, as last loaded and locally adjusted.
    pub fn total(&self) -> u64 {
        self.lock().total
    }

    /// Navigation values for the current page.
    pub fn page_info(&self) -> PageInfo {
        let state = self.lock();
        PageInfo::new(PageRequest::new(state.page, self.page_size), state.total)
    }

    /// Whether a load of the current scope is outstanding.
    pub fn is_loading(&self) -> bool {
        let state = self.lock();
        state.in_flight.as_ref().is_some_and(|f| f.scope == state.scope)
    }

    /// Whether the current scope has been loaded at least once.
    pub fn is_loaded(&self) -> bool {
        self.lock().loaded
    }

    /// Number of loads applied so far.
    pub fn load_count(&self) -> u64 {
        self.lock().loads
    }

    /// The signal this collection raises after mutations.
    pub fn signal(&self) -> &InvalidationSignal {
        &self.signal
    }

    /// Tag statistics over the current page.
    pub fn tag_stats(&self) -> Vec<TagStat> {
        stats(&self.lock().items)
    }

    /// Fetch `page` of the current scope and apply it.
    pub async fn load(&self, page: u64) -> AppResult<LoadOutcome> {
        let (sequence, scope, request) = {
            let mut state = self.lock();
            if state.in_flight.as_ref().is_some_and(|f| f.scope == state.scope) {
                debug!(page, "Load already in flight, skipping");
                return Ok(LoadOutcome::Skipped);
            }
            state.sequence += 1;
            let scope = state.scope.clone();
            state.in_flight = Some(InFlight {
                sequence: state.sequence,
                scope: scope.clone(),
            });
            (state.sequence, scope, PageRequest::new(page, self.page_size))
        };

        let result = self.fetch(&scope, request).await;

        let mut state = self.lock();
        if state.in_flight.as_ref().is_some_and(|f| f.sequence == sequence) {
            state.in_flight = None;
        }
        if state.sequence != sequence {
            debug!(sequence, current = state.sequence, "Discarding stale load response");
            return Ok(LoadOutcome::Stale);
        }

        let (items, total) = result?;
        state.items = items;
        state.total = total;
        state.page = request.page;
        state.loaded = true;
        state.loads += 1;

        let info = PageInfo::new(request, total);
        debug!(
            workspace_id = %scope.workspace_id,
            page = info.page,
            total = info.total_items,
            "File page loaded"
        );
        Ok(LoadOutcome::Loaded(info))
    }

    async fn fetch(&self, scope: &Scope, request: PageRequest) -> AppResult<(Vec<FileRecord>, u64)> {
        let filters = scope.filters();
        let query = Query::with_filters(filters.clone())
            .order_by(SortField::desc("created_at"))
            .order_by(SortField::asc("id"))
            .window(request.offset(), request.limit());

        let (total, rows) = futures::try_join!(
            self.store.count(FileRecord::TABLE, &filters),
            self.store.query(FileRecord::TABLE, &query),
        )?;
        Ok((FileRecord::from_rows(rows)?, total))
    }

    /// Reload the current page. Steps back when the page no longer exists.
    pub async fn reload(&self) -> AppResult<LoadOutcome> {
        let page = self.page();
        let outcome = self.load(page).await?;
        if let LoadOutcome::Loaded(info) = outcome {
            if page > 1 && info.total_pages < page {
                return self.load(info.total_pages.max(1)).await;
            }
        }
        Ok(outcome)
    }

    /// Reload if the invalidation signal is set, then clear it.
    ///
    /// Returns `None` when the signal was clean.
    pub async fn refresh_if_dirty(&self) -> AppResult<Option<LoadOutcome>> {
        if !self.signal.is_dirty() {
            return Ok(None);
        }
        let outcome = self.reload().await?;
        if matches!(outcome, LoadOutcome::Loaded(_)) {
            self.signal.clear();
        }
        Ok(Some(outcome))
    }

    /// Switch to another scope and load its first page.
    ///
    /// Any load of the previous scope still in flight becomes stale.
    pub async fn set_scope(&self, scope: Scope) -> AppResult<LoadOutcome> {
        if !scope.is_well_formed() {
            return Err(AppError::validation("A folder scope requires a project"));
        }
        {
            let mut state = self.lock();
            if state.scope == scope && state.loaded {
                return Ok(LoadOutcome::Skipped);
            }
            state.scope = scope.clone();
            state.sequence += 1;
            state.in_flight = None;
            state.items.clear();
            state.total = 0;
            state.page = 1;
            state.loaded = false;
        }
        self.scope_tx.send_replace(scope.clone());
        debug!(
            workspace_id = %scope.workspace_id,
            project_id = ?scope.project_id,
            folder_id = ?scope.folder_id,
            "Collection scope changed"
        );
        self.load(1).await
    }

    /// Show every file of a workspace.
    pub async fn select_workspace(&self, workspace_id: WorkspaceId) -> AppResult<LoadOutcome> {
        self.set_scope(Scope::workspace(workspace_id)).await
    }

    /// Narrow to a project root, or widen back to the workspace with `None`.
    pub async fn select_project(&self, project_id: Option<ProjectId>) -> AppResult<LoadOutcome> {
        let current = self.scope();
        let scope = match project_id {
            Some(p) => Scope::project(current.workspace_id, p),
            None => Scope::workspace(current.workspace_id),
        };
        self.set_scope(scope.with_filter(current.filter)).await
    }

    /// Narrow to a folder of the current project, or back to its root with `None`.
    pub async fn select_folder(&self, folder_id: Option<FolderId>) -> AppResult<LoadOutcome> {
        let current = self.scope();
        let Some(project_id) = current.project_id else {
            return Err(AppError::validation("Select a project before selecting a folder"));
        };
        let scope = match folder_id {
            Some(f) => Scope::folder(current.workspace_id, project_id, f),
            None => Scope::project(current.workspace_id, project_id),
        };
        self.set_scope(scope.with_filter(current.filter)).await
    }

    /// Change the content filter of the current location.
    pub async fn set_filter(&self, filter: ContentFilter) -> AppResult<LoadOutcome> {
        self.set_scope(self.scope().with_filter(filter)).await
    }

    /// Load the following page, if any.
    pub async fn next_page(&self) -> AppResult<LoadOutcome> {
        let info = self.page_info();
        if !info.has_next {
            return Ok(LoadOutcome::Skipped);
        }
        self.load(info.page + 1).await
    }

    /// Load the preceding page, if any.
    pub async fn prev_page(&self) -> AppResult<LoadOutcome> {
        let info = self.page_info();
        if !info.has_previous {
            return Ok(LoadOutcome::Skipped);
        }
        self.load(info.page - 1).await
    }

    /// Load `page`, clamped to the known page range.
    pub async fn go_to_page(&self, page: u64) -> AppResult<LoadOutcome> {
        if !self.is_loaded() {
            return self.load(page.max(1)).await;
        }
        let last = self.page_info().total_pages.max(1);
        self.load(page.clamp(1, last)).await
    }

    /// Take in records persisted elsewhere (for example by an upload).
    ///
    /// Records outside the scope and ids already held are ignored. New
    /// records are prepended when page 1 is shown. Returns how many were
    /// taken in. The store is not touched; the next load is authoritative.
    pub fn add_local(&self, records: Vec<FileRecord>) -> usize {
        let mut state = self.lock();
        let mut held: HashSet<FileId> = state.items.iter().map(|r| r.id).collect();
        let fresh: Vec<FileRecord> = records
            .into_iter()
            .filter(|r| state.scope.contains(r) && held.insert(r.id))
            .collect();

        let added = fresh.len();
        if added == 0 {
            return 0;
        }
        state.total += added as u64;
        if state.page == 1 {
            let mut items = fresh;
            items.append(&mut state.items);
            items.truncate(self.page_size as usize);
            state.items = items;
        }
        debug!(added, total = state.total, "Records added locally");
        added
    }

    /// Write mutable fields of a record.
    ///
    /// The held copy reflects the change immediately and is restored if the
    /// write fails. A record that leaves the scope is dropped from the page.
    pub async fn update(&self, id: FileId, patch: FilePatch) -> AppResult<FileRecord> {
        let patch = self.validate_patch(patch).await?;
        self.write_patch(id, patch).await
    }

    /// Apply an already validated patch.
    pub(crate) async fn write_patch(&self, id: FileId, patch: FilePatch) -> AppResult<FileRecord> {
        let now = Utc::now();

        let snapshot = {
            let mut state = self.lock();
            state.items.iter_mut().find(|r| r.id == id).map(|held| {
                let original = held.clone();
                patch.apply_to(held, now);
                (original, held.clone())
            })
        };

        let result =
            update_one::<FileRecord>(self.store.as_ref(), id.into_uuid(), patch.to_row(now)).await;

        match result {
            Ok(record) => {
                self.reconcile(&record);
                self.signal.mark_dirty();
                info!(file_id = %id, fields = ?patch.changed_fields(), "File updated");
                Ok(record)
            }
            Err(e) => {
                if let Some((original, optimistic)) = snapshot {
                    let mut state = self.lock();
                    if let Some(held) = state.items.iter_mut().find(|r| r.id == id) {
                        // A reload may have replaced the optimistic copy meanwhile.
                        if *held == optimistic {
                            *held = original;
                        }
                    }
                }
                warn!(file_id = %id, error = %e, "File update failed, local change rolled back");
                Err(e)
            }
        }
    }

    fn reconcile(&self, record: &FileRecord) {
        let mut state = self.lock();
        let in_scope = state.scope.contains(record);
        let Some(pos) = state.items.iter().position(|r| r.id == record.id) else {
            return;
        };
        if in_scope {
            state.items[pos] = record.clone();
        } else {
            state.items.remove(pos);
            state.total = state.total.saturating_sub(1);
        }
    }

    async fn validate_patch(&self, mut patch: FilePatch) -> AppResult<FilePatch> {
        if patch.is_empty() {
            return Err(AppError::validation("Nothing to update"));
        }
        if let Some(name) = &patch.name {
            patch.name = Some(validate_name(name, "File")?);
        }
        if let Some(tags) = &patch.tags {
            let cleaned = tags
                .iter()
                .filter(|t| !t.trim().is_empty())
                .map(|t| clean(t))
                .collect::<AppResult<Vec<_>>>()?;
            patch.tags = Some(dedup_tags(&cleaned));
        }
        if let Some(url) = &patch.external_url {
            patch.external_url = Some(
                url.as_deref()
                    .map(str::trim)
                    .filter(|u| !u.is_empty())
                    .map(str::to_string),
            );
        }
        if let Some(location) = &patch.location {
            self.check_destination(location).await?;
        }
        Ok(patch)
    }

    /// Reject a file destination whose project is unknown or outside the
    /// collection's workspace, or whose folder is unknown or in another project.
    pub async fn check_destination(&self, location: &FileLocation) -> AppResult<()> {
        let workspace_id = self.scope().workspace_id;
        let project = match location.project_id {
            Some(project_id) => {
                find_by_id::<Project>(self.store.as_ref(), project_id.into_uuid()).await?
            }
            None => None,
        };
        let folder = match location.folder_id {
            Some(folder_id) => {
                find_by_id::<Folder>(self.store.as_ref(), folder_id.into_uuid()).await?
            }
            None => None,
        };
        MoveValidator::check_file_destination(
            workspace_id,
            location,
            project.as_ref(),
            folder.as_ref(),
        )
        .map_err(|rejection| {
            warn!(%workspace_id, destination = ?location, %rejection, "File move rejected");
            rejection.into_error()
        })
    }

    /// The held record, or the stored one when it is not on this page.
    ///
    /// Records of other workspaces are reported as missing.
    pub async fn fetch_record(&self, id: FileId) -> AppResult<FileRecord> {
        if let Some(record) = self.get(id) {
            return Ok(record);
        }
        let workspace_id = self.scope().workspace_id;
        find_by_id::<FileRecord>(self.store.as_ref(), id.into_uuid())
            .await?
            .filter(|r| !r.is_deleted() && r.workspace_id == workspace_id)
            .ok_or_else(|| AppError::not_found(format!("File {id} not found")))
    }

    /// Delete a file: remove its backing object, then soft-delete the record.
    ///
    /// An object storage failure is logged and does not block the record
    /// deletion. Local state changes only after the record is marked.
    pub async fn remove(&self, id: FileId) -> AppResult<()> {
        let record = self.fetch_record(id).await?;

        if let Err(e) = self.storage.remove(&record.storage_path).await {
            warn!(
                file_id = %id,
                path = %record.storage_path,
                error = %e,
                "Failed to remove backing object, deleting record anyway"
            );
        }

        let now = Utc::now();
        self.store
            .update(
                FileRecord::TABLE,
                id.into_uuid(),
                fields(json!({ "deleted_at": now, "updated_at": now })),
            )
            .await?;

        {
            let mut state = self.lock();
            let before = state.items.len();
            state.items.retain(|r| r.id != id);
            if state.items.len() < before || state.scope.contains(&record) {
                state.total = state.total.saturating_sub(1);
            }
        }

        self.signal.mark_dirty();
        info!(file_id = %id, name = %record.name, "File deleted");
        Ok(())
    }

    /// Flip the favorite flag.
    pub async fn toggle_favorite(&self, id: FileId) -> AppResult<FileRecord> {
        let record = self.fetch_record(id).await?;
        self.update(id, FilePatch::favorite(!record.is_favorite)).await
    }

    /// File a record somewhere else. Moving to the current location writes nothing.
    pub async fn move_file(&self, id: FileId, location: FileLocation) -> AppResult<FileRecord> {
        let record = self.fetch_record(id).await?;
        if record.location() == location {
            return Ok(record);
        }
        self.update(id, FilePatch::location(location)).await
    }

    /// Add a tag unless some spelling of it is already present.
    pub async fn add_tag(&self, id: FileId, tag: &str) -> AppResult<FileRecord> {
        self.add_tag_edit(id, tag).await.map(TagEdit::into_record)
    }

    /// Remove every spelling of a tag.
    pub async fn remove_tag(&self, id: FileId, tag: &str) -> AppResult<FileRecord> {
        self.remove_tag_edit(id, tag).await.map(TagEdit::into_record)
    }

    pub(crate) async fn add_tag_edit(&self, id: FileId, tag: &str) -> AppResult<TagEdit> {
        let tag = clean(tag)?;
        self.edit_tags(id, |tags| {
            let mut next = tags.to_vec();
            if !contains_tag(tags, &tag) {
                next.push(tag.clone());
            }
            next
        })
        .await
    }

    pub(crate) async fn remove_tag_edit(&self, id: FileId, tag: &str) -> AppResult<TagEdit> {
        let key = normalize(tag);
        if key.is_empty() {
            return Err(AppError::validation("Tag cannot be empty"));
        }
        self.edit_tags(id, |tags| {
            tags.iter()
                .filter(|t| normalize(t) != key)
                .cloned()
                .collect()
        })
        .await
    }

    async fn edit_tags(
        &self,
        id: FileId,
        edit: impl FnOnce(&[String]) -> Vec<String>,
    ) -> AppResult<TagEdit> {
        let record = self.fetch_record(id).await?;
        let tags = edit(&record.tags);
        if tags == record.tags {
            return Ok(TagEdit::Unchanged(record));
        }
        self.update(id, FilePatch::tags(tags))
            .await
            .map(TagEdit::Changed)
    }
}
