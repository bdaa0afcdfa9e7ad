//! Workspace-wide tag vocabulary: statistics and bulk rename/merge/delete.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use filekeep_core::config::TaxonomyConfig;
use filekeep_core::error::AppError;
use filekeep_core::result::AppResult;
use filekeep_core::traits::RecordStore;
use filekeep_core::types::{FileId, FilterField, Query, SortField, WorkspaceId};
use filekeep_entity::file::{FilePatch, FileRecord};

use super::normalize::{clean, contains_tag, dedup_tags, normalize};
use crate::records::{fetch_all, update_one};
use crate::report::BatchReport;
use crate::signal::InvalidationSignal;

/// Usage of one tag across a set of files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagStat {
    /// Representative spelling (first seen).
    pub tag: String,
    /// Comparison key shared by every spelling.
    pub normalized: String,
    /// Number of distinct files carrying the tag.
    pub count: usize,
    /// The files carrying the tag.
    pub files: Vec<FileId>,
}

/// Group files by normalized tag.
///
/// Entries are ordered by descending count, then by normalized tag.
/// Soft-deleted files are ignored.
pub fn stats(files: &[FileRecord]) -> Vec<TagStat> {
    let mut entries: Vec<TagStat> = Vec::new();
    let mut positions: HashMap<String, usize> = HashMap::new();

    for file in files.iter().filter(|f| !f.is_deleted()) {
        let mut seen = HashSet::new();
        for raw in &file.tags {
            let key = normalize(raw);
            if key.is_empty() || !seen.insert(key.clone()) {
                continue;
            }
            let pos = *positions.entry(key.clone()).or_insert_with(|| {
                entries.push(TagStat {
                    tag: raw.trim().to_string(),
                    normalized: key,
                    count: 0,
                    files: Vec::new(),
                });
                entries.len() - 1
            });
            entries[pos].count += 1;
            entries[pos].files.push(file.id);
        }
    }

    entries.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.normalized.cmp(&b.normalized)));
    entries
}

/// Which bulk operation a report describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TagOperation {
    /// A tag was respelled across files.
    Rename,
    /// One tag was folded into another.
    Merge,
    /// A tag was stripped from every file.
    Delete,
}

/// Outcome of a bulk tag operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TagOperationReport {
    /// The operation that actually ran. A rename that collides runs as a merge.
    pub operation: TagOperation,
    /// The tag the operation was asked about.
    pub tag: String,
    /// The replacement tag, for rename and merge.
    pub target: Option<String>,
    /// Per-file outcome. `skipped` holds files never attempted after a stop.
    pub outcome: BatchReport,
    /// Updated records as stored, for refreshing dependent views.
    pub affected: Vec<FileRecord>,
}

impl TagOperationReport {
    fn new(operation: TagOperation, tag: &str, target: Option<&str>) -> Self {
        Self {
            operation,
            tag: tag.to_string(),
            target: target.map(str::to_string),
            outcome: BatchReport::new(),
            affected: Vec::new(),
        }
    }

    /// Number of files rewritten.
    pub fn updated_count(&self) -> usize {
        self.outcome.success_count()
    }

    /// Number of files whose write failed.
    pub fn failure_count(&self) -> usize {
        self.outcome.failure_count()
    }

    /// Number of files never attempted.
    pub fn not_attempted_count(&self) -> usize {
        self.outcome.skipped.len()
    }

    /// Whether every planned file was rewritten.
    pub fn is_complete(&self) -> bool {
        self.outcome.is_complete() && self.outcome.skipped.is_empty()
    }
}

/// Replace (or drop, when `replacement` is `None`) every tag matching `key`.
///
/// The replacement takes the position of the first match.
fn replace_tag(tags: &[String], key: &str, replacement: Option<&str>) -> Vec<String> {
    let mut out = Vec::with_capacity(tags.len());
    let mut placed = false;
    for tag in tags {
        if normalize(tag) != key {
            out.push(tag.clone());
        } else if let Some(r) = replacement.filter(|_| !placed) {
            out.push(r.to_string());
            placed = true;
        }
    }
    dedup_tags(&out)
}

/// Tag statistics and bulk tag edits for one workspace.
#[derive(Debug, Clone)]
pub struct TagTaxonomy {
    store: Arc<dyn RecordStore>,
    signal: InvalidationSignal,
    config: TaxonomyConfig,
    workspace_id: WorkspaceId,
}

impl TagTaxonomy {
    /// Creates a taxonomy over one workspace.
    pub fn new(
        store: Arc<dyn RecordStore>,
        signal: InvalidationSignal,
        config: TaxonomyConfig,
        workspace_id: WorkspaceId,
    ) -> Self {
        Self {
            store,
            signal,
            config,
            workspace_id,
        }
    }

    /// The workspace this taxonomy covers.
    pub fn workspace_id(&self) -> WorkspaceId {
        self.workspace_id
    }

    /// Every live file in the workspace, newest first.
    pub async fn workspace_files(&self) -> AppResult<Vec<FileRecord>> {
        let query = Query::new()
            .filter(FilterField::eq_id("workspace_id", self.workspace_id))
            .filter(FilterField::is_null("deleted_at"))
            .order_by(SortField::desc("created_at"));
        fetch_all(self.store.as_ref(), &query).await
    }

    /// Tag statistics over the whole workspace.
    pub async fn stats(&self) -> AppResult<Vec<TagStat>> {
        Ok(stats(&self.workspace_files().await?))
    }

    /// Live files carrying `tag` in any spelling.
    pub async fn files_with_tag(&self, tag: &str) -> AppResult<Vec<FileRecord>> {
        let files = self.workspace_files().await?;
        Ok(files
            .into_iter()
            .filter(|f| contains_tag(&f.tags, tag))
            .collect())
    }

    /// Respell `old_tag` as `new_tag` on every file carrying it.
    ///
    /// When `new_tag` already exists under another spelling (or only the
    /// case of `old_tag` changes), the call runs as [`TagTaxonomy::merge`].
    /// Otherwise files are rewritten one at a time in paced batches and the
    /// first failed write stops all further writes.
    pub async fn rename(&self, old_tag: &str, new_tag: &str) -> AppResult<TagOperationReport> {
        let old_key = require_key(old_tag)?;
        let new_tag = clean(new_tag)?;
        let new_key = normalize(&new_tag);

        let files = self.workspace_files().await?;
        let collides = old_key == new_key
            || files
                .iter()
                .flat_map(|f| f.tags.iter())
                .any(|t| normalize(t) == new_key);
        if collides {
            info!(
                workspace_id = %self.workspace_id,
                from = old_tag,
                to = %new_tag,
                "Tag rename collides with an existing tag, merging instead"
            );
            return self.merge_into(files, old_tag, &old_key, &new_tag).await;
        }

        let carriers = carriers(&files, &old_key, old_tag)?;
        let plan = carriers
            .into_iter()
            .map(|f| (f.id, replace_tag(&f.tags, &old_key, Some(&new_tag))))
            .collect();

        let mut report = TagOperationReport::new(TagOperation::Rename, old_tag, Some(&new_tag));
        self.execute(plan, true, &mut report).await;
        self.finish(&report);
        Ok(report)
    }

    /// Fold `source_tag` into `target_tag` on every file carrying the source.
    ///
    /// The target is only added where no spelling of it is already present.
    /// When both normalize equally, every spelling is rewritten to the
    /// target's exact spelling. Failed files are reported and the remaining
    /// files are still attempted.
    pub async fn merge(&self, source_tag: &str, target_tag: &str) -> AppResult<TagOperationReport> {
        let source_key = require_key(source_tag)?;
        let target_tag = clean(target_tag)?;
        let files = self.workspace_files().await?;
        self.merge_into(files, source_tag, &source_key, &target_tag).await
    }

    /// Strip `tag` from every file carrying it. Other tags are untouched.
    pub async fn delete(&self, tag: &str) -> AppResult<TagOperationReport> {
        let key = require_key(tag)?;
        let files = self.workspace_files().await?;
        let plan = carriers(&files, &key, tag)?
            .into_iter()
            .map(|f| (f.id, replace_tag(&f.tags, &key, None)))
            .collect();

        let mut report = TagOperationReport::new(TagOperation::Delete, tag, None);
        self.execute(plan, false, &mut report).await;
        self.finish(&report);
        Ok(report)
    }

    async fn merge_into(
        &self,
        files: Vec<FileRecord>,
        source_tag: &str,
        source_key: &str,
        target_tag: &str,
    ) -> AppResult<TagOperationReport> {
        let same_key = source_key == normalize(target_tag);
        let plan = carriers(&files, source_key, source_tag)?
            .into_iter()
            .filter_map(|f| {
                let replacement = if same_key {
                    Some(target_tag)
                } else {
                    let rest = replace_tag(&f.tags, source_key, None);
                    (!contains_tag(&rest, target_tag)).then_some(target_tag)
                };
                let tags = replace_tag(&f.tags, source_key, replacement);
                (tags != f.tags).then_some((f.id, tags))
            })
            .collect();

        let mut report = TagOperationReport::new(TagOperation::Merge, source_tag, Some(target_tag));
        self.execute(plan, false, &mut report).await;
        self.finish(&report);
        Ok(report)
    }

    /// Write new tag sets in bounded batches, pausing between batches.
    ///
    /// With `stop_on_failure` the writes run one at a time and the first
    /// failure leaves every later file unattempted. Otherwise each batch is
    /// written concurrently and failures are only recorded.
    async fn execute(
        &self,
        plan: Vec<(FileId, Vec<String>)>,
        stop_on_failure: bool,
        report: &mut TagOperationReport,
    ) {
        let batch_size = self.config.batch_size.max(1);
        let delay = self.config.batch_delay();
        let mut stopped = false;

        for (index, batch) in plan.chunks(batch_size).enumerate() {
            if stopped {
                batch.iter().for_each(|(id, _)| report.outcome.skip(*id));
                continue;
            }
            if index > 0 && !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }

            if stop_on_failure {
                for (id, tags) in batch {
                    if stopped {
                        report.outcome.skip(*id);
                        continue;
                    }
                    let result = self.write_tags(*id, tags).await;
                    stopped = !record_write(report, *id, result);
                }
            } else {
                let writes = batch.iter().map(|(id, tags)| self.write_tags(*id, tags));
                let results = join_all(writes).await;
                for ((id, _), result) in batch.iter().zip(results) {
                    record_write(report, *id, result);
                }
            }
        }
    }

    async fn write_tags(&self, id: FileId, tags: &[String]) -> AppResult<FileRecord> {
        let fields = FilePatch::tags(tags.to_vec()).to_row(Utc::now());
        update_one::<FileRecord>(self.store.as_ref(), id.into_uuid(), fields).await
    }

    fn finish(&self, report: &TagOperationReport) {
        if report.updated_count() > 0 {
            self.signal.mark_dirty();
        }
        if report.is_complete() {
            info!(
                workspace_id = %self.workspace_id,
                operation = ?report.operation,
                tag = %report.tag,
                target = ?report.target,
                updated = report.updated_count(),
                "Tag operation completed"
            );
        } else {
            warn!(
                workspace_id = %self.workspace_id,
                operation = ?report.operation,
                tag = %report.tag,
                updated = report.updated_count(),
                failed = report.failure_count(),
                not_attempted = report.not_attempted_count(),
                "Tag operation completed partially"
            );
        }
    }
}

/// Record one write in the report. Returns whether it succeeded.
fn record_write(report: &mut TagOperationReport, id: FileId, result: AppResult<FileRecord>) -> bool {
    match result {
        Ok(record) => {
            report.outcome.succeed(id);
            report.affected.push(record);
            true
        }
        Err(e) => {
            warn!(file_id = %id, error = %e, "Tag write failed");
            report.outcome.fail(id, &e);
            false
        }
    }
}

fn require_key(tag: &str) -> AppResult<String> {
    let key = normalize(tag);
    if key.is_empty() {
        return Err(AppError::validation("Tag cannot be empty"));
    }
    Ok(key)
}

fn carriers<'a>(files: &'a [FileRecord], key: &str, tag: &str) -> AppResult<Vec<&'a FileRecord>> {
    let found: Vec<&FileRecord> = files
        .iter()
        .filter(|f| f.tags.iter().any(|t| normalize(t) == key))
        .collect();
    if found.is_empty() {
        return Err(AppError::not_found(format!("Tag '{}' is not used", tag.trim())));
    }
    Ok(found)
}
