//! Multi-selection operations over a file collection.
//!
//! Each item is written on its own; a failed item is rolled back alone and
//! the rest of the batch carries on. Repeated ids are processed once.

use std::collections::HashSet;

use tracing::{info, warn};

use filekeep_core::error::AppError;
use filekeep_core::result::AppResult;
use filekeep_core::types::FileId;
use filekeep_entity::file::{FileLocation, FilePatch};

use super::collection::{FileCollection, TagEdit};
use crate::folder::MoveRejection;
use crate::report::BatchReport;
use crate::tag::{clean, normalize};

fn unique(ids: &[FileId]) -> Vec<FileId> {
    let mut seen = HashSet::new();
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

fn log_report(operation: &str, report: &BatchReport) {
    if report.is_complete() {
        info!(
            operation,
            succeeded = report.success_count(),
            skipped = report.skipped.len(),
            "Batch completed"
        );
    } else {
        warn!(
            operation,
            succeeded = report.success_count(),
            failed = report.failure_count(),
            skipped = report.skipped.len(),
            "Batch completed with failures"
        );
    }
}

impl FileCollection {
    /// Move every selected file to `destination`.
    ///
    /// The destination is checked once before any write. Files already
    /// there are skipped.
    pub async fn move_files(
        &self,
        ids: &[FileId],
        destination: FileLocation,
    ) -> AppResult<BatchReport> {
        if !destination.is_well_formed() {
            return Err(MoveRejection::MissingProject.into_error());
        }
        self.check_destination(&destination).await?;

        let mut report = BatchReport::new();
        for id in unique(ids) {
            let record = match self.fetch_record(id).await {
                Ok(record) => record,
                Err(e) => {
                    report.fail(id, &e);
                    continue;
                }
            };
            if record.location() == destination {
                report.skip(id);
                continue;
            }
            match self.write_patch(id, FilePatch::location(destination)).await {
                Ok(_) => report.succeed(id),
                Err(e) => report.fail(id, &e),
            }
        }
        log_report("move", &report);
        Ok(report)
    }

    /// Delete every selected file.
    pub async fn delete_files(&self, ids: &[FileId]) -> AppResult<BatchReport> {
        let mut report = BatchReport::new();
        for id in unique(ids) {
            match self.remove(id).await {
                Ok(()) => report.succeed(id),
                Err(e) => report.fail(id, &e),
            }
        }
        log_report("delete", &report);
        Ok(report)
    }

    /// Add `tag` to every selected file. Files already carrying it are skipped.
    pub async fn tag_files(&self, ids: &[FileId], tag: &str) -> AppResult<BatchReport> {
        let tag = clean(tag)?;
        let mut report = BatchReport::new();
        for id in unique(ids) {
            record_edit(&mut report, id, self.add_tag_edit(id, &tag).await);
        }
        log_report("tag", &report);
        Ok(report)
    }

    /// Remove `tag` from every selected file. Files without it are skipped.
    pub async fn untag_files(&self, ids: &[FileId], tag: &str) -> AppResult<BatchReport> {
        if normalize(tag).is_empty() {
            return Err(AppError::validation("Tag cannot be empty"));
        }
        let mut report = BatchReport::new();
        for id in unique(ids) {
            record_edit(&mut report, id, self.remove_tag_edit(id, tag).await);
        }
        log_report("untag", &report);
        Ok(report)
    }
}

fn record_edit(report: &mut BatchReport, id: FileId, result: AppResult<TagEdit>) {
    match result {
        Ok(TagEdit::Changed(_)) => report.succeed(id),
        Ok(TagEdit::Unchanged(_)) => report.skip(id),
        Err(e) => report.fail(id, &e),
    }
}
