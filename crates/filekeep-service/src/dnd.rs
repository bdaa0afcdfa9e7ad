//! Drag payloads exchanged between views and their drop handling.
//!
//! A payload is text: `files:<json array of ids>` or `folder:<id>`.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use filekeep_core::error::AppError;
use filekeep_core::result::AppResult;
use filekeep_core::types::{FileId, FolderId};
use filekeep_entity::file::FileLocation;

use crate::file::FileCollection;
use crate::folder::{FolderTree, MoveOutcome, MoveRejection};
use crate::report::BatchReport;

const FILES_PREFIX: &str = "files";
const FOLDER_PREFIX: &str = "folder";

/// What is being dragged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DragPayload {
    /// One or more files.
    Files(Vec<FileId>),
    /// A single folder.
    Folder(FolderId),
}

impl fmt::Display for DragPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Files(ids) => {
                let list = serde_json::to_string(ids).map_err(|_| fmt::Error)?;
                write!(f, "{FILES_PREFIX}:{list}")
            }
            Self::Folder(id) => write!(f, "{FOLDER_PREFIX}:{id}"),
        }
    }
}

impl FromStr for DragPayload {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((kind, body)) = s.trim().split_once(':') else {
            return Err(AppError::validation("Drag payload has no kind prefix"));
        };
        match kind {
            FILES_PREFIX => {
                let ids: Vec<FileId> = serde_json::from_str(body).map_err(|e| {
                    AppError::validation(format!("Invalid file list in drag payload: {e}"))
                })?;
                if ids.is_empty() {
                    return Err(AppError::validation("Drag payload carries no files"));
                }
                Ok(Self::Files(ids))
            }
            FOLDER_PREFIX => body
                .trim()
                .parse()
                .map(Self::Folder)
                .map_err(|e| AppError::validation(format!("Invalid folder id in drag payload: {e}"))),
            other => Err(AppError::validation(format!("Unknown drag payload kind '{other}'"))),
        }
    }
}

/// What a drop did.
#[derive(Debug, Clone, PartialEq)]
pub enum DropOutcome {
    /// Files were moved; one entry per file.
    Files(BatchReport),
    /// A folder was moved, or already sat at the target.
    Folder(MoveOutcome),
}

/// Apply a drop of `payload` onto `target`.
///
/// Files go through the collection's batch move. A folder moves within
/// `tree`, which must be the tree of the target project.
pub async fn apply_drop(
    payload: &DragPayload,
    target: FileLocation,
    collection: &FileCollection,
    tree: Option<&mut FolderTree>,
) -> AppResult<DropOutcome> {
    debug!(%payload, destination = ?target, "Applying drop");
    match payload {
        DragPayload::Files(ids) => collection
            .move_files(ids, target)
            .await
            .map(DropOutcome::Files),
        DragPayload::Folder(id) => {
            let Some(tree) = tree else {
                return Err(AppError::validation("Dropping a folder requires a project view"));
            };
            if target.project_id != Some(tree.project_id()) {
                return Err(MoveRejection::CrossProject.into_error());
            }
            tree.move_folder(*id, target.folder_id)
                .await
                .map(DropOutcome::Folder)
        }
    }
}
