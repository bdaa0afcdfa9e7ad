//! Legality checks for structural moves.

use std::fmt;

use filekeep_core::error::AppError;
use filekeep_core::types::{FolderId, ProjectId, WorkspaceId};
use filekeep_entity::file::FileLocation;
use filekeep_entity::folder::{Folder, FolderIndex};
use filekeep_entity::project::Project;

/// Why a move was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveRejection {
    /// The item already sits at the destination. Not an error.
    Unchanged,
    /// A folder cannot become its own parent.
    IntoSelf,
    /// A folder cannot move below one of its descendants.
    IntoDescendant,
    /// The destination folder belongs to another project.
    CrossProject,
    /// A folder destination without a project.
    MissingProject,
    /// The destination project does not exist.
    UnknownProject(ProjectId),
    /// The destination project belongs to another workspace.
    CrossWorkspace,
    /// The folder is not part of the hierarchy being edited.
    UnknownFolder(FolderId),
    /// The existing parent chain already loops.
    CorruptHierarchy,
}

impl MoveRejection {
    /// Convert into the error surfaced to callers.
    pub fn into_error(self) -> AppError {
        AppError::invalid_move(self.to_string())
    }
}

impl fmt::Display for MoveRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unchanged => write!(f, "Item is already at the destination"),
            Self::IntoSelf => write!(f, "A folder cannot be moved into itself"),
            Self::IntoDescendant => write!(f, "A folder cannot be moved into one of its subfolders"),
            Self::CrossProject => write!(f, "Destination folder belongs to a different project"),
            Self::MissingProject => write!(f, "A folder destination requires a project"),
            Self::UnknownProject(id) => write!(f, "Project {id} does not exist"),
            Self::CrossWorkspace => write!(f, "Destination project belongs to a different workspace"),
            Self::UnknownFolder(id) => write!(f, "Folder {id} is not part of this project"),
            Self::CorruptHierarchy => write!(f, "Folder hierarchy contains a cycle"),
        }
    }
}

/// Decides whether a proposed folder or file move is allowed.
#[derive(Debug, Clone, Copy)]
pub struct MoveValidator<'a> {
    index: &'a FolderIndex,
}

impl<'a> MoveValidator<'a> {
    /// Validate against the folders of one project.
    pub fn new(index: &'a FolderIndex) -> Self {
        Self { index }
    }

    /// Check moving `folder` under `target` (`None` for project root).
    ///
    /// Walks upward from the target; meeting `folder` on the way means the
    /// move would create a cycle. The walk is bounded by the folder count.
    pub fn check_folder_move(
        &self,
        folder: FolderId,
        target: Option<FolderId>,
    ) -> Result<(), MoveRejection> {
        if !self.index.contains(folder) {
            return Err(MoveRejection::UnknownFolder(folder));
        }
        if target == Some(folder) {
            return Err(MoveRejection::IntoSelf);
        }
        if self.index.effective_parent(folder) == target {
            return Err(MoveRejection::Unchanged);
        }

        let Some(target) = target else {
            return Ok(());
        };
        if !self.index.contains(target) {
            return Err(MoveRejection::UnknownFolder(target));
        }

        let ancestry = self.index.ancestry(target);
        if ancestry.contains(folder) {
            return Err(MoveRejection::IntoDescendant);
        }
        if ancestry.cyclic {
            return Err(MoveRejection::CorruptHierarchy);
        }
        Ok(())
    }

    /// Check filing a file of `workspace_id` at `destination`.
    ///
    /// `project` and `folder` are the destination project and folder as
    /// stored, when the destination names them. Files carry no cycle
    /// concern; the project has to exist in the file's workspace and the
    /// folder has to belong to that project.
    pub fn check_file_destination(
        workspace_id: WorkspaceId,
        destination: &FileLocation,
        project: Option<&Project>,
        folder: Option<&Folder>,
    ) -> Result<(), MoveRejection> {
        let Some(project_id) = destination.project_id else {
            return match destination.folder_id {
                Some(_) => Err(MoveRejection::MissingProject),
                None => Ok(()),
            };
        };
        match project {
            Some(p) if p.id != project_id => return Err(MoveRejection::UnknownProject(project_id)),
            Some(p) if p.workspace_id != workspace_id => return Err(MoveRejection::CrossWorkspace),
            Some(_) => {}
            None => return Err(MoveRejection::UnknownProject(project_id)),
        }

        let Some(folder_id) = destination.folder_id else {
            return Ok(());
        };
        match folder {
            Some(f) if f.id != folder_id => Err(MoveRejection::UnknownFolder(folder_id)),
            Some(f) if f.project_id != project_id => Err(MoveRejection::CrossProject),
            Some(_) => Ok(()),
            None => Err(MoveRejection::UnknownFolder(folder_id)),
        }
    }
}
