//! Folder entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use filekeep_core::result::AppResult;
use filekeep_core::types::{FolderId, ProjectId};

use crate::record::{Record, tables};
use crate::workspace::model::validate_name;

/// Separator used in materialized folder paths.
pub const PATH_SEPARATOR: char = '/';

/// A folder in a project's hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Folder {
    /// Unique folder identifier.
    pub id: FolderId,
    /// The project this folder belongs to.
    pub project_id: ProjectId,
    /// Parent folder ID (null for folders at project root).
    pub parent_id: Option<FolderId>,
    /// Folder name.
    pub name: String,
    /// Materialized path of ancestor names and this folder's own name
    /// (e.g., `Reports/2024`). Derived from the parent chain.
    #[serde(default)]
    pub path: String,
    /// When the folder was created.
    pub created_at: DateTime<Utc>,
    /// When the folder was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Folder {
    /// Build a new, not yet persisted folder. The path is left for the
    /// owning tree to materialize.
    pub fn new(project_id: ProjectId, parent_id: Option<FolderId>, name: &str) -> AppResult<Self> {
        let name = validate_folder_name(name)?;
        let now = Utc::now();
        Ok(Self {
            id: FolderId::new(),
            project_id,
            parent_id,
            path: name.clone(),
            name,
            created_at: now,
            updated_at: now,
        })
    }

    /// Check if this folder sits at project root.
    pub fn is_root(&self) -> bool {
        self.parent_id.is_none()
    }
}

impl Record for Folder {
    const TABLE: &'static str = tables::FOLDERS;

    fn record_id(&self) -> Uuid {
        self.id.into_uuid()
    }
}

/// Validate a folder name. Names may not contain the path separator.
pub fn validate_folder_name(name: &str) -> AppResult<String> {
    let name = validate_name(name, "Folder")?;
    if name.contains(PATH_SEPARATOR) {
        return Err(filekeep_core::AppError::validation(format!(
            "Folder name cannot contain '{PATH_SEPARATOR}'"
        )));
    }
    Ok(name)
}
