//! Project entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use filekeep_core::result::AppResult;
use filekeep_core::types::{ProjectId, WorkspaceId};

use crate::record::{Record, tables};
use crate::workspace::model::{DEFAULT_COLOR, validate_color, validate_name};

/// A project within a workspace, owning a folder hierarchy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Project {
    /// Unique project identifier.
    pub id: ProjectId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Project name.
    pub name: String,
    /// Display color (`#rrggbb`).
    pub color: String,
    /// Optional free-form description.
    #[serde(default)]
    pub description: Option<String>,
    /// When the project was created.
    pub created_at: DateTime<Utc>,
    /// When the project was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Project {
    /// Build a new, not yet persisted project.
    pub fn new(
        workspace_id: WorkspaceId,
        name: &str,
        color: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: ProjectId::new(),
            workspace_id,
            name: validate_name(name, "Project")?,
            color: validate_color(color.unwrap_or(DEFAULT_COLOR))?,
            description: description
                .map(str::trim)
                .filter(|d| !d.is_empty())
                .map(str::to_string),
            created_at: now,
            updated_at: now,
        })
    }
}

impl Record for Project {
    const TABLE: &'static str = tables::PROJECTS;

    fn record_id(&self) -> Uuid {
        self.id.into_uuid()
    }
}
