//! What a file collection is looking at.

use serde::{Deserialize, Serialize};

use filekeep_core::types::{FilterField, FolderId, ProjectId, WorkspaceId};
use filekeep_entity::file::FileRecord;

/// Narrowing of a scope by file content.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum ContentFilter {
    /// Every live file.
    #[default]
    All,
    /// Only favorites.
    Favorites,
    /// Only files carrying this exact tag spelling.
    Tag(String),
    /// Only files whose name contains this text, ignoring case.
    Search(String),
}

/// The bounds of a collection view.
///
/// Without a project the scope covers every live file of the workspace.
/// With a project it covers the files filed directly at the project root,
/// or directly inside `folder_id` when one is set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scope {
    /// The workspace.
    pub workspace_id: WorkspaceId,
    /// The project, if narrowed to one.
    pub project_id: Option<ProjectId>,
    /// The folder inside the project, if narrowed to one.
    pub folder_id: Option<FolderId>,
    /// Content filter.
    #[serde(default)]
    pub filter: ContentFilter,
}

impl Scope {
    /// The whole workspace.
    pub fn workspace(workspace_id: WorkspaceId) -> Self {
        Self {
            workspace_id,
            project_id: None,
            folder_id: None,
            filter: ContentFilter::All,
        }
    }

    /// The root of a project.
    pub fn project(workspace_id: WorkspaceId, project_id: ProjectId) -> Self {
        Self {
            project_id: Some(project_id),
            ..Self::workspace(workspace_id)
        }
    }

    /// One folder of a project.
    pub fn folder(workspace_id: WorkspaceId, project_id: ProjectId, folder_id: FolderId) -> Self {
        Self {
            folder_id: Some(folder_id),
            ..Self::project(workspace_id, project_id)
        }
    }

    /// Same location with a different content filter.
    pub fn with_filter(mut self, filter: ContentFilter) -> Self {
        self.filter = filter;
        self
    }

    /// Whether the scope names a folder without a project.
    pub fn is_well_formed(&self) -> bool {
        self.folder_id.is_none() || self.project_id.is_some()
    }

    /// Store filters selecting the records of this scope.
    pub fn filters(&self) -> Vec<FilterField> {
        let mut filters = vec![
            FilterField::eq_id("workspace_id", self.workspace_id),
            FilterField::is_null("deleted_at"),
        ];
        if let Some(project_id) = self.project_id {
            filters.push(FilterField::eq_id("project_id", project_id));
            filters.push(FilterField::eq_opt_id("folder_id", self.folder_id));
        }
        match &self.filter {
            ContentFilter::All => {}
            ContentFilter::Favorites => filters.push(FilterField::eq_bool("is_favorite", true)),
            ContentFilter::Tag(tag) => filters.push(FilterField::contains("tags", tag.clone())),
            ContentFilter::Search(text) => {
                filters.push(FilterField::ilike("name", format!("%{}%", text.trim())))
            }
        }
        filters
    }

    /// Whether a record falls inside this scope. Mirrors [`Scope::filters`].
    pub fn contains(&self, record: &FileRecord) -> bool {
        if record.workspace_id != self.workspace_id || record.is_deleted() {
            return false;
        }
        if self.project_id.is_some()
            && (record.project_id != self.project_id || record.folder_id != self.folder_id)
        {
            return false;
        }
        match &self.filter {
            ContentFilter::All => true,
            ContentFilter::Favorites => record.is_favorite,
            ContentFilter::Tag(tag) => record.tags.iter().any(|t| t == tag),
            ContentFilter::Search(text) => record
                .name
                .to_lowercase()
                .contains(&text.trim().to_lowercase()),
        }
    }
}
