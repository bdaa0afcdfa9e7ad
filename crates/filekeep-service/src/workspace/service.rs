//! Workspace and project CRUD.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use filekeep_core::error::AppError;
use filekeep_core::result::AppResult;
use filekeep_core::traits::RecordStore;
use filekeep_core::types::{FilterField, ProjectId, Query, SortField, WorkspaceId};
use filekeep_entity::Record;
use filekeep_entity::file::FileRecord;
use filekeep_entity::folder::Folder;
use filekeep_entity::project::Project;
use filekeep_entity::workspace::{Workspace, validate_color, validate_name};

use crate::records::{fetch_all, fields, find_by_id, insert_one, update_one};
use crate::signal::InvalidationSignal;

/// Changes to a project. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProjectUpdate {
    /// New name.
    pub name: Option<String>,
    /// New color (`#rrggbb`).
    pub color: Option<String>,
    /// New description; `Some(None)` clears it.
    pub description: Option<Option<String>>,
}

impl ProjectUpdate {
    fn is_empty(&self) -> bool {
        self.name.is_none() && self.color.is_none() && self.description.is_none()
    }
}

/// Manages workspaces and the projects inside them.
#[derive(Debug, Clone)]
pub struct WorkspaceService {
    /// Record store.
    store: Arc<dyn RecordStore>,
    /// Raised after every successful mutation.
    signal: InvalidationSignal,
}

impl WorkspaceService {
    /// Creates a new workspace service.
    pub fn new(store: Arc<dyn RecordStore>, signal: InvalidationSignal) -> Self {
        Self { store, signal }
    }

    /// Lists every workspace, oldest first.
    pub async fn list_workspaces(&self) -> AppResult<Vec<Workspace>> {
        let query = Query::new().order_by(SortField::asc("created_at"));
        fetch_all(self.store.as_ref(), &query).await
    }

    /// Gets a workspace by ID.
    pub async fn get_workspace(&self, id: WorkspaceId) -> AppResult<Workspace> {
        find_by_id(self.store.as_ref(), id.into_uuid())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Workspace {id} not found")))
    }

    /// Creates a workspace.
    pub async fn create_workspace(&self, name: &str, color: Option<&str>) -> AppResult<Workspace> {
        let workspace = Workspace::new(name, color)?;
        let workspace = insert_one(self.store.as_ref(), &workspace).await?;
        self.signal.mark_dirty();
        info!(workspace_id = %workspace.id, name = %workspace.name, "Workspace created");
        Ok(workspace)
    }

    /// Renames a workspace.
    pub async fn rename_workspace(&self, id: WorkspaceId, name: &str) -> AppResult<Workspace> {
        let name = validate_name(name, "Workspace")?;
        self.get_workspace(id).await?;
        let workspace: Workspace = update_one(
            self.store.as_ref(),
            id.into_uuid(),
            fields(json!({ "name": name, "updated_at": Utc::now() })),
        )
        .await?;
        self.signal.mark_dirty();
        info!(workspace_id = %id, name = %workspace.name, "Workspace renamed");
        Ok(workspace)
    }

    /// Changes the display color of a workspace.
    pub async fn recolor_workspace(&self, id: WorkspaceId, color: &str) -> AppResult<Workspace> {
        let color = validate_color(color)?;
        self.get_workspace(id).await?;
        let workspace: Workspace = update_one(
            self.store.as_ref(),
            id.into_uuid(),
            fields(json!({ "color": color, "updated_at": Utc::now() })),
        )
        .await?;
        self.signal.mark_dirty();
        info!(workspace_id = %id, color = %workspace.color, "Workspace recolored");
        Ok(workspace)
    }

    /// Deletes an empty workspace.
    ///
    /// Rejected with a conflict while it still holds projects or live files.
    pub async fn delete_workspace(&self, id: WorkspaceId) -> AppResult<()> {
        let workspace = self.get_workspace(id).await?;

        let projects = self
            .store
            .count(Project::TABLE, &[FilterField::eq_id("workspace_id", id)])
            .await?;
        let files = self
            .store
            .count(
                FileRecord::TABLE,
                &[
                    FilterField::eq_id("workspace_id", id),
                    FilterField::is_null("deleted_at"),
                ],
            )
            .await?;
        if projects > 0 || files > 0 {
            return Err(AppError::conflict(format!(
                "Workspace '{}' still holds {projects} project(s) and {files} file(s)",
                workspace.name
            )));
        }

        self.store.delete(Workspace::TABLE, id.into_uuid()).await?;
        self.signal.mark_dirty();
        info!(workspace_id = %id, name = %workspace.name, "Workspace deleted");
        Ok(())
    }

    /// Lists the projects of a workspace by name.
    pub async fn list_projects(&self, workspace_id: WorkspaceId) -> AppResult<Vec<Project>> {
        let query = Query::new()
            .filter(FilterField::eq_id("workspace_id", workspace_id))
            .order_by(SortField::asc("name"));
        fetch_all(self.store.as_ref(), &query).await
    }

    /// Gets a project by ID.
    pub async fn get_project(&self, id: ProjectId) -> AppResult<Project> {
        find_by_id(self.store.as_ref(), id.into_uuid())
            .await?
            .ok_or_else(|| AppError::not_found(format!("Project {id} not found")))
    }

    /// Creates a project inside an existing workspace.
    pub async fn create_project(
        &self,
        workspace_id: WorkspaceId,
        name: &str,
        color: Option<&str>,
        description: Option<&str>,
    ) -> AppResult<Project> {
        self.get_workspace(workspace_id).await?;
        let project = Project::new(workspace_id, name, color, description)?;
        let project = insert_one(self.store.as_ref(), &project).await?;
        self.signal.mark_dirty();
        info!(
            workspace_id = %workspace_id,
            project_id = %project.id,
            name = %project.name,
            "Project created"
        );
        Ok(project)
    }

    /// Applies changes to a project.
    pub async fn update_project(&self, id: ProjectId, update: ProjectUpdate) -> AppResult<Project> {
        if update.is_empty() {
            return Err(AppError::validation("Nothing to update"));
        }
        self.get_project(id).await?;

        let mut changes = fields(json!({ "updated_at": Utc::now() }));
        if let Some(name) = &update.name {
            changes.insert("name".into(), json!(validate_name(name, "Project")?));
        }
        if let Some(color) = &update.color {
            changes.insert("color".into(), json!(validate_color(color)?));
        }
        if let Some(description) = &update.description {
            let description = description
                .as_deref()
                .map(str::trim)
                .filter(|d| !d.is_empty());
            changes.insert("description".into(), json!(description));
        }

        let project: Project = update_one(self.store.as_ref(), id.into_uuid(), changes).await?;
        self.signal.mark_dirty();
        info!(project_id = %id, name = %project.name, "Project updated");
        Ok(project)
    }

    /// Deletes an empty project.
    ///
    /// Rejected with a conflict while it still holds folders or live files.
    pub async fn delete_project(&self, id: ProjectId) -> AppResult<()> {
        let project = self.get_project(id).await?;

        let folders = self
            .store
            .count(Folder::TABLE, &[FilterField::eq_id("project_id", id)])
            .await?;
        let files = self
            .store
            .count(
                FileRecord::TABLE,
                &[
                    FilterField::eq_id("project_id", id),
                    FilterField::is_null("deleted_at"),
                ],
            )
            .await?;
        if folders > 0 || files > 0 {
            return Err(AppError::conflict(format!(
                "Project '{}' still holds {folders} folder(s) and {files} file(s)",
                project.name
            )));
        }

        self.store.delete(Project::TABLE, id.into_uuid()).await?;
        self.signal.mark_dirty();
        info!(project_id = %id, name = %project.name, "Project deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use filekeep_core::ErrorKind;
    use filekeep_entity::file::{FileLocation, NewFileRecord};
    use filekeep_store::MemoryRecordStore;

    use super::*;

    fn service() -> (WorkspaceService, Arc<dyn RecordStore>) {
        let store: Arc<dyn RecordStore> = Arc::new(MemoryRecordStore::new());
        (WorkspaceService::new(store.clone(), InvalidationSignal::new()), store)
    }

    #[tokio::test]
    async fn test_workspace_lifecycle() {
        let (svc, _) = service();
        let ws = svc.create_workspace(" Studio ", None).await.expect("create");
        assert_eq!(ws.name, "Studio");

        let ws = svc.rename_workspace(ws.id, "Agency").await.expect("rename");
        assert_eq!(ws.name, "Agency");
        let ws = svc.recolor_workspace(ws.id, "#ABCDEF").await.expect("recolor");
        assert_eq!(ws.color, "#abcdef");
        assert!(svc.recolor_workspace(ws.id, "blue").await.is_err());

        assert_eq!(svc.list_workspaces().await.expect("list").len(), 1);
        svc.delete_workspace(ws.id).await.expect("delete");
        let err = svc.get_workspace(ws.id).await.expect_err("gone");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_non_empty_containers_cannot_be_deleted() {
        let (svc, store) = service();
        let ws = svc.create_workspace("Main", None).await.expect("create");
        let project = svc
            .create_project(ws.id, "Launch", Some("#00ff00"), Some("  "))
            .await
            .expect("project");
        assert_eq!(project.description, None);

        let err = svc.delete_workspace(ws.id).await.expect_err("has project");
        assert_eq!(err.kind, ErrorKind::Conflict);

        let file = NewFileRecord {
            workspace_id: ws.id,
            location: FileLocation::project_root(project.id),
            name: "brief.md".into(),
            size_bytes: 3,
            mime_type: None,
            storage_path: "objects/brief.md".into(),
            tags: vec![],
        }
        .into_record()
        .expect("record");
        store
            .insert(FileRecord::TABLE, vec![file.to_row().expect("row")])
            .await
            .expect("seed");

        let err = svc.delete_project(project.id).await.expect_err("has file");
        assert_eq!(err.kind, ErrorKind::Conflict);

        store
            .update(
                FileRecord::TABLE,
                file.id.into_uuid(),
                fields(json!({ "deleted_at": Utc::now() })),
            )
            .await
            .expect("soft delete");
        svc.delete_project(project.id).await.expect("only deleted files left");
        svc.delete_workspace(ws.id).await.expect("empty now");
    }

    #[tokio::test]
    async fn test_update_project() {
        let (svc, _) = service();
        let ws = svc.create_workspace("Main", None).await.expect("create");
        let project = svc
            .create_project(ws.id, "Launch", None, Some("first"))
            .await
            .expect("project");

        let updated = svc
            .update_project(
                project.id,
                ProjectUpdate {
                    name: Some("Relaunch".into()),
                    description: Some(None),
                    ..ProjectUpdate::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.name, "Relaunch");
        assert_eq!(updated.description, None);
        assert_eq!(updated.color, project.color);

        let err = svc
            .update_project(project.id, ProjectUpdate::default())
            .await
            .expect_err("empty");
        assert_eq!(err.kind, ErrorKind::Validation);

        let err = svc
            .create_project(WorkspaceId::new(), "Orphan", None, None)
            .await
            .expect_err("no workspace");
        assert_eq!(err.kind, ErrorKind::NotFound);
    }
}
