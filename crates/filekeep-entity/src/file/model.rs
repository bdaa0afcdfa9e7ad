//! File record entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use filekeep_core::result::AppResult;
use filekeep_core::types::{FileId, FolderId, ProjectId, WorkspaceId};

use crate::record::{Record, tables};
use crate::workspace::model::validate_name;

/// Broad content category of a file, derived from its MIME type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FileCategory {
    /// Raster or vector images.
    Image,
    /// Video content.
    Video,
    /// Audio content.
    Audio,
    /// Text, PDF, office documents.
    Document,
    /// Compressed archives.
    Archive,
    /// Anything else.
    Other,
}

impl FileCategory {
    /// Derive the category from a MIME type.
    pub fn from_mime(mime: Option<&str>) -> Self {
        let Some(mime) = mime else {
            return Self::Other;
        };
        let mime = mime.to_ascii_lowercase();
        match mime.split('/').next().unwrap_or_default() {
            "image" => Self::Image,
            "video" => Self::Video,
            "audio" => Self::Audio,
            "text" => Self::Document,
            _ if mime == "application/pdf"
                || mime.contains("document")
                || mime.contains("msword")
                || mime.contains("spreadsheet")
                || mime.contains("presentation") =>
            {
                Self::Document
            }
            _ if mime.contains("zip")
                || mime.contains("tar")
                || mime.contains("gzip")
                || mime.contains("compressed") =>
            {
                Self::Archive
            }
            _ => Self::Other,
        }
    }
}

/// Where a file is filed inside its workspace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FileLocation {
    /// Owning project (`None` for workspace root).
    pub project_id: Option<ProjectId>,
    /// Owning folder (`None` for project root or workspace root).
    pub folder_id: Option<FolderId>,
}

impl FileLocation {
    /// The workspace root: no project, no folder.
    pub fn workspace_root() -> Self {
        Self {
            project_id: None,
            folder_id: None,
        }
    }

    /// The root of a project.
    pub fn project_root(project_id: ProjectId) -> Self {
        Self {
            project_id: Some(project_id),
            folder_id: None,
        }
    }

    /// A folder inside a project.
    pub fn folder(project_id: ProjectId, folder_id: FolderId) -> Self {
        Self {
            project_id: Some(project_id),
            folder_id: Some(folder_id),
        }
    }

    /// A folder without a project is not a place a file can be filed.
    pub fn is_well_formed(&self) -> bool {
        self.folder_id.is_none() || self.project_id.is_some()
    }
}

/// A file record: catalog metadata for one stored object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Unique file identifier.
    pub id: FileId,
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Owning project, if filed under one.
    #[serde(default)]
    pub project_id: Option<ProjectId>,
    /// Owning folder, if filed inside one.
    #[serde(default)]
    pub folder_id: Option<FolderId>,
    /// Display name.
    pub name: String,
    /// Name the file had when it was uploaded.
    pub original_name: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type of the content.
    #[serde(default)]
    pub mime_type: Option<String>,
    /// Content category.
    pub category: FileCategory,
    /// Location of the backing object in object storage.
    pub storage_path: String,
    /// Optional external link.
    #[serde(default)]
    pub external_url: Option<String>,
    /// Favorite flag.
    #[serde(default)]
    pub is_favorite: bool,
    /// Tag set. Order is irrelevant.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Soft-delete marker.
    #[serde(default)]
    pub deleted_at: Option<DateTime<Utc>>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last updated.
    pub updated_at: DateTime<Utc>,
}

impl FileRecord {
    /// Current location.
    pub fn location(&self) -> FileLocation {
        FileLocation {
            project_id: self.project_id,
            folder_id: self.folder_id,
        }
    }

    /// Whether the record carries the soft-delete marker.
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Get the file extension (lowercase), if any.
    pub fn extension(&self) -> Option<String> {
        self.name
            .rsplit('.')
            .next()
            .filter(|ext| *ext != self.name)
            .map(|ext| ext.to_lowercase())
    }
}

impl Record for FileRecord {
    const TABLE: &'static str = tables::FILES;

    fn record_id(&self) -> Uuid {
        self.id.into_uuid()
    }
}

/// Data handed over by the upload pipeline for a freshly stored object.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewFileRecord {
    /// Owning workspace.
    pub workspace_id: WorkspaceId,
    /// Where to file the record.
    pub location: FileLocation,
    /// Original file name.
    pub name: String,
    /// Size in bytes.
    pub size_bytes: i64,
    /// MIME type.
    pub mime_type: Option<String>,
    /// Location of the backing object.
    pub storage_path: String,
    /// Initial tags.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl NewFileRecord {
    /// Materialize the record with fresh id and timestamps.
    pub fn into_record(self) -> AppResult<FileRecord> {
        let name = validate_name(&self.name, "File")?;
        let now = Utc::now();
        Ok(FileRecord {
            id: FileId::new(),
            workspace_id: self.workspace_id,
            project_id: self.location.project_id,
            folder_id: self.location.folder_id,
            original_name: name.clone(),
            name,
            size_bytes: self.size_bytes,
            category: FileCategory::from_mime(self.mime_type.as_deref()),
            mime_type: self.mime_type,
            storage_path: self.storage_path,
            external_url: None,
            is_favorite: false,
            tags: self.tags,
            deleted_at: None,
            created_at: now,
            updated_at: now,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_from_mime() {
        assert_eq!(FileCategory::from_mime(Some("image/png")), FileCategory::Image);
        assert_eq!(FileCategory::from_mime(Some("application/pdf")), FileCategory::Document);
        assert_eq!(FileCategory::from_mime(Some("application/zip")), FileCategory::Archive);
        assert_eq!(FileCategory::from_mime(Some("application/octet-stream")), FileCategory::Other);
        assert_eq!(FileCategory::from_mime(None), FileCategory::Other);
    }

    #[test]
    fn test_location_shapes() {
        let p = ProjectId::new();
        assert!(FileLocation::workspace_root().is_well_formed());
        assert!(FileLocation::folder(p, FolderId::new()).is_well_formed());
        let broken = FileLocation {
            project_id: None,
            folder_id: Some(FolderId::new()),
        };
        assert!(!broken.is_well_formed());
    }

    #[test]
    fn test_new_record_keeps_original_name() {
        let record = NewFileRecord {
            workspace_id: WorkspaceId::new(),
            location: FileLocation::workspace_root(),
            name: " invoice.PDF ".into(),
            size_bytes: 42,
            mime_type: Some("application/pdf".into()),
            storage_path: "ws/invoice.pdf".into(),
            tags: vec![],
        }
        .into_record()
        .expect("valid");
        assert_eq!(record.name, "invoice.PDF");
        assert_eq!(record.original_name, "invoice.PDF");
        assert_eq!(record.extension().as_deref(), Some("pdf"));
        assert_eq!(record.category, FileCategory::Document);
    }

    #[test]
    fn test_row_without_optional_columns_parses() {
        let record = NewFileRecord {
            workspace_id: WorkspaceId::new(),
            location: FileLocation::workspace_root(),
            name: "a.txt".into(),
            size_bytes: 1,
            mime_type: None,
            storage_path: "a".into(),
            tags: vec![],
        }
        .into_record()
        .expect("valid");
        let mut row = record.to_row().expect("row");
        row.remove("tags");
        row.remove("project_id");
        let back = FileRecord::from_row(row).expect("parse");
        assert!(back.tags.is_empty());
        assert_eq!(back.project_id, None);
    }
}
