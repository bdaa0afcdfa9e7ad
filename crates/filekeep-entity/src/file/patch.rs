//! Partial updates of the mutable file record fields.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use filekeep_core::types::Row;

use super::model::{FileLocation, FileRecord};

/// The user-mutable subset of a file record. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilePatch {
    /// New display name.
    pub name: Option<String>,
    /// Replacement tag set.
    pub tags: Option<Vec<String>>,
    /// New favorite flag.
    pub is_favorite: Option<bool>,
    /// New project/folder association (both columns are written together).
    pub location: Option<FileLocation>,
    /// New external URL; `Some(None)` clears it.
    pub external_url: Option<Option<String>>,
}

impl FilePatch {
    /// Patch that only replaces the tag set.
    pub fn tags(tags: Vec<String>) -> Self {
        Self {
            tags: Some(tags),
            ..Self::default()
        }
    }

    /// Patch that only sets the favorite flag.
    pub fn favorite(is_favorite: bool) -> Self {
        Self {
            is_favorite: Some(is_favorite),
            ..Self::default()
        }
    }

    /// Patch that only moves the file.
    pub fn location(location: FileLocation) -> Self {
        Self {
            location: Some(location),
            ..Self::default()
        }
    }

    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.tags.is_none()
            && self.is_favorite.is_none()
            && self.location.is_none()
            && self.external_url.is_none()
    }

    /// Names of the columns this patch writes.
    pub fn changed_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.name.is_some() {
            fields.push("name");
        }
        if self.tags.is_some() {
            fields.push("tags");
        }
        if self.is_favorite.is_some() {
            fields.push("is_favorite");
        }
        if self.location.is_some() {
            fields.push("project_id");
            fields.push("folder_id");
        }
        if self.external_url.is_some() {
            fields.push("external_url");
        }
        fields
    }

    /// Mirror the patch into a locally held record.
    pub fn apply_to(&self, record: &mut FileRecord, now: DateTime<Utc>) {
        if let Some(name) = &self.name {
            record.name = name.clone();
        }
        if let Some(tags) = &self.tags {
            record.tags = tags.clone();
        }
        if let Some(fav) = self.is_favorite {
            record.is_favorite = fav;
        }
        if let Some(location) = self.location {
            record.project_id = location.project_id;
            record.folder_id = location.folder_id;
        }
        if let Some(url) = &self.external_url {
            record.external_url = url.clone();
        }
        record.updated_at = now;
    }

    /// Store columns for this patch, including the update timestamp.
    pub fn to_row(&self, now: DateTime<Utc>) -> Row {
        let mut row = Row::new();
        if let Some(name) = &self.name {
            row.insert("name".into(), json!(name));
        }
        if let Some(tags) = &self.tags {
            row.insert("tags".into(), json!(tags));
        }
        if let Some(fav) = self.is_favorite {
            row.insert("is_favorite".into(), json!(fav));
        }
        if let Some(location) = self.location {
            row.insert("project_id".into(), json!(location.project_id));
            row.insert("folder_id".into(), json!(location.folder_id));
        }
        if let Some(url) = &self.external_url {
            row.insert(
                "external_url".into(),
                url.as_ref().map_or(Value::Null, |u| json!(u)),
            );
        }
        row.insert("updated_at".into(), json!(now));
        row
    }
}
