//! Workspace entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use filekeep_core::error::AppError;
use filekeep_core::result::AppResult;
use filekeep_core::types::WorkspaceId;

use crate::record::{Record, tables};

/// Default color assigned when none is given.
pub const DEFAULT_COLOR: &str = "#6366f1";

/// Longest accepted display name.
const MAX_NAME_LEN: usize = 255;

/// Top-level tenant boundary owning projects and file records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workspace {
    /// Unique workspace identifier.
    pub id: WorkspaceId,
    /// Display name.
    pub name: String,
    /// Display color (`#rrggbb`).
    pub color: String,
    /// When the workspace was created.
    pub created_at: DateTime<Utc>,
    /// When the workspace was last updated.
    pub updated_at: DateTime<Utc>,
}

impl Workspace {
    /// Build a new, not yet persisted workspace.
    pub fn new(name: &str, color: Option<&str>) -> AppResult<Self> {
        let now = Utc::now();
        Ok(Self {
            id: WorkspaceId::new(),
            name: validate_name(name, "Workspace")?,
            color: validate_color(color.unwrap_or(DEFAULT_COLOR))?,
            created_at: now,
            updated_at: now,
        })
    }
}

impl Record for Workspace {
    const TABLE: &'static str = tables::WORKSPACES;

    fn record_id(&self) -> Uuid {
        self.id.into_uuid()
    }
}

/// Trim and validate a display name; `what` names the entity in the error.
pub fn validate_name(name: &str, what: &str) -> AppResult<String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::validation(format!("{what} name cannot be empty")));
    }
    if trimmed.chars().count() > MAX_NAME_LEN {
        return Err(AppError::validation(format!(
            "{what} name cannot exceed {MAX_NAME_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

/// Validate a `#rrggbb` color and return it lowercased.
pub fn validate_color(color: &str) -> AppResult<String> {
    let color = color.trim();
    let valid = color.len() == 7
        && color.starts_with('#')
        && color[1..].chars().all(|c| c.is_ascii_hexdigit());
    if !valid {
        return Err(AppError::validation(format!(
            "Invalid color '{color}', expected #rrggbb"
        )));
    }
    Ok(color.to_ascii_lowercase())
}
