//! Row-level change events delivered by the change-notification feed.
//!
//! Events are published by the record store for every write to a row that
//! carries a `workspace_id`, and consumed by file collections to decide when
//! to reload. Delivery is best-effort, unordered, and at-least-once, so an
//! event only says "something in this workspace changed".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::WorkspaceId;

/// The kind of row-level change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    /// A row was inserted.
    Insert,
    /// A row was updated.
    Update,
    /// A row was deleted.
    Delete,
}

/// A single row-level change within one workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Unique event ID.
    pub id: Uuid,
    /// Workspace the changed row belongs to.
    pub workspace_id: WorkspaceId,
    /// Table the row lives in.
    pub table: String,
    /// What happened to the row.
    pub kind: ChangeKind,
    /// Primary key of the changed row.
    pub record_id: Uuid,
    /// When the change was observed.
    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    /// Create a new change event.
    pub fn new(
        workspace_id: WorkspaceId,
        table: impl Into<String>,
        kind: ChangeKind,
        record_id: Uuid,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            table: table.into(),
            kind,
            record_id,
            timestamp: Utc::now(),
        }
    }

    /// Whether the event concerns `table`.
    pub fn is_for_table(&self, table: &str) -> bool {
        self.table == table
    }
}
