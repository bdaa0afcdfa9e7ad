//! Channel type definitions and parsing.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use filekeep_core::types::WorkspaceId;

/// Typed channel identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "id")]
pub enum ChannelType {
    /// Every row-level change inside one workspace.
    Workspace(WorkspaceId),
    /// Changes to one table inside one workspace.
    Table(WorkspaceId, String),
}

impl ChannelType {
    /// Parses a channel string into a typed channel.
    pub fn parse(channel: &str) -> Option<Self> {
        let parts: Vec<&str> = channel.splitn(3, ':').collect();
        match parts.as_slice() {
            ["workspace", id] => Uuid::parse_str(id)
                .ok()
                .map(|id| ChannelType::Workspace(id.into())),
            ["workspace", id, table] if !table.is_empty() => Uuid::parse_str(id)
                .ok()
                .map(|id| ChannelType::Table(id.into(), (*table).to_string())),
            _ => None,
        }
    }

    /// Converts back to a channel string.
    pub fn to_channel_string(&self) -> String {
        match self {
            ChannelType::Workspace(id) => format!("workspace:{id}"),
            ChannelType::Table(id, table) => format!("workspace:{id}:{table}"),
        }
    }

    /// Workspace the channel belongs to.
    pub fn workspace_id(&self) -> WorkspaceId {
        match self {
            ChannelType::Workspace(id) | ChannelType::Table(id, _) => *id,
        }
    }
}
