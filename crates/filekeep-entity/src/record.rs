//! Conversion between entities and record store rows.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use uuid::Uuid;

use filekeep_core::error::AppError;
use filekeep_core::result::AppResult;
use filekeep_core::types::Row;

/// Table names used in the record store.
pub mod tables {
    /// Workspace rows.
    pub const WORKSPACES: &str = "workspaces";
    /// Project rows.
    pub const PROJECTS: &str = "projects";
    /// Folder rows.
    pub const FOLDERS: &str = "folders";
    /// File record rows.
    pub const FILES: &str = "files";
}

/// An entity stored as one row of a record store table.
pub trait Record: Serialize + DeserializeOwned + Sized {
    /// The table holding rows of this entity.
    const TABLE: &'static str;

    /// Primary key of this record.
    fn record_id(&self) -> Uuid;

    /// Serialize into a row.
    fn to_row(&self) -> AppResult<Row> {
        match serde_json::to_value(self)? {
            Value::Object(map) => Ok(map),
            other => Err(AppError::internal(format!(
                "{} record serialized to a non-object value: {other}",
                Self::TABLE
            ))),
        }
    }

    /// Deserialize from a row.
    fn from_row(row: Row) -> AppResult<Self> {
        serde_json::from_value(Value::Object(row)).map_err(|e| {
            AppError::with_source(
                filekeep_core::error::ErrorKind::Serialization,
                format!("Malformed {} row: {e}", Self::TABLE),
                e,
            )
        })
    }

    /// Deserialize a batch of rows.
    fn from_rows(rows: Vec<Row>) -> AppResult<Vec<Self>> {
        rows.into_iter().map(Self::from_row).collect()
    }
}
