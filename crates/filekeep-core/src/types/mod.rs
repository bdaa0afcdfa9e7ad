//! Core type definitions used across the FileKeep workspace.

pub mod filter;
pub mod id;
pub mod pagination;
pub mod sorting;

pub use filter::{FilterField, FilterOp, FilterValue, Query};
pub use id::*;
pub use pagination::{PageInfo, PageRequest, PageResponse};
pub use sorting::{SortDirection, SortField};

/// A record store row: a JSON object keyed by column name.
pub type Row = serde_json::Map<String, serde_json::Value>;
