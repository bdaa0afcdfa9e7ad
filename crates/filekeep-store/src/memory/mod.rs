//! In-memory record store.

pub mod matcher;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::Value;
use tracing::debug;
use uuid::Uuid;

use filekeep_core::error::AppError;
use filekeep_core::events::{ChangeEvent, ChangeKind};
use filekeep_core::result::AppResult;
use filekeep_core::traits::{ChangeFeed, RecordStore};
use filekeep_core::types::{FilterField, Query, Row, WorkspaceId};

/// Tables of JSON rows kept in insertion order.
///
/// Every write to a row carrying a `workspace_id` column is published to the
/// attached change feed, which is how other sessions learn about changes.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecordStore {
    /// Table name → rows.
    tables: Arc<DashMap<String, Vec<Row>>>,
    /// Where row-level changes are published.
    feed: Option<Arc<dyn ChangeFeed>>,
}

impl MemoryRecordStore {
    /// Create an empty store without change publishing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store publishing changes to `feed`.
    pub fn with_feed(feed: Arc<dyn ChangeFeed>) -> Self {
        Self {
            tables: Arc::new(DashMap::new()),
            feed: Some(feed),
        }
    }

    /// Create a store pre-populated from a table snapshot.
    pub fn from_tables(tables: HashMap<String, Vec<Row>>) -> Self {
        Self {
            tables: Arc::new(tables.into_iter().collect()),
            feed: None,
        }
    }

    /// Attach a change feed.
    pub fn set_feed(&mut self, feed: Arc<dyn ChangeFeed>) {
        self.feed = Some(feed);
    }

    /// Copy of every table.
    pub fn tables(&self) -> HashMap<String, Vec<Row>> {
        self.tables
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Number of rows in `table`, ignoring filters.
    pub fn row_count(&self, table: &str) -> usize {
        self.tables.get(table).map_or(0, |rows| rows.len())
    }

    async fn publish(&self, table: &str, kind: ChangeKind, rows: &[Row]) {
        let Some(feed) = &self.feed else {
            return;
        };
        for row in rows {
            let (Some(workspace_id), Some(record_id)) = (workspace_of(row), row_id(row)) else {
                continue;
            };
            feed.publish(ChangeEvent::new(workspace_id, table, kind, record_id))
                .await;
        }
    }
}

fn row_id(row: &Row) -> Option<Uuid> {
    row.get("id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
}

fn workspace_of(row: &Row) -> Option<WorkspaceId> {
    row.get("workspace_id")
        .and_then(Value::as_str)
        .and_then(|s| s.parse().ok())
}

fn merge_fields(row: &mut Row, fields: &Row) {
    for (key, value) in fields {
        if key != "id" {
            row.insert(key.clone(), value.clone());
        }
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn query(&self, table: &str, query: &Query) -> AppResult<Vec<Row>> {
        let mut rows: Vec<Row> = self
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| matcher::matches_all(row, &query.filters))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if !query.sort.is_empty() {
            rows.sort_by(|a, b| matcher::compare_rows(a, b, &query.sort));
        }

        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        let window: Vec<Row> = rows.into_iter().skip(offset).take(limit).collect();

        debug!(table, returned = window.len(), "Memory store query");
        Ok(window)
    }

    async fn count(&self, table: &str, filters: &[FilterField]) -> AppResult<u64> {
        Ok(self.tables.get(table).map_or(0, |rows| {
            rows.iter()
                .filter(|row| matcher::matches_all(row, filters))
                .count() as u64
        }))
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> AppResult<Vec<Row>> {
        {
            let mut entry = self.tables.entry(table.to_string()).or_default();
            for row in &rows {
                let id = row_id(row).ok_or_else(|| {
                    AppError::validation(format!("Row for '{table}' is missing a UUID 'id' column"))
                })?;
                if entry.iter().any(|existing| row_id(existing) == Some(id)) {
                    return Err(AppError::conflict(format!(
                        "Row {id} already exists in '{table}'"
                    )));
                }
            }
            entry.extend(rows.iter().cloned());
        }

        self.publish(table, ChangeKind::Insert, &rows).await;
        Ok(rows)
    }

    async fn update(&self, table: &str, id: Uuid, fields: Row) -> AppResult<Row> {
        let updated = {
            let mut entry = self
                .tables
                .get_mut(table)
                .ok_or_else(|| AppError::not_found(format!("Row {id} not found in '{table}'")))?;
            let row = entry
                .iter_mut()
                .find(|row| row_id(row) == Some(id))
                .ok_or_else(|| AppError::not_found(format!("Row {id} not found in '{table}'")))?;
            merge_fields(row, &fields);
            row.clone()
        };

        self.publish(table, ChangeKind::Update, std::slice::from_ref(&updated))
            .await;
        Ok(updated)
    }

    async fn update_where(
        &self,
        table: &str,
        filters: &[FilterField],
        fields: Row,
    ) -> AppResult<u64> {
        let touched: Vec<Row> = match self.tables.get_mut(table) {
            Some(mut entry) => entry
                .iter_mut()
                .filter(|row| matcher::matches_all(row, filters))
                .map(|row| {
                    merge_fields(row, &fields);
                    row.clone()
                })
                .collect(),
            None => Vec::new(),
        };

        self.publish(table, ChangeKind::Update, &touched).await;
        Ok(touched.len() as u64)
    }

    async fn delete(&self, table: &str, id: Uuid) -> AppResult<bool> {
        let removed = match self.tables.get_mut(table) {
            Some(mut entry) => entry
                .iter()
                .position(|row| row_id(row) == Some(id))
                .map(|pos| entry.remove(pos)),
            None => None,
        };

        match removed {
            Some(row) => {
                self.publish(table, ChangeKind::Delete, std::slice::from_ref(&row))
                    .await;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
