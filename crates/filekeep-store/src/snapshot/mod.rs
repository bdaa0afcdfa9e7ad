//! Record store persisted to a JSON snapshot file.
//!
//! Reads are served from memory. Every successful write rewrites the whole
//! snapshot through a temporary file and an atomic rename, so a crash never
//! leaves a half-written snapshot behind.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use filekeep_core::error::{AppError, ErrorKind};
use filekeep_core::result::AppResult;
use filekeep_core::traits::{ChangeFeed, RecordStore};
use filekeep_core::types::{FilterField, Query, Row};

use crate::memory::MemoryRecordStore;

/// Current on-disk format version.
const SNAPSHOT_VERSION: u32 = 1;

/// On-disk layout of a snapshot.
#[derive(Debug, Serialize, Deserialize)]
struct SnapshotFile {
    version: u32,
    saved_at: DateTime<Utc>,
    #[serde(default)]
    tables: HashMap<String, Vec<Row>>,
}

/// A [`MemoryRecordStore`] mirrored to a JSON file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    inner: MemoryRecordStore,
    path: PathBuf,
    /// Serializes flushes so snapshots are written in order.
    flush_lock: Arc<Mutex<()>>,
}

impl SnapshotStore {
    /// Open the snapshot at `path`, starting empty if it does not exist.
    pub async fn open(path: impl AsRef<Path>, feed: Option<Arc<dyn ChangeFeed>>) -> AppResult<Self> {
        let path = path.as_ref().to_path_buf();
        let tables = match fs::read(&path).await {
            Ok(bytes) => {
                let snapshot: SnapshotFile = serde_json::from_slice(&bytes).map_err(|e| {
                    AppError::with_source(
                        ErrorKind::Serialization,
                        format!("Corrupt snapshot: {}", path.display()),
                        e,
                    )
                })?;
                if snapshot.version > SNAPSHOT_VERSION {
                    return Err(AppError::store(format!(
                        "Snapshot version {} is newer than supported version {SNAPSHOT_VERSION}",
                        snapshot.version
                    )));
                }
                snapshot.tables
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => HashMap::new(),
            Err(e) => {
                return Err(AppError::with_source(
                    ErrorKind::Store,
                    format!("Failed to read snapshot: {}", path.display()),
                    e,
                ));
            }
        };

        let rows: usize = tables.values().map(Vec::len).sum();
        info!(path = %path.display(), tables = tables.len(), rows, "Opened snapshot store");

        let mut inner = MemoryRecordStore::from_tables(tables);
        if let Some(feed) = feed {
            inner.set_feed(feed);
        }

        Ok(Self {
            inner,
            path,
            flush_lock: Arc::new(Mutex::new(())),
        })
    }

    /// Snapshot file location.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Write the current tables to disk.
    pub async fn flush(&self) -> AppResult<()> {
        let _guard = self.flush_lock.lock().await;

        let snapshot = SnapshotFile {
            version: SNAPSHOT_VERSION,
            saved_at: Utc::now(),
            tables: self.inner.tables(),
        };
        let bytes = serde_json::to_vec_pretty(&snapshot)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await.map_err(|e| {
                AppError::with_source(
                    ErrorKind::Store,
                    format!("Failed to create snapshot directory: {}", parent.display()),
                    e,
                )
            })?;
        }

        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, &bytes).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Store,
                format!("Failed to write snapshot: {}", tmp.display()),
                e,
            )
        })?;
        fs::rename(&tmp, &self.path).await.map_err(|e| {
            AppError::with_source(
                ErrorKind::Store,
                format!("Failed to replace snapshot: {}", self.path.display()),
                e,
            )
        })?;

        debug!(path = %self.path.display(), bytes = bytes.len(), "Flushed snapshot");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for SnapshotStore {
    async fn query(&self, table: &str, query: &Query) -> AppResult<Vec<Row>> {
        self.inner.query(table, query).await
    }

    async fn count(&self, table: &str, filters: &[FilterField]) -> AppResult<u64> {
        self.inner.count(table, filters).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> AppResult<Vec<Row>> {
        let inserted = self.inner.insert(table, rows).await?;
        self.flush().await?;
        Ok(inserted)
    }

    async fn update(&self, table: &str, id: Uuid, fields: Row) -> AppResult<Row> {
        let updated = self.inner.update(table, id, fields).await?;
        self.flush().await?;
        Ok(updated)
    }

    async fn update_where(
        &self,
        table: &str,
        filters: &[FilterField],
        fields: Row,
    ) -> AppResult<u64> {
        let touched = self.inner.update_where(table, filters, fields).await?;
        if touched > 0 {
            self.flush().await?;
        }
        Ok(touched)
    }

    async fn delete(&self, table: &str, id: Uuid) -> AppResult<bool> {
        let removed = self.inner.delete(table, id).await?;
        if removed {
            self.flush().await?;
        }
        Ok(removed)
    }
}
