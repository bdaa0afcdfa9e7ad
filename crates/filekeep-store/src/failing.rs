//! Fault-injecting record store wrapper.
//!
//! Wraps another store and fails or delays selected operations. Used to
//! exercise rollback and partial-failure reporting.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use filekeep_core::error::AppError;
use filekeep_core::result::AppResult;
use filekeep_core::traits::RecordStore;
use filekeep_core::types::{FilterField, Query, Row};

/// Which operations a [`FailingStore`] should fail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureRule {
    /// Fail `update` of this row in any table.
    UpdateOf(Uuid),
    /// Fail every `update_where` on this table.
    UpdateWhereOn(String),
    /// Fail `delete` of this row in any table.
    DeleteOf(Uuid),
    /// Fail every `insert` into this table.
    InsertInto(String),
    /// Fail every `query` and `count` on this table.
    ReadsOn(String),
    /// Fail the n-th write (1-based) counted across all write operations.
    NthWrite(usize),
}

/// A [`RecordStore`] that injects failures into an inner store.
#[derive(Debug, Clone)]
pub struct FailingStore {
    inner: Arc<dyn RecordStore>,
    rules: Arc<Mutex<Vec<FailureRule>>>,
    writes: Arc<AtomicUsize>,
    /// Delay applied to the next `query` only.
    next_query_delay: Arc<Mutex<Option<Duration>>>,
}

impl FailingStore {
    /// Wrap `inner` with no failures configured.
    pub fn new(inner: Arc<dyn RecordStore>) -> Self {
        Self {
            inner,
            rules: Arc::new(Mutex::new(Vec::new())),
            writes: Arc::new(AtomicUsize::new(0)),
            next_query_delay: Arc::new(Mutex::new(None)),
        }
    }

    /// Add a failure rule.
    pub fn fail(&self, rule: FailureRule) {
        self.rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(rule);
    }

    /// Remove every failure rule.
    pub fn clear(&self) {
        self.rules.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    /// Delay the next `query` call by `delay`.
    pub fn delay_next_query(&self, delay: Duration) {
        *self
            .next_query_delay
            .lock()
            .unwrap_or_else(|e| e.into_inner()) = Some(delay);
    }

    /// Number of write operations attempted so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    fn matches(&self, predicate: impl Fn(&FailureRule) -> bool) -> bool {
        self.rules
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .any(predicate)
    }

    /// Count a write and check the positional and operation rules.
    fn check_write(&self, op: &str, predicate: impl Fn(&FailureRule) -> bool) -> AppResult<()> {
        let n = self.writes.fetch_add(1, Ordering::SeqCst) + 1;
        if self.matches(|rule| *rule == FailureRule::NthWrite(n) || predicate(rule)) {
            debug!(op, write = n, "Injected store failure");
            return Err(AppError::store(format!("Injected failure in {op}")));
        }
        Ok(())
    }

    fn check_read(&self, table: &str) -> AppResult<()> {
        if self.matches(|rule| matches!(rule, FailureRule::ReadsOn(t) if t == table)) {
            return Err(AppError::store(format!("Injected read failure on '{table}'")));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for FailingStore {
    async fn query(&self, table: &str, query: &Query) -> AppResult<Vec<Row>> {
        let delay = self
            .next_query_delay
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .take();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.check_read(table)?;
        self.inner.query(table, query).await
    }

    async fn count(&self, table: &str, filters: &[FilterField]) -> AppResult<u64> {
        self.check_read(table)?;
        self.inner.count(table, filters).await
    }

    async fn insert(&self, table: &str, rows: Vec<Row>) -> AppResult<Vec<Row>> {
        self.check_write("insert", |rule| {
            matches!(rule, FailureRule::InsertInto(t) if t == table)
        })?;
        self.inner.insert(table, rows).await
    }

    async fn update(&self, table: &str, id: Uuid, fields: Row) -> AppResult<Row> {
        self.check_write("update", |rule| *rule == FailureRule::UpdateOf(id))?;
        self.inner.update(table, id, fields).await
    }

    async fn update_where(
        &self,
        table: &str,
        filters: &[FilterField],
        fields: Row,
    ) -> AppResult<u64> {
        self.check_write("update_where", |rule| {
            matches!(rule, FailureRule::UpdateWhereOn(t) if t == table)
        })?;
        self.inner.update_where(table, filters, fields).await
    }

    async fn delete(&self, table: &str, id: Uuid) -> AppResult<bool> {
        self.check_write("delete", |rule| *rule == FailureRule::DeleteOf(id))?;
        self.inner.delete(table, id).await
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::memory::MemoryRecordStore;

    fn row(id: Uuid) -> Row {
        let mut row = Row::new();
        row.insert("id".into(), json!(id.to_string()));
        row
    }

    #[tokio::test]
    async fn test_fails_only_selected_update() {
        let store = FailingStore::new(Arc::new(MemoryRecordStore::new()));
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        store.insert("files", vec![row(a), row(b)]).await.expect("insert");

        store.fail(FailureRule::UpdateOf(a));
        assert!(store.update("files", a, Row::new()).await.is_err());
        assert!(store.update("files", b, Row::new()).await.is_ok());

        store.clear();
        assert!(store.update("files", a, Row::new()).await.is_ok());
        assert_eq!(store.write_count(), 4);
    }

    #[tokio::test]
    async fn test_nth_write() {
        let store = FailingStore::new(Arc::new(MemoryRecordStore::new()));
        store.fail(FailureRule::NthWrite(2));
        assert!(store.insert("t", vec![row(Uuid::new_v4())]).await.is_ok());
        assert!(store.insert("t", vec![row(Uuid::new_v4())]).await.is_err());
        assert!(store.insert("t", vec![row(Uuid::new_v4())]).await.is_ok());
        assert_eq!(store.count("t", &[]).await.expect("count"), 2);
    }
}
