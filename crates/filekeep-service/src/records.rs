//! Typed access helpers over the generic record store.

use serde_json::Value;
use uuid::Uuid;

use filekeep_core::result::AppResult;
use filekeep_core::traits::RecordStore;
use filekeep_core::types::{FilterField, Query, Row};
use filekeep_entity::Record;

/// Fetch one record by primary key.
pub async fn find_by_id<T: Record>(store: &dyn RecordStore, id: Uuid) -> AppResult<Option<T>> {
    let rows = store
        .query(T::TABLE, &Query::new().filter(FilterField::eq_id("id", id)).window(0, 1))
        .await?;
    rows.into_iter().next().map(T::from_row).transpose()
}

/// Fetch every record matching `query`.
pub async fn fetch_all<T: Record>(store: &dyn RecordStore, query: &Query) -> AppResult<Vec<T>> {
    T::from_rows(store.query(T::TABLE, query).await?)
}

/// Persist a new record and return it as stored.
pub async fn insert_one<T: Record>(store: &dyn RecordStore, record: &T) -> AppResult<T> {
    let mut rows = store.insert(T::TABLE, vec![record.to_row()?]).await?;
    match rows.pop() {
        Some(row) => T::from_row(row),
        None => record.to_row().and_then(T::from_row),
    }
}

/// Merge `fields` into a record and return the stored result.
pub async fn update_one<T: Record>(store: &dyn RecordStore, id: Uuid, fields: Row) -> AppResult<T> {
    T::from_row(store.update(T::TABLE, id, fields).await?)
}

/// Build a row from a JSON object literal. Non-object values yield an empty row.
pub fn fields(value: Value) -> Row {
    match value {
        Value::Object(map) => map,
        _ => Row::new(),
    }
}
