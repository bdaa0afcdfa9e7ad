//! Generic record store trait.

use async_trait::async_trait;
use uuid::Uuid;

use crate::result::AppResult;
use crate::types::{FilterField, Query, Row};

/// A table-oriented record store reachable through query/insert/update/delete.
///
/// Rows are JSON objects keyed by column name and identified by an `id`
/// column holding a UUID string. The store makes no ordering promise beyond
/// the sort fields of a [`Query`].
#[async_trait]
pub trait RecordStore: Send + Sync + std::fmt::Debug + 'static {
    /// Return the rows of `table` matching `query`.
    async fn query(&self, table: &str, query: &Query) -> AppResult<Vec<Row>>;

    /// Count the rows of `table` matching every filter.
    async fn count(&self, table: &str, filters: &[FilterField]) -> AppResult<u64>;

    /// Insert rows and return them as stored.
    async fn insert(&self, table: &str, rows: Vec<Row>) -> AppResult<Vec<Row>>;

    /// Merge `fields` into the row with primary key `id` and return the result.
    async fn update(&self, table: &str, id: Uuid, fields: Row) -> AppResult<Row>;

    /// Merge `fields` into every row matching the filters. Returns the number of rows touched.
    async fn update_where(&self, table: &str, filters: &[FilterField], fields: Row)
    -> AppResult<u64>;

    /// Delete the row with primary key `id`. Returns `true` if a row was removed.
    async fn delete(&self, table: &str, id: Uuid) -> AppResult<bool>;
}
