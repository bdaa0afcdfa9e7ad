//! Object storage trait for the bytes backing a file record.

use async_trait::async_trait;

use crate::result::AppResult;

/// Storage holding the backing object of each file record.
///
/// Only the operations the organizational layer needs are exposed; byte
/// transfer belongs to the upload pipeline.
#[async_trait]
pub trait ObjectStorage: Send + Sync + std::fmt::Debug + 'static {
    /// Return the provider type name (e.g., "local", "memory").
    fn provider_type(&self) -> &str;

    /// Check whether an object exists at the given path.
    async fn exists(&self, path: &str) -> AppResult<bool>;

    /// Remove the object at the given path.
    async fn remove(&self, path: &str) -> AppResult<()>;
}
