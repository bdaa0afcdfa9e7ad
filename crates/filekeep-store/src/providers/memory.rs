//! In-memory object storage.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use dashmap::DashSet;

use filekeep_core::error::AppError;
use filekeep_core::result::AppResult;
use filekeep_core::traits::ObjectStorage;

/// Object storage that only tracks which paths exist.
///
/// `fail_removals` makes every removal error, for exercising callers that
/// must tolerate storage failures.
#[derive(Debug, Clone, Default)]
pub struct MemoryObjectStorage {
    objects: Arc<DashSet<String>>,
    fail_removals: Arc<AtomicBool>,
}

impl MemoryObjectStorage {
    /// Create empty storage.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an object.
    pub fn put(&self, path: impl Into<String>) {
        self.objects.insert(path.into());
    }

    /// Number of stored objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether storage holds nothing.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Toggle removal failures.
    pub fn fail_removals(&self, fail: bool) {
        self.fail_removals.store(fail, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectStorage for MemoryObjectStorage {
    fn provider_type(&self) -> &str {
        "memory"
    }

    async fn exists(&self, path: &str) -> AppResult<bool> {
        Ok(self.objects.contains(path))
    }

    async fn remove(&self, path: &str) -> AppResult<()> {
        if self.fail_removals.load(Ordering::SeqCst) {
            return Err(AppError::storage(format!("Failed to delete object: {path}")));
        }
        self.objects.remove(path);
        Ok(())
    }
}
