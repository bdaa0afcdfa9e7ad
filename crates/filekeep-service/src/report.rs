//! Aggregate outcome of multi-record operations.

use serde::{Deserialize, Serialize};

use filekeep_core::error::AppError;
use filekeep_core::types::FileId;

/// One item that failed inside a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchFailure {
    /// The record that failed.
    pub id: FileId,
    /// Why it failed.
    pub message: String,
}

/// Which items of a batch succeeded, failed, or were never written.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    /// Items written successfully.
    pub succeeded: Vec<FileId>,
    /// Items whose write failed.
    pub failed: Vec<BatchFailure>,
    /// Items not written: nothing to change, duplicates, or stopped early.
    pub skipped: Vec<FileId>,
}

impl BatchReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a success.
    pub fn succeed(&mut self, id: FileId) {
        self.succeeded.push(id);
    }

    /// Record a failure.
    pub fn fail(&mut self, id: FileId, error: &AppError) {
        self.failed.push(BatchFailure {
            id,
            message: error.to_string(),
        });
    }

    /// Record an item that was not written.
    pub fn skip(&mut self, id: FileId) {
        self.skipped.push(id);
    }

    /// Number of failed items.
    pub fn failure_count(&self) -> usize {
        self.failed.len()
    }

    /// Number of items written.
    pub fn success_count(&self) -> usize {
        self.succeeded.len()
    }

    /// Ids of the failed items.
    pub fn failed_ids(&self) -> Vec<FileId> {
        self.failed.iter().map(|f| f.id).collect()
    }

    /// Whether no item failed.
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts() {
        let mut report = BatchReport::new();
        let (a, b, c) = (FileId::new(), FileId::new(), FileId::new());
        report.succeed(a);
        report.skip(b);
        assert!(report.is_complete());

        report.fail(c, &AppError::store("timeout"));
        assert!(!report.is_complete());
        assert_eq!(report.failure_count(), 1);
        assert_eq!(report.success_count(), 1);
        assert_eq!(report.failed_ids(), vec![c]);
        assert!(report.failed[0].message.contains("timeout"));
    }
}
