//! # filekeep-store
//!
//! Implementations of the record store and object storage collaborators:
//!
//! - [`MemoryRecordStore`]: in-process tables with a full filter engine,
//!   publishing row-level changes to an optional change feed.
//! - [`SnapshotStore`]: a memory store persisted to a JSON snapshot file
//!   after every write.
//! - [`LocalObjectStorage`] / [`MemoryObjectStorage`]: backing-object
//!   removal for file deletion.
//! - [`FailingStore`]: a wrapper that injects store failures, used to
//!   exercise partial-failure paths.

pub mod failing;
pub mod memory;
pub mod providers;
pub mod snapshot;

pub use failing::{FailingStore, FailureRule};
pub use memory::MemoryRecordStore;
pub use providers::local::LocalObjectStorage;
pub use providers::memory::MemoryObjectStorage;
pub use snapshot::SnapshotStore;
