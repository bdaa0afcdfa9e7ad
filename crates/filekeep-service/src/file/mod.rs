//! File collections: scoped paging, optimistic edits, batch operations, and push sync.

pub mod batch;
pub mod collection;
pub mod scope;
pub mod sync;

pub use collection::{FileCollection, LoadOutcome};
pub use scope::{ContentFilter, Scope};
pub use sync::CollectionSync;
