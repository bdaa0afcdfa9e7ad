//! Collaborator traits defined in `filekeep-core` and implemented by other crates.

pub mod change_feed;
pub mod record_store;
pub mod storage;

pub use change_feed::ChangeFeed;
pub use record_store::RecordStore;
pub use storage::ObjectStorage;
