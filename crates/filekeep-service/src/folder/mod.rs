//! Folder hierarchy service and move validation.

pub mod tree;
pub mod validator;

pub use tree::{FolderDeletion, FolderTree, MoveOutcome};
pub use validator::{MoveRejection, MoveValidator};
