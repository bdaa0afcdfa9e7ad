//! # filekeep-service
//!
//! Organizational and synchronization layer for FileKeep. Each service
//! talks to the record store through the `RecordStore` trait and raises the
//! shared [`InvalidationSignal`] after every successful mutation.
//!
//! Services follow constructor injection: all collaborators are provided
//! at construction time via `Arc` references.

pub mod dnd;
pub mod file;
pub mod folder;
pub mod records;
pub mod report;
pub mod signal;
pub mod tag;
pub mod workspace;

pub use dnd::{DragPayload, DropOutcome, apply_drop};
pub use file::{CollectionSync, ContentFilter, FileCollection, LoadOutcome, Scope};
pub use folder::{FolderDeletion, FolderTree, MoveOutcome, MoveRejection, MoveValidator};
pub use report::{BatchFailure, BatchReport};
pub use signal::{InvalidationSignal, SignalState};
pub use tag::{TagOperation, TagOperationReport, TagStat, TagTaxonomy};
pub use workspace::{ProjectUpdate, WorkspaceService};
