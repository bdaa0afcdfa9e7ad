//! # filekeep-core
//!
//! Core crate for FileKeep. Contains the collaborator traits (record store,
//! object storage, change feed), configuration schemas, typed identifiers,
//! change events, pagination/sorting/filter types, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other FileKeep crates.

pub mod config;
pub mod error;
pub mod events;
pub mod result;
pub mod traits;
pub mod types;

pub use error::{AppError, ErrorKind};
pub use result::AppResult;
