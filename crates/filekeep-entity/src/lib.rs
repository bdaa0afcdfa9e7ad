//! # filekeep-entity
//!
//! Domain entity models for FileKeep. Every struct in this crate represents
//! a record store row or a domain value object. Row-backed entities
//! implement [`Record`] so they can be converted to and from the generic
//! JSON rows the record store deals in.

pub mod file;
pub mod folder;
pub mod project;
pub mod record;
pub mod workspace;

pub use record::Record;
