//! Workspace and project management.

pub mod service;

pub use service::{ProjectUpdate, WorkspaceService};
