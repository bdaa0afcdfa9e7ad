//! Workspace domain entities.

pub mod model;

pub use model::{Workspace, validate_color, validate_name};
