//! File domain entities.

pub mod model;
pub mod patch;

pub use model::{FileCategory, FileLocation, FileRecord, NewFileRecord};
pub use patch::FilePatch;
