//! Convenience result type alias for FileKeep.

use crate::error::AppError;

/// A specialized `Result` type for FileKeep operations.
pub type AppResult<T> = Result<T, AppError>;
