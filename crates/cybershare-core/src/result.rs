//! Convenience result type alias for CyberShare.

use crate::error::AppError;

/// A specialized `Result` type for CyberShare operations.
pub type AppResult<T> = Result<T, AppError>;
