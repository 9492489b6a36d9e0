//! Core error types for `CursorBar`.

use thiserror::Error;

/// Core error type for `CursorBar` operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A billing anchor or other date string could not be interpreted.
    #[error("Invalid date: {0}")]
    InvalidDate(String),

    /// Invalid data from API response.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
