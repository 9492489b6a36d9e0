//! Fetch error types.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

// ============================================================================
// HTTP Error
// ============================================================================

/// HTTP-specific error type.
#[derive(Debug, Error)]
pub enum HttpError {
    /// Request error.
    #[error("Request error: {0}")]
    Request(#[from] reqwest::Error),

    /// Domain not allowed.
    #[error("Domain not allowed: {0}")]
    DomainNotAllowed(String),

    /// Invalid URL.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),
}

// ============================================================================
// Process Error
// ============================================================================

/// Error type for process operations.
#[derive(Debug, Error)]
pub enum ProcessError {
    /// Command not found.
    #[error("Command not found: {0}")]
    NotFound(String),

    /// Command timed out.
    #[error("Command timed out after {0:?}")]
    Timeout(Duration),

    /// Non-zero exit code.
    #[error("Command exited with code {code}: {stderr}")]
    NonZeroExit {
        /// Exit code from the process.
        code: i32,
        /// Standard error output.
        stderr: String,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

// ============================================================================
// State Database Error
// ============================================================================

/// Error type for reading an application state database.
#[derive(Debug, Error)]
pub enum StateDbError {
    /// The database file does not exist.
    #[error("State database not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Copying the database aside failed.
    #[error("Failed to copy state database: {0}")]
    Io(#[from] std::io::Error),

    /// SQLite rejected the file or a query.
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
