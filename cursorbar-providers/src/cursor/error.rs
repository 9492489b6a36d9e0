//! Cursor-specific errors.

use std::fmt;
use std::path::PathBuf;

use cursorbar_core::CoreError;
use cursorbar_fetch::StateDbError;
use thiserror::Error;

/// Cursor-specific errors.
#[derive(Debug, Error)]
pub enum CursorError {
    /// The state database does not exist at the resolved path.
    #[error("Cursor state database not found at {}", .path.display())]
    DatabaseNotFound {
        /// Path that was checked.
        path: PathBuf,
    },

    /// The state database holds no access token.
    #[error("No access token in Cursor state database (is Cursor logged in?)")]
    TokenMissing,

    /// The stored access token could not be decoded.
    #[error("Invalid access token: {0}")]
    InvalidToken(String),

    /// No user id could be taken from the session token.
    #[error("Could not extract user id from session token")]
    AuthExtraction,

    /// The usage endpoint answered with a non-success status.
    #[error("HTTP {status}: {body}")]
    Http {
        /// HTTP status code.
        status: u16,
        /// Response body, verbatim.
        body: String,
    },

    /// The request never produced a response.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The response body was not a usage snapshot.
    #[error("Invalid usage response: {0}")]
    Decode(String),

    /// The billing anchor could not be parsed.
    #[error("Invalid billing date: {0}")]
    InvalidDate(#[from] CoreError),

    /// The state database could not be read.
    #[error("State database error: {0}")]
    StateDb(#[from] StateDbError),
}

impl From<reqwest::Error> for CursorError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CursorError::Transport(format!("Request timed out: {err}"))
        } else if err.is_connect() {
            CursorError::Transport(format!("Connection failed: {err}"))
        } else {
            CursorError::Transport(err.to_string())
        }
    }
}

// ============================================================================
// Cycle Error
// ============================================================================

/// Step of a fetch cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CycleStage {
    /// Reading the session token from the state database.
    Credentials,
    /// Calling the usage endpoint.
    Usage,
    /// Projecting the billing cycle.
    BillingCycle,
}

impl CycleStage {
    /// Returns a display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Credentials => "Credential extraction",
            Self::Usage => "Usage request",
            Self::BillingCycle => "Billing cycle calculation",
        }
    }
}

impl fmt::Display for CycleStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A [`CursorError`] tagged with the step that produced it.
#[derive(Debug, Error)]
#[error("{stage} failed: {source}")]
pub struct CycleError {
    /// Where the cycle stopped.
    pub stage: CycleStage,
    /// The underlying failure.
    #[source]
    pub source: CursorError,
}

impl CycleError {
    /// Tags `source` with `stage`.
    pub fn new(stage: CycleStage, source: CursorError) -> Self {
        Self { stage, source }
    }

    /// Returns the underlying failure.
    pub fn source_error(&self) -> &CursorError {
        &self.source
    }

    /// Consumes the wrapper and returns the underlying failure.
    pub fn into_source(self) -> CursorError {
        self.source
    }
}
