//! Cursor IDE provider implementation.
//!
//! Cursor is an AI-powered code editor built on VS Code. A logged-in
//! Cursor keeps its access token in the editor's global state database;
//! this provider turns that token into a session cookie and asks the web
//! API for the current plan usage.
//!
//! ## Modules
//!
//! - [`locator`]: where `state.vscdb` lives on each platform
//! - [`auth`]: token extraction, JWT subject decoding, session cookie
//! - [`api`]: the `/api/usage` client
//! - [`fetcher`]: the fetch cycle tying the three together
//!
//! ## API Endpoints
//!
//! - `https://www.cursor.com/api/usage?user=<id>` - Get usage data
//!
//! ## Usage
//!
//! ```ignore
//! use cursorbar_providers::cursor::CursorUsageFetcher;
//!
//! let fetcher = CursorUsageFetcher::new();
//! let usage = fetcher.fetch().await?;
//! ```

// Modules
pub mod api;
pub mod auth;
mod error;
pub mod fetcher;
pub mod locator;

// Re-exports
pub use api::{CURSOR_API_BASE, CursorApiClient};
pub use auth::{
    ACCESS_TOKEN_KEY, CursorAuthReader, JwtClaims, NoDiagnostics, SessionToken,
    StateDbDiagnostics, TracingDiagnostics, decode_jwt_claims, user_id_from_subject,
};
pub use error::{CursorError, CycleError, CycleStage};
pub use fetcher::{CursorUsage, CursorUsageFetcher};
pub use locator::{DEFAULT_APP_NAME, resolve_state_db_path, resolve_state_db_path_for};
