//! Host APIs for CursorBar.
//!
//! This module provides abstractions for interacting with external systems:
//!
//! - [`http`] - HTTP client with tracing and domain allowlist
//! - [`process`] - Subprocess execution for host lookups
//! - [`platform`] - OS, home directory and WSL detection
//! - [`state_db`] - Snapshot reads of editor `state.vscdb` files

pub mod http;
pub mod platform;
pub mod process;
pub mod state_db;

// Re-export key types
pub use http::HttpClient;
pub use platform::{HostOs, PlatformInfo, WslInfo};
pub use process::{ProcessOutput, ProcessRunner};
pub use state_db::StateDb;
