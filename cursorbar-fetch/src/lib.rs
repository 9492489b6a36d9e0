// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # CursorBar Fetch
//!
//! Host APIs used by the CursorBar usage fetchers.
//!
//! ## Host APIs
//!
//! The [`host`] module provides abstractions for system interactions:
//!
//! - [`host::http`] - HTTP client with tracing and domain allowlist
//! - [`host::process`] - Subprocess execution for host lookups
//! - [`host::platform`] - OS, home directory and WSL detection
//! - [`host::state_db`] - Snapshot reads of editor `state.vscdb` files
//!
//! [`context::FetchContext`] bundles these so a fetcher receives them as a
//! single value.
//!
//! ## Example
//!
//! ```ignore
//! use cursorbar_fetch::FetchContext;
//!
//! let ctx = FetchContext::new();
//! let platform = ctx.platform().await;
//! println!("running on {}", platform.os.display_name());
//! ```

pub mod context;
pub mod error;
pub mod host;

// Re-export key types at crate root

// Errors
pub use error::{HttpError, ProcessError, StateDbError};

// Host APIs
pub use host::{
    http::HttpClient,
    platform::{HostOs, PlatformInfo, WslInfo},
    process::{ProcessOutput, ProcessRunner},
    state_db::StateDb,
};

// Context
pub use context::{FetchContext, FetchContextBuilder};
