// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # CursorBar Providers
//!
//! Usage providers for the CursorBar application.
//!
//! The [`cursor`] module reads the session of a locally logged-in Cursor
//! editor and fetches its plan usage:
//!
//! | Step | Module | Output |
//! |------|--------|--------|
//! | Locate `state.vscdb` | [`cursor::locator`] | `PathBuf` |
//! | Extract credential | [`cursor::auth`] | [`cursor::SessionToken`] |
//! | Fetch usage | [`cursor::api`] | `UsageSnapshot` |
//! | Orchestrate | [`cursor::fetcher`] | [`cursor::CursorUsage`] |
//!
//! ## Usage
//!
//! ```ignore
//! use cursorbar_providers::cursor::CursorUsageFetcher;
//!
//! let usage = CursorUsageFetcher::new().fetch().await?;
//! println!("renews {}", usage.billing_cycle.next_renewal);
//! ```

pub mod cursor;

// Re-export key types
pub use cursor::{CursorError, CursorUsage, CursorUsageFetcher, CycleError, CycleStage};
