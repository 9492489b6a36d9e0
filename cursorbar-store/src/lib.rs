// Lint configuration for this crate
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

//! # CursorBar Store
//!
//! Settings persistence for the CursorBar application.
//!
//! This crate provides:
//!
//! - **Settings**: User preferences (database path override, app name,
//!   API base URL, log level)
//! - **SettingsStore**: Settings bound to a file
//! - **Persistence**: File I/O helpers for JSON data
//!
//! Fetched usage is never persisted.
//!
//! ## Usage
//!
//! ```ignore
//! use cursorbar_store::SettingsStore;
//!
//! let store = SettingsStore::load_default().await;
//! store.try_update(|s| s.set_database_path("/data/state.vscdb")).await?;
//! store.save().await?;
//! ```

pub mod error;
pub mod persistence;
pub mod settings;

pub use error::StoreError;
pub use persistence::{default_config_dir, default_settings_path, ensure_dir, load_json, save_json};
pub use settings::{DEFAULT_APP_NAME, LogLevel, Settings, SettingsStore};
