//! Settings file I/O.
//!
//! The settings file can name a path inside another application's private
//! data, so it is written owner-only (0600 in a 0700 directory on Unix).

use serde::{Serialize, de::DeserializeOwned};
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::StoreError;

/// File name of the settings document inside the config dir.
const SETTINGS_FILE_NAME: &str = "settings.json";

#[cfg(unix)]
const OWNER_FILE_MODE: u32 = 0o600;
#[cfg(unix)]
const OWNER_DIR_MODE: u32 = 0o700;

// ============================================================================
// Default Paths
// ============================================================================

/// Returns the default configuration directory.
///
/// - macOS: `~/Library/Application Support/CursorBar`
/// - Linux: `~/.config/cursorbar`
/// - Windows: `%APPDATA%\cursorbar`
///
/// Falls back to the working directory when no home is known.
pub fn default_config_dir() -> PathBuf {
    let dir = if cfg!(target_os = "macos") {
        dirs::home_dir().map(|h| h.join("Library/Application Support/CursorBar"))
    } else {
        dirs::config_dir().map(|c| c.join("cursorbar"))
    };
    dir.unwrap_or_else(|| PathBuf::from("."))
}

/// Returns the default settings file path.
pub fn default_settings_path() -> PathBuf {
    default_config_dir().join(SETTINGS_FILE_NAME)
}

// ============================================================================
// Owner-only permissions
// ============================================================================

#[cfg(unix)]
async fn restrict_to_owner(path: &Path, mode: u32) -> Result<(), StoreError> {
    use std::os::unix::fs::PermissionsExt;

    tokio::fs::set_permissions(path, std::fs::Permissions::from_mode(mode)).await?;
    debug!(path = %path.display(), mode = %format!("{mode:o}"), "Restricted permissions");
    Ok(())
}

#[cfg(unix)]
async fn restrict_file(path: &Path) -> Result<(), StoreError> {
    restrict_to_owner(path, OWNER_FILE_MODE).await
}

#[cfg(unix)]
async fn restrict_dir(path: &Path) -> Result<(), StoreError> {
    restrict_to_owner(path, OWNER_DIR_MODE).await
}

#[cfg(not(unix))]
async fn restrict_file(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

#[cfg(not(unix))]
async fn restrict_dir(_path: &Path) -> Result<(), StoreError> {
    Ok(())
}

// ============================================================================
// JSON documents
// ============================================================================

/// Writes `data` as pretty JSON to `path`.
///
/// The parent directory is created when missing. The document goes to a
/// sibling `.tmp` file first and is renamed into place, so a reader never
/// sees a half-written file.
///
/// # Errors
///
/// Returns `StoreError::Serialization` if `data` cannot be serialized and
/// `StoreError::Io` if any filesystem step fails.
pub async fn save_json<T: Serialize>(path: &Path, data: &T) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(data)?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        ensure_dir(parent).await?;
    }

    let staging = path.with_extension("json.tmp");
    tokio::fs::write(&staging, json.as_bytes()).await?;
    restrict_file(&staging).await?;
    tokio::fs::rename(&staging, path).await?;

    debug!(path = %path.display(), bytes = json.len(), "Saved JSON");
    Ok(())
}

/// Reads and parses a JSON document.
///
/// # Errors
///
/// Returns `StoreError::Io` if the file cannot be read and
/// `StoreError::Serialization` if it is not valid JSON for `T`.
pub async fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T, StoreError> {
    let content = tokio::fs::read_to_string(path).await?;
    let data = serde_json::from_str(&content)?;

    debug!(path = %path.display(), bytes = content.len(), "Loaded JSON");
    Ok(data)
}

/// Creates `path` (and its ancestors) if it does not exist.
///
/// Only a directory created here is restricted; an existing one keeps its
/// permissions.
///
/// # Errors
///
/// Returns `StoreError::Io` if the directory cannot be created.
pub async fn ensure_dir(path: &Path) -> Result<(), StoreError> {
    if path.is_dir() {
        return Ok(());
    }

    debug!(path = %path.display(), "Creating directory");
    tokio::fs::create_dir_all(path).await?;
    restrict_dir(path).await
}

// ============================================================================
// Tests
// ============================================================================
