//! User settings with persistence.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_settings_path, load_json, save_json};

/// Application directory name used when none is configured.
pub const DEFAULT_APP_NAME: &str = "Cursor";

// ============================================================================
// Settings
// ============================================================================

/// User settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Explicit `state.vscdb` path. Blank or unset means platform default.
    pub custom_database_path: Option<String>,

    /// Application directory name (`Cursor`, or a fork's name).
    pub app_name: String,

    /// Usage API base URL override.
    pub api_base_url: Option<String>,

    /// Log level.
    pub log_level: LogLevel,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            custom_database_path: None,
            app_name: DEFAULT_APP_NAME.to_string(),
            api_base_url: None,
            log_level: LogLevel::default(),
        }
    }
}

impl Settings {
    /// Returns the custom database path if it is set and non-blank.
    pub fn database_path(&self) -> Option<&str> {
        self.custom_database_path
            .as_deref()
            .filter(|p| !p.trim().is_empty())
    }

    /// Returns the application name, falling back to the default if blank.
    pub fn app_name(&self) -> &str {
        let name = self.app_name.trim();
        if name.is_empty() { DEFAULT_APP_NAME } else { name }
    }

    /// Returns the API base URL override if it is set and non-blank.
    pub fn api_base_url(&self) -> Option<&str> {
        self.api_base_url.as_deref().filter(|u| !u.trim().is_empty())
    }

    /// Sets the custom database path.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if `path` is blank.
    pub fn set_database_path(&mut self, path: &str) -> Result<(), StoreError> {
        if path.trim().is_empty() {
            return Err(StoreError::Config("database path must not be empty".into()));
        }
        self.custom_database_path = Some(path.to_string());
        Ok(())
    }

    /// Clears the custom database path.
    pub fn clear_database_path(&mut self) {
        self.custom_database_path = None;
    }

    /// Sets the application name.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Config` if `name` is blank or contains a path
    /// separator.
    pub fn set_app_name(&mut self, name: &str) -> Result<(), StoreError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(StoreError::Config("app name must not be empty".into()));
        }
        if name.contains(['/', '\\']) {
            return Err(StoreError::Config(format!(
                "app name {name:?} must not contain path separators"
            )));
        }
        self.app_name = name.to_string();
        Ok(())
    }
}

// ============================================================================
// Log Level
// ============================================================================

/// Log level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LogLevel {
    /// Error level logging.
    Error,
    /// Warning level logging.
    #[default]
    Warn,
    /// Info level logging.
    Info,
    /// Debug level logging.
    Debug,
    /// Trace level logging.
    Trace,
}

impl LogLevel {
    /// Returns the level as a `tracing` filter directive.
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "error" => Ok(LogLevel::Error),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "info" => Ok(LogLevel::Info),
            "debug" => Ok(LogLevel::Debug),
            "trace" => Ok(LogLevel::Trace),
            other => Err(StoreError::Config(format!("unknown log level {other:?}"))),
        }
    }
}

// ============================================================================
// Settings Store
// ============================================================================

/// Settings bound to a file.
#[derive(Debug, Clone)]
pub struct SettingsStore {
    settings: Arc<RwLock<Settings>>,
    path: PathBuf,
}

impl SettingsStore {
    /// Creates a store with default settings bound to `path`.
    pub fn new(path: PathBuf) -> Self {
        Self {
            settings: Arc::new(RwLock::new(Settings::default())),
            path,
        }
    }

    /// Loads settings from the default path.
    pub async fn load_default() -> Self {
        Self::load(default_settings_path()).await
    }

    /// Loads settings from a path.
    ///
    /// A missing or unreadable file yields defaults; the error is logged.
    pub async fn load(path: PathBuf) -> Self {
        let settings = if path.exists() {
            info!(path = %path.display(), "Loading settings");
            load_json(&path).await.unwrap_or_else(|e| {
                warn!(error = %e, "Failed to load settings, using defaults");
                Settings::default()
            })
        } else {
            debug!(path = %path.display(), "Settings file not found, using defaults");
            Settings::default()
        };

        Self {
            settings: Arc::new(RwLock::new(settings)),
            path,
        }
    }

    /// Returns the file this store reads and writes.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Gets a copy of the current settings.
    pub async fn get(&self) -> Settings {
        self.settings.read().await.clone()
    }

    /// Applies a fallible change in memory.
    ///
    /// # Errors
    ///
    /// Returns whatever `f` returns; on error the settings are unchanged.
    pub async fn try_update<F>(&self, f: F) -> Result<(), StoreError>
    where
        F: FnOnce(&mut Settings) -> Result<(), StoreError>,
    {
        let mut settings = self.settings.write().await;
        let mut next = settings.clone();
        f(&mut next)?;
        *settings = next;
        Ok(())
    }

    /// Applies a change in memory.
    pub async fn update<F>(&self, f: F)
    where
        F: FnOnce(&mut Settings),
    {
        let mut settings = self.settings.write().await;
        f(&mut settings);
    }

    /// Restores defaults in memory.
    pub async fn reset(&self) {
        *self.settings.write().await = Settings::default();
    }

    /// Saves settings to disk.
    ///
    /// # Errors
    ///
    /// Returns error if settings cannot be written to disk.
    pub async fn save(&self) -> Result<(), StoreError> {
        let settings = self.settings.read().await;
        save_json(&self.path, &*settings).await?;
        info!(path = %self.path.display(), "Settings saved");
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.app_name(), "Cursor");
        assert_eq!(settings.database_path(), None);
        assert_eq!(settings.api_base_url(), None);
        assert_eq!(settings.log_level, LogLevel::Warn);
    }

    #[test]
    fn test_blank_values_fall_back() {
        let settings = Settings {
            custom_database_path: Some("  ".to_string()),
            app_name: String::new(),
            api_base_url: Some(String::new()),
            log_level: LogLevel::Info,
        };
        assert_eq!(settings.database_path(), None);
        assert_eq!(settings.app_name(), "Cursor");
        assert_eq!(settings.api_base_url(), None);
    }

    #[test]
    fn test_set_database_path() {
        let mut settings = Settings::default();
        settings.set_database_path("/tmp/state.vscdb").unwrap();
        assert_eq!(settings.database_path(), Some("/tmp/state.vscdb"));

        assert!(matches!(
            settings.set_database_path(" "),
            Err(StoreError::Config(_))
        ));
        assert_eq!(settings.database_path(), Some("/tmp/state.vscdb"));

        settings.clear_database_path();
        assert_eq!(settings.database_path(), None);
    }

    #[test]
    fn test_set_app_name() {
        let mut settings = Settings::default();
        settings.set_app_name(" Cursor Nightly ").unwrap();
        assert_eq!(settings.app_name(), "Cursor Nightly");

        assert!(settings.set_app_name("").is_err());
        assert!(settings.set_app_name("../etc").is_err());
        assert_eq!(settings.app_name(), "Cursor Nightly");
    }

    #[test]
    fn test_log_level_parse() {
        assert_eq!("DEBUG".parse::<LogLevel>().unwrap(), LogLevel::Debug);
        assert_eq!("warning".parse::<LogLevel>().unwrap(), LogLevel::Warn);
        assert!("loud".parse::<LogLevel>().is_err());
        assert_eq!(LogLevel::Trace.to_string(), "trace");
    }

    #[tokio::test]
    async fn test_try_update_keeps_old_value_on_error() {
        let store = SettingsStore::new(PathBuf::from("unused.json"));

        let result = store.try_update(|s| s.set_app_name("")).await;
        assert!(result.is_err());
        assert_eq!(store.get().await.app_name, "Cursor");

        store.try_update(|s| s.set_app_name("Other")).await.unwrap();
        assert_eq!(store.get().await.app_name, "Other");

        store.reset().await;
        assert_eq!(store.get().await, Settings::default());
    }
}
