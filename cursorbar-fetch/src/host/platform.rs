//! Host platform detection.
//!
//! Path resolution for application state depends on a handful of host
//! facts: the operating system, the user's home and roaming app-data
//! directories, and whether we run inside WSL (where the application we
//! care about usually lives on the Windows side). [`PlatformInfo`] gathers
//! those facts once so that consumers can stay pure functions of it.

use std::path::PathBuf;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, instrument, warn};

use super::process::ProcessRunner;

/// How long to wait for `cmd.exe` to answer under WSL.
const WINDOWS_USER_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

// ============================================================================
// Host OS
// ============================================================================

/// Operating system family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HostOs {
    /// Windows.
    Windows,
    /// macOS.
    MacOs,
    /// Linux, including WSL.
    Linux,
    /// Anything else.
    Other,
}

impl HostOs {
    /// Returns the OS this binary was built for.
    pub fn current() -> Self {
        if cfg!(target_os = "windows") {
            Self::Windows
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(target_os = "linux") {
            Self::Linux
        } else {
            Self::Other
        }
    }

    /// Returns a display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Windows => "Windows",
            Self::MacOs => "macOS",
            Self::Linux => "Linux",
            Self::Other => "Other",
        }
    }
}

// ============================================================================
// WSL
// ============================================================================

/// Facts about the Windows side of a WSL installation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct WslInfo {
    /// Windows account name, if `cmd.exe` could be asked for it.
    pub windows_user: Option<String>,
}

/// Returns true if the current Linux process runs inside WSL.
pub fn is_wsl() -> bool {
    if std::env::var_os("WSL_DISTRO_NAME").is_some() || std::env::var_os("WSL_INTEROP").is_some()
    {
        return true;
    }

    std::fs::read_to_string("/proc/version")
        .map(|v| v.to_lowercase().contains("microsoft"))
        .unwrap_or(false)
}

/// Asks the Windows side of WSL for the current Windows user name.
///
/// Returns `None` on any failure.
#[instrument(skip(process))]
pub async fn windows_username(process: &ProcessRunner) -> Option<String> {
    let output = match process
        .run_with_timeout(
            "cmd.exe",
            &["/C", "echo %USERNAME%"],
            WINDOWS_USER_LOOKUP_TIMEOUT,
        )
        .await
    {
        Ok(output) => output,
        Err(e) => {
            warn!(error = %e, "Failed to query Windows user name");
            return None;
        }
    };

    let stdout = match output.stdout_if_success() {
        Ok(stdout) => stdout,
        Err(e) => {
            warn!(error = %e, "cmd.exe returned an error");
            return None;
        }
    };

    let username = parse_windows_username(stdout);
    debug!(username = ?username, "Windows user name lookup finished");
    username
}

/// Extracts the user name from `echo %USERNAME%` output.
///
/// An unexpanded `%USERNAME%` means the variable was not set.
fn parse_windows_username(stdout: &str) -> Option<String> {
    let trimmed = stdout.trim();
    if trimmed.is_empty() || trimmed.contains('%') {
        None
    } else {
        Some(trimmed.to_string())
    }
}

// ============================================================================
// Platform Info
// ============================================================================

/// Host facts needed to locate per-user application data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformInfo {
    /// Operating system family.
    pub os: HostOs,
    /// The user's home directory.
    pub home_dir: PathBuf,
    /// Roaming application data directory (`%APPDATA%`), Windows only.
    pub roaming_app_data_dir: Option<PathBuf>,
    /// Set when running under WSL.
    pub wsl: Option<WslInfo>,
}

impl PlatformInfo {
    /// Creates a descriptor for the given OS and home directory.
    pub fn new(os: HostOs, home_dir: impl Into<PathBuf>) -> Self {
        Self {
            os,
            home_dir: home_dir.into(),
            roaming_app_data_dir: None,
            wsl: None,
        }
    }

    /// Sets the roaming application data directory.
    #[must_use]
    pub fn with_roaming_app_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.roaming_app_data_dir = Some(dir.into());
        self
    }

    /// Marks the descriptor as running under WSL.
    #[must_use]
    pub fn with_wsl(mut self, wsl: WslInfo) -> Self {
        self.wsl = Some(wsl);
        self
    }

    /// Returns true if running under WSL.
    pub fn is_wsl(&self) -> bool {
        self.wsl.is_some()
    }

    /// Returns the Windows user name when running under WSL and it is known.
    pub fn wsl_windows_user(&self) -> Option<&str> {
        self.wsl.as_ref()?.windows_user.as_deref()
    }

    /// Detects the current host.
    ///
    /// Never fails; missing directories become empty paths and a failed
    /// WSL user lookup leaves `windows_user` unset.
    #[instrument(skip(process))]
    pub async fn detect(process: &ProcessRunner) -> Self {
        let os = HostOs::current();
        let home_dir = dirs::home_dir().unwrap_or_default();

        let mut info = Self::new(os, home_dir);

        if os == HostOs::Windows {
            let roaming = std::env::var_os("APPDATA")
                .map(PathBuf::from)
                .or_else(dirs::config_dir);
            info.roaming_app_data_dir = roaming;
        }

        if os == HostOs::Linux && is_wsl() {
            debug!("WSL detected, probing Windows user");
            info.wsl = Some(WslInfo {
                windows_user: windows_username(process).await,
            });
        }

        debug!(
            os = os.display_name(),
            wsl = info.is_wsl(),
            "Platform detected"
        );
        info
    }
}

// ============================================================================
// Tests
// ============================================================================
