//! Cursor state database location.
//!
//! Cursor is a VS Code fork and keeps its global state where VS Code would,
//! under the application's own directory name:
//!
//! | Host | Path |
//! |------|------|
//! | Windows | `%APPDATA%\Cursor\User\globalStorage\state.vscdb` |
//! | macOS | `~/Library/Application Support/Cursor/User/globalStorage/state.vscdb` |
//! | Linux | `~/.config/Cursor/User/globalStorage/state.vscdb` |
//! | WSL | `/mnt/c/Users/<win user>/AppData/Roaming/Cursor/User/globalStorage/state.vscdb` |

use std::path::{Path, PathBuf};

use cursorbar_fetch::{HostOs, PlatformInfo};

/// Default application directory name.
pub const DEFAULT_APP_NAME: &str = "Cursor";

/// Path of the state database below the application directory.
const STATE_DB_SUBPATH: [&str; 3] = ["User", "globalStorage", "state.vscdb"];

/// Where WSL mounts the Windows system drive.
const WSL_WINDOWS_USERS: &str = "/mnt/c/Users";

/// Resolves the state database path for the default application name.
///
/// A non-blank `custom_path` wins and is returned verbatim.
pub fn resolve_state_db_path(custom_path: Option<&str>, platform: &PlatformInfo) -> PathBuf {
    resolve_state_db_path_for(custom_path, DEFAULT_APP_NAME, platform)
}

/// Resolves the state database path for an application named `app_name`.
///
/// Pure; never touches the filesystem.
pub fn resolve_state_db_path_for(
    custom_path: Option<&str>,
    app_name: &str,
    platform: &PlatformInfo,
) -> PathBuf {
    if let Some(custom) = custom_path.filter(|p| !p.trim().is_empty()) {
        return PathBuf::from(custom);
    }

    let app_dir = match platform.os {
        HostOs::Windows => windows_app_dir(platform).join(app_name),
        HostOs::MacOs => platform
            .home_dir
            .join("Library")
            .join("Application Support")
            .join(app_name),
        HostOs::Linux | HostOs::Other => match platform.wsl_windows_user() {
            Some(user) => Path::new(WSL_WINDOWS_USERS)
                .join(user)
                .join("AppData")
                .join("Roaming")
                .join(app_name),
            None => platform.home_dir.join(".config").join(app_name),
        },
    };

    STATE_DB_SUBPATH
        .iter()
        .fold(app_dir, |path, segment| path.join(segment))
}

fn windows_app_dir(platform: &PlatformInfo) -> PathBuf {
    platform
        .roaming_app_data_dir
        .clone()
        .unwrap_or_else(|| platform.home_dir.join("AppData").join("Roaming"))
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use cursorbar_fetch::WslInfo;

    #[test]
    fn test_custom_path_wins() {
        let platform = PlatformInfo::new(HostOs::MacOs, "/Users/me");
        let path = resolve_state_db_path(Some("/tmp/x.vscdb"), &platform);
        assert_eq!(path, PathBuf::from("/tmp/x.vscdb"));
    }

    #[test]
    fn test_custom_path_is_verbatim() {
        let platform = PlatformInfo::new(HostOs::Linux, "/home/me");
        let path = resolve_state_db_path(Some(" /tmp/with space.vscdb"), &platform);
        assert_eq!(path, PathBuf::from(" /tmp/with space.vscdb"));
    }

    #[test]
    fn test_blank_custom_path_ignored() {
        let platform = PlatformInfo::new(HostOs::Linux, "/home/me");

        for blank in [Some(""), Some("   "), None] {
            let path = resolve_state_db_path(blank, &platform);
            assert_eq!(
                path,
                PathBuf::from("/home/me/.config/Cursor/User/globalStorage/state.vscdb")
            );
        }
    }

    #[test]
    fn test_macos_path() {
        let platform = PlatformInfo::new(HostOs::MacOs, "/Users/me");
        let path = resolve_state_db_path(None, &platform);
        assert_eq!(
            path,
            PathBuf::from(
                "/Users/me/Library/Application Support/Cursor/User/globalStorage/state.vscdb"
            )
        );
    }

    #[test]
    fn test_windows_path_uses_roaming_dir() {
        let platform = PlatformInfo::new(HostOs::Windows, "/home/me")
            .with_roaming_app_data_dir("/roaming");
        let path = resolve_state_db_path(None, &platform);
        assert_eq!(
            path,
            PathBuf::from("/roaming/Cursor/User/globalStorage/state.vscdb")
        );
    }

    #[test]
    fn test_windows_path_without_roaming_dir() {
        let platform = PlatformInfo::new(HostOs::Windows, "/home/me");
        let path = resolve_state_db_path(None, &platform);
        assert_eq!(
            path,
            PathBuf::from("/home/me/AppData/Roaming/Cursor/User/globalStorage/state.vscdb")
        );
    }

    #[test]
    fn test_wsl_with_windows_user() {
        let platform = PlatformInfo::new(HostOs::Linux, "/home/me").with_wsl(WslInfo {
            windows_user: Some("Alice".to_string()),
        });
        let path = resolve_state_db_path(None, &platform);
        assert_eq!(
            path,
            PathBuf::from(
                "/mnt/c/Users/Alice/AppData/Roaming/Cursor/User/globalStorage/state.vscdb"
            )
        );
    }

    #[test]
    fn test_wsl_without_windows_user_falls_back_to_linux() {
        let platform = PlatformInfo::new(HostOs::Linux, "/home/me").with_wsl(WslInfo::default());
        let path = resolve_state_db_path(None, &platform);
        assert_eq!(
            path,
            PathBuf::from("/home/me/.config/Cursor/User/globalStorage/state.vscdb")
        );
    }

    #[test]
    fn test_other_os_uses_linux_layout() {
        let platform = PlatformInfo::new(HostOs::Other, "/home/me");
        let path = resolve_state_db_path(None, &platform);
        assert_eq!(
            path,
            PathBuf::from("/home/me/.config/Cursor/User/globalStorage/state.vscdb")
        );
    }

    #[test]
    fn test_custom_app_name() {
        let platform = PlatformInfo::new(HostOs::Linux, "/home/me");
        let path = resolve_state_db_path_for(None, "Cursor Nightly", &platform);
        assert_eq!(
            path,
            PathBuf::from("/home/me/.config/Cursor Nightly/User/globalStorage/state.vscdb")
        );
    }
}
