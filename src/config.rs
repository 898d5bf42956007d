//! Server configuration and user settings
//!
//! `ServerConfig` comes from the environment (after `dotenvy` has loaded any
//! `.env` file). `Settings` is the user's preference file written by the
//! settings app; it is re-read for every dialog and never fails to load.

use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Hard ceiling on how long a dialog may stay open.
pub const DEFAULT_DIALOG_TIMEOUT: Duration = Duration::from_secs(10 * 60);

/// Interval between liveness notifications while a dialog is open.
pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(15);

pub const ENV_DIALOG_BIN: &str = "CONSULT_DIALOG_BIN";
pub const ENV_SETTINGS: &str = "CONSULT_SETTINGS";
pub const ENV_DIALOG_TIMEOUT: &str = "CONSULT_DIALOG_TIMEOUT_SECS";
pub const ENV_HEARTBEAT: &str = "CONSULT_HEARTBEAT_SECS";

// ============================================================================
// Platform
// ============================================================================

/// Target platform; decides where the presentation helper is installed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    MacOs,
    Linux,
    Windows,
}

impl Platform {
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::MacOs
        } else if cfg!(windows) {
            Platform::Windows
        } else {
            Platform::Linux
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Platform::MacOs => "macos",
            Platform::Linux => "linux",
            Platform::Windows => "windows",
        }
    }

    /// Where the installer puts the dialog helper.
    pub fn default_helper_path(self) -> PathBuf {
        match self {
            Platform::MacOs => PathBuf::from("/Applications/Consult.app/Contents/MacOS/consult-dialog"),
            Platform::Linux => home_dir().join(".local/bin/consult-dialog"),
            Platform::Windows => env_dir("LOCALAPPDATA")
                .join("Programs")
                .join("Consult")
                .join("consult-dialog.exe"),
        }
    }

    /// Where the settings app writes `settings.json`.
    pub fn default_settings_path(self) -> PathBuf {
        match self {
            Platform::MacOs => home_dir()
                .join("Library/Application Support/Consult")
                .join("settings.json"),
            Platform::Linux => env::var_os("XDG_CONFIG_HOME")
                .map(PathBuf::from)
                .unwrap_or_else(|| home_dir().join(".config"))
                .join("consult")
                .join("settings.json"),
            Platform::Windows => env_dir("APPDATA").join("Consult").join("settings.json"),
        }
    }
}

fn home_dir() -> PathBuf {
    env::var_os("HOME")
        .or_else(|| env::var_os("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

fn env_dir(var: &str) -> PathBuf {
    env::var_os(var).map(PathBuf::from).unwrap_or_else(home_dir)
}

// ============================================================================
// ServerConfig
// ============================================================================

/// Process-level configuration for the MCP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub platform: Platform,
    pub helper_path: PathBuf,
    pub settings_path: PathBuf,
    pub dialog_timeout: Duration,
    pub heartbeat_interval: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        let platform = Platform::current();
        Self {
            platform,
            helper_path: platform.default_helper_path(),
            settings_path: platform.default_settings_path(),
            dialog_timeout: DEFAULT_DIALOG_TIMEOUT,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
        }
    }
}

impl ServerConfig {
    /// Platform defaults overridden by `CONSULT_*` environment variables.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(path) = env::var_os(ENV_DIALOG_BIN) {
            config.helper_path = PathBuf::from(path);
        }
        if let Some(path) = env::var_os(ENV_SETTINGS) {
            config.settings_path = PathBuf::from(path);
        }
        if let Some(timeout) = duration_from_env(ENV_DIALOG_TIMEOUT) {
            config.dialog_timeout = timeout;
        }
        if let Some(interval) = duration_from_env(ENV_HEARTBEAT) {
            config.heartbeat_interval = interval;
        }

        debug!(?config, "Loaded server configuration");
        config
    }
}

fn duration_from_env(var: &str) -> Option<Duration> {
    let raw = env::var(var).ok()?;
    match raw.trim().parse::<u64>() {
        Ok(secs) if secs > 0 => Some(Duration::from_secs(secs)),
        _ => {
            warn!(var, value = %raw, "Ignoring invalid duration override");
            None
        }
    }
}

// ============================================================================
// Settings
// ============================================================================

/// User preferences shared with the settings app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Return a natural-language sentence instead of compact JSON.
    pub humanize_responses: bool,
    /// Show the outgoing response to the user before returning it.
    pub review_before_send: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            humanize_responses: true,
            review_before_send: false,
        }
    }
}

impl Settings {
    /// Load settings; a missing or unreadable file yields the defaults.
    pub fn load(path: &Path) -> Self {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "No settings file, using defaults");
                return Self::default();
            }
        };
        match serde_json::from_str(&raw) {
            Ok(settings) => settings,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Unreadable settings file, using defaults");
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_missing_file_defaults() {
        let settings = Settings::load(Path::new("/nonexistent/consult/settings.json"));
        assert_eq!(settings, Settings::default());
        assert!(settings.humanize_responses);
        assert!(!settings.review_before_send);
    }

    #[test]
    fn test_settings_partial_and_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        std::fs::write(&path, r#"{"reviewBeforeSend": true, "theme": "dark"}"#).unwrap();
        let settings = Settings::load(&path);
        assert!(settings.humanize_responses);
        assert!(settings.review_before_send);

        std::fs::write(&path, "{ not json").unwrap();
        assert_eq!(Settings::load(&path), Settings::default());

        std::fs::write(&path, r#"{"humanizeResponses": "yes"}"#).unwrap();
        assert_eq!(Settings::load(&path), Settings::default());
    }

    #[test]
    fn test_platform_paths() {
        assert!(Platform::MacOs
            .default_helper_path()
            .starts_with("/Applications/Consult.app"));
        assert!(Platform::Linux
            .default_settings_path()
            .ends_with("consult/settings.json"));
        assert!(Platform::Windows
            .default_helper_path()
            .ends_with("consult-dialog.exe"));
    }
}
