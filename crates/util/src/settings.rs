//! Remote fetch settings.
//!
//! Values resolve in this order, first match wins per field:
//! 1. explicit overrides supplied by the caller (CLI flags)
//! 2. environment variables (`LATEBIND_API_BASE`, `LATEBIND_HTTP_TIMEOUT_SECS`)
//! 3. a JSON settings file at `LATEBIND_SETTINGS_PATH`, or
//!    `~/.config/latebind/settings.json` on most platforms
//! 4. built-in defaults (no base URL, 30 second timeout)
//!
//! A settings file that cannot be parsed is logged and ignored.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use dirs_next::config_dir;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

/// Environment variable holding the base URL for relative proxy targets.
pub const API_BASE_ENV: &str = "LATEBIND_API_BASE";

/// Environment variable holding the request timeout in seconds.
pub const HTTP_TIMEOUT_ENV: &str = "LATEBIND_HTTP_TIMEOUT_SECS";

/// Environment variable allowing callers to override the settings file path.
pub const SETTINGS_PATH_ENV: &str = "LATEBIND_SETTINGS_PATH";

/// Default filename for the JSON settings file.
pub const SETTINGS_FILE_NAME: &str = "settings.json";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Error surfaced when settings cannot be resolved.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid base URL '{value}': {reason}")]
    InvalidBaseUrl { value: String, reason: String },

    #[error("invalid timeout '{value}': expected a whole number of seconds")]
    InvalidTimeout { value: String },
}

/// Settings file payload. Every field is optional.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct SettingsFile {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Caller-supplied overrides, typically from CLI flags.
#[derive(Debug, Default, Clone)]
pub struct SettingsOverrides {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Resolved settings for the HTTP fetch collaborator.
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteSettings {
    pub base_url: Option<Url>,
    pub timeout: Duration,
}

impl Default for RemoteSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl RemoteSettings {
    /// Resolves settings from overrides, the environment and the settings file.
    pub fn load(overrides: &SettingsOverrides) -> Result<Self, SettingsError> {
        let file = load_settings_file(&default_settings_path())?;
        Self::resolve(overrides, &file)
    }

    fn resolve(overrides: &SettingsOverrides, file: &SettingsFile) -> Result<Self, SettingsError> {
        let base_url = overrides
            .base_url
            .clone()
            .or_else(|| non_empty_env(API_BASE_ENV))
            .or_else(|| file.base_url.clone())
            .map(|value| parse_base_url(&value))
            .transpose()?;

        let timeout_secs = match overrides.timeout_secs {
            Some(seconds) => Some(seconds),
            None => match non_empty_env(HTTP_TIMEOUT_ENV) {
                Some(value) => Some(value.parse::<u64>().map_err(|_| SettingsError::InvalidTimeout { value })?),
                None => file.timeout_secs,
            },
        };

        let settings = Self {
            base_url,
            timeout: timeout_secs.map(Duration::from_secs).unwrap_or(DEFAULT_TIMEOUT),
        };
        debug!(
            base_url = ?settings.base_url.as_ref().map(Url::as_str),
            timeout_secs = settings.timeout.as_secs(),
            "remote settings resolved"
        );
        Ok(settings)
    }
}

/// Base URLs must be absolute `http` or `https` URLs.
pub fn parse_base_url(value: &str) -> Result<Url, SettingsError> {
    let invalid = |reason: String| SettingsError::InvalidBaseUrl {
        value: value.to_string(),
        reason,
    };
    let url = Url::parse(value.trim()).map_err(|error| invalid(error.to_string()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", url.scheme())));
    }
    if url.host_str().is_none() {
        return Err(invalid("missing host".to_string()));
    }
    Ok(url)
}

fn non_empty_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn default_settings_path() -> PathBuf {
    if let Some(path) = non_empty_env(SETTINGS_PATH_ENV) {
        return PathBuf::from(path);
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("latebind")
        .join(SETTINGS_FILE_NAME)
}

fn load_settings_file(path: &Path) -> Result<SettingsFile, SettingsError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(file) => Ok(file),
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse settings file; using defaults"
                );
                Ok(SettingsFile::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(SettingsFile::default()),
        Err(error) => Err(SettingsError::Io(error)),
    }
}
