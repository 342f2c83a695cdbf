//! Configuration loading.
//!
//! Configuration is loaded from TOML files with the following resolution order:
//! 1. `--config <path>` (explicit path, must exist)
//! 2. `~/.specdrafter/config.toml` (user)
//! 3. `/etc/specdrafter/config.toml` (system)
//!
//! With no file at all the built-in defaults apply. `SPECDRAFTER_API_URL`
//! overrides `api.base_url` wherever the rest came from.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::directive::DirectiveDisplay;
use crate::{DrafterError, Result};

/// Environment variable overriding the backend base URL.
pub const API_URL_ENV: &str = "SPECDRAFTER_API_URL";

/// Client configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub document: DocumentConfig,
}

/// Backend connection settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    /// Backend base URL (default: http://localhost:8000).
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Timeout for non-streaming requests in seconds (default: 30).
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    /// TCP connect timeout in seconds (default: 10).
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout_secs: default_request_timeout(),
            connect_timeout_secs: default_connect_timeout(),
        }
    }
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_connect_timeout() -> u64 {
    10
}

/// Chat transcript settings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatConfig {
    /// Whether control directives are shown in the transcript (default: strip).
    #[serde(default)]
    pub directive_display: DirectiveDisplay,
}

/// Document generation settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentConfig {
    /// Target tool the PRD is written for (default: "Cursor").
    #[serde(default = "default_target")]
    pub default_target: String,
    /// Where generated documents are saved (default: current directory).
    #[serde(default)]
    pub output_dir: Option<PathBuf>,
}

impl Default for DocumentConfig {
    fn default() -> Self {
        Self {
            default_target: default_target(),
            output_dir: None,
        }
    }
}

fn default_target() -> String {
    "Cursor".to_string()
}

impl Config {
    /// Load configuration from the standard locations, then apply the
    /// environment override.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let mut config = match Self::resolve_config_path(explicit_path)? {
            Some(path) => Self::load_from_file(&path)?,
            None => Config::default(),
        };
        config.apply_api_url_override(std::env::var(API_URL_ENV).ok());
        Ok(config)
    }

    /// Parse a single config file.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            DrafterError::Configuration(format!("Failed to read config file {path:?}: {e}"))
        })?;
        toml::from_str(&content).map_err(|e| {
            DrafterError::Configuration(format!("Failed to parse config file {path:?}: {e}"))
        })
    }

    /// Replace the base URL when an override is set and non-empty.
    pub fn apply_api_url_override(&mut self, value: Option<String>) {
        if let Some(url) = value.filter(|url| !url.trim().is_empty()) {
            self.api.base_url = url.trim().to_string();
        }
    }

    /// Resolve the config file path; `None` means use defaults.
    fn resolve_config_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
        if let Some(path) = explicit {
            if path.exists() {
                return Ok(Some(path.to_path_buf()));
            }
            return Err(DrafterError::Configuration(format!(
                "Config file not found: {path:?}"
            )));
        }

        // User config
        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".specdrafter").join("config.toml");
            if user_config.exists() {
                return Ok(Some(user_config));
            }
        }

        // System config
        let system_config = PathBuf::from("/etc/specdrafter/config.toml");
        if system_config.exists() {
            return Ok(Some(system_config));
        }

        Ok(None)
    }
}
