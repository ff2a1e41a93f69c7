//! Configuration loading and management
//!
//! Configuration is loaded from `~/.config/tracklet/config.toml`
//!
//! This module follows the XDG Base Directory Specification:
//! - Config: `$XDG_CONFIG_HOME/tracklet/` (~/.config/tracklet/)
//! - State/Logs: `$XDG_STATE_HOME/tracklet/` (~/.local/state/tracklet/)
//!
//! The event clients never read files or the environment themselves. Callers
//! load a [`Config`] (or build a [`ClientConfig`] by hand) and pass it in.

use crate::error::{Error, Result};
use crate::tracking::EVENTS_PATH;
use reqwest::header::HeaderValue;
use reqwest::Url;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};

/// Env var overriding `client.base_url`
pub const ENV_BASE_URL: &str = "TRACKLET_BASE_URL";
/// Env var overriding `client.secret`
pub const ENV_SECRET: &str = "TRACKLET_SECRET";
/// Env var overriding `client.default_subject_id`
pub const ENV_SUBJECT_ID: &str = "TRACKLET_SUBJECT_ID";

/// Returns a best-effort home directory path.
fn home_dir() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Returns XDG_CONFIG_HOME or ~/.config
fn xdg_config_home() -> PathBuf {
    std::env::var("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".config"))
}

/// Returns XDG_STATE_HOME or ~/.local/state
fn xdg_state_home() -> PathBuf {
    std::env::var("XDG_STATE_HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|_| home_dir().join(".local/state"))
}

/// Main configuration struct
#[derive(Debug, Deserialize, Default)]
pub struct Config {
    /// Ingestion endpoint connection settings
    #[serde(default)]
    pub client: ClientConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Connection settings for an event client
///
/// `base_url` and `secret` are required; they are optional here only so a
/// partially filled config file still parses and can be reported on.
#[derive(Deserialize, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Ingestion server URL (e.g., `https://api.example.com`)
    pub base_url: Option<String>,

    /// SDK secret, sent as a bearer credential
    pub secret: Option<String>,

    /// Subject attributed to events that don't name one
    pub default_subject_id: Option<String>,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            secret: None,
            default_subject_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

// Hand-written so the secret never lands in logs or panic messages.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("secret", &self.secret.as_ref().map(|_| "<redacted>"))
            .field("default_subject_id", &self.default_subject_id)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

fn default_timeout_secs() -> u64 {
    30
}

impl ClientConfig {
    /// Build a config with the two required fields set
    pub fn new(base_url: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            base_url: Some(base_url.into()),
            secret: Some(secret.into()),
            ..Default::default()
        }
    }

    /// Set the subject used when `track` is called without one
    pub fn with_default_subject_id(mut self, subject_id: impl Into<String>) -> Self {
        self.default_subject_id = Some(subject_id.into());
        self
    }

    /// Set the per-request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }

    /// Check if a client could be built from this config
    pub fn is_ready(&self) -> bool {
        self.validate().is_ok()
    }

    /// Validate configuration, returning error message if invalid
    ///
    /// This is the full set of checks a client makes at construction, so a
    /// config that passes here always yields a working client.
    pub fn validate(&self) -> Result<()> {
        self.endpoint()?;
        self.auth_header()?;
        if self.timeout_secs == 0 {
            return Err(Error::Config(
                "client.timeout_secs must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL with trailing slashes stripped
    pub fn normalized_base_url(&self) -> Result<&str> {
        let base_url = self
            .base_url
            .as_deref()
            .unwrap_or_default()
            .trim_end_matches('/');
        if base_url.is_empty() {
            return Err(Error::Config("client.base_url is required".to_string()));
        }
        Ok(base_url)
    }

    /// Absolute URL events are posted to
    pub fn endpoint(&self) -> Result<Url> {
        let base_url = self.normalized_base_url()?;
        Url::parse(&format!("{}{}", base_url, EVENTS_PATH))
            .map_err(|e| Error::Config(format!("invalid base_url {:?}: {}", base_url, e)))
    }

    /// `Authorization` header carrying the secret, marked sensitive
    pub(crate) fn auth_header(&self) -> Result<HeaderValue> {
        let secret = self.secret.as_deref().unwrap_or_default();
        if secret.is_empty() {
            return Err(Error::Config("client.secret is required".to_string()));
        }

        let mut value = HeaderValue::from_str(&format!("Bearer {}", secret))
            .map_err(|e| Error::Config(format!("invalid secret: {}", e)))?;
        value.set_sensitive(true);
        Ok(value)
    }

    /// Overlay values from `TRACKLET_*` environment variables
    ///
    /// Only set, non-empty variables replace file values.
    pub fn apply_env(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        let lookup = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if let Some(base_url) = lookup(ENV_BASE_URL) {
            self.base_url = Some(base_url);
        }
        if let Some(secret) = lookup(ENV_SECRET) {
            self.secret = Some(secret);
        }
        if let Some(subject_id) = lookup(ENV_SUBJECT_ID) {
            self.default_subject_id = Some(subject_id);
        }
    }
}

/// Logging configuration
#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Maximum number of log files to keep
    #[serde(default = "default_max_log_files")]
    pub max_files: usize,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            max_files: default_max_log_files(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_log_files() -> usize {
    5
}

impl Config {
    /// Load configuration from the default path
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if !config_path.exists() {
            tracing::info!("No config file found at {:?}, using defaults", config_path);
            return Ok(Config::default());
        }

        Self::load_from(&config_path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("failed to read config file {:?}: {}", path, e)))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;

        Ok(config)
    }

    /// Returns the default config file path
    ///
    /// `$XDG_CONFIG_HOME/tracklet/config.toml` (~/.config/tracklet/config.toml)
    pub fn config_path() -> PathBuf {
        xdg_config_home().join("tracklet").join("config.toml")
    }

    /// Returns the state directory path (for logs)
    ///
    /// `$XDG_STATE_HOME/tracklet/` (~/.local/state/tracklet/)
    pub fn state_dir() -> PathBuf {
        xdg_state_home().join("tracklet")
    }
}
