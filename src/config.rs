//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files, environment variable overrides, and the
//! `app-config.json` runtime file that can repoint the client at another
//! backend at startup.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::cache::DEFAULT_PAGE_SIZE;
use crate::transport::TransportConfig;

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub session: SessionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Backend connection configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Header carrying the token
    #[serde(default = "default_auth_header")]
    pub auth_header: String,

    /// Prefix before the token; empty sends the token alone
    #[serde(default = "default_auth_scheme")]
    pub auth_scheme: String,

    /// Page size used when aggregating startups
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Path or URL of an `app-config.json` to apply at startup
    #[serde(default)]
    pub runtime_config: Option<String>,

    /// Bootstrap token, used when no session token is stored
    #[serde(default)]
    pub auth_token: Option<String>,
}

fn default_base_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("incubator-portal/{}", env!("CARGO_PKG_VERSION"))
}

fn default_auth_header() -> String {
    "Authorization".to_string()
}

fn default_auth_scheme() -> String {
    "Bearer".to_string()
}

fn default_page_size() -> u32 {
    DEFAULT_PAGE_SIZE
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout(),
            user_agent: default_user_agent(),
            auth_header: default_auth_header(),
            auth_scheme: default_auth_scheme(),
            page_size: default_page_size(),
            runtime_config: None,
            auth_token: None,
        }
    }
}

/// Session persistence configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Token file; defaults to the local data dir
    #[serde(default)]
    pub token_file: Option<String>,

    #[serde(default = "default_persist")]
    pub persist: bool,
}

fn default_persist() -> bool {
    true
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            token_file: None,
            persist: default_persist(),
        }
    }
}

impl SessionConfig {
    /// Where the token lives when persistence is on
    pub fn token_path(&self) -> Option<PathBuf> {
        if !self.persist {
            return None;
        }
        Some(
            self.token_file
                .as_ref()
                .map(PathBuf::from)
                .unwrap_or_else(crate::session::TokenStore::default_path),
        )
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("incubator-portal").join("config.toml")),
            Some(PathBuf::from("/etc/incubator-portal/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path_opt in config_paths.iter().flatten() {
            if path_opt.exists() {
                match Self::load_with_env(path_opt) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path_opt);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path_opt, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    /// Apply overrides from any key lookup
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        // API overrides
        if let Some(url) = lookup("INCUBATOR_API_URL") {
            self.api.base_url = url;
        }
        if let Some(token) = lookup("INCUBATOR_AUTH_TOKEN") {
            self.api.auth_token = Some(token);
        }
        if let Some(size) = lookup("INCUBATOR_PAGE_SIZE") {
            match size.parse() {
                Ok(size) => self.api.page_size = size,
                Err(_) => tracing::warn!(value = %size, "Ignoring invalid INCUBATOR_PAGE_SIZE"),
            }
        }

        // Logging overrides
        if let Some(level) = lookup("INCUBATOR_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Some(format) = lookup("INCUBATOR_LOG_FORMAT") {
            self.logging.format = format;
        }
    }

    /// Overlay a runtime config file's values
    pub fn apply_runtime(&mut self, runtime: RuntimeConfig) {
        if let Some(url) = runtime.api_base_url.filter(|u| !u.trim().is_empty()) {
            self.api.base_url = url;
        }
        if let Some(token) = runtime.auth_token.filter(|t| !t.trim().is_empty()) {
            self.api.auth_token = Some(token);
        }
    }

    /// Load and apply `api.runtime_config` if one is set. A failure is
    /// logged and the current values are kept.
    pub async fn bootstrap_runtime(&mut self) {
        let Some(source) = self.api.runtime_config.clone() else {
            return;
        };

        match RuntimeConfig::load(&source, self.api.timeout_secs).await {
            Ok(runtime) => {
                tracing::info!(source = %source, "Applied runtime config");
                self.apply_runtime(runtime);
            }
            Err(e) => {
                tracing::warn!(
                    source = %source,
                    error = %e,
                    base_url = %self.api.base_url,
                    "Runtime config unavailable, keeping defaults"
                );
            }
        }
    }

    /// Transport settings derived from the `[api]` section
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig {
            base_url: self.api.base_url.clone(),
            request_timeout_ms: self.api.timeout_secs.saturating_mul(1000),
            user_agent: self.api.user_agent.clone(),
            auth_header: self.api.auth_header.clone(),
            auth_scheme: self.api.auth_scheme.clone(),
        }
    }
}

// ============================================
// RUNTIME CONFIG
// ============================================

/// Contents of `app-config.json`
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeConfig {
    #[serde(default)]
    pub api_base_url: Option<String>,
    #[serde(default)]
    pub auth_token: Option<String>,
}

impl RuntimeConfig {
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(content).map_err(|e| ConfigError::Runtime(e.to_string()))
    }

    /// Read from a local path or fetch from an `http(s)` URL
    pub async fn load(source: &str, timeout_secs: u64) -> Result<Self, ConfigError> {
        if source.starts_with("http://") || source.starts_with("https://") {
            let client = reqwest::Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .map_err(|e| ConfigError::Runtime(e.to_string()))?;

            let response = client
                .get(source)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| ConfigError::Runtime(e.to_string()))?;

            let body = response
                .text()
                .await
                .map_err(|e| ConfigError::Runtime(e.to_string()))?;
            Self::parse(&body)
        } else {
            let path = Path::new(source);
            let content = tokio::fs::read_to_string(path)
                .await
                .map_err(|e| ConfigError::Io {
                    path: path.to_path_buf(),
                    error: e.to_string(),
                })?;
            Self::parse(&content)
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },

    #[error("Failed to load runtime config: {0}")]
    Runtime(String),
}

/// Generate a default config file content
pub fn generate_default_config() -> String {
    r#"# Incubator Portal Configuration
#
# Environment variables override these settings:
# - INCUBATOR_API_URL
# - INCUBATOR_AUTH_TOKEN
# - INCUBATOR_PAGE_SIZE
# - INCUBATOR_LOG_LEVEL
# - INCUBATOR_LOG_FORMAT

[api]
# Backend base URL
base_url = "http://localhost:8000"

# Request timeout in seconds
timeout_secs = 30

# Header carrying the access token, and the scheme placed before it.
# Use auth_scheme = "" to send the raw token (e.g. with X-Auth-Token).
auth_header = "Authorization"
auth_scheme = "Bearer"

# Page size when loading every startup
page_size = 100

# Optional app-config.json (local path or http(s) URL) with
# apiBaseUrl and authToken, applied at startup
# runtime_config = "./app-config.json"

[session]
# Keep the access token between runs
persist = true

# Token file location
# token_file = "~/.local/share/incubator-portal/access_token"

[logging]
# Log level: trace, debug, info, warn, error
level = "info"

# Log format: pretty (for development) or json (for production)
format = "pretty"
"#
    .to_string()
}
