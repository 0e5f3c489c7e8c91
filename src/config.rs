//! Configuration Management
//!
//! [`ClientConfig`] is the immutable configuration handed to every resource
//! client. [`Settings`] is the persistent configuration of the `odata-admin`
//! command line tool.

use crate::api::ApiError;
use anyhow::Result;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCESS_CONTROL_ALLOW_ORIGIN};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

/// Base path used when nothing else is configured
pub const DEFAULT_BASE_PATH: &str = "http://localhost:2000/odata";

/// Environment variable overriding the persisted base path
pub const BASE_PATH_ENV: &str = "ODATA_ADMIN_BASE_PATH";

/// Immutable client configuration
///
/// Default headers live here instead of on each client so that clients
/// sharing a configuration never observe each other's changes.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    base_path: Url,
    default_headers: HeaderMap,
    user_agent: String,
}

impl ClientConfig {
    /// Create a configuration for the given OData service root
    pub fn new(base_path: &str) -> Result<Self, ApiError> {
        let url = Url::parse(base_path)
            .map_err(|e| ApiError::Config(format!("invalid base path {:?}: {}", base_path, e)))?;

        if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") {
            return Err(ApiError::Config(format!(
                "base path must be an http(s) URL: {}",
                base_path
            )));
        }

        Ok(Self::from_url(url))
    }

    fn from_url(base_path: Url) -> Self {
        let mut default_headers = HeaderMap::new();
        // Kept for compatibility with existing backends; it has no effect client-side
        default_headers.insert(ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*"));

        Self {
            base_path,
            default_headers,
            user_agent: format!("odata-admin/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    /// Add a header sent with every request
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, ApiError> {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| ApiError::Config(format!("invalid header name {:?}: {}", name, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| ApiError::Config(format!("invalid value for header {}: {}", name, e)))?;
        self.default_headers.insert(name, value);
        Ok(self)
    }

    /// Override the User-Agent
    pub fn with_user_agent(mut self, user_agent: &str) -> Self {
        self.user_agent = user_agent.to_string();
        self
    }

    /// Service root without a trailing slash
    pub fn base_path(&self) -> &str {
        self.base_path.as_str().trim_end_matches('/')
    }

    pub fn default_headers(&self) -> &HeaderMap {
        &self.default_headers
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::from_url(Url::parse(DEFAULT_BASE_PATH).expect("default base path is a valid URL"))
    }
}

/// Persistent settings for the command line tool
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Settings {
    /// Last used service root
    #[serde(default)]
    pub base_path: Option<String>,
    /// Last used resource collection
    #[serde(default)]
    pub last_resource: Option<String>,
}

impl Settings {
    /// Get the settings file path
    pub fn settings_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("odata-admin").join("config.json"))
    }

    /// Load settings from the default location
    pub fn load() -> Self {
        match Self::settings_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Load settings from a file, falling back to defaults if unreadable
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => serde_json::from_str(&content).unwrap_or_else(|e| {
                tracing::warn!("Ignoring malformed settings file {:?}: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        }
    }

    /// Save settings to the default location
    pub fn save(&self) -> Result<()> {
        let Some(path) = Self::settings_path() else {
            return Ok(());
        };
        self.save_to(&path)
    }

    /// Save settings to a file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        Ok(())
    }

    /// Get effective base path (CLI > environment > settings > default)
    pub fn effective_base_path(&self, cli: Option<&str>) -> String {
        cli.map(str::to_string)
            .or_else(|| std::env::var(BASE_PATH_ENV).ok().filter(|v| !v.is_empty()))
            .or_else(|| self.base_path.clone())
            .unwrap_or_else(|| DEFAULT_BASE_PATH.to_string())
    }

    /// Remember the base path and resource of the last successful call
    pub fn remember(&mut self, base_path: &str, resource: &str) -> Result<()> {
        self.base_path = Some(base_path.to_string());
        self.last_resource = Some(resource.to_string());
        self.save()
    }
}
