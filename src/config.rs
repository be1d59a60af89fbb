//! Configuration management for QueryDeck.
//!
//! Handles loading configuration from TOML files, with support for named
//! query-service endpoints and UI settings.

use crate::error::{QueryDeckError, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use url::Url;

/// Default query service endpoint.
pub const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8000";

/// Main configuration structure for QueryDeck.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Default query service.
    #[serde(default)]
    pub server: ServerConfig,

    /// Named query services, selected with `--server`.
    #[serde(default)]
    pub servers: HashMap<String, ServerConfig>,

    /// UI settings.
    #[serde(default)]
    pub ui: UiConfig,
}

/// Query service endpoint configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the service (e.g., "http://127.0.0.1:8000").
    #[serde(default = "default_url")]
    pub url: String,

    /// Request timeout in seconds. Requests wait indefinitely when unset.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

fn default_url() -> String {
    DEFAULT_SERVER_URL.to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            timeout_secs: None,
        }
    }
}

impl ServerConfig {
    /// Creates a server config for the given URL.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            timeout_secs: None,
        }
    }

    /// Validates the URL and normalizes away a trailing slash.
    pub fn validate(mut self) -> Result<Self> {
        let url = Url::parse(&self.url)
            .map_err(|e| QueryDeckError::config(format!("Invalid server URL '{}': {e}", self.url)))?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(QueryDeckError::config(format!(
                "Invalid scheme '{}'. Expected 'http' or 'https'",
                url.scheme()
            )));
        }

        self.url = self.url.trim_end_matches('/').to_string();
        Ok(self)
    }
}

/// Language used for the generic failure message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    Es,
    En,
}

impl Locale {
    /// Message shown when a transport call fails. No detail is exposed.
    pub fn generic_failure(self) -> &'static str {
        match self {
            Self::Es => "Ocurrió un error, inténtelo de nuevo",
            Self::En => "Something went wrong, please try again",
        }
    }
}

/// UI configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct UiConfig {
    #[serde(default)]
    pub locale: Locale,
}

impl Config {
    /// Returns the default config file path for the current platform.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("querydeck")
            .join("config.toml")
    }

    /// Loads configuration from a TOML file. A missing file yields defaults.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| QueryDeckError::config(format!("Failed to read config file: {e}")))?;

        Self::parse_toml(&content, path)
    }

    /// Parses configuration from a TOML string.
    fn parse_toml(content: &str, path: &Path) -> Result<Self> {
        toml::from_str(content).map_err(|e| {
            QueryDeckError::config(format!(
                "Configuration error in {}:\n  {}",
                path.display(),
                e
            ))
        })
    }

    /// Gets a named server, or the default server if name is None.
    pub fn get_server(&self, name: Option<&str>) -> Option<&ServerConfig> {
        match name {
            Some(name) => self.servers.get(name),
            None => Some(&self.server),
        }
    }

    /// Resolves the server to use.
    ///
    /// Precedence: explicit URL, then named server, then the `[server]` table.
    /// A timeout override applies to whichever server wins.
    pub fn resolve_server(
        &self,
        url: Option<&str>,
        name: Option<&str>,
        timeout_secs: Option<u64>,
    ) -> Result<ServerConfig> {
        let mut server = match (url, name) {
            (Some(url), _) => ServerConfig {
                url: url.to_string(),
                timeout_secs: self.server.timeout_secs,
            },
            (None, Some(name)) => self.get_server(Some(name)).cloned().ok_or_else(|| {
                QueryDeckError::config(format!("Server '{}' not found in config file", name))
            })?,
            (None, None) => self.server.clone(),
        };

        if timeout_secs.is_some() {
            server.timeout_secs = timeout_secs;
        }
        server.validate()
    }
}
