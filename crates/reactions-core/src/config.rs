//! Configuration loading and typed config structures for the reactions engine.
//!
//! The canonical configuration lives in `reactions-config.yaml` in the
//! working directory. This module defines strongly-typed structs that mirror
//! the YAML structure, and provides a loader that reads and validates the
//! file. Every section falls back to defaults when absent.

use std::collections::BTreeSet;
use std::path::Path;

use serde::Deserialize;

/// Reactions offered when the config does not name any.
pub const DEFAULT_ALLOWED: [&str; 8] = ["👍", "😂", "🎉", "😢", "😡", "👏", "🙌", "👀"];

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The content parsed but is not usable.
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level configuration.
///
/// Mirrors the structure of `reactions-config.yaml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ReactionsConfig {
    /// Which reactions users may toggle.
    #[serde(default)]
    pub reactions: AllowListConfig,

    /// Storage backend selection.
    #[serde(default)]
    pub store: StoreConfig,

    /// HTTP listener settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ReactionsConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// Environment variables override YAML values:
    /// - `DRAGONFLY_URL` overrides `store.dragonfly_url`
    /// - `REACTIONS_STORE` overrides `store.backend`
    /// - `REACTIONS_PORT` overrides `server.port`
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read,
    /// [`ConfigError::Yaml`] if the content is not valid YAML, or
    /// [`ConfigError::Invalid`] if validation or an override fails.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&contents)?;
        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Parse and validate configuration from a YAML string.
    ///
    /// Environment overrides are not applied.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML, or
    /// [`ConfigError::Invalid`] if the allow-list is unusable.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants the engine relies on.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when the allow-list is empty,
    /// contains a blank symbol or contains a duplicate.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let allowed = &self.reactions.allowed;
        if allowed.is_empty() {
            return Err(ConfigError::Invalid(
                "reactions.allowed must name at least one symbol".to_owned(),
            ));
        }
        let mut seen = BTreeSet::new();
        for symbol in allowed {
            let trimmed = symbol.trim();
            if trimmed.is_empty() {
                return Err(ConfigError::Invalid(
                    "reactions.allowed contains an empty symbol".to_owned(),
                ));
            }
            if !seen.insert(trimmed) {
                return Err(ConfigError::Invalid(format!(
                    "reactions.allowed lists {trimmed} more than once"
                )));
            }
        }
        Ok(())
    }

    /// Override values with environment variables when set.
    ///
    /// This allows Docker Compose (or any deployment) to set connection
    /// strings and ports without modifying the YAML config file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] if a variable holds an unusable value.
    pub fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Ok(val) = std::env::var("DRAGONFLY_URL") {
            self.store.dragonfly_url = val;
        }
        if let Ok(val) = std::env::var("REACTIONS_STORE") {
            self.store.backend = StoreBackend::parse(&val)?;
        }
        if let Ok(val) = std::env::var("REACTIONS_PORT") {
            self.server.port = val
                .parse()
                .map_err(|e| ConfigError::Invalid(format!("invalid REACTIONS_PORT: {e}")))?;
        }
        Ok(())
    }
}

/// The fixed reaction allow-list.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct AllowListConfig {
    /// Allowed symbols in display order.
    #[serde(default = "default_allowed")]
    pub allowed: Vec<String>,
}

impl Default for AllowListConfig {
    fn default() -> Self {
        Self {
            allowed: default_allowed(),
        }
    }
}

/// Which storage backend holds reaction state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StoreBackend {
    /// Process memory; state is lost on restart.
    #[default]
    Memory,
    /// A `Dragonfly` (Redis-compatible) server.
    Dragonfly,
}

impl StoreBackend {
    /// Parse a backend name (case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for unknown names.
    pub fn parse(name: &str) -> Result<Self, ConfigError> {
        match name.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "dragonfly" | "redis" => Ok(Self::Dragonfly),
            other => Err(ConfigError::Invalid(format!("unknown store backend: {other}"))),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct StoreConfig {
    /// Selected backend.
    #[serde(default)]
    pub backend: StoreBackend,

    /// Dragonfly (Redis-compatible) URL, used when `backend` is `dragonfly`.
    #[serde(default = "default_dragonfly_url")]
    pub dragonfly_url: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            dragonfly_url: default_dragonfly_url(),
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ServerConfig {
    /// The host address to bind to.
    #[serde(default = "default_host")]
    pub host: String,

    /// The TCP port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_allowed() -> Vec<String> {
    DEFAULT_ALLOWED.iter().map(|s| (*s).to_owned()).collect()
}

fn default_dragonfly_url() -> String {
    "redis://localhost:6379".to_owned()
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

const fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_owned()
}
