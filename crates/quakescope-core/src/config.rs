//! Configuration loading and typed config structures for the explorer.
//!
//! The configuration lives in a YAML file (conventionally
//! `quakescope.yaml`). Every field has a default, so an empty file or a file
//! with only some sections is valid.

use std::path::Path;

use serde::Deserialize;

/// Environment variable overriding `logging.level`.
pub const LOG_LEVEL_ENV: &str = "QUAKESCOPE_LOG_LEVEL";

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
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// Top-level explorer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ExplorerConfig {
    /// Time-lapse playback settings.
    #[serde(default)]
    pub playback: PlaybackConfig,

    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ExplorerConfig {
    /// Load configuration from a YAML file at the given path.
    ///
    /// `QUAKESCOPE_LOG_LEVEL` overrides `logging.level` when set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`] if the file cannot be read, or
    /// [`ConfigError::Yaml`] if the content is not valid YAML.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::parse(&contents)
    }

    /// Parse configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Yaml`] if the string is not valid YAML.
    pub fn parse(yaml: &str) -> Result<Self, ConfigError> {
        let mut config: Self = if yaml.trim().is_empty() {
            Self::default()
        } else {
            serde_yml::from_str(yaml)?
        };
        config.logging.apply_env_overrides();
        Ok(config)
    }
}

/// Time-lapse playback settings.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PlaybackConfig {
    /// Milliseconds between playback ticks.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Smallest interval accepted when changing speed.
    #[serde(default = "default_min_tick_interval_ms")]
    pub min_tick_interval_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            min_tick_interval_ms: default_min_tick_interval_ms(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LoggingConfig {
    /// Default `tracing` filter directive when `RUST_LOG` is unset.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl LoggingConfig {
    /// Apply `QUAKESCOPE_LOG_LEVEL` if it is set and non-empty.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(level) = std::env::var(LOG_LEVEL_ENV) {
            if !level.trim().is_empty() {
                self.level = level;
            }
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

const fn default_tick_interval_ms() -> u64 {
    1000
}

const fn default_min_tick_interval_ms() -> u64 {
    100
}

fn default_log_level() -> String {
    "info".to_owned()
}
