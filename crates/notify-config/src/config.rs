//! Configuration management for the notification service.

use crate::{ConfigResult, Paths};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default log level.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Default push provider endpoint.
pub const DEFAULT_PUSH_ENDPOINT: &str = "https://push.linkod.app";

/// Main service configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Push provider API endpoint.
    #[serde(default = "default_push_endpoint")]
    pub push_endpoint: String,
    /// Directory database path; defaults to the standard location.
    #[serde(default)]
    pub database_path: Option<PathBuf>,
    /// Audience rule file path; defaults to the standard location.
    #[serde(default)]
    pub rules_path: Option<PathBuf>,
}

fn default_log_level() -> String {
    DEFAULT_LOG_LEVEL.to_string()
}

fn default_push_endpoint() -> String {
    DEFAULT_PUSH_ENDPOINT.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
            push_endpoint: DEFAULT_PUSH_ENDPOINT.to_string(),
            database_path: None,
            rules_path: None,
        }
    }
}

impl Config {
    /// Create a new Config with default values, then override from environment.
    pub fn new() -> Self {
        let mut config = Self::default();
        config.load_from_env();
        config
    }

    /// Load configuration from the standard file, falling back to defaults.
    /// Environment variables override the file.
    pub fn load(paths: &Paths) -> ConfigResult<Self> {
        let config_path = paths.config_file();

        let mut config = if config_path.exists() {
            Self::load_from_file(&config_path)?
        } else {
            Self::default()
        };

        config.load_from_env();
        Ok(config)
    }

    /// Load configuration from a specific file.
    pub fn load_from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the standard file.
    pub fn save(&self, paths: &Paths) -> ConfigResult<()> {
        paths.ensure_dirs()?;
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(paths.config_file(), content)?;
        Ok(())
    }

    /// Override configuration from environment variables.
    fn load_from_env(&mut self) {
        if let Ok(log_level) = std::env::var("NOTIFYD_LOG_LEVEL") {
            self.log_level = log_level;
        }
        if let Ok(endpoint) = std::env::var("NOTIFYD_PUSH_ENDPOINT") {
            self.push_endpoint = endpoint;
        }
    }

    /// Effective directory database path.
    pub fn database_file(&self, paths: &Paths) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| paths.database_file())
    }

    /// Effective audience rule file path.
    pub fn rules_file(&self, paths: &Paths) -> PathBuf {
        self.rules_path.clone().unwrap_or_else(|| paths.rules_file())
    }
}
