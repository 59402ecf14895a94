//! Configuration management for jobs-queue

pub mod schema;

pub use schema::{Config, LogFormat, MAX_CACHE_EXPIRE};

use crate::error::{JobsError, JobsResult};
use regex::Regex;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

/// Configuration manager
pub struct ConfigManager {
    config_path: PathBuf,
}

impl ConfigManager {
    /// Create a new config manager with default path
    pub fn new() -> Self {
        Self {
            config_path: Self::default_config_path(),
        }
    }

    /// Create a config manager with a custom path
    pub fn with_path(path: PathBuf) -> Self {
        Self { config_path: path }
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        PathBuf::from("./config.toml")
    }

    /// Load and validate the configuration. The daemon cannot run without
    /// an allow-list, so a missing file is an error.
    pub async fn load(&self) -> JobsResult<Config> {
        if !self.config_path.exists() {
            return Err(JobsError::ConfigNotFound(self.config_path.clone()));
        }

        let config = self.load_from_file(&self.config_path).await?;
        self.validate(&config)?;
        Ok(config)
    }

    /// Load configuration, falling back to defaults if the file is missing
    pub async fn load_or_default(&self) -> JobsResult<Config> {
        if !self.config_path.exists() {
            debug!("Config file not found, using defaults");
            return Ok(Config::default());
        }

        self.load_from_file(&self.config_path).await
    }

    /// Load configuration from a specific file
    pub async fn load_from_file(&self, path: &Path) -> JobsResult<Config> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| JobsError::io(format!("reading config from {}", path.display()), e))?;

        toml::from_str(&content).map_err(|e| JobsError::ConfigInvalid {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Check the values serde cannot express
    pub fn validate(&self, config: &Config) -> JobsResult<()> {
        let invalid = |reason: &str| JobsError::ConfigInvalid {
            path: self.config_path.clone(),
            reason: reason.to_string(),
        };

        if config.workers == 0 {
            return Err(invalid("workers must be greater than 0"));
        }
        if config.queue_size == 0 {
            return Err(invalid("queue_size must be greater than 0"));
        }
        if config.cache_expire > MAX_CACHE_EXPIRE {
            return Err(invalid(&format!(
                "cache_expire must be at most {} seconds",
                MAX_CACHE_EXPIRE
            )));
        }
        compile_excludes(&config.cache_excludes)?;
        Ok(())
    }

    /// Get the config file path
    pub fn path(&self) -> &Path {
        &self.config_path
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

/// Compile cache exclude patterns
pub fn compile_excludes(patterns: &[String]) -> JobsResult<Vec<Regex>> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| JobsError::ExcludePattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}
