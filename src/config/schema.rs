//! Configuration schema for jobs-queue
//!
//! Configuration is a flat TOML file, `./config.toml` by default:
//!
//! ```toml
//! workers = 2
//! queue_size = 10
//! socket = "/run/jobs-queue.sock"
//! cache_expire = 60
//! cache_delete_mode = "expire_complete"
//! cache_excludes = ["^echo "]
//! jobs = ["echo", "sleep"]
//! ```

use crate::cache::DeleteMode;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Longest accepted `cache_expire`, one year
pub const MAX_CACHE_EXPIRE: u64 = 365 * 24 * 60 * 60;

/// Root configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Number of workers draining the queue
    pub workers: usize,

    /// Maximum number of jobs waiting for a worker
    pub queue_size: usize,

    /// Unix datagram socket to listen on
    pub socket: PathBuf,

    /// Cache entry lifetime in seconds (0 = never expires)
    pub cache_expire: u64,

    /// When cache entries are removed
    pub cache_delete_mode: DeleteMode,

    /// Regular expressions; matching keys are never cached
    pub cache_excludes: Vec<String>,

    /// Executables allowed to run
    pub jobs: Vec<String>,

    /// Enable debug logging
    pub log_debug: bool,

    /// Prefix log lines with a timestamp
    pub log_datetime: bool,

    /// Log format: "text" or "json"
    pub log_format: LogFormat,

    /// Seconds to wait for workers to drain on shutdown
    pub shutdown_timeout: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            workers: 1,
            queue_size: 10,
            socket: default_socket_path(),
            cache_expire: 0,
            cache_delete_mode: DeleteMode::default(),
            cache_excludes: vec![],
            jobs: vec![],
            log_debug: false,
            log_datetime: false,
            log_format: LogFormat::default(),
            shutdown_timeout: 30,
        }
    }
}

impl Config {
    /// Cache entry lifetime
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_expire)
    }

    /// Shutdown drain deadline
    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_secs(self.shutdown_timeout)
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

/// Socket location used when the config file does not name one
pub fn default_socket_path() -> PathBuf {
    dirs::runtime_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join("jobs-queue.sock")
}
