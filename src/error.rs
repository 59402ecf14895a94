//! Error types for jobs-queue
//!
//! All modules use `JobsResult<T>` as their return type. Per-job failures
//! (`ParseError`, `ExecutionError`) are their own types and never reach
//! `JobsError`: they are logged where they occur.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for jobs-queue operations
pub type JobsResult<T> = Result<T, JobsError>;

/// Reasons a raw command line is rejected before admission
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("empty command line")]
    EmptyInput,

    #[error("malformed command line (unbalanced quotes or trailing escape): {0}")]
    Malformed(String),

    #[error("job executable '{0}' not configured")]
    UnauthorizedExecutable(String),
}

/// Reasons an admitted job failed to run successfully
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("failed to start {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} exited with {status}, stderr: {stderr}")]
    Exit {
        command: String,
        status: String,
        stderr: String,
    },
}

/// All errors that can occur in jobs-queue
#[derive(Error, Debug)]
pub enum JobsError {
    // Configuration errors
    #[error("Invalid configuration at {path}: {reason}")]
    ConfigInvalid { path: PathBuf, reason: String },

    #[error("Configuration file not found: {0}")]
    ConfigNotFound(PathBuf),

    #[error("Invalid cache exclude pattern '{pattern}': {source}")]
    ExcludePattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    // Listener errors
    #[error("Failed to bind socket {path}: {source}")]
    Bind {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to send to {path}: {source}")]
    Send {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // IO errors
    #[error("IO error: {context}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    // Serialization errors
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    // General errors
    #[error("{0}")]
    User(String),
}

impl JobsError {
    /// Create an IO error with context
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Get actionable hint for the error
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Self::ConfigNotFound(_) => Some("Pass --config <path> or set JOBS_QUEUE_CONFIG"),
            Self::Bind { .. } => {
                Some("Check that the socket directory exists and no other daemon is running")
            }
            Self::Send { .. } => Some("Is the daemon running? Start it with: jobs-queue serve"),
            _ => None,
        }
    }
}
