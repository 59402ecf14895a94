//! Process execution abstraction
//!
//! Workers run jobs through the `Executor` trait so the pool can be driven
//! by something other than real processes in tests.

use crate::command::Command;
use crate::error::ExecutionError;
use async_trait::async_trait;
use std::process::Stdio;
use tracing::debug;

/// Everything a finished process left behind
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
    /// Exit code, `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
}

impl ProcessOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable exit status
    pub fn status(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {}", code),
            None => "signal".to_string(),
        }
    }
}

/// Runs a command to completion
#[async_trait]
pub trait Executor: Send + Sync {
    /// Run `cmd` and capture its output. Only a failure to start is an
    /// error here; the caller judges the exit status.
    async fn execute(&self, cmd: &Command) -> Result<ProcessOutput, ExecutionError>;
}

/// Executor spawning real child processes
#[derive(Debug, Default)]
pub struct ProcessExecutor;

impl ProcessExecutor {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl Executor for ProcessExecutor {
    async fn execute(&self, cmd: &Command) -> Result<ProcessOutput, ExecutionError> {
        debug!("Executing: {} {:?}", cmd.executable(), cmd.args());

        let output = tokio::process::Command::new(cmd.executable())
            .args(cmd.args())
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|source| ExecutionError::Spawn {
                command: cmd.to_string(),
                source,
            })?;

        Ok(ProcessOutput {
            code: output.status.code(),
            stdout: output.stdout,
            stderr: output.stderr,
        })
    }
}
