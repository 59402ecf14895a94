//! Worker pool draining the admission queue
//!
//! Each worker loops: dequeue, mark the key in the cache, execute, release
//! the key, log the outcome. A failed job is logged and forgotten; it never
//! stops the worker or touches the others.

pub mod executor;

pub use executor::{Executor, ProcessExecutor, ProcessOutput};

use crate::cache::DedupCache;
use crate::command::Command;
use crate::error::ExecutionError;
use crate::queue::JobReceiver;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Result of running one job
#[derive(Debug)]
pub struct JobOutcome {
    pub command: Command,
    pub stdout: Vec<String>,
    pub stderr: Vec<String>,
    pub result: Result<(), ExecutionError>,
}

impl JobOutcome {
    pub fn succeeded(&self) -> bool {
        self.result.is_ok()
    }
}

/// Releases a cache key when dropped, so every exit path clears it
struct Release<'a> {
    cache: &'a DedupCache,
    key: String,
}

impl Drop for Release<'_> {
    fn drop(&mut self) {
        self.cache.release(&self.key);
    }
}

/// A single queue consumer
pub struct Worker {
    name: String,
    queue: JobReceiver,
    cache: Arc<DedupCache>,
    executor: Arc<dyn Executor>,
}

impl Worker {
    pub fn new(
        name: impl Into<String>,
        queue: JobReceiver,
        cache: Arc<DedupCache>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        Self {
            name: name.into(),
            queue,
            cache,
            executor,
        }
    }

    /// Process jobs until the queue is closed and drained
    pub async fn run(self) {
        info!("({}) start", self.name);
        while let Some(cmd) = self.queue.dequeue().await {
            self.process(cmd).await;
        }
        info!("({}) stop", self.name);
    }

    /// Run one job and log everything it printed
    pub async fn process(&self, cmd: Command) -> JobOutcome {
        let key = cmd.key();
        self.cache.set(&key);
        let _release = Release {
            cache: &self.cache,
            key,
        };

        info!("({}) exec  : {}", self.name, cmd);
        let (stdout, stderr, result) = match self.executor.execute(&cmd).await {
            Ok(output) => {
                let stdout = split_lines(&output.stdout);
                let stderr = split_lines(&output.stderr);
                let result = if output.success() {
                    Ok(())
                } else {
                    Err(ExecutionError::Exit {
                        command: cmd.to_string(),
                        status: output.status(),
                        stderr: stderr.join("\n"),
                    })
                };
                (stdout, stderr, result)
            }
            Err(e) => (vec![], vec![], Err(e)),
        };

        for line in &stdout {
            info!("({}) stdout: {}", self.name, line);
        }
        for line in &stderr {
            info!("({}) stderr: {}", self.name, line);
        }
        if let Err(e) = &result {
            error!("({}) {}", self.name, e);
        }

        JobOutcome {
            command: cmd,
            stdout,
            stderr,
            result,
        }
    }
}

fn split_lines(buf: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(buf)
        .lines()
        .map(str::to_string)
        .collect()
}

/// Fixed set of workers sharing one queue and one cache
pub struct WorkerPool {
    workers: JoinSet<()>,
}

impl WorkerPool {
    /// Start `count` workers named `worker-1` .. `worker-N`
    pub fn spawn(
        count: usize,
        queue: JobReceiver,
        cache: Arc<DedupCache>,
        executor: Arc<dyn Executor>,
    ) -> Self {
        let mut workers = JoinSet::new();
        for i in 1..=count {
            let worker = Worker::new(
                format!("worker-{}", i),
                queue.clone(),
                Arc::clone(&cache),
                Arc::clone(&executor),
            );
            workers.spawn(worker.run());
        }
        Self { workers }
    }

    /// Workers still running
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Wait for every worker to drain the closed queue. Workers still busy
    /// after `timeout` are aborted, killing their child processes. Returns
    /// how many were aborted.
    pub async fn join(mut self, timeout: Duration) -> usize {
        let drained = tokio::time::timeout(timeout, async {
            while let Some(result) = self.workers.join_next().await {
                if let Err(e) = result {
                    error!("Worker task failed: {}", e);
                }
            }
        })
        .await;

        if drained.is_ok() {
            return 0;
        }

        let remaining = self.workers.len();
        warn!(
            "Shutdown timeout after {:?}, aborting {} busy worker(s)",
            timeout, remaining
        );
        self.workers.shutdown().await;
        remaining
    }
}
