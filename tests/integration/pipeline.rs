//! End-to-end runs through intake, cache, queue and workers

use async_trait::async_trait;
use jobs_queue::cache::{DedupCache, DeleteMode};
use jobs_queue::command::Command;
use jobs_queue::error::{ExecutionError, ParseError};
use jobs_queue::intake::{Admission, Intake};
use jobs_queue::queue::AdmissionQueue;
use jobs_queue::worker::{Executor, ProcessExecutor, ProcessOutput, Worker, WorkerPool};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::{Notify, Semaphore};

/// Runs real processes but holds each job open until the test lets it go
struct GatedExecutor {
    inner: ProcessExecutor,
    started: Notify,
    gate: Semaphore,
    outputs: Mutex<Vec<ProcessOutput>>,
}

impl GatedExecutor {
    fn new() -> Self {
        Self {
            inner: ProcessExecutor::new(),
            started: Notify::new(),
            gate: Semaphore::new(0),
            outputs: Mutex::new(vec![]),
        }
    }
}

#[async_trait]
impl Executor for GatedExecutor {
    async fn execute(&self, cmd: &Command) -> Result<ProcessOutput, ExecutionError> {
        let output = self.inner.execute(cmd).await?;
        self.started.notify_one();
        self.gate.acquire().await.unwrap().forget();
        self.outputs.lock().unwrap().push(output.clone());
        Ok(output)
    }
}

/// Finishes instantly with empty output
struct InstantExecutor;

#[async_trait]
impl Executor for InstantExecutor {
    async fn execute(&self, _cmd: &Command) -> Result<ProcessOutput, ExecutionError> {
        Ok(ProcessOutput {
            code: Some(0),
            ..Default::default()
        })
    }
}

fn allowed() -> Vec<String> {
    vec!["echo".to_string()]
}

#[tokio::test]
async fn duplicate_skipped_while_first_runs() {
    let cache = Arc::new(DedupCache::new(DeleteMode::Complete, Duration::ZERO, vec![]));
    let (queue, receiver) = AdmissionQueue::bounded(1);
    let executor = Arc::new(GatedExecutor::new());
    let pool = WorkerPool::spawn(1, receiver, Arc::clone(&cache), executor.clone());
    let intake = Intake::new(allowed(), Arc::clone(&cache), queue);

    assert_eq!(intake.admit("echo hello"), Admission::Enqueued);
    tokio::time::timeout(Duration::from_secs(5), executor.started.notified())
        .await
        .expect("first job never started");

    assert_eq!(intake.admit("echo hello"), Admission::Duplicate);

    executor.gate.add_permits(1);
    drop(intake);
    assert_eq!(pool.join(Duration::from_secs(5)).await, 0);

    let outputs = executor.outputs.lock().unwrap();
    assert_eq!(outputs.len(), 1);
    assert_eq!(outputs[0].stdout, b"hello\n");
    assert!(!cache.contains("echo hello"));
}

/// The cache is only marked once a worker dequeues the job. A copy sent
/// before that is not a duplicate yet: with one queue slot it is dropped
/// because the queue is full.
#[tokio::test]
async fn resubmission_before_dequeue_is_dropped_not_duplicate() {
    let cache = Arc::new(DedupCache::new(DeleteMode::Complete, Duration::ZERO, vec![]));
    let (queue, receiver) = AdmissionQueue::bounded(1);
    let worker = Worker::new(
        "worker-1",
        receiver.clone(),
        Arc::clone(&cache),
        Arc::new(InstantExecutor),
    );
    let intake = Intake::new(allowed(), Arc::clone(&cache), queue);

    assert_eq!(intake.admit("echo hello"), Admission::Enqueued);
    assert!(!cache.contains("echo hello"));
    assert_eq!(intake.admit("echo hello"), Admission::Dropped);

    drop(intake);
    let cmd = receiver.dequeue().await.unwrap();
    assert!(worker.process(cmd).await.succeeded());
    assert_eq!(receiver.dequeue().await, None);
}

#[tokio::test]
async fn unauthorized_executable_touches_nothing() {
    let cache = Arc::new(DedupCache::new(DeleteMode::Complete, Duration::ZERO, vec![]));
    let (queue, receiver) = AdmissionQueue::bounded(1);
    let intake = Intake::new(allowed(), Arc::clone(&cache), queue);

    assert_eq!(
        intake.admit("rm -rf /"),
        Admission::Rejected(ParseError::UnauthorizedExecutable("rm".to_string()))
    );

    drop(intake);
    assert!(cache.is_empty());
    assert_eq!(receiver.dequeue().await, None);
}

#[tokio::test(start_paused = true)]
async fn expire_mode_blocks_resubmission_until_ttl() {
    let ttl = Duration::from_secs(30);
    let cache = Arc::new(DedupCache::new(DeleteMode::Expire, ttl, vec![]));
    let (queue, receiver) = AdmissionQueue::bounded(1);
    let worker = Worker::new(
        "worker-1",
        receiver.clone(),
        Arc::clone(&cache),
        Arc::new(InstantExecutor),
    );
    let intake = Intake::new(allowed(), Arc::clone(&cache), queue);

    assert_eq!(intake.admit("echo hello"), Admission::Enqueued);
    let cmd = receiver.dequeue().await.unwrap();
    assert!(worker.process(cmd).await.succeeded());

    assert!(cache.contains("echo hello"));
    assert_eq!(intake.admit("echo hello"), Admission::Duplicate);

    tokio::time::advance(ttl).await;

    assert!(!cache.contains("echo hello"));
    assert_eq!(intake.admit("echo hello"), Admission::Enqueued);
}

#[tokio::test]
async fn excluded_commands_always_admitted() {
    let cache = Arc::new(DedupCache::new(
        DeleteMode::Complete,
        Duration::ZERO,
        vec![regex::Regex::new("^echo ping$").unwrap()],
    ));
    let (queue, receiver) = AdmissionQueue::bounded(8);
    let executor = Arc::new(GatedExecutor::new());
    let pool = WorkerPool::spawn(2, receiver, Arc::clone(&cache), executor.clone());
    let intake = Intake::new(allowed(), Arc::clone(&cache), queue);

    for _ in 0..4 {
        assert_eq!(intake.admit("echo ping"), Admission::Enqueued);
    }

    executor.gate.add_permits(4);
    drop(intake);
    assert_eq!(pool.join(Duration::from_secs(5)).await, 0);
    assert_eq!(executor.outputs.lock().unwrap().len(), 4);
}
