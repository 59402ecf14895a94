//! Bounded admission queue between intake and workers
//!
//! Enqueue never waits: a full queue hands the command back so the caller
//! can drop it. Dequeue waits until a job arrives or the queue is closed.

use crate::command::Command;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};

/// Why a command was not admitted
#[derive(Error, Debug, PartialEq, Eq)]
pub enum Rejected {
    #[error("queue limit is reached")]
    Full(Command),

    #[error("queue is closed")]
    Closed(Command),
}

impl Rejected {
    /// Recover the command that was not admitted
    pub fn into_inner(self) -> Command {
        match self {
            Self::Full(cmd) | Self::Closed(cmd) => cmd,
        }
    }
}

/// Sending half, owned by the intake loop
#[derive(Debug)]
pub struct AdmissionQueue {
    tx: mpsc::Sender<Command>,
}

/// Receiving half, shared by every worker
#[derive(Debug, Clone)]
pub struct JobReceiver {
    rx: Arc<Mutex<mpsc::Receiver<Command>>>,
}

impl AdmissionQueue {
    /// Create a queue holding at most `capacity` jobs.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero; config validation rejects that first.
    pub fn bounded(capacity: usize) -> (Self, JobReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (
            Self { tx },
            JobReceiver {
                rx: Arc::new(Mutex::new(rx)),
            },
        )
    }

    /// Admit `cmd` without waiting
    pub fn try_enqueue(&self, cmd: Command) -> Result<(), Rejected> {
        self.tx.try_send(cmd).map_err(|e| match e {
            mpsc::error::TrySendError::Full(cmd) => Rejected::Full(cmd),
            mpsc::error::TrySendError::Closed(cmd) => Rejected::Closed(cmd),
        })
    }

    pub fn capacity(&self) -> usize {
        self.tx.max_capacity()
    }

    /// Jobs waiting for a worker
    pub fn len(&self) -> usize {
        self.tx.max_capacity() - self.tx.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Stop admitting. Workers drain what is already queued.
    pub fn close(self) {
        drop(self.tx);
    }
}

impl JobReceiver {
    /// Wait for the next job. `None` once the queue is closed and empty.
    pub async fn dequeue(&self) -> Option<Command> {
        self.rx.lock().await.recv().await
    }
}
