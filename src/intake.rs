//! Intake loop: one datagram at a time from the listener socket
//!
//! Every message is parsed, checked against the dedup cache and offered to
//! the admission queue. Nothing here blocks on the workers: a full queue
//! drops the job, because senders have no way to be told to slow down.

use crate::cache::DedupCache;
use crate::command::Command;
use crate::error::{JobsError, JobsResult, ParseError};
use crate::queue::AdmissionQueue;
use std::sync::Arc;
use tokio::net::UnixDatagram;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Largest datagram read from the socket; longer messages are truncated
pub const BUFFER_SIZE: usize = 1024;

/// What happened to one submitted line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Admission {
    /// Queued for a worker
    Enqueued,
    /// Same key already running or recently run
    Duplicate,
    /// Queue full or closed
    Dropped,
    /// Not a valid allow-listed command
    Rejected(ParseError),
}

/// Decides admission for incoming command lines
pub struct Intake {
    allowed: Vec<String>,
    cache: Arc<DedupCache>,
    queue: AdmissionQueue,
}

impl Intake {
    pub fn new(allowed: Vec<String>, cache: Arc<DedupCache>, queue: AdmissionQueue) -> Self {
        Self {
            allowed,
            cache,
            queue,
        }
    }

    /// Parse `raw`, skip it if its key is cached, otherwise try to queue it.
    ///
    /// The cache check and the enqueue are separate steps. A second copy
    /// arriving before a worker has marked the first can still get in.
    pub fn admit(&self, raw: &str) -> Admission {
        debug!("receive string: {}", raw.trim());

        let cmd = match Command::parse(raw, self.allowed.as_slice()) {
            Ok(cmd) => cmd,
            Err(e) => {
                error!("{}", e);
                return Admission::Rejected(e);
            }
        };

        if self.cache.contains(&cmd.key()) {
            info!("skip cmd: already in cache: {}", cmd);
            return Admission::Duplicate;
        }

        match self.queue.try_enqueue(cmd) {
            Ok(()) => Admission::Enqueued,
            Err(rejected) => {
                let reason = rejected.to_string();
                warn!("{}, drop job: {}", reason, rejected.into_inner());
                Admission::Dropped
            }
        }
    }

    /// Receive datagrams until `cancel` fires, then close the queue so the
    /// workers can drain it.
    pub async fn run(self, socket: &UnixDatagram, cancel: CancellationToken) -> JobsResult<()> {
        let mut buf = [0u8; BUFFER_SIZE];

        let result = loop {
            tokio::select! {
                _ = cancel.cancelled() => break Ok(()),
                received = socket.recv(&mut buf) => match received {
                    Ok(n) => {
                        let line = String::from_utf8_lossy(&buf[..n]);
                        self.admit(&line);
                    }
                    Err(e) => break Err(JobsError::io("receiving datagram", e)),
                },
            }
        };

        self.queue.close();
        result
    }
}
