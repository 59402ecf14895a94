//! Daemon wiring: socket, cache, queue and worker pool for one process
//!
//! Shutdown is graceful: intake stops, the queue is closed, and workers get
//! `shutdown_timeout` to finish what is running and queued before they are
//! aborted.

use crate::cache::DedupCache;
use crate::config::Config;
use crate::error::{JobsError, JobsResult};
use crate::intake::Intake;
use crate::queue::AdmissionQueue;
use crate::worker::{Executor, ProcessExecutor, WorkerPool};
use std::future::Future;
use std::io;
use std::os::unix::fs::FileTypeExt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::fs;
use tokio::net::UnixDatagram;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// A bound, running daemon
pub struct Server {
    config: Config,
    socket: UnixDatagram,
    cache: Arc<DedupCache>,
    intake: Intake,
    pool: WorkerPool,
}

impl Server {
    /// Bind the configured socket and start workers running real processes
    pub async fn bind(config: Config) -> JobsResult<Self> {
        Self::bind_with_executor(config, Arc::new(ProcessExecutor::new())).await
    }

    /// Bind the configured socket and start workers using `executor`
    pub async fn bind_with_executor(
        config: Config,
        executor: Arc<dyn Executor>,
    ) -> JobsResult<Self> {
        if config.jobs.is_empty() {
            warn!("No jobs configured, every command will be rejected");
        }

        let cache = Arc::new(DedupCache::from_config(&config)?);
        let socket = bind_socket(&config.socket).await?;

        let (queue, receiver) = AdmissionQueue::bounded(config.queue_size);
        let pool = WorkerPool::spawn(config.workers, receiver, Arc::clone(&cache), executor);
        let intake = Intake::new(config.jobs.clone(), Arc::clone(&cache), queue);

        info!(
            "start server on: {}, version: {}",
            config.socket.display(),
            env!("CARGO_PKG_VERSION")
        );
        debug!(
            "workers: {}, queue_size: {}, cache: {} ({:?})",
            config.workers,
            config.queue_size,
            cache.mode(),
            cache.ttl()
        );

        Ok(Self {
            config,
            socket,
            cache,
            intake,
            pool,
        })
    }

    /// Path of the listening socket
    pub fn socket_path(&self) -> &Path {
        &self.config.socket
    }

    /// Serve until `shutdown` resolves or the socket fails, then drain
    pub async fn run<F>(self, shutdown: F) -> JobsResult<()>
    where
        F: Future<Output = ()>,
    {
        let Server {
            config,
            socket,
            cache,
            intake,
            pool,
        } = self;

        let cancel = CancellationToken::new();
        let sweeper = cache.spawn_sweeper(config.cache_ttl().saturating_mul(2), cancel.clone());

        let serve = async {
            let result = intake.run(&socket, cancel.clone()).await;
            cancel.cancel();
            result
        };
        let watch = async {
            tokio::select! {
                _ = shutdown => info!("shutdown requested"),
                _ = cancel.cancelled() => {}
            }
            cancel.cancel();
        };
        let (result, ()) = tokio::join!(serve, watch);

        let aborted = pool.join(config.shutdown_timeout()).await;
        if aborted > 0 {
            warn!("{} job(s) did not finish before shutdown", aborted);
        }
        if let Some(sweeper) = sweeper {
            let _ = sweeper.await;
        }

        drop(socket);
        remove_socket(&config.socket).await;
        info!("server stopped");
        result
    }
}

async fn bind_socket(path: &Path) -> JobsResult<UnixDatagram> {
    let bind_error = |source: io::Error| JobsError::Bind {
        path: PathBuf::from(path),
        source,
    };

    match fs::symlink_metadata(path).await {
        Ok(meta) if meta.file_type().is_socket() => {
            let client = UnixDatagram::unbound()
                .map_err(|e| JobsError::io("checking socket owner", e))?;
            if client.connect(path).is_ok() {
                return Err(bind_error(io::Error::new(
                    io::ErrorKind::AddrInUse,
                    "socket is owned by a running daemon",
                )));
            }

            // Nobody listens: left behind by a daemon that did not clean up
            debug!("Removing stale socket {}", path.display());
            fs::remove_file(path).await.map_err(|e| {
                JobsError::io(format!("removing stale socket {}", path.display()), e)
            })?;
        }
        Ok(_) => {
            return Err(bind_error(io::Error::new(
                io::ErrorKind::AlreadyExists,
                "path exists and is not a socket",
            )));
        }
        Err(_) => {}
    }

    UnixDatagram::bind(path).map_err(bind_error)
}

async fn remove_socket(path: &Path) {
    if let Err(e) = fs::remove_file(path).await {
        warn!("Failed to remove socket {}: {}", path.display(), e);
    }
}
