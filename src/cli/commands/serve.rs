//! Serve command - run the daemon until SIGINT or SIGTERM

use crate::config::Config;
use crate::error::JobsResult;
use crate::server::Server;
use tracing::{info, warn};

/// Execute the serve command
pub async fn execute(config: &Config) -> JobsResult<()> {
    let server = Server::bind(config.clone()).await?;
    server.run(shutdown_signal()).await
}

/// Resolves on the first SIGINT or SIGTERM
async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => info!("shutdown (signal: SIGINT)"),
                    _ = term.recv() => info!("shutdown (signal: SIGTERM)"),
                }
                return;
            }
            Err(e) => warn!("Failed to install SIGTERM handler: {}", e),
        }
    }

    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for SIGINT: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown (signal: SIGINT)");
}
