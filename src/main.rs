//! jobs-queue - background job runner
//!
//! CLI entry point that dispatches to subcommands.

use clap::Parser;
use console::style;
use jobs_queue::cli::{Cli, Commands};
use jobs_queue::config::{Config, ConfigManager, LogFormat};
use jobs_queue::error::JobsResult;
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{} {}", style("Error:").red().bold(), e);
            if let Some(hint) = e.hint() {
                eprintln!("{} {}", style("Hint:").yellow(), hint);
            }
            ExitCode::FAILURE
        }
    }
}

async fn run() -> JobsResult<()> {
    let cli = Cli::parse();

    let config_manager = if let Some(ref path) = cli.config {
        ConfigManager::with_path(path.clone())
    } else {
        ConfigManager::new()
    };

    match cli.command {
        Commands::Serve => {
            let config = config_manager.load().await?;
            init_logging(cli.verbose, &config);
            info!(
                "loaded config from {} ({} jobs)",
                config_manager.path().display(),
                config.jobs.len()
            );
            jobs_queue::cli::commands::serve(&config).await
        }
        Commands::Send(args) => {
            let config = config_manager.load_or_default().await?;
            init_logging(cli.verbose, &config);
            jobs_queue::cli::commands::send(args, &config).await
        }
        Commands::Check => {
            let config = config_manager.load().await?;
            jobs_queue::cli::commands::check(&config, config_manager.path())
        }
    }
}

/// Level comes from the config file, raised by -v flags; RUST_LOG wins
fn init_logging(verbose: u8, config: &Config) {
    let level = match (verbose, config.log_debug) {
        (0, false) => "info",
        (0, true) | (1, _) => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("jobs_queue={}", level)));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stdout);

    match (config.log_format, config.log_datetime) {
        (LogFormat::Json, _) => builder.json().init(),
        (LogFormat::Text, true) => builder.init(),
        (LogFormat::Text, false) => builder.without_time().init(),
    }
}
