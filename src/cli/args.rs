//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// jobs-queue - run jobs in background with a queue limiter
///
/// Put a job on the queue of a running daemon:
///   jobs-queue send sleep 10
#[derive(Parser, Debug)]
#[command(name = "jobs-queue")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "JOBS_QUEUE_CONFIG")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Listen on the socket and run submitted jobs
    Serve,

    /// Submit a command line to a running daemon
    Send(SendArgs),

    /// Validate the configuration file and print the effective settings
    Check,
}

/// Arguments for the send command
#[derive(Parser, Debug)]
pub struct SendArgs {
    /// Socket path (defaults to the configured socket)
    #[arg(short, long)]
    pub socket: Option<PathBuf>,

    /// Command and arguments. A single argument is sent verbatim, so
    /// `send 'sleep 10'` and `send sleep 10` are equivalent.
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}
