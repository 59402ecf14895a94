//! jobs-queue - run jobs in background with a queue limiter
//!
//! Command lines arrive as datagrams on a Unix socket, are checked against
//! an allow-list and a deduplication cache, then run by a fixed pool of
//! workers that log each line the jobs print.

pub mod cache;
pub mod cli;
pub mod command;
pub mod config;
pub mod error;
pub mod intake;
pub mod queue;
pub mod server;
pub mod worker;

pub use error::{JobsError, JobsResult};
