//! Check command - validate configuration and show effective settings

use crate::cache::DedupCache;
use crate::config::Config;
use crate::error::JobsResult;
use console::style;
use std::path::Path;

/// Execute the check command
pub fn execute(config: &Config, path: &Path) -> JobsResult<()> {
    // Compiles exclude patterns the same way the daemon does
    DedupCache::from_config(config)?;

    println!(
        "{} Configuration OK: {}",
        style("✓").green(),
        style(path.display()).cyan()
    );
    println!();
    print!("{}", toml::to_string_pretty(config)?);
    Ok(())
}
