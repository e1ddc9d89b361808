//! Clean command - removes build artifacts.

use anyhow::Result;

use crate::clean;
use crate::config::Config;

/// Clean target for the clean command.
pub enum CleanTarget {
    /// Packaged archives (default)
    Dist,
    /// Native staging directory and prebuild output
    Native,
    /// Staged `src`/`deps`
    Staged,
    /// Everything
    All,
}

/// Execute the clean command.
pub fn cmd_clean(config: &Config, target: CleanTarget) -> Result<()> {
    let cleaned = match target {
        CleanTarget::Dist => clean::clean_dist(config)?,
        CleanTarget::Native => clean::clean_native(config)?,
        CleanTarget::Staged => clean::clean_staged(config)?,
        CleanTarget::All => clean::clean_all(config)?,
    };
    if cleaned {
        println!("Clean complete.");
    } else {
        println!("Nothing to clean.");
    }
    Ok(())
}
