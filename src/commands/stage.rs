//! Stage command - copies native sources into the project root.

use anyhow::Result;

use crate::config::{Config, NATIVE_PACKAGE};
use crate::stage;

/// Execute the stage command.
pub fn cmd_stage(config: &Config) -> Result<()> {
    stage::stage_sources(&config.base_dir, NATIVE_PACKAGE)?;
    println!("Native sources staged.");
    Ok(())
}
