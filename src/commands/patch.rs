//! Patch command - applies dependency patches.

use anyhow::Result;

use crate::config::Config;
use crate::patch::{self, PatchReport};

/// Execute the patch command.
///
/// Patch failures are reported but never fail the command.
pub fn cmd_patch(config: &Config) -> Result<PatchReport> {
    let report = patch::apply_patches(&config.base_dir, &patch::default_rules(&config.base_dir));
    println!(
        "{} applied, {} already patched or not matched, {} failed",
        report.applied_count(),
        report.not_found_count(),
        report.failed_count()
    );
    Ok(report)
}
