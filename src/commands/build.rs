//! Build command - runs the whole packaging pipeline.

use anyhow::Result;
use std::time::Instant;

use crate::clean;
use crate::config::{Config, NATIVE_PACKAGE};
use crate::manifest;
use crate::orchestrator::{Orchestrator, TargetOutcome};
use crate::patch;
use crate::process::CommandRunner;
use crate::stage;
use crate::timing::format_duration;

/// Pipeline steps that can be turned off.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Skip the manifest rewrite and `npm install`.
    pub skip_install: bool,
    /// Skip dependency patches.
    pub skip_patch: bool,
}

/// Execute the build command.
pub fn cmd_build(
    config: &Config,
    options: BuildOptions,
    runner: &dyn CommandRunner,
) -> Result<Vec<TargetOutcome>> {
    println!("=== nativepack build ===\n");
    let build_start = Instant::now();

    clean::clean_dist(config)?;

    if options.skip_install {
        println!("Skipping manifest rewrite and install (--skip-install)");
    } else {
        manifest::rewrite_manifest(
            &config.primary_manifest(),
            &config.secondary_manifest(),
            NATIVE_PACKAGE,
        )?;
        manifest::install_dependencies(&config.base_dir, runner)?;
    }

    if options.skip_patch {
        println!("Skipping dependency patches (--skip-patch)");
    } else {
        let report = patch::apply_patches(&config.base_dir, &patch::default_rules(&config.base_dir));
        if report.failed_count() > 0 {
            tracing::warn!("{} dependency patch(es) failed", report.failed_count());
        }
    }

    stage::stage_sources(&config.base_dir, NATIVE_PACKAGE)?;

    let outcomes = Orchestrator::new(config, runner).run()?;

    print_summary(&outcomes);
    println!("\nTotal build time: {}", format_duration(build_start.elapsed()));

    Ok(outcomes)
}

fn print_summary(outcomes: &[TargetOutcome]) {
    println!("\n=== Build Summary ===");
    for outcome in outcomes {
        match outcome {
            TargetOutcome::Packaged { archive, abi, target } => println!(
                "  node {} ({} {}, abi {}) -> {}",
                target.runtime_version,
                target.platform,
                target.arch,
                abi,
                archive.display()
            ),
            TargetOutcome::Skipped(target) => println!(
                "  node {} ({} {}) skipped",
                target.runtime_version, target.platform, target.arch
            ),
        }
    }
}
