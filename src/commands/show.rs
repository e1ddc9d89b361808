//! Show command - displays information.

use anyhow::Result;

use crate::abi::AbiRegistry;
use crate::config::Config;
use crate::orchestrator::{BuildTarget, Orchestrator};
use crate::process::CommandRunner;
use crate::versions::normalize_version;

/// Show target for the show command.
pub enum ShowTarget {
    /// Show configuration
    Config,
    /// Show the resolved build matrix
    Targets,
    /// Show the ABI for a Node version
    Abi { version: String },
}

/// Execute the show command.
pub fn cmd_show(config: &Config, target: ShowTarget, runner: &dyn CommandRunner) -> Result<()> {
    match target {
        ShowTarget::Config => config.print(),
        ShowTarget::Targets => {
            let orchestrator = Orchestrator::new(config, runner);
            let versions = match config.single_target {
                Some(ref t) => vec![t.clone()],
                None => orchestrator.resolve_targets()?,
            };
            println!("Build targets:");
            for version in versions {
                let target = BuildTarget {
                    runtime_version: version,
                    arch: config.arch().to_string(),
                    platform: config.platform.clone(),
                };
                let note = if target.is_skipped(&config.ignore_versions) {
                    " (skipped)"
                } else {
                    ""
                };
                println!(
                    "  node {} {} {}{}",
                    target.runtime_version, target.platform, target.arch, note
                );
            }
        }
        ShowTarget::Abi { version } => {
            let registry = AbiRegistry::locate(&config.node_modules())?;
            let version = normalize_version(&version);
            let abi = registry.abi_for(&version, "node")?;
            println!("node {} -> abi {}", version, abi);
            if let Some(source) = registry.source() {
                println!("  (from {})", source.display());
            }
        }
    }
    Ok(())
}
