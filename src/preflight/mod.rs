//! Preflight checks.
//!
//! Validates host tools and the project layout before starting a build.
//! Run with `nativepack preflight` to check everything is ready.

mod host_tools;
mod project;
mod types;

use anyhow::{bail, Result};

use crate::config::Config;

pub use types::{CheckResult, CheckStatus, PreflightReport};

/// Run all preflight checks.
pub fn run_preflight(config: &Config) -> PreflightReport {
    let mut checks = Vec::new();

    println!("Running preflight checks...\n");

    println!("Checking host tools...");
    checks.extend(host_tools::check_host_tools());

    println!("Checking project...");
    checks.extend(project::check_project(config));

    println!();

    PreflightReport { checks }
}

/// Run preflight and bail if any checks fail.
pub fn run_preflight_or_fail(config: &Config) -> Result<()> {
    let report = run_preflight(config);
    report.print();

    if !report.all_passed() {
        bail!(
            "Preflight failed: {} check(s) failed. Fix the issues above before building.",
            report.fail_count()
        );
    }

    println!("All preflight checks passed!\n");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::fs;

    #[test]
    fn missing_project_files_fail() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = Config::from_vars(temp.path(), &HashMap::new());
        let checks = project::check_project(&config);

        let failed: Vec<&str> = checks
            .iter()
            .filter(|c| c.status == CheckStatus::Fail)
            .map(|c| c.name.as_str())
            .collect();
        assert!(failed.contains(&"package.json"));
        assert!(failed.contains(&"library version"));
    }

    #[test]
    fn complete_project_passes_project_checks() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = Config::from_vars(temp.path(), &HashMap::new());
        fs::write(config.primary_manifest(), "{}").unwrap();
        fs::create_dir_all(config.secondary_manifest().parent().unwrap()).unwrap();
        fs::write(config.secondary_manifest(), "{}").unwrap();
        fs::create_dir_all(config.constants_file().parent().unwrap()).unwrap();
        fs::write(config.constants_file(), "export const NATIVE_VERSION = 7\n").unwrap();
        fs::create_dir_all(config.node_modules()).unwrap();

        let report = PreflightReport {
            checks: project::check_project(&config),
        };
        assert!(report.all_passed());
        assert_eq!(report.warn_count(), 0);
    }
}
