//! Project layout checks.

use crate::config::Config;
use crate::orchestrator::Orchestrator;
use crate::process::SystemRunner;

use super::types::CheckResult;

/// Check the files the pipeline reads before building.
pub fn check_project(config: &Config) -> Vec<CheckResult> {
    let mut results = Vec::new();

    for (name, path) in [
        ("package.json", config.primary_manifest()),
        ("web-server package.json", config.secondary_manifest()),
    ] {
        if path.is_file() {
            results.push(CheckResult::pass(name));
        } else {
            results.push(CheckResult::fail(
                name,
                &format!("{} not found", path.display()),
            ));
        }
    }

    results.push(check_library_version(config));

    if config.node_modules().is_dir() {
        results.push(CheckResult::pass("node_modules"));
    } else {
        results.push(CheckResult::warn(
            "node_modules",
            "Not installed yet - `nativepack build` runs npm install first",
        ));
    }

    results
}

fn check_library_version(config: &Config) -> CheckResult {
    const NAME: &str = "library version";
    // No commands are run when resolving the library version.
    match Orchestrator::new(config, &SystemRunner).library_version() {
        Ok(v) => CheckResult::pass_with(NAME, &v),
        Err(e) => CheckResult::fail(NAME, &format!("{:#}", e)),
    }
}
