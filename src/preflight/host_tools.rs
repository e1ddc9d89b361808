//! Host tool availability checks.

use crate::process;

use super::types::CheckResult;

/// Tools the pipeline shells out to, with what they are used for.
const REQUIRED_TOOLS: &[(&str, &str)] = &[
    ("node", "Reports the host runtime version"),
    ("npm", "Installs project dependencies"),
    ("npx", "Runs prebuild"),
];

/// Check host tools are installed.
pub fn check_host_tools() -> Vec<CheckResult> {
    REQUIRED_TOOLS
        .iter()
        .map(|(tool, purpose)| check_tool(tool, purpose))
        .collect()
}

fn check_tool(tool: &str, purpose: &str) -> CheckResult {
    match process::find_program(tool) {
        Some(path) => CheckResult::pass_with(tool, &path.display().to_string()),
        None => CheckResult::fail(
            tool,
            &format!("Not found in PATH. {}. Install Node.js.", purpose),
        ),
    }
}
