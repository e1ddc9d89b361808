//! Preflight check types and report.

/// Result of a single preflight check.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub details: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    /// Check passed.
    Pass,
    /// Check failed - build will fail.
    Fail,
    /// Check passed but with a warning.
    Warn,
}

impl CheckStatus {
    fn label(self) -> &'static str {
        match self {
            CheckStatus::Pass => "PASS",
            CheckStatus::Fail => "FAIL",
            CheckStatus::Warn => "WARN",
        }
    }
}

impl CheckResult {
    fn new(name: &str, status: CheckStatus, details: Option<&str>) -> Self {
        Self {
            name: name.to_string(),
            status,
            details: details.map(str::to_string),
        }
    }

    pub fn pass(name: &str) -> Self {
        Self::new(name, CheckStatus::Pass, None)
    }

    pub fn pass_with(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Pass, Some(details))
    }

    pub fn fail(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Fail, Some(details))
    }

    pub fn warn(name: &str, details: &str) -> Self {
        Self::new(name, CheckStatus::Warn, Some(details))
    }
}

/// Results of all preflight checks.
#[derive(Debug, Default)]
pub struct PreflightReport {
    pub checks: Vec<CheckResult>,
}

impl PreflightReport {
    /// Returns true if no check failed.
    pub fn all_passed(&self) -> bool {
        self.fail_count() == 0
    }

    pub fn fail_count(&self) -> usize {
        self.count(CheckStatus::Fail)
    }

    pub fn warn_count(&self) -> usize {
        self.count(CheckStatus::Warn)
    }

    fn count(&self, status: CheckStatus) -> usize {
        self.checks.iter().filter(|c| c.status == status).count()
    }

    /// Print the report to stdout.
    pub fn print(&self) {
        println!("=== Preflight Check Results ===\n");

        for check in &self.checks {
            let label = check.status.label();
            match &check.details {
                Some(details) => println!("  [{}] {}: {}", label, check.name, details),
                None => println!("  [{}] {}", label, check.name),
            }
        }

        println!();
        let total = self.checks.len();
        let passed = self.count(CheckStatus::Pass);
        println!("Summary: {}/{} passed", passed, total);
        if self.fail_count() > 0 {
            println!("         {} FAILED - build will not succeed", self.fail_count());
        }
        if self.warn_count() > 0 {
            println!("         {} warnings", self.warn_count());
        }
    }
}
