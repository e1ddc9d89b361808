//! Literal find/replace patches for installed third-party packages.
//!
//! Used to correct stale metadata shipped by dependencies, most notably the
//! `node-abi` registry bundled with `prebuild`, which lists the wrong ABI for
//! Node 24. Patch failures never abort the run: each rule is attempted and its
//! outcome recorded.

use std::fs;
use std::path::{Path, PathBuf};

/// A single literal replacement applied to one file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatchRule {
    pub file_path: PathBuf,
    pub from_literal: String,
    pub to_literal: String,
}

impl PatchRule {
    pub fn new(file_path: PathBuf, from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            file_path,
            from_literal: from.into(),
            to_literal: to.into(),
        }
    }
}

/// What happened when a rule was applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PatchOutcome {
    /// Replacement performed and written back.
    Applied,
    /// `from_literal` not present; file left untouched.
    NotFound,
    /// File could not be read or written.
    Failed(String),
}

/// Outcome of every rule, in rule order.
#[derive(Debug, Default)]
pub struct PatchReport {
    pub results: Vec<(PathBuf, PatchOutcome)>,
}

impl PatchReport {
    pub fn applied_count(&self) -> usize {
        self.count(|o| *o == PatchOutcome::Applied)
    }

    pub fn not_found_count(&self) -> usize {
        self.count(|o| *o == PatchOutcome::NotFound)
    }

    pub fn failed_count(&self) -> usize {
        self.count(|o| matches!(o, PatchOutcome::Failed(_)))
    }

    fn count(&self, pred: impl Fn(&PatchOutcome) -> bool) -> usize {
        self.results.iter().filter(|(_, o)| pred(o)).count()
    }
}

const NODE24_ENTRY_STALE: &str = r#"  {
    "runtime": "node",
    "target": "24.0.0",
    "lts": [
      "2025-10-28",
      "2026-10-20"
    ],
    "future": false,
    "abi": "134"
  },"#;

const NODE24_ENTRY_FIXED: &str = r#"  {
    "runtime": "node",
    "target": "24.0.0",
    "lts": [
      "2025-10-28",
      "2026-10-20"
    ],
    "future": false,
    "abi": "137"
  },"#;

/// Built-in patch set for a project rooted at `base_dir`.
pub fn default_rules(base_dir: &Path) -> Vec<PatchRule> {
    vec![PatchRule::new(
        base_dir.join("node_modules/prebuild/node_modules/node-abi/abi_registry.json"),
        NODE24_ENTRY_STALE,
        NODE24_ENTRY_FIXED,
    )]
}

/// Apply `rules` in order. Paths in log output are shown relative to
/// `base_dir`.
pub fn apply_patches(base_dir: &Path, rules: &[PatchRule]) -> PatchReport {
    let mut report = PatchReport::default();

    for rule in rules {
        let rel = rule
            .file_path
            .strip_prefix(base_dir)
            .unwrap_or(&rule.file_path)
            .display()
            .to_string();
        println!("Patching {}", rel);

        let outcome = apply_one(rule);
        match &outcome {
            PatchOutcome::Applied => tracing::debug!("patched {}", rel),
            PatchOutcome::NotFound => tracing::warn!(
                "Patch {} skipped: pattern not found (already patched or upstream changed)",
                rel
            ),
            PatchOutcome::Failed(msg) => tracing::error!("Patch {} failed: {}", rel, msg),
        }
        report.results.push((rule.file_path.clone(), outcome));
    }

    println!("\nDependencies patch finished.\n");
    report
}

fn apply_one(rule: &PatchRule) -> PatchOutcome {
    let content = match fs::read_to_string(&rule.file_path) {
        Ok(c) => c,
        Err(e) => return PatchOutcome::Failed(e.to_string()),
    };

    if !content.contains(&rule.from_literal) {
        return PatchOutcome::NotFound;
    }

    let patched = content.replacen(&rule.from_literal, &rule.to_literal, 1);
    match fs::write(&rule.file_path, patched) {
        Ok(()) => PatchOutcome::Applied,
        Err(e) => PatchOutcome::Failed(e.to_string()),
    }
}
