//! Node ABI lookup backed by the installed `node-abi` registry.
//!
//! The registry is the `abi_registry.json` shipped with the `node-abi`
//! package: a list of `{ runtime, target, abi, ... }` records. Lookup follows
//! `node-abi`'s rules: the ABI of the newest registered target not newer than
//! the requested version, valid up to the next major (node) or minor
//! (electron) release after the newest registered one.

use anyhow::{bail, Context, Result};
use semver::Version;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Registry locations relative to `node_modules`, in lookup order.
pub const REGISTRY_CANDIDATES: &[&str] = &[
    "node-abi/abi_registry.json",
    "prebuild/node_modules/node-abi/abi_registry.json",
];

/// One registry record.
#[derive(Debug, Clone, Deserialize)]
pub struct AbiEntry {
    pub runtime: String,
    pub target: String,
    pub abi: String,
}

/// Parsed ABI registry.
#[derive(Debug, Clone)]
pub struct AbiRegistry {
    entries: Vec<(Version, AbiEntry)>,
    source: Option<PathBuf>,
}

impl AbiRegistry {
    /// Parse a registry from JSON text.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: Vec<AbiEntry> =
            serde_json::from_str(json).context("Failed to parse ABI registry JSON")?;
        let entries = raw
            .into_iter()
            .filter_map(|entry| match Version::parse(&entry.target) {
                Ok(v) => Some((v, entry)),
                Err(e) => {
                    tracing::debug!("skipping registry target {}: {}", entry.target, e);
                    None
                }
            })
            .collect();
        Ok(Self {
            entries,
            source: None,
        })
    }

    /// Load a registry file.
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("Failed to read ABI registry {}", path.display()))?;
        let mut registry =
            Self::from_json(&json).with_context(|| format!("Invalid registry {}", path.display()))?;
        registry.source = Some(path.to_path_buf());
        Ok(registry)
    }

    /// Find and load the installed registry under `node_modules`.
    pub fn locate(node_modules: &Path) -> Result<Self> {
        for candidate in REGISTRY_CANDIDATES {
            let path = node_modules.join(candidate);
            if path.is_file() {
                tracing::debug!("using ABI registry {}", path.display());
                return Self::load(&path);
            }
        }
        bail!(
            "node-abi registry not found under {}. Run 'npm install' first.",
            node_modules.display()
        )
    }

    /// Path the registry was loaded from, if any.
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// Resolve the ABI number for `target` on `runtime`.
    pub fn abi_for(&self, target: &str, runtime: &str) -> Result<String> {
        // A bare number is already an ABI.
        if !target.is_empty() && target.chars().all(|c| c.is_ascii_digit()) {
            return Ok(target.to_string());
        }

        let target = target.trim_start_matches('v');
        let wanted = Version::parse(target)
            .with_context(|| format!("Invalid runtime version '{}'", target))?;

        let best = self
            .entries
            .iter()
            .filter(|(v, e)| e.runtime == runtime && *v <= wanted)
            .max_by(|(a, _), (b, _)| a.cmp(b));

        if let (Some((_, entry)), Some(next)) = (best, self.next_target(runtime)) {
            if wanted < next {
                return Ok(entry.abi.clone());
            }
        }

        bail!(
            "Could not detect abi for version {} and runtime {}. \
             Updating \"node-abi\" might help solve this issue if it is a new release of {}",
            target,
            runtime,
            runtime
        )
    }

    /// First release after the newest registered target for `runtime`.
    fn next_target(&self, runtime: &str) -> Option<Version> {
        let latest = self
            .entries
            .iter()
            .filter(|(_, e)| e.runtime == runtime)
            .map(|(v, _)| v)
            .max()?;

        let next = if runtime == "electron" {
            if latest.pre.is_empty() {
                Version::new(latest.major, latest.minor + 1, 0)
            } else {
                Version::new(latest.major + 1, 0, 0)
            }
        } else {
            Version::new(latest.major + 1, 0, 0)
        };
        Some(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const REGISTRY: &str = r#"[
      {"runtime": "node", "target": "18.0.0", "lts": ["2022-10-25", "2023-10-18"], "future": false, "abi": "108"},
      {"runtime": "node", "target": "20.0.0", "lts": ["2023-10-24", "2024-10-22"], "future": false, "abi": "115"},
      {"runtime": "node", "target": "22.0.0", "lts": ["2024-10-29", "2025-10-21"], "future": false, "abi": "127"},
      {"runtime": "node", "target": "24.0.0", "lts": ["2025-10-28", "2026-10-20"], "future": false, "abi": "137"},
      {"runtime": "electron", "target": "33.0.0-alpha.1", "lts": false, "future": true, "abi": "130"}
    ]"#;

    fn registry() -> AbiRegistry {
        AbiRegistry::from_json(REGISTRY).unwrap()
    }

    #[test]
    fn exact_targets_resolve() {
        let r = registry();
        assert_eq!(r.abi_for("18.0.0", "node").unwrap(), "108");
        assert_eq!(r.abi_for("20.0.0", "node").unwrap(), "115");
        assert_eq!(r.abi_for("v24.0.0", "node").unwrap(), "137");
    }

    #[test]
    fn minor_releases_use_previous_entry() {
        assert_eq!(registry().abi_for("22.11.0", "node").unwrap(), "127");
    }

    #[test]
    fn numeric_target_is_returned_as_is() {
        assert_eq!(registry().abi_for("115", "node").unwrap(), "115");
    }

    #[test]
    fn too_new_or_too_old_fails() {
        let r = registry();
        assert!(r.abi_for("25.0.0", "node").is_err());
        assert!(r.abi_for("16.0.0", "node").is_err());
    }

    #[test]
    fn runtimes_are_separate() {
        assert!(registry().abi_for("20.0.0", "electron").is_err());
    }

    #[test]
    fn locate_prefers_top_level_registry() {
        let temp = tempfile::TempDir::new().unwrap();
        let nm = temp.path().join("node_modules");
        let nested = nm.join(REGISTRY_CANDIDATES[1]);
        fs::create_dir_all(nested.parent().unwrap()).unwrap();
        fs::write(&nested, REGISTRY).unwrap();

        let r = AbiRegistry::locate(&nm).unwrap();
        assert_eq!(r.source(), Some(nested.as_path()));

        let top = nm.join(REGISTRY_CANDIDATES[0]);
        fs::create_dir_all(top.parent().unwrap()).unwrap();
        fs::write(&top, "[]").unwrap();
        let r = AbiRegistry::locate(&nm).unwrap();
        assert_eq!(r.source(), Some(top.as_path()));
    }

    #[test]
    fn locate_without_install_fails() {
        let temp = tempfile::TempDir::new().unwrap();
        assert!(AbiRegistry::locate(temp.path()).is_err());
    }
}
