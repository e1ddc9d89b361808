//! Configuration management for nativepack.
//!
//! Reads configuration from a `.env` file in the project root and from
//! environment variables. Environment variables take precedence over `.env`.
//! The environment is read exactly once; every component receives the
//! resulting [`Config`] explicitly.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::platform;
use crate::versions::{normalize_version, parse_version_list};

/// Runtime versions built when running in CI without an explicit list.
pub const DEFAULT_BUILD_VERSIONS: &[&str] = &["18.0.0", "20.0.0", "22.0.0", "24.0.0"];

/// Versions that cannot be built for win32 arm64/ia32.
pub const DEFAULT_IGNORE_VERSIONS: &[&str] = &["18.0.0"];

/// Package whose native sources and prebuilt binaries are handled.
pub const NATIVE_PACKAGE: &str = "better-sqlite3";

/// Secondary manifest that pins the native package version.
pub const SECONDARY_MANIFEST: &str = "any-listen/packages/web-server/package.json";

/// Shared constants file carrying `NATIVE_VERSION`.
pub const CONSTANTS_FILE: &str = "any-listen/packages/shared/common/constants.ts";

/// nativepack configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// Project root holding `package.json`.
    pub base_dir: PathBuf,
    /// Single target (`LIB_TARGET`); short-circuits matrix resolution.
    pub single_target: Option<String>,
    /// Build matrix override (`DEFAULT_BUILD_NODE_VERSION`).
    pub build_versions: Option<Vec<String>>,
    /// Running under CI (`IS_CI`).
    pub is_ci: bool,
    /// Architecture override (`LIB_ARCH`).
    pub arch: Option<String>,
    /// Library version override (`LIB_VERSION`).
    pub lib_version: Option<String>,
    /// Versions skipped on win32 arm64/ia32 (`IGNORE_NODE_VERSION`).
    pub ignore_versions: Vec<String>,
    /// Node-style platform name (`NATIVEPACK_PLATFORM`, default host).
    pub platform: String,
}

impl Config {
    /// Load configuration from `.env` and the process environment.
    pub fn load(base_dir: &Path) -> Result<Self> {
        let mut vars = HashMap::new();

        let env_path = base_dir.join(".env");
        if env_path.exists() {
            let iter = dotenvy::from_path_iter(&env_path)
                .with_context(|| format!("Failed to read {}", env_path.display()))?;
            for item in iter {
                let (key, value) =
                    item.with_context(|| format!("Invalid line in {}", env_path.display()))?;
                vars.insert(key, value);
            }
        }

        // Environment variables override .env file
        vars.extend(std::env::vars());

        Ok(Self::from_vars(base_dir, &vars))
    }

    /// Build configuration from an explicit variable map.
    pub fn from_vars(base_dir: &Path, vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| vars.get(key).map(String::as_str).filter(|v| !v.is_empty());

        let ignore_versions = parse_version_list(get("IGNORE_NODE_VERSION"))
            .unwrap_or_else(|| to_owned_list(DEFAULT_IGNORE_VERSIONS));

        Self {
            base_dir: base_dir.to_path_buf(),
            single_target: get("LIB_TARGET").map(normalize_version),
            build_versions: parse_version_list(get("DEFAULT_BUILD_NODE_VERSION")),
            is_ci: get("IS_CI").is_some(),
            arch: get("LIB_ARCH").map(str::to_string),
            lib_version: get("LIB_VERSION").map(str::to_string),
            ignore_versions,
            platform: get("NATIVEPACK_PLATFORM")
                .unwrap_or(platform::host_platform())
                .to_string(),
        }
    }

    /// Target architecture: override or host.
    pub fn arch(&self) -> &str {
        self.arch.as_deref().unwrap_or(platform::host_arch())
    }

    pub fn primary_manifest(&self) -> PathBuf {
        self.base_dir.join("package.json")
    }

    pub fn secondary_manifest(&self) -> PathBuf {
        self.base_dir.join(SECONDARY_MANIFEST)
    }

    pub fn constants_file(&self) -> PathBuf {
        self.base_dir.join(CONSTANTS_FILE)
    }

    pub fn node_modules(&self) -> PathBuf {
        self.base_dir.join("node_modules")
    }

    pub fn dist_dir(&self) -> PathBuf {
        self.base_dir.join("dist")
    }

    pub fn native_dir(&self) -> PathBuf {
        self.base_dir.join("native")
    }

    pub fn prebuilds_dir(&self) -> PathBuf {
        self.base_dir.join("prebuilds")
    }

    /// Print configuration for debugging.
    pub fn print(&self) {
        let or_default = |v: &Option<String>, d: &str| v.clone().unwrap_or_else(|| d.to_string());
        println!("Configuration:");
        println!("  Project root: {}", self.base_dir.display());
        println!("  Platform: {}", self.platform);
        println!("  LIB_ARCH: {}", self.arch());
        println!(
            "  LIB_TARGET: {}",
            or_default(&self.single_target, "(not set)")
        );
        println!(
            "  LIB_VERSION: {}",
            or_default(&self.lib_version, "(from constants file)")
        );
        println!(
            "  DEFAULT_BUILD_NODE_VERSION: {}",
            self.build_versions
                .as_ref()
                .map(|v| v.join(","))
                .unwrap_or_else(|| "(not set)".to_string())
        );
        println!("  IS_CI: {}", self.is_ci);
        println!("  IGNORE_NODE_VERSION: {}", self.ignore_versions.join(","));
        if self.primary_manifest().exists() {
            println!("  package.json: FOUND");
        } else {
            println!("  package.json: NOT FOUND");
        }
    }
}

fn to_owned_list(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
