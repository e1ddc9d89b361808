//! Multi-target native builds.
//!
//! For every requested Node version the orchestrator runs `prebuild`,
//! unpacks the produced prebuilt tarball into `native/`, and repackages it as
//! `dist/<platform>_<arch>_<abi>_v<version>.tar.gz`. Targets are processed one
//! at a time; the first failure aborts the whole run.

use anyhow::{bail, Context, Result};
use regex::Regex;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::abi::AbiRegistry;
use crate::archive;
use crate::config::{Config, DEFAULT_BUILD_VERSIONS};
use crate::manifest;
use crate::process::{Cmd, CommandRunner};
use crate::timing::Timer;

/// Matches the library version constant in the shared constants file.
const NATIVE_VERSION_PATTERN: &str = r"NATIVE_VERSION\s*=\s*(\d+)";

/// Leading path segments dropped from prebuilt tarballs (`build/Release/`).
const PREBUILT_STRIP: usize = 2;

/// One build/package unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildTarget {
    pub runtime_version: String,
    pub arch: String,
    pub platform: String,
}

impl BuildTarget {
    /// win32 arm64/ia32 cannot be built for versions in `ignore`.
    pub fn is_skipped(&self, ignore: &[String]) -> bool {
        self.platform == "win32"
            && (self.arch == "arm64" || self.arch == "ia32")
            && ignore.iter().any(|v| *v == self.runtime_version)
    }

    /// Whether `prebuild --strip` is supported on this platform.
    pub fn strips_symbols(&self) -> bool {
        self.platform != "android"
    }

    /// Tarball name produced by `prebuild`.
    pub fn prebuilt_name(&self, package: &str, abi: &str) -> String {
        format!(
            "{}-v-node-v{}-{}-{}.tar.gz",
            package, abi, self.platform, self.arch
        )
    }

    /// Final archive name.
    pub fn archive_name(&self, abi: &str, lib_version: &str) -> String {
        format!(
            "{}_{}_{}_v{}.tar.gz",
            self.platform, self.arch, abi, lib_version
        )
    }

    /// The `npx prebuild` invocation for this target.
    pub fn prebuild_cmd(&self) -> Cmd {
        Cmd::new("npx")
            .args(["prebuild", "-r", "node", "-a", self.arch.as_str()])
            .args(["-t", self.runtime_version.as_str()])
            .arg_if(self.strips_symbols(), "--strip")
            .error_msg(format!("prebuild failed for node {}", self.runtime_version))
    }
}

/// Result of processing one target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetOutcome {
    Packaged {
        target: BuildTarget,
        abi: String,
        archive: PathBuf,
    },
    Skipped(BuildTarget),
}

/// Extract `NATIVE_VERSION = <n>` from source text.
pub fn parse_native_version(source: &str) -> Option<String> {
    let re = Regex::new(NATIVE_VERSION_PATTERN).ok()?;
    re.captures(source).map(|c| c[1].to_string())
}

/// Remove the `native` staging directory. A missing directory is fine; any
/// other error is fatal.
fn remove_staging_dir(dir: &Path) -> Result<()> {
    match fs::remove_dir_all(dir) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e).with_context(|| format!("Failed to clear {}", dir.display())),
    }
}

/// Drives builds for every resolved target.
pub struct Orchestrator<'a> {
    config: &'a Config,
    runner: &'a dyn CommandRunner,
}

impl<'a> Orchestrator<'a> {
    pub fn new(config: &'a Config, runner: &'a dyn CommandRunner) -> Self {
        Self { config, runner }
    }

    /// Versions to build when no single target is set: explicit list, then
    /// the CI matrix, then the host's Node version.
    pub fn resolve_targets(&self) -> Result<Vec<String>> {
        if let Some(ref list) = self.config.build_versions {
            return Ok(list.clone());
        }
        if self.config.is_ci {
            return Ok(DEFAULT_BUILD_VERSIONS.iter().map(|s| s.to_string()).collect());
        }
        Ok(vec![self.host_node_version()?])
    }

    /// Version of the `node` binary on PATH, without the leading `v`.
    pub fn host_node_version(&self) -> Result<String> {
        let result = Cmd::new("node")
            .arg("--version")
            .error_msg("Failed to query node version")
            .run_with(self.runner)?;
        let version = result.stdout_trimmed().trim_start_matches('v');
        if version.is_empty() {
            bail!("'node --version' printed nothing");
        }
        Ok(version.to_string())
    }

    /// `LIB_VERSION` or the constant from the shared constants file.
    pub fn library_version(&self) -> Result<String> {
        if let Some(ref v) = self.config.lib_version {
            return Ok(v.clone());
        }
        let path = self.config.constants_file();
        let source = fs::read_to_string(&path).with_context(|| {
            format!(
                "LIB_VERSION is not set and {} could not be read",
                path.display()
            )
        })?;
        parse_native_version(&source).with_context(|| {
            format!(
                "LIB_VERSION is not set and NATIVE_VERSION was not found in {}",
                path.display()
            )
        })
    }

    /// Build everything requested by the configuration.
    pub fn run(&self) -> Result<Vec<TargetOutcome>> {
        if let Some(ref target) = self.config.single_target {
            return Ok(vec![self.build_target(target)?]);
        }

        let versions = self.resolve_targets()?;
        tracing::info!("build matrix: {}", versions.join(", "));

        let mut outcomes = Vec::with_capacity(versions.len());
        for version in &versions {
            outcomes.push(self.build_target(version)?);
        }
        Ok(outcomes)
    }

    /// Build and package a single Node version.
    pub fn build_target(&self, version: &str) -> Result<TargetOutcome> {
        let target = BuildTarget {
            runtime_version: version.to_string(),
            arch: self.config.arch().to_string(),
            platform: self.config.platform.clone(),
        };
        let lib_version = self.library_version()?;

        if target.is_skipped(&self.config.ignore_versions) {
            tracing::warn!(
                "skipping node {} on {} {} (not buildable)",
                target.runtime_version,
                target.platform,
                target.arch
            );
            return Ok(TargetOutcome::Skipped(target));
        }

        println!(
            "\n=== Building for {} {} {} ===",
            target.platform, target.runtime_version, target.arch
        );
        let timer = Timer::start(&format!("node {} {}", target.runtime_version, target.arch));

        target
            .prebuild_cmd()
            .dir(&self.config.base_dir)
            .run_interactive_with(self.runner)?;

        let native = self.config.native_dir();
        remove_staging_dir(&native)?;

        let registry = AbiRegistry::locate(&self.config.node_modules())?;
        let abi = registry.abi_for(&target.runtime_version, "node")?;

        let package = manifest::read_manifest(&self.config.primary_manifest())?;
        let prebuilt = self
            .config
            .prebuilds_dir()
            .join(target.prebuilt_name(manifest::package_name(&package)?, &abi));
        archive::unpack(&prebuilt, &native, PREBUILT_STRIP)
            .with_context(|| format!("Failed to unpack prebuilt {}", prebuilt.display()))?;

        let dist = self.config.dist_dir();
        fs::create_dir_all(&dist)?;
        let output = dist.join(target.archive_name(&abi, &lib_version));
        archive::pack_dir(&native, true, &output)?;

        let size = fs::metadata(&output)?.len();
        let digest = archive::sha256_file(&output)?;
        tracing::info!(
            "packaged {} ({} bytes, sha256 {})",
            output.display(),
            size,
            digest
        );
        timer.finish();

        Ok(TargetOutcome::Packaged {
            target,
            abi,
            archive: output,
        })
    }
}
