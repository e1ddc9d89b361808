//! `package.json` handling.
//!
//! The project manifest pins the native package at whatever version the
//! application's web-server package depends on. The manifest is treated as
//! an opaque JSON document: only `dependencies.<name>` is touched, key order
//! and every other field survive the rewrite.

use anyhow::{anyhow, Context, Result};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

use crate::process::{Cmd, CommandRunner};

/// Read and parse a manifest file.
pub fn read_manifest(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse manifest {}", path.display()))
}

/// Write a manifest with 2-space indentation and a trailing newline.
pub fn write_manifest(path: &Path, manifest: &Value) -> Result<()> {
    let mut text = serde_json::to_string_pretty(manifest)?;
    text.push('\n');
    fs::write(path, text).with_context(|| format!("Failed to write manifest {}", path.display()))
}

/// The manifest's `name` field.
pub fn package_name(manifest: &Value) -> Result<&str> {
    manifest
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| anyhow!("Manifest has no \"name\" field"))
}

fn dependencies_mut(manifest: &mut Value) -> Result<&mut Map<String, Value>> {
    let obj = manifest
        .as_object_mut()
        .ok_or_else(|| anyhow!("Manifest is not a JSON object"))?;
    obj.entry("dependencies")
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| anyhow!("\"dependencies\" is not an object"))
}

/// Copy `dependency`'s version spec from `secondary` into `primary`,
/// overwriting any existing entry. Returns the copied spec.
pub fn rewrite_manifest(primary: &Path, secondary: &Path, dependency: &str) -> Result<String> {
    let mut manifest = read_manifest(primary)?;
    let source = read_manifest(secondary)?;

    let spec = source
        .get("dependencies")
        .and_then(|d| d.get(dependency))
        .cloned()
        .ok_or_else(|| {
            anyhow!(
                "{} does not depend on {}",
                secondary.display(),
                dependency
            )
        })?;

    let version = spec.as_str().unwrap_or_default().to_string();
    dependencies_mut(&mut manifest)?.insert(dependency.to_string(), spec);
    write_manifest(primary, &manifest)?;

    tracing::info!("pinned {}@{} in {}", dependency, version, primary.display());
    Ok(version)
}

/// Install dependencies without running lifecycle scripts.
pub fn install_dependencies(base_dir: &Path, runner: &dyn CommandRunner) -> Result<()> {
    Cmd::new("npm")
        .args(["install", "--ignore-scripts"])
        .dir(base_dir)
        .error_msg("npm install failed")
        .run_interactive_with(runner)?;
    Ok(())
}
