//! Staging of native sources for the external builder.
//!
//! `prebuild` compiles from `src/` and `deps/` in the project root, so the
//! installed package's copies are mirrored there before building.

use anyhow::{bail, Context, Result};
use std::fs;
use std::path::Path;
use walkdir::WalkDir;

/// Directories copied from the installed package into the project root.
pub const STAGED_DIRS: &[&str] = &["src", "deps"];

/// Copy `node_modules/<package>/{src,deps}` into `base_dir`.
pub fn stage_sources(base_dir: &Path, package: &str) -> Result<()> {
    let package_dir = base_dir.join("node_modules").join(package);
    if !package_dir.is_dir() {
        bail!(
            "{} is not installed ({} missing). Run 'npm install' first.",
            package,
            package_dir.display()
        );
    }

    for name in STAGED_DIRS {
        let src = package_dir.join(name);
        let dst = base_dir.join(name);
        println!("Staging {}/{} -> {}", package, name, name);
        copy_dir_recursive(&src, &dst)
            .with_context(|| format!("Failed to stage {}", src.display()))?;
    }

    Ok(())
}

/// Recursively copy `src` into `dst`, overwriting existing files.
pub fn copy_dir_recursive(src: &Path, dst: &Path) -> Result<()> {
    if !src.is_dir() {
        bail!("Source directory not found: {}", src.display());
    }

    for entry in WalkDir::new(src) {
        let entry = entry?;
        let rel = entry.path().strip_prefix(src)?;
        let target = dst.join(rel);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::copy(entry.path(), &target)
                .with_context(|| format!("Failed to copy {}", entry.path().display()))?;
        }
    }

    Ok(())
}
