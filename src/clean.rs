//! Build artifact cleaning.

use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::Config;
use crate::stage::STAGED_DIRS;

/// Remove `path` if present. Returns whether anything was removed.
fn remove_dir(path: &Path, label: &str) -> Result<bool> {
    if path.exists() {
        println!("Removing {}...", label);
        fs::remove_dir_all(path)?;
        Ok(true)
    } else {
        Ok(false)
    }
}

/// Clean packaged archives (`dist/`).
pub fn clean_dist(config: &Config) -> Result<bool> {
    remove_dir(&config.dist_dir(), "dist")
}

/// Clean the native staging directory and prebuild output.
pub fn clean_native(config: &Config) -> Result<bool> {
    let native = remove_dir(&config.native_dir(), "native staging directory")?;
    let prebuilds = remove_dir(&config.prebuilds_dir(), "prebuilds")?;
    let build = remove_dir(&config.base_dir.join("build"), "node-gyp build directory")?;
    Ok(native || prebuilds || build)
}

/// Clean native sources staged from the installed package.
pub fn clean_staged(config: &Config) -> Result<bool> {
    let mut cleaned = false;
    for name in STAGED_DIRS {
        cleaned |= remove_dir(&config.base_dir.join(name), name)?;
    }
    Ok(cleaned)
}

/// Clean everything produced by the pipeline.
pub fn clean_all(config: &Config) -> Result<bool> {
    let dist = clean_dist(config)?;
    let native = clean_native(config)?;
    let staged = clean_staged(config)?;
    Ok(dist || native || staged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn clean_all_removes_outputs_and_reports() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = Config::from_vars(temp.path(), &HashMap::new());
        for dir in ["dist", "native", "prebuilds", "src", "deps"] {
            fs::create_dir_all(temp.path().join(dir)).unwrap();
        }
        fs::write(temp.path().join("package.json"), "{}").unwrap();

        assert!(clean_all(&config).unwrap());
        for dir in ["dist", "native", "prebuilds", "src", "deps"] {
            assert!(!temp.path().join(dir).exists(), "{} should be gone", dir);
        }
        assert!(temp.path().join("package.json").exists());

        assert!(!clean_all(&config).unwrap());
    }
}
