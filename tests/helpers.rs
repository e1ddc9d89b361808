//! Shared test utilities for nativepack tests.

#![allow(dead_code)]

use anyhow::{bail, Result};
use nativepack::abi::AbiRegistry;
use nativepack::archive;
use nativepack::config::Config;
use nativepack::process::{Cmd, CommandResult, CommandRunner};
use std::cell::RefCell;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Package name written to the mock project's package.json.
pub const PACKAGE_NAME: &str = "native-pkg";

/// Content of the fake compiled addon.
pub const ADDON_BYTES: &[u8] = b"\x7fELF fake better_sqlite3.node";

/// node-abi registry as shipped by prebuild, with the stale Node 24 ABI.
pub const STALE_REGISTRY: &str = r#"[
  {
    "runtime": "node",
    "target": "18.0.0",
    "lts": [
      "2022-10-25",
      "2023-10-18"
    ],
    "future": false,
    "abi": "108"
  },
  {
    "runtime": "node",
    "target": "20.0.0",
    "lts": [
      "2023-10-24",
      "2024-10-22"
    ],
    "future": false,
    "abi": "115"
  },
  {
    "runtime": "node",
    "target": "22.0.0",
    "lts": [
      "2024-10-29",
      "2025-10-21"
    ],
    "future": false,
    "abi": "127"
  },
  {
    "runtime": "node",
    "target": "24.0.0",
    "lts": [
      "2025-10-28",
      "2026-10-20"
    ],
    "future": false,
    "abi": "134"
  },
  {
    "runtime": "electron",
    "target": "33.0.0",
    "lts": false,
    "future": false,
    "abi": "130"
  }
]
"#;

/// Temporary project laid out like the real repository after checkout.
pub struct TestEnv {
    /// Temporary directory (kept alive for lifetime of TestEnv)
    pub _temp_dir: TempDir,
    /// Project root
    pub base_dir: PathBuf,
}

impl TestEnv {
    /// Create a project with manifests, constants file and an installed
    /// better-sqlite3 + node-abi.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let base_dir = temp_dir.path().to_path_buf();

        write(
            &base_dir.join("package.json"),
            &format!(
                r#"{{
  "name": "{}",
  "version": "1.0.0",
  "dependencies": {{
    "better-sqlite3": "^11.0.0",
    "tar": "^7.4.3"
  }}
}}
"#,
                PACKAGE_NAME
            ),
        );
        write(
            &base_dir.join("any-listen/packages/web-server/package.json"),
            r#"{"name":"web-server","dependencies":{"better-sqlite3":"12.2.0"}}"#,
        );
        write(
            &base_dir.join("any-listen/packages/shared/common/constants.ts"),
            "export const APP_NAME = 'any-listen'\nexport const NATIVE_VERSION = 9\n",
        );

        let pkg = base_dir.join("node_modules/better-sqlite3");
        write(&pkg.join("src/better_sqlite3.cpp"), "// addon source\n");
        write(&pkg.join("deps/sqlite3/sqlite3.c"), "/* sqlite */\n");
        write(&pkg.join("deps/sqlite3.gyp"), "{}\n");

        write(&Self::registry_path_in(&base_dir), STALE_REGISTRY);

        Self {
            _temp_dir: temp_dir,
            base_dir,
        }
    }

    fn registry_path_in(base_dir: &Path) -> PathBuf {
        base_dir.join("node_modules/prebuild/node_modules/node-abi/abi_registry.json")
    }

    /// The registry prebuild consults (and the patcher rewrites).
    pub fn registry_path(&self) -> PathBuf {
        Self::registry_path_in(&self.base_dir)
    }

    /// Configuration from explicit variables.
    pub fn config(&self, vars: &[(&str, &str)]) -> Config {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_vars(&self.base_dir, &vars)
    }

    /// Sorted file names under dist/.
    pub fn dist_files(&self) -> Vec<String> {
        let dist = self.base_dir.join("dist");
        let mut names: Vec<String> = match fs::read_dir(&dist) {
            Ok(entries) => entries
                .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
                .collect(),
            Err(_) => Vec::new(),
        };
        names.sort();
        names
    }
}

/// Write a file, creating parent directories.
pub fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).expect("Failed to create parent dir");
    fs::write(path, content).expect("Failed to write file");
}

/// Stand-in for npm/npx/node.
///
/// `npx prebuild` writes a prebuilt tarball the way prebuild does, using the
/// ABI from prebuild's own node-abi registry.
pub struct FakeRunner {
    pub base_dir: PathBuf,
    pub platform: String,
    pub calls: RefCell<Vec<String>>,
    /// Node version whose build exits non-zero.
    pub fail_version: Option<String>,
    /// Whether prebuild actually writes its tarball.
    pub produce: bool,
    /// Whether `npm install` exits non-zero.
    pub fail_install: bool,
}

impl FakeRunner {
    pub fn new(env: &TestEnv, platform: &str) -> Self {
        Self {
            base_dir: env.base_dir.clone(),
            platform: platform.to_string(),
            calls: RefCell::new(Vec::new()),
            fail_version: None,
            produce: true,
            fail_install: false,
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.borrow().clone()
    }

    /// Versions passed to `prebuild -t`, in call order.
    pub fn built_versions(&self) -> Vec<String> {
        self.calls
            .borrow()
            .iter()
            .filter(|c| c.starts_with("npx prebuild"))
            .filter_map(|c| flag_value(c, "-t"))
            .collect()
    }

    fn prebuild(&self, cmd: &Cmd) -> Result<i32> {
        let line = cmd.to_string();
        let (Some(arch), Some(target)) = (flag_value(&line, "-a"), flag_value(&line, "-t")) else {
            bail!("unexpected prebuild invocation: {}", line);
        };
        if self.fail_version.as_deref() == Some(target.as_str()) {
            return Ok(1);
        }
        if !self.produce {
            return Ok(0);
        }

        let registry = AbiRegistry::load(
            &self
                .base_dir
                .join("node_modules/prebuild/node_modules/node-abi/abi_registry.json"),
        )?;
        let abi = registry.abi_for(&target, "node")?;

        let work = self.base_dir.join(".fake-prebuild");
        let _ = fs::remove_dir_all(&work);
        fs::create_dir_all(work.join("build/Release"))?;
        fs::write(work.join("build/Release/better_sqlite3.node"), ADDON_BYTES)?;

        let prebuilds = self.base_dir.join("prebuilds");
        fs::create_dir_all(&prebuilds)?;
        let name = format!(
            "{}-v-node-v{}-{}-{}.tar.gz",
            PACKAGE_NAME, abi, self.platform, arch
        );
        archive::pack(&work, &["build"], true, &prebuilds.join(name))?;
        fs::remove_dir_all(&work)?;
        Ok(0)
    }
}

impl CommandRunner for FakeRunner {
    fn output(&self, cmd: &Cmd) -> Result<CommandResult> {
        self.calls.borrow_mut().push(cmd.to_string());
        let stdout = if cmd.get_program() == "node" {
            "v22.3.0\n".to_string()
        } else {
            String::new()
        };
        Ok(CommandResult {
            code: Some(0),
            stdout,
            stderr: String::new(),
        })
    }

    fn status(&self, cmd: &Cmd) -> Result<Option<i32>> {
        self.calls.borrow_mut().push(cmd.to_string());
        let is_prebuild = cmd.get_program() == "npx"
            && cmd.get_args().first().map(String::as_str) == Some("prebuild");
        let code = if is_prebuild {
            self.prebuild(cmd)?
        } else if self.fail_install && cmd.get_program() == "npm" {
            1
        } else {
            0
        };
        Ok(Some(code))
    }
}

/// Value following `flag` in a space-separated command line.
pub fn flag_value(line: &str, flag: &str) -> Option<String> {
    let mut parts = line.split(' ');
    parts.find(|p| *p == flag)?;
    parts.next().map(str::to_string)
}

/// Assert that a file exists.
pub fn assert_file_exists(path: &Path) {
    assert!(path.is_file(), "Expected file at {}", path.display());
}
