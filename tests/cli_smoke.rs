//! CLI smoke tests for nativepack.
//!
//! These run the real binary for commands that need no Node toolchain.

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use predicates::prelude::*;
use std::fs;
use tempfile::TempDir;

fn nativepack() -> Command {
    cargo_bin_cmd!("nativepack")
}

#[test]
fn help_flag_works() {
    nativepack()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("QUICK START"));
}

#[test]
fn show_config_uses_env_and_dotenv() {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join(".env"), "IGNORE_NODE_VERSION=20,22\n").unwrap();

    nativepack()
        .args(["show", "config"])
        .arg("-C")
        .arg(temp.path())
        .env("LIB_ARCH", "arm64")
        .env("NATIVEPACK_PLATFORM", "win32")
        .env_remove("IGNORE_NODE_VERSION")
        .assert()
        .success()
        .stdout(predicate::str::contains("LIB_ARCH: arm64"))
        .stdout(predicate::str::contains("Platform: win32"))
        .stdout(predicate::str::contains("IGNORE_NODE_VERSION: 20.0.0,22.0.0"));
}

#[test]
fn show_targets_lists_ci_matrix() {
    let temp = TempDir::new().unwrap();

    nativepack()
        .args(["show", "targets", "-C"])
        .arg(temp.path())
        .env("IS_CI", "1")
        .env("LIB_ARCH", "arm64")
        .env("NATIVEPACK_PLATFORM", "win32")
        .env_remove("LIB_TARGET")
        .env_remove("DEFAULT_BUILD_NODE_VERSION")
        .env_remove("IGNORE_NODE_VERSION")
        .assert()
        .success()
        .stdout(predicate::str::contains("node 18.0.0 win32 arm64 (skipped)"))
        .stdout(predicate::str::contains("node 24.0.0 win32 arm64\n"));
}

#[test]
fn pack_and_unpack_round_trip() {
    let temp = TempDir::new().unwrap();
    let native = temp.path().join("native");
    fs::create_dir_all(native.join("lib")).unwrap();
    fs::write(native.join("better_sqlite3.node"), "addon").unwrap();
    fs::write(native.join("lib/notes.txt"), "notes").unwrap();
    let tarball = temp.path().join("out/native.tar.gz");

    nativepack()
        .arg("pack")
        .arg(&native)
        .arg(&tarball)
        .assert()
        .success();

    let out = temp.path().join("extracted");
    nativepack()
        .arg("unpack")
        .arg(&tarball)
        .arg(&out)
        .assert()
        .success();

    assert_eq!(fs::read_to_string(out.join("better_sqlite3.node")).unwrap(), "addon");
    assert_eq!(fs::read_to_string(out.join("lib/notes.txt")).unwrap(), "notes");
}

#[test]
fn build_without_project_fails() {
    let temp = TempDir::new().unwrap();

    nativepack()
        .args(["build", "--skip-install", "--skip-patch", "-C"])
        .arg(temp.path())
        .assert()
        .failure()
        .stderr(predicate::str::contains("not installed"));
}
