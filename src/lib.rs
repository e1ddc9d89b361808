//! nativepack library exports.
//!
//! Builds the better-sqlite3 native addon for a matrix of Node versions with
//! `prebuild` and repackages every binary as
//! `dist/<platform>_<arch>_<abi>_v<version>.tar.gz`.
//!
//! Pipeline: [`manifest`] → install → [`patch`] → [`stage`] →
//! [`orchestrator`] (per target) → [`archive`].

pub mod abi;
pub mod archive;
pub mod clean;
pub mod commands;
pub mod config;
pub mod manifest;
pub mod orchestrator;
pub mod patch;
pub mod platform;
pub mod preflight;
pub mod process;
pub mod stage;
pub mod timing;
pub mod versions;
