//! CLI command handlers.
//!
//! Each submodule handles a specific CLI command:
//! - `build` - Full pipeline: manifest, install, patch, stage, build, package
//! - `patch` - Apply dependency patches only
//! - `stage` - Stage native sources only
//! - `archive` - Pack/unpack tarballs
//! - `clean` - Remove build artifacts
//! - `show` - Display configuration, targets, ABIs
//! - `preflight` - Run preflight checks

pub mod archive;
pub mod build;
pub mod clean;
pub mod patch;
mod preflight;
pub mod show;
pub mod stage;

pub use archive::{cmd_pack, cmd_unpack};
pub use build::cmd_build;
pub use clean::cmd_clean;
pub use patch::cmd_patch;
pub use preflight::cmd_preflight;
pub use show::cmd_show;
pub use stage::cmd_stage;
