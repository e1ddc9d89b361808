//! Archive commands - pack and unpack tarballs by hand.

use anyhow::{bail, Result};
use std::path::Path;

use crate::archive;

/// Pack every entry of `dir` into `dest` (gzip unless `dest` ends in `.tar`).
pub fn cmd_pack(dir: &Path, dest: &Path) -> Result<()> {
    if !dir.is_dir() {
        bail!("Not a directory: {}", dir.display());
    }
    if let Some(parent) = dest.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let gzip = dest.extension().map_or(true, |ext| ext != "tar");
    archive::pack_dir(dir, gzip, dest)?;
    println!("{}  {}", archive::sha256_file(dest)?, dest.display());
    Ok(())
}

/// Extract `archive_path` into `dest`, stripping `strip` components.
pub fn cmd_unpack(archive_path: &Path, dest: &Path, strip: usize) -> Result<()> {
    archive::unpack(archive_path, dest, strip)?;
    println!("Extracted {} to {}", archive_path.display(), dest.display());
    Ok(())
}
