//! Tar archive operations.
//!
//! Packs staging directories into (optionally gzip-compressed) tarballs and
//! extracts builder output with leading path components stripped.

use anyhow::{Context, Result};
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Component, Path, PathBuf};
use tar::{Archive, Builder};

const GZIP_MAGIC: [u8; 2] = [0x1f, 0x8b];

/// Create a tar of `files` (relative to `dir`) at `dest`.
///
/// Directories in `files` are added recursively. The parent of `dest` must
/// already exist.
pub fn pack<S: AsRef<Path>>(dir: &Path, files: &[S], gzip: bool, dest: &Path) -> Result<()> {
    let out = File::create(dest)
        .with_context(|| format!("Failed to create archive {}", dest.display()))?;
    let out = BufWriter::new(out);

    let result = if gzip {
        let encoder = write_tar(GzEncoder::new(out, Compression::default()), dir, files)?;
        encoder.finish()?.flush()
    } else {
        write_tar(out, dir, files)?.flush()
    };
    result.with_context(|| format!("Failed to write archive {}", dest.display()))?;

    Ok(())
}

fn write_tar<W: Write, S: AsRef<Path>>(writer: W, dir: &Path, files: &[S]) -> Result<W> {
    let mut builder = Builder::new(writer);
    builder.follow_symlinks(false);

    for name in files {
        let name = name.as_ref();
        let path = dir.join(name);
        if path.is_dir() {
            builder
                .append_dir_all(name, &path)
                .with_context(|| format!("Failed to add directory {}", path.display()))?;
        } else {
            builder
                .append_path_with_name(&path, name)
                .with_context(|| format!("Failed to add {}", path.display()))?;
        }
    }

    Ok(builder.into_inner()?)
}

/// Pack every entry of `dir` into `dest`, sorted by name.
pub fn pack_dir(dir: &Path, gzip: bool, dest: &Path) -> Result<()> {
    let files = list_dir(dir)?;
    pack(dir, &files, gzip, dest)
}

/// Top-level entry names of `dir`, sorted.
pub fn list_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("Failed to read {}", dir.display()))? {
        files.push(PathBuf::from(entry?.file_name()));
    }
    files.sort();
    Ok(files)
}

/// Extract `archive` into `dest`, dropping `strip` leading path components.
///
/// `dest` is created if missing. Gzip input is detected automatically.
/// Entries that are empty after stripping are skipped; entries escaping
/// `dest` are rejected.
pub fn unpack(archive: &Path, dest: &Path, strip: usize) -> Result<()> {
    fs::create_dir_all(dest)?;

    let file = File::open(archive)
        .with_context(|| format!("Failed to open archive {}", archive.display()))?;
    let mut reader = BufReader::new(file);
    let is_gzip = reader.fill_buf()?.starts_with(&GZIP_MAGIC);
    let reader: Box<dyn Read> = if is_gzip {
        Box::new(GzDecoder::new(reader))
    } else {
        Box::new(reader)
    };

    let mut tar = Archive::new(reader);
    for entry in tar
        .entries()
        .with_context(|| format!("Failed to read archive {}", archive.display()))?
    {
        let mut entry = entry?;
        let path = entry.path()?.into_owned();

        if path
            .components()
            .any(|c| matches!(c, Component::ParentDir | Component::RootDir | Component::Prefix(_)))
        {
            anyhow::bail!(
                "Archive entry {} escapes the destination",
                path.display()
            );
        }

        let stripped: PathBuf = path
            .components()
            .filter(|c| !matches!(c, Component::CurDir))
            .skip(strip)
            .collect();
        if stripped.as_os_str().is_empty() {
            continue;
        }

        let dest_path = dest.join(&stripped);
        if let Some(parent) = dest_path.parent() {
            fs::create_dir_all(parent)?;
        }
        entry
            .unpack(&dest_path)
            .with_context(|| format!("Failed to extract {}", stripped.display()))?;
    }

    Ok(())
}

/// SHA-256 of a file as lowercase hex.
pub fn sha256_file(path: &Path) -> Result<String> {
    let mut file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)?;
    Ok(format!("{:x}", hasher.finalize()))
}
