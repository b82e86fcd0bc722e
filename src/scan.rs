//! Source discovery.
//!
//! Stage 1 of the pipeline. Lists the direct children of the source directory
//! and keeps the ones that are safe to organize. There is no recursion: files
//! in subdirectories are never touched.
//!
//! ## Exclusion Rules
//!
//! Checked in this order; the first match wins and is reported as the reason:
//!
//! 1. **Output directory**: the entry resolves to the output directory
//! 2. **Directory**: subdirectories are skipped
//! 3. **Not a file**: sockets, FIFOs, dangling symlinks
//! 4. **Self**: the running executable, when it lives in the source directory
//! 5. **Hidden**: names starting with `.`, unless hidden files are included
//!
//! ## Ordering
//!
//! Entries come back in the order the platform lists them. This is **not**
//! sorted and may differ between runs or filesystems; downstream stages only
//! rely on the order being stable within one run.

use crate::types::SourceEntry;
use serde::Serialize;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Source is not a directory: {0}")]
    NotADirectory(PathBuf),
}

/// Inputs to discovery besides the directory itself.
#[derive(Debug, Clone, Default)]
pub struct DiscoverOptions {
    /// Resolved output directory; never treated as a source entry.
    pub out_dir: PathBuf,
    /// Keep entries whose name starts with `.`.
    pub include_hidden: bool,
    /// Resolved path of the running program, excluded from processing.
    pub self_path: Option<PathBuf>,
}

/// Why an entry was left out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Exclusion {
    OutputDir,
    Directory,
    NotAFile,
    SelfArtifact,
    Hidden,
}

impl fmt::Display for Exclusion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Exclusion::OutputDir => "output directory",
            Exclusion::Directory => "directory",
            Exclusion::NotAFile => "not a regular file",
            Exclusion::SelfArtifact => "running program",
            Exclusion::Hidden => "hidden",
        };
        f.write_str(label)
    }
}

/// Everything discovery saw, split into kept and excluded entries.
#[derive(Debug, Serialize)]
pub struct Discovery {
    /// Absolute, resolved source directory.
    pub base_dir: PathBuf,
    pub entries: Vec<SourceEntry>,
    pub excluded: Vec<(PathBuf, Exclusion)>,
}

/// List the eligible entries of `base_dir`, in directory-listing order.
pub fn discover(base_dir: &Path, options: &DiscoverOptions) -> Result<Vec<SourceEntry>, ScanError> {
    Ok(scan(base_dir, options)?.entries)
}

/// Like [`discover`], but also reports what was excluded and why.
pub fn scan(base_dir: &Path, options: &DiscoverOptions) -> Result<Discovery, ScanError> {
    let base_dir = base_dir.canonicalize()?;
    if !base_dir.is_dir() {
        return Err(ScanError::NotADirectory(base_dir));
    }

    let out_dir = resolved(&options.out_dir);
    let self_path = options.self_path.as_deref().map(resolved);

    let mut entries = Vec::new();
    let mut excluded = Vec::new();

    for dir_entry in fs::read_dir(&base_dir)? {
        let dir_entry = match dir_entry {
            Ok(e) => e,
            Err(e) => {
                tracing::warn!(dir = %base_dir.display(), error = %e, "skipping unreadable directory entry");
                continue;
            }
        };
        let path = base_dir.join(dir_entry.file_name());

        match exclusion_for(&path, &out_dir, self_path.as_deref(), options.include_hidden) {
            Some(reason) => {
                tracing::debug!(path = %path.display(), %reason, "excluded");
                excluded.push((path, reason));
            }
            None => entries.push(SourceEntry::from_path(&path)),
        }
    }

    Ok(Discovery {
        base_dir,
        entries,
        excluded,
    })
}

fn exclusion_for(
    path: &Path,
    out_dir: &Path,
    self_path: Option<&Path>,
    include_hidden: bool,
) -> Option<Exclusion> {
    let target = resolved(path);
    if target == out_dir {
        return Some(Exclusion::OutputDir);
    }
    // Follows symlinks: a link to a directory is a directory, a dangling link
    // has no metadata at all.
    match fs::metadata(path) {
        Ok(meta) if meta.is_dir() => return Some(Exclusion::Directory),
        Ok(meta) if meta.is_file() => {}
        _ => return Some(Exclusion::NotAFile),
    }
    if self_path.is_some_and(|s| s == target) {
        return Some(Exclusion::SelfArtifact);
    }
    let hidden = SourceEntry::from_path(path).hidden;
    if hidden && !include_hidden {
        return Some(Exclusion::Hidden);
    }
    None
}

/// Canonical form of `path`, or the path itself when it cannot be resolved.
fn resolved(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
