//! Run-scoped data model shared by the pipeline stages.
//!
//! Nothing here outlives a single run: entries are created by discovery,
//! superseded by the rename step, and consumed by copy, index and slideshow.
//! All types serialize so `run --json` can print the full report.

use crate::naming::split_name;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Marker that makes a file hidden on Unix-like platforms.
pub const HIDDEN_MARKER: char = '.';

/// A regular file found directly inside the base directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceEntry {
    /// Absolute path of the file.
    pub path: PathBuf,
    /// Base name (last path component).
    pub name: String,
    /// Lower-cased extension without the dot; empty when there is none.
    pub extension: String,
    /// Name starts with [`HIDDEN_MARKER`].
    pub hidden: bool,
}

impl SourceEntry {
    pub fn from_path(path: &Path) -> Self {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let extension = extension_of(&name);
        let hidden = name.starts_with(HIDDEN_MARKER);
        Self {
            path: path.to_path_buf(),
            name,
            extension,
            hidden,
        }
    }
}

/// Lower-cased extension of a file name, without its dot.
pub fn extension_of(name: &str) -> String {
    let (_, ext) = split_name(name);
    ext.trim_start_matches('.').to_lowercase()
}

/// The name a source entry carries after the rename step.
///
/// Always in the same directory as the original. When renaming is disabled or
/// the name was already canonical, `path`/`name` equal the original's and
/// `changed` is false.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenamedEntry {
    pub original: PathBuf,
    pub path: PathBuf,
    pub name: String,
    pub changed: bool,
}

impl RenamedEntry {
    /// The entry as-is, without a rename.
    pub fn unchanged(entry: &SourceEntry) -> Self {
        Self {
            original: entry.path.clone(),
            path: entry.path.clone(),
            name: entry.name.clone(),
            changed: false,
        }
    }
}

/// Where a file was (or would be, in dry-run) copied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CopyResult {
    /// Group token the destination directory is named after (`jpg`, `unknown`, ...).
    pub group: String,
    /// Final destination file, never a pre-existing path.
    pub destination: PathBuf,
}
