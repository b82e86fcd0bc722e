//! Shared test utilities for the sortdir test suite.
//!
//! Provides fixture setup, lookup helpers that panic with the available
//! candidates on a miss, and a flat listing of a directory tree for
//! whole-layout assertions.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let tmp = setup_dir(&["My Photo.JPG", "notes.txt"]);
//! let report = organize_with(None, tmp.path(), &options, None).unwrap();
//!
//! let (renamed, copy) = find_done(&report, "my_photo.jpg");
//! assert_eq!(copy.group, "jpg");
//!
//! assert_eq!(tree_listing(&tmp.path().join("out")), vec![
//!     "index.html", "jpg/", "jpg/my_photo.jpg", "txt/", "txt/notes.txt",
//! ]);
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use crate::organize::{EntryOutcome, RunReport};
use crate::scan::{Discovery, Exclusion};
use crate::types::{CopyResult, RenamedEntry, SourceEntry};

// =========================================================================
// Fixture setup
// =========================================================================

/// Create a temp directory holding one file per name.
///
/// Each file's content is its own name, so copies can be traced back to
/// their source.
pub fn setup_dir(names: &[&str]) -> TempDir {
    let tmp = TempDir::new().unwrap();
    write_files(tmp.path(), names);
    tmp
}

/// Write one file per name into `dir`, content equal to the name.
pub fn write_files(dir: &Path, names: &[&str]) {
    for name in names {
        fs::write(dir.join(name), name).unwrap();
    }
}

/// Canonical path of a temp directory, matching the paths a run reports.
pub fn base(tmp: &TempDir) -> PathBuf {
    tmp.path().canonicalize().unwrap()
}

pub fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap_or_else(|e| panic!("cannot read {}: {e}", path.display()))
}

// =========================================================================
// Tree listing
// =========================================================================

/// Every path under `root`, relative and sorted. Directories end in `/`.
pub fn tree_listing(root: &Path) -> Vec<String> {
    let mut out = Vec::new();
    collect_tree(root, root, &mut out);
    out.sort();
    out
}

fn collect_tree(root: &Path, dir: &Path, out: &mut Vec<String>) {
    for entry in fs::read_dir(dir).unwrap() {
        let path = entry.unwrap().path();
        let rel = path
            .strip_prefix(root)
            .unwrap()
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        if path.is_dir() {
            out.push(format!("{rel}/"));
            collect_tree(root, &path, out);
        } else {
            out.push(rel);
        }
    }
}

// =========================================================================
// Discovery extractors
// =========================================================================

/// Entry names, sorted (listing order is platform-dependent).
pub fn sorted_names(entries: &[SourceEntry]) -> Vec<&str> {
    let mut names: Vec<&str> = entries.iter().map(|e| e.name.as_str()).collect();
    names.sort();
    names
}

/// Excluded names with their reasons, sorted by name.
pub fn exclusion_reasons(discovery: &Discovery) -> Vec<(&str, Exclusion)> {
    let mut reasons: Vec<(&str, Exclusion)> = discovery
        .excluded
        .iter()
        .map(|(path, why)| {
            let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
            (name, *why)
        })
        .collect();
    reasons.sort_by(|a, b| a.0.cmp(b.0));
    reasons
}

// =========================================================================
// Report lookups, panicking with a clear message on a miss
// =========================================================================

/// Find a processed entry by its display name. Panics if not found.
pub fn find_done<'a>(report: &'a RunReport, name: &str) -> (&'a RenamedEntry, &'a CopyResult) {
    report
        .entries
        .iter()
        .find_map(|e| match e {
            EntryOutcome::Done { renamed, copy } if renamed.name == name => Some((renamed, copy)),
            _ => None,
        })
        .unwrap_or_else(|| {
            let names = report.processed_names();
            panic!("entry '{name}' not found. Available: {names:?}")
        })
}
