//! Collision-free destination paths.
//!
//! Given a candidate path, [`unique_path`] returns either the candidate itself
//! (nothing there yet) or the first free sibling of the form
//! `<stem>-<n><ext>`, counting up from 1:
//!
//! ```text
//! a.txt        exists
//! a-1.txt      exists
//! a-2.txt      ← returned
//! ```
//!
//! The check is a plain existence test, not an exclusive create. Another
//! process creating the same name between the check and the write is not
//! guarded against.

use crate::naming::split_name;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum UniqueError {
    #[error("No free name for {path} after {limit} attempts")]
    Exhausted { path: PathBuf, limit: u32 },
}

/// True if anything (file, directory or dangling symlink) occupies `path`.
pub fn occupied(path: &Path) -> bool {
    path.symlink_metadata().is_ok()
}

/// Resolve `candidate` to a path that does not exist at call time.
///
/// The suffix counter stops at `max_suffix`; past that the name is reported
/// as exhausted instead of looping forever.
pub fn unique_path(candidate: &Path, max_suffix: u32) -> Result<PathBuf, UniqueError> {
    unique_path_with(candidate, max_suffix, occupied)
}

/// [`unique_path`] against a custom notion of "taken".
///
/// Dry runs use this to account for renames and copies they only planned.
pub fn unique_path_with(
    candidate: &Path,
    max_suffix: u32,
    occupied: impl Fn(&Path) -> bool,
) -> Result<PathBuf, UniqueError> {
    if !occupied(candidate) {
        return Ok(candidate.to_path_buf());
    }

    let name = candidate
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let (stem, ext) = split_name(&name);
    let parent = candidate.parent().unwrap_or_else(|| Path::new(""));

    for counter in 1..=max_suffix {
        let next = parent.join(format!("{stem}-{counter}{ext}"));
        if !occupied(&next) {
            return Ok(next);
        }
    }

    Err(UniqueError::Exhausted {
        path: candidate.to_path_buf(),
        limit: max_suffix,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    const LIMIT: u32 = 10_000;

    #[test]
    fn free_candidate_returned_unchanged() {
        let tmp = TempDir::new().unwrap();
        let candidate = tmp.path().join("a.txt");
        assert_eq!(unique_path(&candidate, LIMIT).unwrap(), candidate);
    }

    #[test]
    fn first_collision_gets_suffix_one() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "x").unwrap();

        let resolved = unique_path(&tmp.path().join("a.txt"), LIMIT).unwrap();
        assert_eq!(resolved, tmp.path().join("a-1.txt"));
    }

    #[test]
    fn skips_taken_suffixes() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "x").unwrap();
        fs::write(tmp.path().join("a-1.txt"), "x").unwrap();

        let resolved = unique_path(&tmp.path().join("a.txt"), LIMIT).unwrap();
        assert_eq!(resolved, tmp.path().join("a-2.txt"));
    }

    #[test]
    fn suffix_goes_before_last_extension_only() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("backup.tar.gz"), "x").unwrap();

        let resolved = unique_path(&tmp.path().join("backup.tar.gz"), LIMIT).unwrap();
        assert_eq!(resolved, tmp.path().join("backup.tar-1.gz"));
    }

    #[test]
    fn no_extension_appends_suffix() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("README"), "x").unwrap();

        let resolved = unique_path(&tmp.path().join("README"), LIMIT).unwrap();
        assert_eq!(resolved, tmp.path().join("README-1"));
    }

    #[test]
    fn directory_counts_as_occupied() {
        let tmp = TempDir::new().unwrap();
        fs::create_dir(tmp.path().join("jpg")).unwrap();

        let resolved = unique_path(&tmp.path().join("jpg"), LIMIT).unwrap();
        assert_eq!(resolved, tmp.path().join("jpg-1"));
    }

    #[test]
    fn returned_path_never_exists() {
        let tmp = TempDir::new().unwrap();
        for name in ["n.md", "n-1.md", "n-2.md", "n-4.md"] {
            fs::write(tmp.path().join(name), "x").unwrap();
        }
        let resolved = unique_path(&tmp.path().join("n.md"), LIMIT).unwrap();
        assert!(!resolved.exists());
        assert_eq!(resolved, tmp.path().join("n-3.md"));
    }

    #[test]
    fn custom_predicate_sees_planned_paths() {
        let planned = [PathBuf::from("/plan/a.txt"), PathBuf::from("/plan/a-1.txt")];
        let resolved =
            unique_path_with(Path::new("/plan/a.txt"), LIMIT, |p| planned.iter().any(|x| x == p))
                .unwrap();
        assert_eq!(resolved, PathBuf::from("/plan/a-2.txt"));
    }

    #[test]
    fn exhausted_past_limit() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join("a.txt"), "x").unwrap();
        fs::write(tmp.path().join("a-1.txt"), "x").unwrap();
        fs::write(tmp.path().join("a-2.txt"), "x").unwrap();

        let result = unique_path(&tmp.path().join("a.txt"), 2);
        assert!(matches!(result, Err(UniqueError::Exhausted { limit: 2, .. })));
    }
}
