//! CLI output formatting.
//!
//! # Name-First Display
//!
//! Every line leads with the file's name. Paths inside the output directory
//! are shown relative to it (`jpg/my_photo.jpg`), since the output directory
//! is already named once at the top of a run.
//!
//! # Output Format
//!
//! ## Run
//!
//! ```text
//! Found 3 files
//! Renamed My Photo.JPG → my_photo.jpg
//! Copied my_photo.jpg → jpg/my_photo.jpg
//! Copied notes.txt → txt/notes.txt
//! Failed LICENSE: cannot create group directory (File exists)
//! Index → index.html
//!
//! 3 files: 1 renamed, 1 unchanged, 2 copied, 1 failed
//! ```
//!
//! A dry run prints the same plan with every line prefixed:
//!
//! ```text
//! [dry-run] Rename My Photo.JPG → my_photo.jpg
//! [dry-run] Copy my_photo.jpg → jpg/my_photo.jpg
//! ```
//!
//! ## Check
//!
//! ```text
//! Source: /home/me/Downloads
//! Output: /home/me/Downloads/out
//!
//! Eligible (2)
//!     001 My Photo.JPG → my_photo.jpg
//!     002 notes.txt
//!
//! Excluded (2)
//!     .env (hidden)
//!     out (output directory)
//! ```
//!
//! # Architecture
//!
//! Each output has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::naming::normalize;
use crate::organize::{EntryOutcome, IndexOutcome, OrganizeEvent, RunReport, SlideshowOutcome};
use crate::scan::Discovery;
use std::path::Path;

/// Prefix for every line describing a planned (not performed) change.
pub const DRY_RUN_PREFIX: &str = "[dry-run] ";

// ============================================================================
// Shared helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// `path` relative to `root` with `/` separators, or the full path outside it.
fn display_under(path: &Path, root: &Path) -> String {
    match path.strip_prefix(root) {
        Ok(rel) => rel
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/"),
        Err(_) => path.display().to_string(),
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Pick the past-tense verb for a live run, the imperative for a dry run.
fn verb<'a>(dry_run: bool, done: &'a str, planned: &'a str) -> &'a str {
    if dry_run { planned } else { done }
}

// ============================================================================
// Run progress
// ============================================================================

/// Format a single progress event as display lines.
///
/// `out_dir` is used to shorten destination paths; `dry_run` switches verbs
/// and adds [`DRY_RUN_PREFIX`].
pub fn format_event(event: &OrganizeEvent, out_dir: &Path, dry_run: bool) -> Vec<String> {
    let lines = match event {
        OrganizeEvent::Discovered { count: 0 } => vec!["No files to process".to_string()],
        OrganizeEvent::Discovered { count } => vec![format!("Found {}", plural(*count, "file"))],
        OrganizeEvent::Renamed { from, to } => {
            vec![format!("{} {} \u{2192} {}", verb(dry_run, "Renamed", "Rename"), from, to)]
        }
        OrganizeEvent::Copied { name, destination } => vec![format!(
            "{} {} \u{2192} {}",
            verb(dry_run, "Copied", "Copy"),
            name,
            display_under(destination, out_dir)
        )],
        OrganizeEvent::EntryFailed {
            source,
            action,
            reason,
        } => vec![format!(
            "Failed {}: cannot {} ({})",
            file_name(source),
            action,
            reason
        )],
        OrganizeEvent::Index(outcome) => format_index_outcome(outcome, out_dir),
        OrganizeEvent::Slideshow(outcome) => format_slideshow_outcome(outcome, out_dir),
    };

    if dry_run {
        lines
            .into_iter()
            .map(|l| format!("{DRY_RUN_PREFIX}{l}"))
            .collect()
    } else {
        lines
    }
}

fn format_index_outcome(outcome: &IndexOutcome, out_dir: &Path) -> Vec<String> {
    match outcome {
        IndexOutcome::Written { path } | IndexOutcome::Planned { path } => {
            vec![format!("Index \u{2192} {}", display_under(path, out_dir))]
        }
        IndexOutcome::Failed { path, reason } => vec![format!(
            "Index failed: {} ({})",
            display_under(path, out_dir),
            reason
        )],
    }
}

fn format_slideshow_outcome(outcome: &SlideshowOutcome, out_dir: &Path) -> Vec<String> {
    match outcome {
        SlideshowOutcome::NotRequested => Vec::new(),
        SlideshowOutcome::NoImages => vec!["Slideshow skipped: no images copied".to_string()],
        SlideshowOutcome::Unavailable => {
            vec!["Slideshow skipped: no renderer available".to_string()]
        }
        SlideshowOutcome::Planned { path, images } => vec![format!(
            "Slideshow \u{2192} {} ({})",
            display_under(path, out_dir),
            plural(*images, "image")
        )],
        SlideshowOutcome::Written { path, stats } => {
            let mut line = format!(
                "Slideshow \u{2192} {} ({})",
                display_under(path, out_dir),
                plural(stats.images, "image")
            );
            if stats.notices > 0 {
                line = format!("{line}, {} unsupported", stats.notices);
            }
            vec![line]
        }
        SlideshowOutcome::Failed { path, reason } => vec![format!(
            "Slideshow failed: {} ({})",
            display_under(path, out_dir),
            reason
        )],
    }
}

// ============================================================================
// Run summary
// ============================================================================

/// Format the closing summary of a run.
pub fn format_summary(report: &RunReport) -> Vec<String> {
    if report.is_empty() {
        return Vec::new();
    }

    let unchanged = report
        .entries
        .iter()
        .filter(|e| matches!(e, EntryOutcome::Done { renamed, .. } if !renamed.changed))
        .count();

    let mut lines = vec![
        String::new(),
        format!(
            "{}: {} renamed, {} unchanged, {} copied, {} failed",
            plural(report.entries.len(), "file"),
            report.renamed_count(),
            unchanged,
            report.copied_count(),
            report.failed_count()
        ),
    ];
    if report.dry_run {
        lines.push(format!("{DRY_RUN_PREFIX}Nothing was changed"));
    }
    lines
}

/// Print the closing summary to stdout.
pub fn print_summary(report: &RunReport) {
    for line in format_summary(report) {
        println!("{}", line);
    }
}

// ============================================================================
// Check
// ============================================================================

/// Format the result of discovery: what a run would process, and what it skips.
pub fn format_check_output(discovery: &Discovery, out_dir: &Path) -> Vec<String> {
    let mut lines = vec![
        format!("Source: {}", discovery.base_dir.display()),
        format!("Output: {}", out_dir.display()),
        String::new(),
        format!("Eligible ({})", discovery.entries.len()),
    ];

    for (i, entry) in discovery.entries.iter().enumerate() {
        let normalized = normalize(&entry.name);
        if normalized == entry.name {
            lines.push(format!("{}{} {}", indent(1), format_index(i + 1), entry.name));
        } else {
            lines.push(format!(
                "{}{} {} \u{2192} {}",
                indent(1),
                format_index(i + 1),
                entry.name,
                normalized
            ));
        }
    }

    if !discovery.excluded.is_empty() {
        let mut excluded: Vec<(String, String)> = discovery
            .excluded
            .iter()
            .map(|(path, why)| (file_name(path), why.to_string()))
            .collect();
        excluded.sort();

        lines.push(String::new());
        lines.push(format!("Excluded ({})", excluded.len()));
        for (name, why) in excluded {
            lines.push(format!("{}{} ({})", indent(1), name, why));
        }
    }

    lines
}

/// Print check output to stdout.
pub fn print_check_output(discovery: &Discovery, out_dir: &Path) {
    for line in format_check_output(discovery, out_dir) {
        println!("{}", line);
    }
}

// ============================================================================
// Tests
// ============================================================================
