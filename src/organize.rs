//! The organize pipeline.
//!
//! One run walks a strictly linear sequence of stages:
//!
//! ```text
//! Discover → Rename (optional) → Classify & Copy → Index → Slideshow (optional)
//! ```
//!
//! - **Discover**: [`scan::discover`](crate::scan::discover). An empty result
//!   ends the run right there; that is not an error.
//! - **Rename**: each entry gets its [`normalize`]d name, made unique within
//!   its own directory. Already-canonical names are left alone.
//! - **Classify & Copy**: each (renamed) file is copied into
//!   `<out>/<extension>/`, under a name that does not exist yet. File times
//!   are carried over.
//! - **Index**: `<out>/index.html` lists the display name of every entry that
//!   made it through, in discovery order.
//! - **Slideshow**: the copied images are handed to a [`SlideshowRenderer`].
//!
//! ## Failures
//!
//! A filesystem error on one entry (rename refused, source vanished, group
//! directory blocked) ends that entry's run and is recorded as
//! [`EntryOutcome::Failed`]; the remaining entries carry on. Index and
//! slideshow failures are recorded in the [`RunReport`] too. Nothing that
//! already happened is rolled back. Only an unreadable source directory
//! aborts the run.
//!
//! ## Dry Runs
//!
//! With `dry_run` set nothing on disk changes, but every decision is made
//! exactly as in a live run. Renames and copies a dry run only *plans* are
//! tracked in memory so later collision checks see them, which keeps the
//! reported plan identical to what a live run would do.

use crate::classify::{extension_token, group_dir_for, is_image};
use crate::config::OrganizeConfig;
use crate::index::{index_path, write_index};
use crate::naming::normalize;
use crate::scan::{DiscoverOptions, ScanError, discover};
use crate::slideshow::{HtmlSlideshow, SlideshowRenderer, SlideshowStats};
use crate::types::{CopyResult, RenamedEntry, SourceEntry};
use crate::unique::{occupied, unique_path_with};
use filetime::FileTime;
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::Sender;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OrganizeError {
    #[error("Discovery failed: {0}")]
    Scan(#[from] ScanError),
}

/// A slideshow the run should produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlideshowRequest {
    /// File name inside the output directory.
    pub name: String,
    pub slide_width: u32,
}

/// Settings for one run.
#[derive(Debug, Clone)]
pub struct OrganizeOptions {
    /// Resolved output directory.
    pub out_dir: PathBuf,
    pub rename: bool,
    pub include_hidden: bool,
    pub dry_run: bool,
    pub max_suffix: u32,
    /// Resolved path of the running program, never processed.
    pub self_path: Option<PathBuf>,
    pub slideshow: Option<SlideshowRequest>,
}

impl OrganizeOptions {
    /// Build run options from a loaded config and an already-resolved output directory.
    pub fn from_config(config: &OrganizeConfig, out_dir: PathBuf, dry_run: bool) -> Self {
        let slideshow = config.slideshow.enabled.then(|| SlideshowRequest {
            name: config.slideshow.name.clone(),
            slide_width: config.slideshow.slide_width,
        });
        Self {
            out_dir,
            rename: config.rename,
            include_hidden: config.include_hidden,
            dry_run,
            max_suffix: config.max_suffix,
            self_path: None,
            slideshow,
        }
    }
}

/// The step an entry was at when it failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    Rename,
    ResolveName,
    CreateDir,
    Copy,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Action::Rename => "rename",
            Action::ResolveName => "resolve a free name",
            Action::CreateDir => "create group directory",
            Action::Copy => "copy",
        };
        f.write_str(label)
    }
}

/// How a single entry fared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EntryOutcome {
    Done {
        renamed: RenamedEntry,
        copy: CopyResult,
    },
    Failed {
        source: PathBuf,
        action: Action,
        reason: String,
    },
}

impl EntryOutcome {
    /// Name listed in the index; `None` for failed entries.
    pub fn display_name(&self) -> Option<&str> {
        match self {
            EntryOutcome::Done { renamed, .. } => Some(&renamed.name),
            EntryOutcome::Failed { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexOutcome {
    Written { path: PathBuf },
    Planned { path: PathBuf },
    Failed { path: PathBuf, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SlideshowOutcome {
    NotRequested,
    /// Requested, but none of the copied files is an image.
    NoImages,
    /// Requested, but no renderer is available.
    Unavailable,
    Planned { path: PathBuf, images: usize },
    Written { path: PathBuf, stats: SlideshowStats },
    Failed { path: PathBuf, reason: String },
}

/// Progress notifications, sent as the run goes.
#[derive(Debug, Clone)]
pub enum OrganizeEvent {
    Discovered { count: usize },
    Renamed { from: String, to: String },
    Copied { name: String, destination: PathBuf },
    EntryFailed {
        source: PathBuf,
        action: Action,
        reason: String,
    },
    Index(IndexOutcome),
    Slideshow(SlideshowOutcome),
}

/// Everything a run did (or, in a dry run, would do).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunReport {
    pub dry_run: bool,
    pub out_dir: PathBuf,
    /// One outcome per discovered entry, in discovery order.
    pub entries: Vec<EntryOutcome>,
    /// `None` when there was nothing to process.
    pub index: Option<IndexOutcome>,
    pub slideshow: SlideshowOutcome,
}

impl RunReport {
    fn empty(options: &OrganizeOptions) -> Self {
        Self {
            dry_run: options.dry_run,
            out_dir: options.out_dir.clone(),
            entries: Vec::new(),
            index: None,
            slideshow: SlideshowOutcome::NotRequested,
        }
    }

    /// True when discovery found nothing.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Display names of processed entries, in discovery order.
    pub fn processed_names(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter_map(|e| e.display_name().map(str::to_string))
            .collect()
    }

    pub fn copies(&self) -> impl Iterator<Item = &CopyResult> {
        self.entries.iter().filter_map(|e| match e {
            EntryOutcome::Done { copy, .. } => Some(copy),
            EntryOutcome::Failed { .. } => None,
        })
    }

    pub fn renamed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, EntryOutcome::Done { renamed, .. } if renamed.changed))
            .count()
    }

    pub fn copied_count(&self) -> usize {
        self.copies().count()
    }

    pub fn failed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| matches!(e, EntryOutcome::Failed { .. }))
            .count()
    }

    /// False if any entry failed or the index could not be written.
    pub fn succeeded(&self) -> bool {
        self.failed_count() == 0 && !matches!(self.index, Some(IndexOutcome::Failed { .. }))
    }
}

/// Paths claimed or given up during this run.
///
/// Layered over the real filesystem so that planned (dry-run) renames and
/// copies take part in collision checks. Apart from the output directory,
/// which is claimed before it exists, a live run's overlay agrees with the
/// disk.
#[derive(Default)]
struct Claims {
    taken: HashSet<PathBuf>,
    freed: HashSet<PathBuf>,
}

impl Claims {
    fn occupied(&self, path: &Path) -> bool {
        self.taken.contains(path) || (!self.freed.contains(path) && occupied(path))
    }

    fn claim(&mut self, path: &Path) {
        self.freed.remove(path);
        self.taken.insert(path.to_path_buf());
    }

    fn release(&mut self, path: &Path) {
        self.taken.remove(path);
        self.freed.insert(path.to_path_buf());
    }
}

fn emit(events: &Option<Sender<OrganizeEvent>>, event: OrganizeEvent) {
    if let Some(tx) = events {
        // A closed receiver only means nobody is printing progress.
        let _ = tx.send(event);
    }
}

fn failed(source: &Path, action: Action, reason: impl fmt::Display) -> EntryOutcome {
    EntryOutcome::Failed {
        source: source.to_path_buf(),
        action,
        reason: reason.to_string(),
    }
}

/// Run the pipeline with the built-in HTML slideshow renderer.
pub fn organize(
    base_dir: &Path,
    options: &OrganizeOptions,
    events: Option<Sender<OrganizeEvent>>,
) -> Result<RunReport, OrganizeError> {
    let renderer = options
        .slideshow
        .as_ref()
        .map(|s| HtmlSlideshow::new(s.slide_width));
    organize_with(
        renderer.as_ref().map(|r| r as &dyn SlideshowRenderer),
        base_dir,
        options,
        events,
    )
}

/// Run the pipeline with a specific slideshow renderer (or none).
pub fn organize_with(
    renderer: Option<&dyn SlideshowRenderer>,
    base_dir: &Path,
    options: &OrganizeOptions,
    events: Option<Sender<OrganizeEvent>>,
) -> Result<RunReport, OrganizeError> {
    let discover_options = DiscoverOptions {
        out_dir: options.out_dir.clone(),
        include_hidden: options.include_hidden,
        self_path: options.self_path.clone(),
    };
    let entries = discover(base_dir, &discover_options)?;
    tracing::info!(count = entries.len(), dir = %base_dir.display(), "discovered entries");
    emit(&events, OrganizeEvent::Discovered {
        count: entries.len(),
    });

    let mut report = RunReport::empty(options);
    if entries.is_empty() {
        return Ok(report);
    }

    let mut claims = Claims::default();
    // The output directory may not exist yet; no rename may land on its path.
    claims.claim(&options.out_dir);

    let renamed: Vec<Result<RenamedEntry, EntryOutcome>> = entries
        .iter()
        .map(|entry| {
            let result = if options.rename {
                rename_entry(entry, options, &mut claims)
            } else {
                Ok(RenamedEntry::unchanged(entry))
            };
            match &result {
                Ok(r) if r.changed => emit(&events, OrganizeEvent::Renamed {
                    from: entry.name.clone(),
                    to: r.name.clone(),
                }),
                Ok(_) => {}
                Err(outcome) => report_failure(&events, outcome),
            }
            result
        })
        .collect();

    for result in renamed {
        let outcome = match result {
            Ok(renamed) => match copy_entry(&renamed, options, &mut claims) {
                Ok(copy) => {
                    emit(&events, OrganizeEvent::Copied {
                        name: renamed.name.clone(),
                        destination: copy.destination.clone(),
                    });
                    EntryOutcome::Done { renamed, copy }
                }
                Err(outcome) => {
                    report_failure(&events, &outcome);
                    outcome
                }
            },
            Err(outcome) => outcome,
        };
        report.entries.push(outcome);
    }

    let index = emit_index(&report, options);
    emit(&events, OrganizeEvent::Index(index.clone()));
    report.index = Some(index);

    report.slideshow = emit_slideshow(renderer, &report, options);
    emit(&events, OrganizeEvent::Slideshow(report.slideshow.clone()));

    Ok(report)
}

fn report_failure(events: &Option<Sender<OrganizeEvent>>, outcome: &EntryOutcome) {
    if let EntryOutcome::Failed {
        source,
        action,
        reason,
    } = outcome
    {
        tracing::warn!(file = %source.display(), %action, %reason, "entry failed");
        emit(events, OrganizeEvent::EntryFailed {
            source: source.clone(),
            action: *action,
            reason: reason.clone(),
        });
    }
}

/// Rename an entry in place to its normalized, collision-free name.
fn rename_entry(
    entry: &SourceEntry,
    options: &OrganizeOptions,
    claims: &mut Claims,
) -> Result<RenamedEntry, EntryOutcome> {
    let new_name = normalize(&entry.name);
    if new_name == entry.name {
        tracing::debug!(name = %entry.name, "already normalized");
        return Ok(RenamedEntry::unchanged(entry));
    }

    if !claims.occupied(&entry.path) {
        return Err(failed(&entry.path, Action::Rename, "source file no longer exists"));
    }

    let parent = entry.path.parent().unwrap_or_else(|| Path::new(""));
    let target = unique_path_with(&parent.join(&new_name), options.max_suffix, |p| {
        claims.occupied(p)
    })
    .map_err(|e| failed(&entry.path, Action::ResolveName, e))?;

    if !options.dry_run {
        fs::rename(&entry.path, &target).map_err(|e| failed(&entry.path, Action::Rename, e))?;
    }
    claims.release(&entry.path);
    claims.claim(&target);

    let name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or(new_name);
    Ok(RenamedEntry {
        original: entry.path.clone(),
        path: target,
        name,
        changed: true,
    })
}

/// Copy an entry into its group directory under a fresh name.
fn copy_entry(
    renamed: &RenamedEntry,
    options: &OrganizeOptions,
    claims: &mut Claims,
) -> Result<CopyResult, EntryOutcome> {
    let source = &renamed.path;
    let group_dir = group_dir_for(source, &options.out_dir);
    let group = extension_token(&renamed.name);

    if !claims.occupied(source) {
        return Err(failed(source, Action::Copy, "source file no longer exists"));
    }

    if options.dry_run {
        if group_dir.exists() && !group_dir.is_dir() {
            return Err(failed(
                source,
                Action::CreateDir,
                format!("{} exists and is not a directory", group_dir.display()),
            ));
        }
    } else {
        fs::create_dir_all(&group_dir).map_err(|e| failed(source, Action::CreateDir, e))?;
    }

    let destination = unique_path_with(&group_dir.join(&renamed.name), options.max_suffix, |p| {
        claims.occupied(p)
    })
    .map_err(|e| failed(source, Action::ResolveName, e))?;

    if !options.dry_run {
        copy_with_times(source, &destination).map_err(|e| failed(source, Action::Copy, e))?;
    }
    claims.claim(&destination);

    Ok(CopyResult { group, destination })
}

/// Copy file contents and permissions, then carry over access and modification times.
fn copy_with_times(source: &Path, destination: &Path) -> std::io::Result<()> {
    fs::copy(source, destination)?;
    let meta = fs::metadata(source)?;
    filetime::set_file_times(
        destination,
        FileTime::from_last_access_time(&meta),
        FileTime::from_last_modification_time(&meta),
    )
}

fn emit_index(report: &RunReport, options: &OrganizeOptions) -> IndexOutcome {
    let path = index_path(&options.out_dir);
    if options.dry_run {
        return IndexOutcome::Planned { path };
    }
    match write_index(&options.out_dir, &report.processed_names()) {
        Ok(path) => IndexOutcome::Written { path },
        Err(e) => {
            tracing::error!(error = %e, "index not written");
            IndexOutcome::Failed {
                path,
                reason: e.to_string(),
            }
        }
    }
}

fn emit_slideshow(
    renderer: Option<&dyn SlideshowRenderer>,
    report: &RunReport,
    options: &OrganizeOptions,
) -> SlideshowOutcome {
    let Some(request) = &options.slideshow else {
        return SlideshowOutcome::NotRequested;
    };

    let images: Vec<PathBuf> = report
        .copies()
        .map(|c| c.destination.clone())
        .filter(|p| is_image(p))
        .collect();
    if images.is_empty() {
        return SlideshowOutcome::NoImages;
    }

    let path = options.out_dir.join(&request.name);
    if options.dry_run {
        return SlideshowOutcome::Planned {
            path,
            images: images.len(),
        };
    }

    let Some(renderer) = renderer else {
        tracing::warn!("no slideshow renderer available, skipping slideshow");
        return SlideshowOutcome::Unavailable;
    };

    match renderer.render(&images, &path) {
        Ok(stats) => SlideshowOutcome::Written { path, stats },
        Err(e) => {
            tracing::error!(error = %e, "slideshow failed");
            SlideshowOutcome::Failed {
                path,
                reason: e.to_string(),
            }
        }
    }
}
