//! # sortdir
//!
//! Tidy up a flat directory of files in one pass. Every file directly inside
//! the source directory gets a clean, predictable name, a copy sorted into a
//! per-extension folder, and a line in an HTML index. Optionally, the copied
//! images are collected into a slideshow.
//!
//! # Architecture: One Linear Pipeline
//!
//! ```text
//! 1. Discover   source/          →  eligible files      (no recursion)
//! 2. Rename     My Photo.JPG     →  my_photo.jpg        (in place, optional)
//! 3. Copy       my_photo.jpg     →  out/jpg/my_photo.jpg
//! 4. Index      processed names  →  out/index.html
//! 5. Slideshow  copied images    →  out/slideshow.html  (optional)
//! ```
//!
//! Stages run in order over the whole entry list: every file is renamed
//! before any file is copied. A failure on one file is recorded and the run
//! moves on to the next; nothing is rolled back.
//!
//! Nothing is ever overwritten. Renames and copies resolve collisions by
//! appending `-1`, `-2`, ... before the extension.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`scan`] | Stage 1: lists the source directory and applies the exclusion rules |
//! | [`naming`] | Filename normalization: lowercase, `_` for spaces, restricted alphabet |
//! | [`unique`] | Collision-free path resolution with `-N` suffixes |
//! | [`classify`] | Extension-based grouping and image detection |
//! | [`organize`] | The pipeline itself, its per-entry outcomes and progress events |
//! | [`index`] | HTML index of processed names, rendered with Maud |
//! | [`slideshow`] | Slideshow renderer trait and the HTML implementation |
//! | [`config`] | `sortdir.toml` loading, CLI overlay, validation |
//! | [`types`] | Run-scoped data shared between stages |
//! | [`output`] | CLI output formatting for run progress, summary and `check` |
//!
//! # Design Decisions
//!
//! ## Dry Runs Plan Exactly
//!
//! A dry run makes no filesystem changes but walks the same code path as a
//! live run. Planned renames and copies are kept in an in-memory overlay that
//! the collision checks consult, so the reported plan names the same suffixed
//! paths a live run would produce.
//!
//! ## Bounded Suffix Search
//!
//! The `-N` search stops at `max_suffix` (10000 by default). A file that hits
//! the cap fails on its own; the rest of the run is unaffected.
//!
//! ## Rename Is Idempotent
//!
//! A normalized name normalizes to itself, so a second run over the same
//! directory renames nothing and only adds new copies.

pub mod classify;
pub mod config;
pub mod index;
pub mod naming;
pub mod organize;
pub mod output;
pub mod scan;
pub mod slideshow;
pub mod types;
pub mod unique;

#[cfg(test)]
pub(crate) mod test_helpers;
