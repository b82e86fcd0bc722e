//! HTML index of processed files.
//!
//! Written to `<out>/index.html` at the end of every run: one `<p>` per
//! processed file, in discovery order, carrying the file's display name
//! (the new name when it was renamed).
//!
//! Rendered with [maud](https://maud.lambda.xyz/), so every name is
//! HTML-escaped on interpolation.

use maud::{DOCTYPE, Markup, html};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File name of the index inside the output directory.
pub const INDEX_FILENAME: &str = "index.html";

const TITLE: &str = "File index";

const CSS: &str = "body{font-family:system-ui,-apple-system,Segoe UI,Roboto,Ubuntu,Cantarell,Noto Sans,sans-serif;margin:2rem;} p{margin:.25rem 0}";

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Failed to write index {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
}

/// Render the index document for `names`, in the order given.
pub fn render_index(names: &[String]) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="utf-8";
                meta name="viewport" content="width=device-width, initial-scale=1";
                title { (TITLE) }
                style { (CSS) }
            }
            body {
                h1 { (TITLE) }
                @for name in names {
                    p { (name) }
                }
            }
        }
    }
}

/// Path the index is written to.
pub fn index_path(out_dir: &Path) -> PathBuf {
    out_dir.join(INDEX_FILENAME)
}

/// Render and write the index, creating the output directory if needed.
pub fn write_index(out_dir: &Path, names: &[String]) -> Result<PathBuf, IndexError> {
    let path = index_path(out_dir);
    let write = || -> std::io::Result<()> {
        fs::create_dir_all(out_dir)?;
        fs::write(&path, render_index(names).into_string())
    };
    write().map_err(|source| IndexError::Write {
        path: path.clone(),
        source,
    })?;
    Ok(path)
}
