//! Extension-based grouping.
//!
//! Each file lands in `<out>/<token>/` where the token is its lower-cased
//! extension, or `unknown` when it has none:
//!
//! | File | Group directory |
//! |------|-----------------|
//! | `PHOTO.JPG` | `out/jpg/` |
//! | `archive.tar.gz` | `out/gz/` |
//! | `Makefile` | `out/unknown/` |

use crate::types::extension_of;
use std::path::{Path, PathBuf};

/// Token used for files without an extension.
pub const UNKNOWN_GROUP: &str = "unknown";

/// Extensions that qualify a copied file for the slideshow.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "gif", "tif", "tiff", "webp"];

/// Group token for a file name.
pub fn extension_token(name: &str) -> String {
    let ext = extension_of(name);
    if ext.is_empty() {
        UNKNOWN_GROUP.to_string()
    } else {
        ext
    }
}

/// Destination group directory for a file. Does not create anything.
pub fn group_dir_for(file: &Path, out_dir: &Path) -> PathBuf {
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    out_dir.join(extension_token(&name))
}

/// True if the file's extension is one of [`IMAGE_EXTENSIONS`].
pub fn is_image(path: &Path) -> bool {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&extension_of(&name).as_str())
}
