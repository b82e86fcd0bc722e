//! Canonical filename normalization.
//!
//! Every file that goes through the rename step ends up with a name made only
//! of lower-case ASCII letters, digits, `-` and `_`, plus at most one
//! `.ext` segment. The same rules are applied to every entry:
//!
//! - `My Photo.JPG` → `my_photo.jpg`
//! - `Résumé (final).PDF` → `r_sum_final.pdf`
//! - `__draft--.txt` → `draft.txt`
//! - `...` → `file`
//!
//! ## Stem and Extension
//!
//! The name is split at its **last** dot. A dot in first position (hidden
//! files like `.bashrc`) or in last position (`notes.`) does not start an
//! extension, so those names are treated as all-stem.
//!
//! The extension is lower-cased and, like the stem, restricted to the slug
//! alphabet: anything else becomes `_` (`clip.m p4` → `clip.m_p4`). Runs of
//! `_` in the extension are not collapsed.
//!
//! ## Idempotence
//!
//! `normalize(normalize(x)) == normalize(x)` for every input. Running the
//! tool twice over the same directory therefore renames nothing the second
//! time.

/// Stem used when nothing survives normalization.
pub const FALLBACK_STEM: &str = "file";

/// Split a file name into `(stem, extension)`.
///
/// The extension keeps its leading dot and is returned as-is (no case
/// folding). Returns an empty extension when the name has none:
/// - `"a.tar.gz"` → `("a.tar", ".gz")`
/// - `".bashrc"` → `(".bashrc", "")`
/// - `"notes."` → `("notes.", "")`
pub fn split_name(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(pos) if pos > 0 && pos < name.len() - 1 => name.split_at(pos),
        _ => (name, ""),
    }
}

fn is_slug_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_'
}

/// Map every character outside the slug alphabet to `_`.
fn replace_disallowed(s: &str) -> String {
    s.chars()
        .map(|c| if is_slug_char(c) { c } else { '_' })
        .collect()
}

fn collapse_underscores(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_underscore = false;
    for c in s.chars() {
        if c == '_' {
            if !prev_underscore {
                out.push(c);
            }
            prev_underscore = true;
        } else {
            out.push(c);
            prev_underscore = false;
        }
    }
    out
}

/// Normalize an arbitrary file name into its canonical safe form.
///
/// Total: never fails and never returns an empty string.
pub fn normalize(name: &str) -> String {
    let (stem, ext) = split_name(name);

    let stem = stem.to_lowercase().replace(' ', "_");
    let stem = collapse_underscores(&replace_disallowed(&stem));
    let stem = stem.trim_matches(|c| c == '.' || c == '_' || c == '-');
    let stem = if stem.is_empty() { FALLBACK_STEM } else { stem };

    // Extension characters go through the same alphabet so the result never
    // carries spaces or punctuation after the dot.
    let ext = match ext.strip_prefix('.') {
        Some(rest) => format!(".{}", replace_disallowed(&rest.to_lowercase())),
        None => String::new(),
    };

    format!("{stem}{ext}")
}
