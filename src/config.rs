//! Run configuration.
//!
//! Settings come from three layers, each overriding the one before:
//!
//! ```text
//! stock defaults  →  <source>/sortdir.toml  →  command-line flags
//! ```
//!
//! ## Config File
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! out_dir = "out"           # Output directory, relative to the source directory
//! rename = true             # Normalize source file names in place
//! include_hidden = false    # Also process dot-files
//! max_suffix = 10000        # Highest collision suffix tried before giving up
//!
//! [slideshow]
//! enabled = false           # Build a slideshow from copied images
//! name = "slideshow.html"   # File name inside the output directory
//! slide_width = 960         # Native slide width in pixels
//! ```
//!
//! Unknown keys are rejected to catch typos early. All validation happens
//! before the pipeline touches the filesystem.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Name of the per-directory config file.
pub const CONFIG_FILENAME: &str = "sortdir.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Output directory {0} is the source directory itself")]
    OutputIsSource(PathBuf),
    #[error("Output path {0} exists and is not a directory")]
    OutputNotDirectory(PathBuf),
}

/// Everything a run needs to know besides the source directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OrganizeConfig {
    /// Output directory; relative paths are resolved against the source directory.
    pub out_dir: PathBuf,
    /// Rename source files to their normalized form before copying.
    pub rename: bool,
    /// Include entries whose name starts with a dot.
    pub include_hidden: bool,
    /// Highest `-N` suffix tried when resolving a free name.
    pub max_suffix: u32,
    /// Optional slideshow of the copied images.
    pub slideshow: SlideshowConfig,
}

impl Default for OrganizeConfig {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from("out"),
            rename: true,
            include_hidden: false,
            max_suffix: 10_000,
            slideshow: SlideshowConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SlideshowConfig {
    pub enabled: bool,
    /// Output file name, placed directly inside the output directory.
    pub name: String,
    /// Width every slide is scaled to, in pixels.
    pub slide_width: u32,
}

impl Default for SlideshowConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            name: "slideshow.html".to_string(),
            slide_width: 960,
        }
    }
}

impl OrganizeConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.out_dir.as_os_str().is_empty() {
            return Err(ConfigError::Validation("out_dir must not be empty".into()));
        }
        if self.max_suffix == 0 {
            return Err(ConfigError::Validation(
                "max_suffix must be at least 1".into(),
            ));
        }
        if self.slideshow.slide_width == 0 {
            return Err(ConfigError::Validation(
                "slideshow.slide_width must be non-zero".into(),
            ));
        }
        let name = Path::new(&self.slideshow.name);
        let plain_file_name = name.file_name().is_some_and(|f| f == name.as_os_str());
        if self.slideshow.name.is_empty() || !plain_file_name {
            return Err(ConfigError::Validation(format!(
                "slideshow.name must be a plain file name, got {:?}",
                self.slideshow.name
            )));
        }
        if self.slideshow.name == crate::index::INDEX_FILENAME {
            return Err(ConfigError::Validation(format!(
                "slideshow.name must not be {:?}, the index uses that name",
                crate::index::INDEX_FILENAME
            )));
        }
        Ok(())
    }

    /// Resolve the output directory against `source` and check it is usable.
    ///
    /// The output directory may not exist yet. It must not be the source
    /// directory and must not be an existing regular file.
    pub fn resolve_out_dir(&self, source: &Path) -> Result<PathBuf, ConfigError> {
        let source = absolute(source)?;
        let out_dir = absolute(&source.join(&self.out_dir))?;
        if out_dir == source {
            return Err(ConfigError::OutputIsSource(out_dir));
        }
        if out_dir.exists() && !out_dir.is_dir() {
            return Err(ConfigError::OutputNotDirectory(out_dir));
        }
        Ok(out_dir)
    }
}

/// Canonicalize when the path exists, otherwise make it absolute lexically.
fn absolute(path: &Path) -> std::io::Result<PathBuf> {
    match path.canonicalize() {
        Ok(p) => Ok(p),
        Err(_) => std::path::absolute(path),
    }
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
///
/// This is the base layer that file and command-line overrides merge onto.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(OrganizeConfig::default()).expect("default config must serialize")
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load `sortdir.toml` from a directory as a raw TOML value.
///
/// Returns `Ok(None)` if the directory has no config file.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join(CONFIG_FILENAME);
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge the layers in order, then deserialize and validate.
pub fn resolve_config(layers: Vec<Option<toml::Value>>) -> Result<OrganizeConfig, ConfigError> {
    let merged = layers
        .into_iter()
        .flatten()
        .fold(stock_defaults_value(), merge_toml);
    let config: OrganizeConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load config for `source`, with `overrides` (usually from the command line)
/// applied on top of the config file.
pub fn load_config(
    source: &Path,
    overrides: Option<toml::Value>,
) -> Result<OrganizeConfig, ConfigError> {
    let file = load_raw_config(source)?;
    resolve_config(vec![file, overrides])
}

/// Returns a fully-commented stock `sortdir.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# sortdir configuration
# =====================
# Place this file as `sortdir.toml` in the directory you want to organize.
# All settings are optional; values shown are the defaults.
# Command-line flags override anything set here.
# Unknown keys will cause an error.

# Output directory, relative to the source directory.
out_dir = "out"

# Rename source files in place to lower-case, underscore-separated names.
rename = true

# Also process files whose name starts with a dot.
include_hidden = false

# Highest collision suffix (-1, -2, ...) tried before a file is reported
# as failed.
max_suffix = 10000

# ---------------------------------------------------------------------------
# Slideshow
# ---------------------------------------------------------------------------
[slideshow]
# Build an HTML slideshow of every copied image.
enabled = false

# File name inside the output directory.
name = "slideshow.html"

# Width in pixels each slide is scaled to (aspect ratio is preserved).
slide_width = 960
"##
}
