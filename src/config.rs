//! Field configuration module.
//!
//! Handles loading, validating, and merging `config.toml`. Stock defaults are
//! overridden by the user's config file, which only needs the keys it wants
//! to change.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! media_root = "media"      # Storage root directory
//! media_url = "/media/"     # Public URL prefix for stored files
//! field = "image"           # Field name, used in log output
//! upload_to = "images"      # Directory uploads are stored under
//! quality = 90              # JPEG quality (1-100)
//!
//! # Size tuples: [name, width, height, crop?] or [width, height, crop?]
//! sizes = [
//!     ["default", 800, 600, true],
//!     ["thumbnail", 150, 150],
//!     [1200, 0],
//! ]
//! ```
//!
//! An explicitly empty `sizes = []` disables variants for the field.
//! Unknown keys are rejected to catch typos early.

use crate::imaging::Quality;
use crate::sizes::{self, DirectiveSet, RawSize, SizeSpecError};
use crate::storage::FileSystemStorage;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("Invalid sizes: {0}")]
    Sizes(#[from] SizeSpecError),
}

/// Variant field configuration loaded from `config.toml`.
///
/// All fields have sensible defaults. Unknown keys are rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct VariantsConfig {
    /// Filesystem directory storage keys resolve under.
    pub media_root: PathBuf,
    /// URL prefix joined with storage keys.
    pub media_url: String,
    /// Name of the image field.
    pub field: String,
    /// Key prefix for uploaded source images.
    pub upload_to: String,
    /// Encoder quality for lossy outputs.
    pub quality: u32,
    /// Raw size tuples, parsed by [`VariantsConfig::directives`].
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sizes: Option<RawSize>,
}

impl Default for VariantsConfig {
    fn default() -> Self {
        Self {
            media_root: PathBuf::from("media"),
            media_url: "/media/".to_string(),
            field: "image".to_string(),
            upload_to: "images".to_string(),
            quality: 90,
            sizes: Some(default_sizes()),
        }
    }
}

fn default_sizes() -> RawSize {
    let tuple = |name: &str, w: i64, h: i64| {
        RawSize::List(vec![
            RawSize::Text(name.to_string()),
            RawSize::Int(w),
            RawSize::Int(h),
        ])
    };
    RawSize::List(vec![
        tuple("default", 800, 600),
        tuple("thumbnail", 150, 150),
    ])
}

impl VariantsConfig {
    /// Validate config values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.quality) {
            return Err(ConfigError::Validation("quality must be 1-100".into()));
        }
        if self.media_root.as_os_str().is_empty() {
            return Err(ConfigError::Validation(
                "media_root must not be empty".into(),
            ));
        }
        if self.field.trim().is_empty() {
            return Err(ConfigError::Validation("field must not be empty".into()));
        }
        if Path::new(&self.upload_to).is_absolute() {
            return Err(ConfigError::Validation(
                "upload_to must be a relative path".into(),
            ));
        }
        self.directives()?;
        Ok(())
    }

    /// Parse the configured size tuples.
    ///
    /// `Ok(None)` when no sizes are configured.
    pub fn directives(&self) -> Result<Option<DirectiveSet>, SizeSpecError> {
        sizes::parse(self.sizes.as_ref())
    }

    pub fn quality(&self) -> Quality {
        Quality::new(self.quality)
    }

    /// Storage rooted at `media_root`, relative paths resolved against `base`.
    pub fn storage(&self, base: &Path) -> FileSystemStorage {
        FileSystemStorage::new(base.join(&self.media_root), self.media_url.clone())
    }
}

/// Stock defaults as a TOML value, the base layer for merging.
pub fn stock_defaults_value() -> toml::Value {
    toml::Value::try_from(VariantsConfig::default()).expect("default config must serialize")
}

/// Deep-merge `overlay` into `base`. Tables merge key by key; anything else
/// (including arrays such as `sizes`) is replaced wholesale.
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

/// Read `config.toml` from `dir`, if present.
pub fn load_raw_config(dir: &Path) -> Result<Option<toml::Value>, ConfigError> {
    let config_path = dir.join("config.toml");
    if !config_path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(&config_path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto `base`, deserialize, and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<VariantsConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: VariantsConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load the effective configuration for `dir`.
pub fn load_config(dir: &Path) -> Result<VariantsConfig, ConfigError> {
    let base = stock_defaults_value();
    let overlay = load_raw_config(dir)?;
    resolve_config(base, overlay)
}

/// A documented `config.toml` holding every default.
pub fn stock_config_toml() -> &'static str {
    r##"# Image Variants Configuration
# ============================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
# Unknown keys will cause an error.

# Directory uploaded images and their variants are stored under.
media_root = "media"

# Public URL prefix for stored files.
media_url = "/media/"

# Name of the image field (shown in log output).
field = "image"

# Directory, relative to media_root, that uploads are placed in.
upload_to = "images"

# JPEG encoding quality (1 = worst, 100 = best).
# PNG output always uses the best lossless compression.
quality = 90

# ---------------------------------------------------------------------------
# Variant sizes
# ---------------------------------------------------------------------------
# Each entry produces one variant next to the source image:
#
#   ["name", width, height, crop]  named; crop defaults to true
#   [width, height, crop]          unnamed; named "WxH", crop defaults to true
#   [width, 0]                     fixed width, height follows aspect ratio
#   [0, height]                    fixed height, width follows aspect ratio
#
# A zero dimension always disables cropping. Sources already smaller than
# the target are copied unchanged. Set `sizes = []` to disable variants.
sizes = [
    ["default", 800, 600],
    ["thumbnail", 150, 150],
]
"##
}
