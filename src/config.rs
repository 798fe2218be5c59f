//! Processing configuration.
//!
//! Settings come from three layers, each overriding the one before:
//! stock defaults, an optional `pic-processor.toml`, then command-line flags.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! format = "jpeg"               # jpeg, png or webp
//! quality = 0.8                 # 0.0 (smallest) to 1.0 (best); ignored for png
//! # width = 1200                # target width in pixels
//! # height = 800                # target height in pixels
//! maintain_aspect_ratio = true  # false stretches to exactly width x height
//! ```
//!
//! Files are sparse: a file containing only `format = "webp"` keeps every
//! other default. Unknown keys are rejected to catch typos early.

use crate::imaging::{OutputFormat, ProcessOptions, Quality};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Name of the config file looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "pic-processor.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSer(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// User-facing processing settings.
///
/// Every field has a default, so config files only need the values they
/// want to change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub format: OutputFormat,
    /// Encoder quality in `[0, 1]`.
    pub quality: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    pub maintain_aspect_ratio: bool,
}

impl Default for Settings {
    fn default() -> Self {
        let options = ProcessOptions::default();
        Self {
            format: options.format,
            quality: options.quality.value(),
            width: options.width,
            height: options.height,
            maintain_aspect_ratio: options.maintain_aspect_ratio,
        }
    }
}

impl Settings {
    /// Validate values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.quality) {
            return Err(ConfigError::Validation(format!(
                "quality must be between 0 and 1, got {}",
                self.quality
            )));
        }
        if self.width == Some(0) {
            return Err(ConfigError::Validation("width must be non-zero".into()));
        }
        if self.height == Some(0) {
            return Err(ConfigError::Validation("height must be non-zero".into()));
        }
        Ok(())
    }

    /// The immutable options snapshot handed to a batch run.
    pub fn to_options(&self) -> Result<ProcessOptions, ConfigError> {
        self.validate()?;
        let quality =
            Quality::new(self.quality).map_err(|e| ConfigError::Validation(e.to_string()))?;
        Ok(ProcessOptions {
            format: self.format,
            quality,
            width: self.width,
            height: self.height,
            maintain_aspect_ratio: self.maintain_aspect_ratio,
        })
    }
}

/// Stock defaults as a `toml::Value::Table`, the base layer for merging.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(Settings::default())?)
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

/// Read a config file as a raw TOML value.
pub fn load_raw_config(path: &Path) -> Result<toml::Value, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Merge an optional overlay onto the stock defaults, then deserialize and validate.
pub fn resolve_settings(overlay: Option<toml::Value>) -> Result<Settings, ConfigError> {
    let base = stock_defaults_value()?;
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let settings: Settings = merged.try_into()?;
    settings.validate()?;
    Ok(settings)
}

/// Load settings.
///
/// With an explicit `path`, the file must exist. Without one,
/// [`CONFIG_FILE_NAME`] in `search_dir` is used when present and the stock
/// defaults otherwise.
pub fn load_config(path: Option<&Path>, search_dir: &Path) -> Result<Settings, ConfigError> {
    let overlay = match path {
        Some(p) => Some(load_raw_config(p)?),
        None => {
            let candidate = search_dir.join(CONFIG_FILE_NAME);
            if candidate.exists() {
                log::debug!("using config {}", candidate.display());
                Some(load_raw_config(&candidate)?)
            } else {
                None
            }
        }
    };
    resolve_settings(overlay)
}

/// A fully-commented stock config file. Printed by `gen-config`.
pub fn stock_config_toml() -> &'static str {
    r##"# pic-processor configuration
# ==========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults. Command-line flags override them.
# Unknown keys will cause an error.

# Output format: "jpeg", "png" or "webp".
format = "jpeg"

# Encoder quality from 0.0 (smallest file) to 1.0 (best).
# Applies to jpeg and webp; png output is lossless and ignores it.
quality = 0.8

# Target size in pixels. Leave both unset to keep the source size.
# With only one set, the other follows the source aspect ratio.
# width = 1200
# height = 800

# When both width and height are set:
#   true  -> width wins, height follows the source aspect ratio
#   false -> stretch to exactly width x height
maintain_aspect_ratio = true
"##
}
