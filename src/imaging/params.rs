//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between the caller (the batch coordinator, the CLI) and the
//! [`backend`](super::backend) that does the pixel work.
//!
//! ## Types
//!
//! - [`OutputFormat`]: the encodings we write (JPEG, PNG and WebP).
//! - [`Quality`]: lossy encoding quality in `[0, 1]`. Rejected, not clamped, when out of range.
//! - [`ProcessOptions`]: the immutable options snapshot applied to one batch run.
//! - [`ResizeParams`]: a fully resolved plan with the exact target size.

use super::backend::BackendError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Output encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Jpeg,
    Png,
    Webp,
}

impl OutputFormat {
    pub const ALL: [OutputFormat; 3] = [OutputFormat::Jpeg, OutputFormat::Png, OutputFormat::Webp];

    /// Media type identifier, e.g. `image/jpeg`.
    pub fn mime(self) -> &'static str {
        match self {
            OutputFormat::Jpeg => "image/jpeg",
            OutputFormat::Png => "image/png",
            OutputFormat::Webp => "image/webp",
        }
    }

    /// File extension: the part of the media type after the `/`.
    pub fn extension(self) -> &'static str {
        let mime = self.mime();
        mime.split_once('/').map(|(_, ext)| ext).unwrap_or(mime)
    }

    /// Whether the encoder takes the quality setting into account.
    pub fn honors_quality(self) -> bool {
        !matches!(self, OutputFormat::Png)
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    /// Accepts `jpeg`, `jpg`, `png`, `webp` or their `image/*` media types.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        let name = lower.strip_prefix("image/").unwrap_or(&lower);
        match name {
            "jpeg" | "jpg" => Ok(OutputFormat::Jpeg),
            "png" => Ok(OutputFormat::Png),
            "webp" => Ok(OutputFormat::Webp),
            _ => Err(format!(
                "unsupported output format '{s}' (expected jpeg, png or webp)"
            )),
        }
    }
}

/// Quality setting for lossy encoding, `0.0` (smallest) to `1.0` (best).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Quality(f32);

impl Quality {
    pub fn new(value: f32) -> Result<Self, BackendError> {
        if !(0.0..=1.0).contains(&value) {
            return Err(BackendError::ConstraintViolation(format!(
                "quality must be between 0 and 1, got {value}"
            )));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> f32 {
        self.0
    }

    /// Quality on the 0–100 scale most encoders take.
    pub fn percent(self) -> u8 {
        (self.0 * 100.0).round() as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(0.8)
    }
}

/// Options applied uniformly to every item of one batch run.
///
/// Captured once per run and passed down explicitly; nothing reads settings
/// from elsewhere while a batch is in flight.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProcessOptions {
    pub format: OutputFormat,
    pub quality: Quality,
    /// Target width; `None` leaves the axis unconstrained.
    pub width: Option<u32>,
    /// Target height; `None` leaves the axis unconstrained.
    pub height: Option<u32>,
    pub maintain_aspect_ratio: bool,
}

impl ProcessOptions {
    /// Reject zero-sized constraints. Quality is already range-checked by [`Quality::new`].
    pub fn validate(&self) -> Result<(), BackendError> {
        if self.width == Some(0) {
            return Err(BackendError::ConstraintViolation(
                "width must be a positive integer".into(),
            ));
        }
        if self.height == Some(0) {
            return Err(BackendError::ConstraintViolation(
                "height must be a positive integer".into(),
            ));
        }
        Ok(())
    }
}

impl Default for ProcessOptions {
    fn default() -> Self {
        Self {
            format: OutputFormat::Jpeg,
            quality: Quality::default(),
            width: None,
            height: None,
            maintain_aspect_ratio: true,
        }
    }
}

/// A resolved resize: the exact raster to allocate and how to encode it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeParams {
    pub width: u32,
    pub height: u32,
    pub format: OutputFormat,
    pub quality: Quality,
}
