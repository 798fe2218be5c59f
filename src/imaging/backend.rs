//! Image processing backend trait and shared types.
//!
//! The [`ImageBackend`] trait defines the two operations every backend must
//! support: identify (header-only size probe) and transform (decode, resample,
//! encode).
//!
//! The production implementation is
//! [`RustBackend`](super::rust_backend::RustBackend). Tests use the
//! [`MockBackend`](tests::MockBackend) below, which never touches pixels.

use super::params::{OutputFormat, ProcessOptions};
use serde::Serialize;
use thiserror::Error;

/// Everything that can go wrong while processing one image.
///
/// Each variant is scoped to a single item: the batch coordinator records it
/// on the failing item and moves on.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Options or resolved dimensions are unusable (zero edge, quality out of range).
    #[error("Invalid options: {0}")]
    ConstraintViolation(String),
    /// The source bytes are not a decodable JPEG, PNG or WebP image.
    #[error("Failed to decode image: {0}")]
    Decode(String),
    /// The encoder could not produce output for the requested format.
    #[error("Failed to encode image: {0}")]
    Encode(String),
    /// Header-only size probe failed. Best effort, never fatal.
    #[error("Failed to read image dimensions: {0}")]
    DimensionProbe(String),
}

/// Width and height of a raster, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Encoded output of a transform.
///
/// `dimensions` are the resolved target size, not the source size.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformOutput {
    pub data: Vec<u8>,
    pub dimensions: Dimensions,
    pub format: OutputFormat,
}

/// Trait for image processing backends.
///
/// Backends work on in-memory buffers only. The source format is sniffed from
/// the bytes; file names and extensions never reach this layer.
pub trait ImageBackend: Sync {
    /// Read the image size from its header without decoding pixels.
    fn identify(&self, source: &[u8]) -> Result<Dimensions, BackendError>;

    /// Decode `source`, resample it to the size resolved from `options`, and
    /// encode it in `options.format`.
    fn transform(
        &self,
        source: &[u8],
        options: &ProcessOptions,
    ) -> Result<TransformOutput, BackendError>;
}
