//! Pure Rust image processing backend, plus libwebp for lossy WebP.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Identify | `image::ImageReader::into_dimensions` (header only) |
//! | Decode (JPEG, PNG, WebP) | `image` crate, format sniffed from the bytes |
//! | Resize | `image::DynamicImage::resize_exact` with `Lanczos3` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` (lossless, quality ignored) |
//! | Encode → WebP | `webp::Encoder` (lossy) |
//!
//! Decoded and resized rasters are plain owned values: they are dropped when
//! [`RustBackend::transform`] returns, on the success path and the error path alike.

use super::backend::{BackendError, Dimensions, ImageBackend, TransformOutput};
use super::operations::plan_resize;
use super::params::{OutputFormat, ProcessOptions, Quality};
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::FilterType;
use image::{ColorType, DynamicImage, ImageReader};
use std::borrow::Cow;
use std::io::Cursor;

/// Pure Rust backend using the `image` crate ecosystem.
///
/// See the [module docs](self) for the crate-to-operation mapping.
pub struct RustBackend;

impl RustBackend {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustBackend {
    fn default() -> Self {
        Self::new()
    }
}

/// Build a reader over an in-memory buffer with the format guessed from its magic bytes.
fn reader(source: &[u8]) -> std::io::Result<ImageReader<Cursor<&[u8]>>> {
    ImageReader::new(Cursor::new(source)).with_guessed_format()
}

/// Decode an in-memory image.
fn decode_image(source: &[u8]) -> Result<DynamicImage, BackendError> {
    reader(source)
        .map_err(|e| BackendError::Decode(e.to_string()))?
        .decode()
        .map_err(|e| BackendError::Decode(e.to_string()))
}

/// Encode a raster in the requested format.
fn encode_image(
    img: &DynamicImage,
    format: OutputFormat,
    quality: Quality,
) -> Result<Vec<u8>, BackendError> {
    match format {
        OutputFormat::Jpeg => encode_jpeg(img, quality),
        OutputFormat::Png => encode_png(img),
        OutputFormat::Webp => encode_webp(img, quality),
    }
}

/// JPEG has no alpha channel and no float samples, so anything else is flattened to RGB8.
fn encode_jpeg(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let pixels: Cow<'_, DynamicImage> = match img.color() {
        ColorType::L8 | ColorType::Rgb8 => Cow::Borrowed(img),
        _ => Cow::Owned(DynamicImage::ImageRgb8(img.to_rgb8())),
    };
    let mut out = Vec::new();
    // The JPEG encoder's scale starts at 1.
    let encoder = JpegEncoder::new_with_quality(&mut out, quality.percent().max(1));
    pixels
        .write_with_encoder(encoder)
        .map_err(|e| BackendError::Encode(format!("JPEG: {e}")))?;
    Ok(out)
}

fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, BackendError> {
    let pixels: Cow<'_, DynamicImage> = match img.color() {
        ColorType::Rgb32F | ColorType::Rgba32F => {
            Cow::Owned(DynamicImage::ImageRgba8(img.to_rgba8()))
        }
        _ => Cow::Borrowed(img),
    };
    let mut out = Vec::new();
    pixels
        .write_with_encoder(PngEncoder::new(&mut out))
        .map_err(|e| BackendError::Encode(format!("PNG: {e}")))?;
    Ok(out)
}

/// Lossy WebP through libwebp.
fn encode_webp(img: &DynamicImage, quality: Quality) -> Result<Vec<u8>, BackendError> {
    let rgba = img.to_rgba8();
    let encoder = webp::Encoder::from_rgba(rgba.as_raw(), rgba.width(), rgba.height());
    let encoded = encoder
        .encode_simple(false, quality.percent() as f32)
        .map_err(|e| BackendError::Encode(format!("WebP: {e:?}")))?;
    Ok(encoded.to_vec())
}

impl ImageBackend for RustBackend {
    fn identify(&self, source: &[u8]) -> Result<Dimensions, BackendError> {
        let (width, height) = reader(source)
            .map_err(|e| BackendError::DimensionProbe(e.to_string()))?
            .into_dimensions()
            .map_err(|e| BackendError::DimensionProbe(e.to_string()))?;
        Ok(Dimensions { width, height })
    }

    fn transform(
        &self,
        source: &[u8],
        options: &ProcessOptions,
    ) -> Result<TransformOutput, BackendError> {
        let img = decode_image(source)?;
        let params = plan_resize(
            Dimensions {
                width: img.width(),
                height: img.height(),
            },
            options,
        )?;

        // Single full-surface resample: no crop, no letterbox.
        let resized = img.resize_exact(params.width, params.height, FilterType::Lanczos3);
        drop(img);

        let data = encode_image(&resized, params.format, params.quality)?;
        Ok(TransformOutput {
            data,
            dimensions: Dimensions {
                width: resized.width(),
                height: resized.height(),
            },
            format: params.format,
        })
    }
}
