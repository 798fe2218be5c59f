//! High-level image operations.
//!
//! These functions combine calculations with backend execution. They check
//! the options, plan the resize, and call the backend.

use super::backend::{BackendError, Dimensions, ImageBackend, TransformOutput};
use super::calculations::resolve_dimensions;
use super::params::{ProcessOptions, ResizeParams};

/// Result type for image operations.
pub type Result<T> = std::result::Result<T, BackendError>;

/// Bytes per pixel of the RGBA8 raster a resize allocates.
const BYTES_PER_PIXEL: u64 = 4;

/// Largest target raster accepted, in bytes. Same ceiling the decoder uses.
pub fn max_target_bytes() -> u64 {
    image::Limits::default().max_alloc.unwrap_or(u64::MAX)
}

/// Reject targets whose raster would not fit under [`max_target_bytes`].
fn check_target_size(target: Dimensions) -> Result<()> {
    let bytes = u64::from(target.width)
        .checked_mul(u64::from(target.height))
        .and_then(|pixels| pixels.checked_mul(BYTES_PER_PIXEL));
    match bytes {
        Some(b) if b <= max_target_bytes() => Ok(()),
        _ => Err(BackendError::ConstraintViolation(format!(
            "target size {target} exceeds the {} MiB raster limit",
            max_target_bytes() / (1024 * 1024)
        ))),
    }
}

/// Plan a resize without executing it.
///
/// Backends call this once the source is decoded and its natural size known.
/// A target too large to allocate is refused here, before any pixel work.
pub fn plan_resize(source: Dimensions, options: &ProcessOptions) -> Result<ResizeParams> {
    options.validate()?;
    let target = resolve_dimensions(
        source,
        options.width,
        options.height,
        options.maintain_aspect_ratio,
    )?;
    check_target_size(target)?;
    Ok(ResizeParams {
        width: target.width,
        height: target.height,
        format: options.format,
        quality: options.quality,
    })
}

/// Decode, resize and re-encode one image.
///
/// Options are checked before anything is decoded, so a bad option fails fast
/// without paying for the decode.
pub fn transform(
    backend: &impl ImageBackend,
    source: &[u8],
    options: &ProcessOptions,
) -> Result<TransformOutput> {
    options.validate()?;
    backend.transform(source, options)
}

/// Read the source size from the image header.
///
/// Any failure is reported as [`BackendError::DimensionProbe`] so callers can
/// treat it as the non-fatal side channel it is.
pub fn probe_dimensions(backend: &impl ImageBackend, source: &[u8]) -> Result<Dimensions> {
    backend.identify(source).map_err(|e| match e {
        BackendError::DimensionProbe(msg) => BackendError::DimensionProbe(msg),
        other => BackendError::DimensionProbe(other.to_string()),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::{MockBackend, RecordedOp};
    use crate::imaging::params::{OutputFormat, Quality};

    #[test]
    fn plan_resize_carries_format_and_quality() {
        let options = ProcessOptions {
            format: OutputFormat::Webp,
            quality: Quality::new(0.5).unwrap(),
            width: None,
            height: Some(300),
            maintain_aspect_ratio: true,
        };
        let params = plan_resize(
            Dimensions {
                width: 800,
                height: 600,
            },
            &options,
        )
        .unwrap();

        assert_eq!(params.width, 400);
        assert_eq!(params.height, 300);
        assert_eq!(params.format, OutputFormat::Webp);
        assert_eq!(params.quality.percent(), 50);
    }

    #[test]
    fn plan_resize_rejects_zero_width() {
        let options = ProcessOptions {
            width: Some(0),
            ..ProcessOptions::default()
        };
        let result = plan_resize(
            Dimensions {
                width: 10,
                height: 10,
            },
            &options,
        );
        assert!(matches!(result, Err(BackendError::ConstraintViolation(_))));
    }

    #[test]
    fn plan_resize_rejects_oversized_target() {
        let options = ProcessOptions {
            width: Some(u32::MAX),
            height: Some(u32::MAX),
            maintain_aspect_ratio: false,
            ..ProcessOptions::default()
        };
        let result = plan_resize(
            Dimensions {
                width: 4,
                height: 4,
            },
            &options,
        );
        assert!(matches!(result, Err(BackendError::ConstraintViolation(msg)) if msg.contains("limit")));
    }

    #[test]
    fn plan_resize_accepts_target_at_the_limit() {
        let pixels = max_target_bytes() / BYTES_PER_PIXEL;
        let side = (pixels as f64).sqrt().floor() as u32;
        let options = ProcessOptions {
            width: Some(side),
            height: Some(side),
            maintain_aspect_ratio: false,
            ..ProcessOptions::default()
        };
        let source = Dimensions {
            width: 10,
            height: 10,
        };
        assert!(plan_resize(source, &options).is_ok());

        let options = ProcessOptions {
            width: Some(side + 1),
            height: Some(side + 1),
            ..options
        };
        assert!(plan_resize(source, &options).is_err());
    }

    #[test]
    fn transform_validates_before_backend() {
        let backend = MockBackend::new();
        let options = ProcessOptions {
            height: Some(0),
            ..ProcessOptions::default()
        };

        let result = transform(&backend, &MockBackend::source(100, 100), &options);
        assert!(matches!(result, Err(BackendError::ConstraintViolation(_))));
        assert!(backend.get_operations().is_empty());
    }

    #[test]
    fn transform_returns_resolved_dimensions() {
        let backend = MockBackend::new();
        let options = ProcessOptions {
            width: Some(800),
            height: Some(800),
            maintain_aspect_ratio: false,
            ..ProcessOptions::default()
        };

        let out = transform(&backend, &MockBackend::source(4000, 2000), &options).unwrap();
        assert_eq!(
            out.dimensions,
            Dimensions {
                width: 800,
                height: 800
            }
        );
        assert!(matches!(
            &backend.get_operations()[0],
            RecordedOp::Transform {
                source: Dimensions {
                    width: 4000,
                    height: 2000
                },
                ..
            }
        ));
    }

    #[test]
    fn probe_dimensions_maps_errors_to_probe_kind() {
        let backend = MockBackend::new();
        assert_eq!(
            probe_dimensions(&backend, &MockBackend::source(64, 48)).unwrap(),
            Dimensions {
                width: 64,
                height: 48
            }
        );
        assert!(matches!(
            probe_dimensions(&backend, b"nope"),
            Err(BackendError::DimensionProbe(_))
        ));
    }
}
