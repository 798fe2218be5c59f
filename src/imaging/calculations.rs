//! Pure calculation functions for image dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::backend::{BackendError, Dimensions};

/// Resolve the output size of a resize from the source size and the user's constraints.
///
/// Rules, first match wins:
/// 1. Both `width` and `height`, aspect ratio not maintained → exactly `(width, height)`.
/// 2. Only `width` → height follows the source aspect ratio.
/// 3. Only `height` → width follows the source aspect ratio.
/// 4. Both given, aspect ratio maintained → same as rule 2; `height` is ignored.
/// 5. Neither → source size unchanged.
///
/// Derived edges are rounded to the nearest pixel. A result with a zero edge
/// is a [`BackendError::ConstraintViolation`], never clamped up to 1.
///
/// # Examples
/// ```
/// # use pic_processor::imaging::{Dimensions, resolve_dimensions};
/// let source = Dimensions { width: 4000, height: 2000 };
/// let target = resolve_dimensions(source, Some(800), None, true).unwrap();
/// assert_eq!(target, Dimensions { width: 800, height: 400 });
/// ```
pub fn resolve_dimensions(
    source: Dimensions,
    width: Option<u32>,
    height: Option<u32>,
    maintain_aspect_ratio: bool,
) -> Result<Dimensions, BackendError> {
    if source.width == 0 || source.height == 0 {
        return Err(BackendError::ConstraintViolation(format!(
            "source image has no pixels ({}x{})",
            source.width, source.height
        )));
    }

    let (w, h) = match (width, height) {
        (Some(w), Some(h)) if !maintain_aspect_ratio => (w, h),
        // Width drives whenever it is present and the ratio is kept.
        (Some(w), _) => (w, scale_edge(w, source.height, source.width)),
        (None, Some(h)) => (scale_edge(h, source.width, source.height), h),
        (None, None) => (source.width, source.height),
    };

    if w == 0 || h == 0 {
        return Err(BackendError::ConstraintViolation(format!(
            "resolved size {w}x{h} has a zero edge"
        )));
    }
    Ok(Dimensions {
        width: w,
        height: h,
    })
}

/// `round(given * numerator / denominator)`, saturating at `u32::MAX`.
fn scale_edge(given: u32, numerator: u32, denominator: u32) -> u32 {
    let scaled = (given as f64 * numerator as f64 / denominator as f64).round();
    if scaled >= u32::MAX as f64 {
        u32::MAX
    } else {
        scaled as u32
    }
}
