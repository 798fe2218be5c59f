//! Shared test utilities for the pic-processor test suite.
//!
//! Provides synthetic images encoded in memory (no fixture files needed) and
//! lookup helpers over a [`Batch`].
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let mut batch = Batch::new();
//! batch.add("dawn.png", png_bytes(200, 100));
//! run_batch(&RustBackend::new(), &mut batch, &ProcessOptions::default(), None, None);
//!
//! let item = find_item(&batch, "dawn.png");
//! assert_eq!(item.status(), ItemStatus::Done);
//! ```

use crate::batch::{Batch, ImageItem};
use image::{ImageEncoder, RgbImage, RgbaImage};

// =========================================================================
// Synthetic images
// =========================================================================

fn gradient(width: u32, height: u32) -> RgbImage {
    RgbImage::from_fn(width, height, |x, y| {
        image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
    })
}

/// A valid PNG of the given size.
pub fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// A valid PNG with a translucent alpha channel.
pub fn rgba_png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 200, 128])
    });
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    out
}

/// A valid baseline JPEG of the given size.
pub fn jpeg_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = gradient(width, height);
    let mut out = Vec::new();
    image::codecs::jpeg::JpegEncoder::new(&mut out)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
        .unwrap();
    out
}

/// A valid lossless WebP of the given size.
pub fn webp_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = RgbaImage::from_fn(width, height, |x, y| {
        image::Rgba([(x % 256) as u8, (y % 256) as u8, 64, 255])
    });
    let mut out = Vec::new();
    image::codecs::webp::WebPEncoder::new_lossless(&mut out)
        .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgba8)
        .unwrap();
    out
}

// =========================================================================
// Batch lookups: panics with a clear message on miss
// =========================================================================

/// Find an item by its source file name. Panics if not found.
pub fn find_item<'a>(batch: &'a Batch, name: &str) -> &'a ImageItem {
    batch.iter().find(|i| i.name() == name).unwrap_or_else(|| {
        let names: Vec<&str> = batch.iter().map(|i| i.name()).collect();
        panic!("item '{name}' not found. Available: {names:?}")
    })
}

/// Source file names in batch order.
pub fn item_names(batch: &Batch) -> Vec<&str> {
    batch.iter().map(|i| i.name()).collect()
}
