//! Image processing: decode, resize, re-encode, all in memory.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Identify** | `image::ImageReader::into_dimensions` |
//! | **Resize** | `resize_exact` + Lanczos3 |
//! | **Encode** | `image` (JPEG, PNG), `webp` (lossy WebP) |
//!
//! The module is split into:
//! - **Calculations**: Pure dimension resolution (unit testable)
//! - **Parameters**: Output format, quality, and the per-run options snapshot
//! - **Backend**: [`ImageBackend`] trait + [`RustBackend`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, ImageBackend, TransformOutput};
pub use calculations::resolve_dimensions;
pub use operations::{plan_resize, probe_dimensions, transform};
pub use params::{OutputFormat, ProcessOptions, Quality, ResizeParams};
pub use rust_backend::RustBackend;
