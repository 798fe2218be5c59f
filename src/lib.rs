//! # pic-processor
//!
//! A local batch image converter. Images are decoded, optionally resized,
//! and re-encoded as JPEG, PNG or WebP entirely in memory. Nothing leaves the
//! machine.
//!
//! # Pipeline
//!
//! ```text
//! 1. Select    paths     →  Batch          (files and walked directories)
//! 2. Probe     Batch     →  dimensions     (best effort, never fails an item)
//! 3. Process   Batch     →  Done | Error   (one item at a time, in order)
//! 4. Package   Batch     →  DownloadPlan   (single file or bundle)
//! ```
//!
//! Every item moves through `pending → processing → done | error`. One item
//! failing never stops the others, and every item in a run is processed with
//! the same [`imaging::ProcessOptions`] snapshot.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Dimension resolution, options, the [`imaging::ImageBackend`] trait and its `image`-crate implementation |
//! | [`batch`] | Items, their status lifecycle, and the sequential [`batch::run_batch`] coordinator |
//! | [`scan`] | Input selection: files and directories into a loaded batch |
//! | [`naming`] | Output filename derivation and de-duplication |
//! | [`package`] | Single-file vs. bundled export of finished items |
//! | [`config`] | `pic-processor.toml` loading, merging over defaults, validation |
//! | [`output`] | CLI output formatting |
//!
//! # Resizing Rules
//!
//! With neither width nor height the source size is kept. With one edge set
//! the other follows the source aspect ratio. With both set, the image is
//! either stretched to exactly that size or, when the aspect ratio is kept,
//! sized by width alone. See [`imaging::resolve_dimensions`].

pub mod batch;
pub mod config;
pub mod imaging;
pub mod naming;
pub mod output;
pub mod package;
pub mod scan;

#[cfg(test)]
pub(crate) mod test_helpers;
