//! Input selection: turn command-line paths into a loaded [`Batch`].
//!
//! ## Rules
//!
//! - A **file** argument is taken as-is, whatever its extension. Whether it
//!   really is an image is decided later by the decoder, and a bad file only
//!   fails its own item.
//! - A **directory** argument is walked recursively. Only files with an image
//!   extension (`jpg`, `jpeg`, `png`, `webp`, any case) are picked up, and
//!   hidden entries (leading `.`) are skipped along with everything under
//!   them.
//! - Walked files are sorted by path so batch order is stable across runs.
//!   Argument order is otherwise preserved.
//!
//! ```text
//! shots/
//! ├── .thumbs/            # skipped
//! ├── 2024/
//! │   └── dawn.JPG        # picked up
//! ├── notes.txt           # skipped
//! └── sunset.png          # picked up
//! ```

use crate::batch::Batch;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Input not found: {0}")]
    NotFound(PathBuf),
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] walkdir::Error),
    #[error("No images found in the given inputs")]
    NoImages,
}

/// Extensions accepted when walking a directory.
pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp"];

fn has_image_extension(path: &Path) -> bool {
    let ext = path
        .extension()
        .map(|e| e.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    IMAGE_EXTENSIONS.contains(&ext.as_str())
}

fn is_hidden(entry: &walkdir::DirEntry) -> bool {
    entry.depth() > 0 && entry.file_name().to_string_lossy().starts_with('.')
}

fn walk_images(dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    let mut found = Vec::new();
    for entry in WalkDir::new(dir).into_iter().filter_entry(|e| !is_hidden(e)) {
        let entry = entry?;
        if entry.file_type().is_file() && has_image_extension(entry.path()) {
            found.push(entry.into_path());
        }
    }
    found.sort();
    Ok(found)
}

/// Expand inputs into the list of files to load, in batch order.
pub fn collect_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let found = walk_images(input)?;
            log::debug!("{}: {} images", input.display(), found.len());
            files.extend(found);
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            return Err(ScanError::NotFound(input.clone()));
        }
    }
    if files.is_empty() {
        return Err(ScanError::NoImages);
    }
    Ok(files)
}

/// Display name for a loaded file: its file name, or the whole path when it
/// has none.
fn item_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Read every selected file into a fresh batch of pending items.
pub fn load_batch(inputs: &[PathBuf]) -> Result<Batch, ScanError> {
    let mut batch = Batch::new();
    for path in collect_inputs(inputs)? {
        let bytes = fs::read(&path).map_err(|source| ScanError::Read {
            path: path.clone(),
            source,
        })?;
        batch.add(item_name(&path), bytes);
    }
    Ok(batch)
}
