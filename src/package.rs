//! Download packaging: what to hand the user once a batch is done.
//!
//! One successful item is saved directly under its derived name. Two or more
//! are bundled into a zip archive named [`ARCHIVE_NAME`], one entry per item,
//! with repeated names made unique. Failed and unprocessed items are left out.
//!
//! [`save`] never replaces a file that already exists in the output
//! directory: a taken name gets a `-2`, `-3`, ... suffix instead.

use crate::batch::Batch;
use crate::naming::{dedupe_names, numbered_name, output_filename};
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;
use zip::CompressionMethod;
use zip::write::SimpleFileOptions;

#[derive(Error, Debug)]
pub enum PackageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

/// Name of the bundle when more than one image is exported.
pub const ARCHIVE_NAME: &str = "processed-images.zip";

/// One file to save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveEntry {
    pub filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum DownloadPlan {
    Single(SaveEntry),
    Bundle {
        archive_name: String,
        entries: Vec<SaveEntry>,
    },
}

impl DownloadPlan {
    pub fn entries(&self) -> &[SaveEntry] {
        match self {
            DownloadPlan::Single(entry) => std::slice::from_ref(entry),
            DownloadPlan::Bundle { entries, .. } => entries,
        }
    }
}

/// Decide how to export the finished items. `None` when nothing succeeded.
///
/// Each entry is named from its own item's recorded format, not from the
/// options currently in effect.
pub fn plan_download(batch: &Batch) -> Option<DownloadPlan> {
    let done: Vec<_> = batch
        .done_items()
        .filter_map(|item| item.result().map(|r| (item.name(), r)))
        .collect();

    match done.as_slice() {
        [] => None,
        [(name, result)] => Some(DownloadPlan::Single(SaveEntry {
            filename: output_filename(name, result.format),
            data: result.data.clone(),
        })),
        _ => {
            let names = dedupe_names(
                done.iter()
                    .map(|(name, r)| output_filename(name, r.format))
                    .collect(),
            );
            let entries = names
                .into_iter()
                .zip(done.iter())
                .map(|(filename, (_, r))| SaveEntry {
                    filename,
                    data: r.data.clone(),
                })
                .collect();
            Some(DownloadPlan::Bundle {
                archive_name: ARCHIVE_NAME.to_string(),
                entries,
            })
        }
    }
}

/// What [`save`] put on disk.
#[derive(Debug, Clone, PartialEq)]
pub struct Saved {
    /// The image file, or the archive for a bundle.
    pub path: PathBuf,
    /// Names of the saved images, in batch order.
    pub entries: Vec<String>,
}

/// Write a plan under `output_dir`, creating the directory if needed.
pub fn save(plan: &DownloadPlan, output_dir: &Path) -> Result<Saved, PackageError> {
    std::fs::create_dir_all(output_dir)?;

    let path = match plan {
        DownloadPlan::Single(entry) => {
            let (path, mut file) = create_unused(output_dir, &entry.filename)?;
            file.write_all(&entry.data)?;
            path
        }
        DownloadPlan::Bundle {
            archive_name,
            entries,
        } => {
            let (path, file) = create_unused(output_dir, archive_name)?;
            write_archive(file, entries)?;
            path
        }
    };
    log::debug!("saved {}", path.display());

    Ok(Saved {
        path,
        entries: plan.entries().iter().map(|e| e.filename.clone()).collect(),
    })
}

fn write_archive(file: File, entries: &[SaveEntry]) -> Result<(), PackageError> {
    let mut zip = zip::ZipWriter::new(file);
    let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
    for entry in entries {
        zip.start_file(entry.filename.as_str(), options)?;
        zip.write_all(&entry.data)?;
    }
    zip.finish()?;
    Ok(())
}

/// Create `name` in `dir`, or the first free `name-2`, `name-3`, ...
fn create_unused(dir: &Path, name: &str) -> io::Result<(PathBuf, File)> {
    let mut candidate = name.to_string();
    let mut n = 1;
    loop {
        let path = dir.join(&candidate);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(file) => return Ok((path, file)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                n += 1;
                candidate = numbered_name(name, n);
            }
            Err(e) => return Err(e),
        }
    }
}
