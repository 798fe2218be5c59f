//! CLI output formatting.
//!
//! Every item is shown by its positional index and source name, with sizes
//! and dimensions as indented context lines.
//!
//! # Output Format
//!
//! ## Inputs
//!
//! ```text
//! Images (2)
//! 001 dawn.png
//!     Original: 1.18 MB (4000x3000)
//! 002 notes.jpg
//!     Original: 12 B
//! ```
//!
//! ## Processing
//!
//! ```text
//! Processing 2 images as image/webp
//! [001/002] dawn.png
//!     Result: 340.5 KB (1200x900, webp), 28% of original
//! [002/002] notes.jpg
//!     Error: Failed to decode image: ...
//!
//! 1 done, 1 failed
//! ```
//!
//! ## Save
//!
//! ```text
//! Saved 2 images
//!     out/processed-images.zip
//!         dawn.webp
//!         notes.webp
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure.

use crate::batch::{Batch, BatchEvent, ItemReport};
use crate::imaging::{Dimensions, OutputFormat};
use crate::package::Saved;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Progress prefix: `[001/012]`.
fn progress_index(pos: usize, total: usize) -> String {
    format!("[{}/{}]", format_index(pos), format_index(total))
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{n} {word}")
    } else {
        format!("{n} {word}s")
    }
}

/// Human-readable byte count using 1024 steps.
///
/// ```text
/// 0        → 0 B
/// 1536     → 1.5 KB
/// 1234567  → 1.18 MB
/// ```
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    let fixed = format!("{value:.2}");
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    format!("{} {}", trimmed, UNITS[unit])
}

/// `1.18 MB (4000x3000)`, or just the size when dimensions are unknown.
fn size_with_dims(bytes: usize, dims: Option<Dimensions>) -> String {
    match dims {
        Some(d) => format!("{} ({})", format_file_size(bytes as u64), d),
        None => format_file_size(bytes as u64),
    }
}

// ============================================================================
// Inputs
// ============================================================================

/// List the loaded items before processing.
pub fn format_batch_listing(batch: &Batch) -> Vec<String> {
    let mut lines = vec![format!("Images ({})", batch.len())];
    for (i, item) in batch.iter().enumerate() {
        lines.push(format!("{} {}", format_index(i + 1), item.name()));
        lines.push(format!(
            "    Original: {}",
            size_with_dims(item.original_size(), item.original_dimensions())
        ));
    }
    lines
}

pub fn print_batch_listing(batch: &Batch) {
    for line in format_batch_listing(batch) {
        println!("{}", line);
    }
}

// ============================================================================
// Processing
// ============================================================================

fn format_item_result(report: &ItemReport) -> Vec<String> {
    if let Some(result) = &report.result {
        let dims = Dimensions {
            width: result.width,
            height: result.height,
        };
        let mut line = format!(
            "    Result: {} ({}, {})",
            format_file_size(result.size as u64),
            dims,
            result.format.extension()
        );
        if let Some(ratio) = result.compression_ratio {
            line.push_str(&format!(", {ratio}% of original"));
        }
        vec![line]
    } else if let Some(error) = &report.error {
        vec![format!("    Error: {}", error)]
    } else {
        Vec::new()
    }
}

/// Format a single progress event as display lines.
///
/// `ItemStarted` yields the item header so a slow transform is visible while
/// it runs; `ItemFinished` adds the outcome beneath it.
pub fn format_batch_event(event: &BatchEvent, format: OutputFormat) -> Vec<String> {
    match event {
        BatchEvent::Started { total } => {
            vec![format!("Processing {} as {}", plural(*total, "image"), format)]
        }
        BatchEvent::ItemStarted {
            index, total, name, ..
        } => vec![format!("{} {}", progress_index(*index, *total), name)],
        BatchEvent::ItemFinished { report, .. } => format_item_result(report),
        BatchEvent::Finished(summary) => vec![String::new(), summary.to_string()],
    }
}

// ============================================================================
// Save
// ============================================================================

/// Archive entries are listed under the archive path.
pub fn format_save_output(saved: Option<&Saved>) -> Vec<String> {
    let Some(saved) = saved else {
        return vec!["Nothing to save: no image was processed successfully".to_string()];
    };
    let mut lines = vec![
        format!("Saved {}", plural(saved.entries.len(), "image")),
        format!("    {}", saved.path.display()),
    ];
    if saved.entries.len() > 1 {
        lines.extend(saved.entries.iter().map(|name| format!("        {}", name)));
    }
    lines
}

pub fn print_save_output(saved: Option<&Saved>) {
    for line in format_save_output(saved) {
        println!("{}", line);
    }
}
