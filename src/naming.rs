//! Output filename derivation.
//!
//! An output file keeps the source name's stem and takes the extension of
//! the format it was encoded in:
//! - `holiday.JPG` encoded as `image/webp` → `holiday.webp`
//! - `scan.final.png` encoded as `image/jpeg` → `scan.final.jpeg`
//! - `README` encoded as `image/png` → `README.png`
//!
//! Only the last `.ext` suffix is stripped, and only when it contains neither
//! a `/` nor another `.`.

use crate::imaging::OutputFormat;
use std::collections::{HashMap, HashSet};

/// Strip the last `.extension` suffix from a file name.
///
/// - `"photo.jpg"` → `"photo"`
/// - `"archive.tar.gz"` → `"archive.tar"`
/// - `"noext"` → `"noext"`
/// - `"dir.d/file"` → `"dir.d/file"` (the dot belongs to a directory)
/// - `".hidden"` → `".hidden"` (stripping would leave nothing)
///
/// A leading dot starts a dotfile name, not an extension. `.hidden` encoded
/// as PNG is therefore saved as `.hidden.png`, never as a bare `.png`.
pub fn file_stem(name: &str) -> &str {
    match name.rfind('.') {
        Some(0) | None => name,
        Some(dot) if name[dot + 1..].is_empty() || name[dot + 1..].contains('/') => name,
        Some(dot) => &name[..dot],
    }
}

/// Name for an item's output: source stem + the format's extension.
pub fn output_filename(source_name: &str, format: OutputFormat) -> String {
    format!("{}.{}", file_stem(source_name), format.extension())
}

/// `name` with `-n` inserted before its extension: `a.png`, 2 → `a-2.png`.
pub fn numbered_name(name: &str, n: u32) -> String {
    match name.rfind('.') {
        Some(dot) if dot > 0 => format!("{}-{}{}", &name[..dot], n, &name[dot..]),
        _ => format!("{name}-{n}"),
    }
}

/// Make every name in the list unique by suffixing repeats with `-2`, `-3`, …
///
/// The first occurrence keeps its name. Order is preserved.
pub fn dedupe_names(names: Vec<String>) -> Vec<String> {
    let mut seen: HashMap<String, u32> = HashMap::new();
    let mut taken: HashSet<String> = names.iter().cloned().collect();
    let mut out = Vec::with_capacity(names.len());

    for name in names {
        let count = seen.entry(name.clone()).or_insert(0);
        *count += 1;
        if *count == 1 {
            out.push(name);
            continue;
        }

        let mut n = *count;
        let mut candidate = numbered_name(&name, n);
        while taken.contains(&candidate) {
            n += 1;
            candidate = numbered_name(&name, n);
        }
        taken.insert(candidate.clone());
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_simple_extension() {
        assert_eq!(file_stem("photo.jpg"), "photo");
    }

    #[test]
    fn strips_only_last_extension() {
        assert_eq!(file_stem("scan.final.png"), "scan.final");
    }

    #[test]
    fn keeps_name_without_extension() {
        assert_eq!(file_stem("README"), "README");
    }

    #[test]
    fn keeps_trailing_dot() {
        assert_eq!(file_stem("weird."), "weird.");
    }

    #[test]
    fn ignores_dot_in_directory() {
        assert_eq!(file_stem("dir.d/file"), "dir.d/file");
    }

    #[test]
    fn keeps_dotfile() {
        assert_eq!(file_stem(".hidden"), ".hidden");
        assert_eq!(output_filename(".hidden", OutputFormat::Png), ".hidden.png");
    }

    #[test]
    fn numbered_name_goes_before_extension() {
        assert_eq!(numbered_name("a.png", 2), "a-2.png");
        assert_eq!(numbered_name("scan.final.webp", 3), "scan.final-3.webp");
        assert_eq!(numbered_name("x", 2), "x-2");
        assert_eq!(numbered_name(".hidden", 2), ".hidden-2");
    }

    #[test]
    fn output_name_uses_format_extension() {
        assert_eq!(
            output_filename("holiday.JPG", OutputFormat::Webp),
            "holiday.webp"
        );
        assert_eq!(
            output_filename("logo.png", OutputFormat::Jpeg),
            "logo.jpeg"
        );
        assert_eq!(output_filename("README", OutputFormat::Png), "README.png");
    }

    #[test]
    fn dedupe_suffixes_repeats() {
        let names = vec![
            "a.jpeg".to_string(),
            "b.jpeg".to_string(),
            "a.jpeg".to_string(),
            "a.jpeg".to_string(),
        ];
        assert_eq!(
            dedupe_names(names),
            vec!["a.jpeg", "b.jpeg", "a-2.jpeg", "a-3.jpeg"]
        );
    }

    #[test]
    fn dedupe_skips_names_already_taken() {
        let names = vec![
            "a.png".to_string(),
            "a-2.png".to_string(),
            "a.png".to_string(),
        ];
        assert_eq!(dedupe_names(names), vec!["a.png", "a-2.png", "a-3.png"]);
    }

    #[test]
    fn dedupe_handles_names_without_extension() {
        let names = vec!["x".to_string(), "x".to_string()];
        assert_eq!(dedupe_names(names), vec!["x", "x-2"]);
    }
}
