//! Page file naming and path component sanitization.

use std::path::{Path, PathBuf};

use super::constants::{PAGE_EXTENSION, PARTIAL_SUFFIX};

/// Number of decimal digits needed to print `n`.
#[must_use]
pub fn digit_width(n: u32) -> usize {
    n.checked_ilog10().map_or(1, |log| log as usize + 1)
}

/// File name for `page`, zero-padded to the digit width of `last_page`.
///
/// `page_filename(7, 120)` is `007.jpg`.
#[must_use]
pub fn page_filename(page: u32, last_page: u32) -> String {
    let width = digit_width(last_page);
    format!("{page:0width$}.{PAGE_EXTENSION}")
}

/// Temporary sibling used while `path` is being written.
#[must_use]
pub fn partial_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".");
    name.push(PARTIAL_SUFFIX);
    path.with_file_name(name)
}

/// Makes a metadata value safe to use as a single directory name.
///
/// Characters that are invalid on common filesystems become `_`. Values that
/// would be empty or resolve to `.`/`..` become `_` so a manifest can never
/// direct writes outside the output root.
#[must_use]
pub fn sanitize_path_component(value: &str) -> String {
    let sanitized: String = value
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    if sanitized.is_empty() || sanitized.chars().all(|c| c == '.') {
        return "_".to_string();
    }
    sanitized
}
