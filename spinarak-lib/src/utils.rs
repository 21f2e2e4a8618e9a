//! Utility functions for gathering links.
//!
//! Links may come from the command line or from a plain text file with one
//! link per line.

use crate::error::SpinarakError;
use std::fs;
use std::path::Path;

/// Parse a link list: one link per line.
///
/// Blank lines and lines starting with `#` are skipped, and anything after
/// an inline ` #` is dropped. Order and duplicates are preserved.
///
/// ```rust
/// use spinarak_lib::parse_links;
///
/// let text = "# pages to scan\nhttp://a.example\n\nhttp://b.example  # second\n";
/// assert_eq!(parse_links(text), vec!["http://a.example", "http://b.example"]);
/// ```
pub fn parse_links(text: &str) -> Vec<String> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| match line.find(" #") {
            Some(idx) => line[..idx].trim_end(),
            None => line,
        })
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Read links from a file.
///
/// # Errors
///
/// Returns `SpinarakError::FileError` if the file cannot be read and
/// `SpinarakError::InvalidInput` if it contains no links.
pub fn read_links_from_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>, SpinarakError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .map_err(|e| SpinarakError::file_error(path.to_string_lossy(), e.to_string()))?;

    let links = parse_links(&content);
    if links.is_empty() {
        return Err(SpinarakError::invalid_input(format!(
            "No links found in '{}'",
            path.display()
        )));
    }
    Ok(links)
}
