//! Upload validation.
//!
//! Uploads must be non-empty PDFs within the size limit. The file name is
//! only used to derive a default title.

use std::path::Path;

use crate::defaults::UNTITLED_PAPER;
use crate::error::{Error, Result};

/// Magic bytes every PDF starts with.
pub const PDF_MAGIC: &[u8] = b"%PDF";

/// Check that an upload is a non-empty PDF within `max_size_bytes`.
pub fn validate_upload(filename: &str, data: &[u8], max_size_bytes: usize) -> Result<()> {
    if data.is_empty() {
        return Err(Error::InvalidInput("Uploaded file is empty".to_string()));
    }
    if data.len() > max_size_bytes {
        return Err(Error::InvalidInput(format!(
            "File exceeds maximum size of {} bytes",
            max_size_bytes
        )));
    }
    if !data.starts_with(PDF_MAGIC) {
        return Err(Error::InvalidInput(format!(
            "{} is not a PDF document",
            sanitize_filename(filename)
        )));
    }
    Ok(())
}

/// Sanitize filename for display and logging.
pub fn sanitize_filename(filename: &str) -> String {
    // Remove path components
    let name = filename.rsplit(['/', '\\']).next().unwrap_or(filename);

    let sanitized: String = name
        .chars()
        .map(|c| match c {
            '<' | '>' | ':' | '"' | '|' | '?' | '*' | '\0' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();

    let sanitized = sanitized.trim();
    if sanitized.is_empty() {
        return "unnamed_file".to_string();
    }
    sanitized.chars().take(255).collect()
}

/// Default title for an upload: the file stem with `_`/`-` read as spaces.
pub fn title_from_filename(filename: &str) -> String {
    let name = sanitize_filename(filename);
    let stem = Path::new(&name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let title = stem
        .replace(['_', '-'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if title.is_empty() || name == "unnamed_file" {
        UNTITLED_PAPER.to_string()
    } else {
        title
    }
}
