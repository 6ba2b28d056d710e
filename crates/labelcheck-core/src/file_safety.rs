//! Upload checks: extension allow-list and declared media type detection.

use once_cell::sync::Lazy;
use std::collections::HashSet;

use crate::defaults::ALLOWED_EXTENSIONS;
use crate::error::{Error, Result};

/// MIME type for `.docx` uploads.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

static ALLOWED: Lazy<HashSet<&'static str>> =
    Lazy::new(|| ALLOWED_EXTENSIONS.iter().copied().collect());

/// Lower-cased extension of `filename`, if it has one.
pub fn extension(filename: &str) -> Option<String> {
    let (stem, ext) = filename.rsplit_once('.')?;
    if stem.is_empty() || ext.is_empty() {
        return None;
    }
    Some(ext.to_lowercase())
}

/// Reject anything that is not a `.pdf` or `.docx` file (case-insensitive).
pub fn ensure_supported_extension(filename: &str) -> Result<()> {
    match extension(filename) {
        Some(ext) if ALLOWED.contains(ext.as_str()) => Ok(()),
        _ => Err(Error::UnsupportedFileType(format!(
            "{} (expected one of: {})",
            filename,
            ALLOWED_EXTENSIONS.join(", ")
        ))),
    }
}

/// Media type declared on upload.
///
/// Magic bytes win. A `.docx` sniffs as a generic zip archive, so that case
/// falls through to the extension mapping.
pub fn detect_media_type(filename: &str, data: &[u8]) -> String {
    if let Some(kind) = infer::get(data) {
        let mime = kind.mime_type();
        if mime != "application/zip" {
            return mime.to_string();
        }
    }

    match extension(filename).as_deref() {
        Some("pdf") => "application/pdf".to_string(),
        Some("docx") => DOCX_MIME.to_string(),
        _ => "application/octet-stream".to_string(),
    }
}
