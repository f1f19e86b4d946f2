//! Input sources: file-type allow-list and text decoding.
//!
//! Plain text exports come straight from the admin panel's file picker;
//! PDF exports are decoded to text first.

use std::path::Path;

use tracing::debug;

use crate::error::InputReadError;

/// Extensions accepted by default.
pub const DEFAULT_ALLOWED_EXTENSIONS: [&str; 4] = ["txt", "csv", "text", "pdf"];

/// How the bytes of an input are turned into text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// UTF-8 text (`.txt`, `.csv`, `.text`).
    Text,
    /// PDF document.
    Pdf,
}

impl InputKind {
    /// Map a file extension (without the dot) to an input kind.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "txt" | "csv" | "text" => Some(InputKind::Text),
            "pdf" => Some(InputKind::Pdf),
            _ => None,
        }
    }

    /// Input kind of a file name or path.
    pub fn from_path(path: &Path) -> Option<Self> {
        file_extension(path).and_then(|ext| Self::from_extension(&ext))
    }
}

/// Lowercased extension of a path.
pub fn file_extension(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

/// Check a file name against the default allow-list.
pub fn is_allowed_file(name: &str) -> bool {
    file_extension(Path::new(name))
        .is_some_and(|ext| DEFAULT_ALLOWED_EXTENSIONS.contains(&ext.as_str()))
}

/// Check a file name against a configured allow-list.
pub fn is_allowed_with(name: &str, allowed: &[String]) -> bool {
    file_extension(Path::new(name))
        .is_some_and(|ext| allowed.iter().any(|a| a.trim_start_matches('.').eq_ignore_ascii_case(&ext)))
}

/// Decode raw bytes into text.
pub fn decode_text(bytes: &[u8], kind: InputKind) -> Result<String, InputReadError> {
    match kind {
        InputKind::Text => {
            let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
            String::from_utf8(bytes.to_vec()).map_err(|e| InputReadError::Decode(e.to_string()))
        }
        InputKind::Pdf => decode_pdf(bytes),
    }
}

#[cfg(feature = "native")]
fn decode_pdf(bytes: &[u8]) -> Result<String, InputReadError> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| InputReadError::Pdf(e.to_string()))
}

#[cfg(not(feature = "native"))]
fn decode_pdf(_bytes: &[u8]) -> Result<String, InputReadError> {
    Err(InputReadError::UnsupportedType("pdf".to_string()))
}

/// Read a file in full and decode it according to its extension.
pub fn read_text(path: &Path) -> Result<String, InputReadError> {
    let kind = InputKind::from_path(path).ok_or_else(|| {
        InputReadError::UnsupportedType(file_extension(path).unwrap_or_default())
    })?;

    let bytes = std::fs::read(path).map_err(|source| InputReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    debug!("Read {} bytes from {}", bytes.len(), path.display());
    decode_text(&bytes, kind)
}
