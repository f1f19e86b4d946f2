//! Error types for the voucher-core library.

use std::path::PathBuf;

use thiserror::Error;

/// Main error type for the voucher library.
#[derive(Error, Debug)]
pub enum VoucherError {
    /// The input source could not be read or decoded.
    #[error("input error: {0}")]
    Input(#[from] InputReadError),

    /// Export formatting failed.
    #[error("export error: {0}")]
    Export(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors raised while reading an uploaded voucher file.
///
/// These are kept apart from parse quality: a file that reads fine but holds
/// no usable account blocks is an empty result, not an error.
#[derive(Error, Debug)]
pub enum InputReadError {
    /// The file could not be read.
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The bytes are not valid UTF-8 text.
    #[error("input is not valid UTF-8: {0}")]
    Decode(String),

    /// Text extraction from a PDF document failed.
    #[error("failed to extract text from PDF: {0}")]
    Pdf(String),

    /// The file extension is not in the allow-list.
    #[error("unsupported file type: {0}")]
    UnsupportedType(String),
}

/// Result type for the voucher library.
pub type Result<T> = std::result::Result<T, VoucherError>;
