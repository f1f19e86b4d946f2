//! Core library for Wi-Fi voucher extraction.
//!
//! This crate provides:
//! - Decoding of uploaded voucher exports (plain text, CSV, PDF)
//! - Label-driven and positional account extraction
//! - Voucher data models and configuration
//! - Search, duplicate checks and export of extracted records

pub mod catalog;
pub mod error;
pub mod export;
pub mod extract;
pub mod input;
pub mod models;

pub use error::{InputReadError, Result, VoucherError};
pub use extract::{
    extract, is_valid_credential, ExtractionMode, ExtractionReport, IdGenerator, VoucherExtractor,
};
pub use input::{is_allowed_file, read_text, InputKind};
pub use models::config::VoucherConfig;
pub use models::voucher::{VoucherCandidate, VoucherRecord, VoucherStatus};
