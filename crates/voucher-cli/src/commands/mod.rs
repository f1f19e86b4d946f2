//! Subcommands and the helpers they share.

pub mod batch;
pub mod config;
pub mod extract;

use std::path::{Path, PathBuf};

use tracing::debug;

use voucher_core::export::ExportFormat;
use voucher_core::input::{decode_text, file_extension, is_allowed_with};
use voucher_core::{ExtractionMode, InputKind, InputReadError, VoucherConfig};

/// Output format of extracted records.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    /// JSON array of records
    Json,
    /// CSV with a header row
    Csv,
    /// Labeled plain-text blocks
    Txt,
}

impl From<OutputFormat> for ExportFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Json => ExportFormat::Json,
            OutputFormat::Csv => ExportFormat::Csv,
            OutputFormat::Txt => ExportFormat::Txt,
        }
    }
}

/// Extraction strategy.
#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum ModeArg {
    /// Label-driven blocks with confidence scoring
    Flexible,
    /// Fixed "User Name" / "Password" layout
    Positional,
    /// Flexible, falling back to positional when nothing is found
    Auto,
}

impl From<ModeArg> for ExtractionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Flexible => ExtractionMode::Flexible,
            ModeArg::Positional => ExtractionMode::Positional,
            ModeArg::Auto => ExtractionMode::Auto,
        }
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("voucher")
        .join("config.json")
}

/// Configuration file path: `--config` if given, else the default location.
pub fn config_file(config_path: Option<&str>) -> PathBuf {
    config_path.map(PathBuf::from).unwrap_or_else(default_config_path)
}

/// Load configuration from `--config`, else from the default location,
/// else built-in defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<VoucherConfig> {
    if let Some(path) = config_path {
        return Ok(VoucherConfig::from_file(Path::new(path))?);
    }

    let path = default_config_path();
    if path.exists() {
        debug!("Loading configuration from {}", path.display());
        Ok(VoucherConfig::from_file(&path)?)
    } else {
        Ok(VoucherConfig::default())
    }
}

/// Check a file against the allow-list, read it and decode it to text.
pub async fn read_input(path: &Path, config: &VoucherConfig) -> anyhow::Result<String> {
    let name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
    if !is_allowed_with(name, &config.input.allowed_extensions) {
        return Err(InputReadError::UnsupportedType(file_extension(path).unwrap_or_default()).into());
    }

    // Extra extensions allowed through config are read as plain text
    let kind = InputKind::from_path(path).unwrap_or(InputKind::Text);

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|source| InputReadError::Io {
            path: path.to_path_buf(),
            source,
        })?;

    debug!("Read {} bytes from {}", bytes.len(), path.display());

    Ok(decode_text(&bytes, kind)?)
}
