//! Configuration structures for voucher extraction.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Result, VoucherError};
use crate::extract::ExtractionMode;
use crate::input::DEFAULT_ALLOWED_EXTENSIONS;
use crate::models::voucher::{DEFAULT_LOCATION, DEFAULT_PACKAGE, DEFAULT_PRICE};

/// Main configuration for the voucher tools.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VoucherConfig {
    /// Flexible (label-driven) extraction configuration.
    pub extraction: ExtractionConfig,

    /// Rigid positional extraction configuration.
    pub positional: PositionalConfig,

    /// Input file configuration.
    pub input: InputConfig,
}

/// Extraction thresholds and record defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Minimum accumulated confidence for a block to become a record.
    pub min_confidence: u32,

    /// Package label when a block names none.
    pub default_package: String,

    /// Price label when a block names none.
    pub default_price: String,

    /// Sale location assigned to every extracted record.
    pub default_location: String,

    /// Strategy used when the caller does not pick one.
    pub default_mode: ExtractionMode,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            min_confidence: 50,
            default_package: DEFAULT_PACKAGE.to_string(),
            default_price: DEFAULT_PRICE.to_string(),
            default_location: DEFAULT_LOCATION.to_string(),
            default_mode: ExtractionMode::Flexible,
        }
    }
}

/// Lookahead windows of the positional layout, counted from the line after
/// the username.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionalConfig {
    /// Lines searched for the `password` label.
    pub password_window: usize,

    /// Lines searched for the package and price lines.
    pub detail_window: usize,
}

impl Default for PositionalConfig {
    fn default() -> Self {
        Self {
            password_window: 4,
            detail_window: 6,
        }
    }
}

/// Input file handling.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Accepted file extensions, without the dot.
    pub allowed_extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            allowed_extensions: DEFAULT_ALLOWED_EXTENSIONS
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
        }
    }
}

impl VoucherConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            VoucherError::Config(format!("{}: {}", path.display(), e))
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| VoucherError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = VoucherConfig::default();
        assert_eq!(config.extraction.min_confidence, 50);
        assert_eq!(config.extraction.default_package, "3GB");
        assert_eq!(config.extraction.default_price, "0000 Afn");
        assert_eq!(config.extraction.default_mode, ExtractionMode::Flexible);
        assert_eq!(config.positional, PositionalConfig { password_window: 4, detail_window: 6 });
        assert_eq!(config.input.allowed_extensions, vec!["txt", "csv", "text", "pdf"]);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config: VoucherConfig =
            serde_json::from_str(r#"{"extraction": {"min_confidence": 80}}"#).unwrap();
        assert_eq!(config.extraction.min_confidence, 80);
        assert_eq!(config.extraction.default_price, "0000 Afn");
        assert_eq!(config.positional.detail_window, 6);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");

        let mut config = VoucherConfig::default();
        config.extraction.default_location = "Dasht-e-Barchi".to_string();
        config.positional.password_window = 3;
        config.save(&path).unwrap();

        let loaded = VoucherConfig::from_file(&path).unwrap();
        assert_eq!(loaded.extraction.default_location, "Dasht-e-Barchi");
        assert_eq!(loaded.positional.password_window, 3);
    }

    #[test]
    fn test_invalid_file_is_config_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "not json").unwrap();

        assert!(matches!(VoucherConfig::from_file(&path), Err(VoucherError::Config(_))));
    }
}
