//! Voucher extraction from uploaded text.
//!
//! Two independent strategies are provided:
//! - [`flexible`]: label-driven, confidence-scored block scanning for
//!   free-form exports.
//! - [`positional`]: a rigid one-value-per-line layout.
//!
//! They share only the credential shape check. [`VoucherExtractor`] bundles
//! configuration, id generation and the clock, and lets the caller pick a
//! strategy through [`ExtractionMode`].

mod credential;
pub mod flexible;
mod identity;
pub mod patterns;
pub mod positional;

pub use credential::is_valid_credential;
pub use flexible::{extract_flexible, BlockScanner, ScanState};
pub use identity::{Clock, CounterIdGenerator, FixedClock, IdGenerator, SequentialIdGenerator, SystemClock};
pub use positional::extract_positional;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::models::config::{ExtractionConfig, PositionalConfig, VoucherConfig};
use crate::models::voucher::{MAX_CONFIDENCE, VoucherCandidate, VoucherRecord, VoucherStatus};

/// Extraction strategy.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMode {
    /// Label-driven block scanning.
    #[default]
    Flexible,
    /// Fixed one-value-per-line layout.
    Positional,
    /// Flexible first; positional only if the flexible pass found nothing.
    Auto,
}

impl ExtractionMode {
    /// Parse a mode name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "flexible" => Some(ExtractionMode::Flexible),
            "positional" => Some(ExtractionMode::Positional),
            "auto" => Some(ExtractionMode::Auto),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionMode::Flexible => "flexible",
            ExtractionMode::Positional => "positional",
            ExtractionMode::Auto => "auto",
        }
    }
}

impl std::fmt::Display for ExtractionMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Counters collected during one scan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ScanStats {
    /// Non-empty lines scanned.
    pub lines: usize,
    /// Account blocks (or positional layouts) that were opened.
    pub blocks_seen: usize,
    /// Blocks dropped by validation.
    pub blocks_dropped: usize,
}

/// Result of one extraction run.
#[derive(Debug, Clone, Serialize)]
pub struct ExtractionReport {
    /// Extracted records, in input order.
    pub records: Vec<VoucherRecord>,
    /// Strategy that produced `records`.
    pub mode: ExtractionMode,
    /// Scan counters of that strategy.
    pub stats: ScanStats,
}

impl ExtractionReport {
    /// Number of extracted records.
    pub fn count(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// Turns validated candidates into records: applies defaults, clamps the
/// confidence, stamps the extraction time and fills in a missing id.
pub struct RecordFactory<'a> {
    defaults: &'a ExtractionConfig,
    ids: &'a dyn IdGenerator,
    clock: &'a dyn Clock,
}

impl<'a> RecordFactory<'a> {
    pub fn new(defaults: &'a ExtractionConfig, ids: &'a dyn IdGenerator, clock: &'a dyn Clock) -> Self {
        Self { defaults, ids, clock }
    }

    pub fn id_generator(&self) -> &'a dyn IdGenerator {
        self.ids
    }

    /// Finalize a candidate. Returns `None` if either credential is missing.
    pub fn finalize(&self, candidate: VoucherCandidate) -> Option<VoucherRecord> {
        let username = candidate.username?;
        let password = candidate.password?;
        let confidence = candidate.confidence_score.min(MAX_CONFIDENCE);

        Some(VoucherRecord {
            id: candidate.id.unwrap_or_else(|| self.ids.next_id()),
            username,
            password,
            package_label: candidate
                .package_label
                .unwrap_or_else(|| self.defaults.default_package.clone()),
            price_label: candidate
                .price_label
                .unwrap_or_else(|| self.defaults.default_price.clone()),
            location: candidate
                .location
                .unwrap_or_else(|| self.defaults.default_location.clone()),
            status: VoucherStatus::Available,
            confidence_score: u8::try_from(confidence).unwrap_or(u8::MAX),
            extracted_at: self.clock.now(),
        })
    }
}

/// Split text into trimmed, non-empty lines, preserving order.
pub(crate) fn split_lines(text: &str) -> Vec<&str> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .collect()
}

/// Configurable voucher extractor.
pub struct VoucherExtractor {
    config: ExtractionConfig,
    positional: PositionalConfig,
    ids: Box<dyn IdGenerator>,
    clock: Box<dyn Clock>,
}

impl VoucherExtractor {
    /// Create an extractor with default settings.
    pub fn new() -> Self {
        Self {
            config: ExtractionConfig::default(),
            positional: PositionalConfig::default(),
            ids: Box::new(CounterIdGenerator::new()),
            clock: Box::new(SystemClock),
        }
    }

    /// Create an extractor from a loaded configuration.
    pub fn from_config(config: &VoucherConfig) -> Self {
        Self {
            config: config.extraction.clone(),
            positional: config.positional,
            ..Self::new()
        }
    }

    /// Set the minimum confidence a block needs to become a record.
    pub fn with_min_confidence(mut self, min_confidence: u32) -> Self {
        self.config.min_confidence = min_confidence;
        self
    }

    /// Set the positional lookahead windows.
    pub fn with_positional(mut self, positional: PositionalConfig) -> Self {
        self.positional = positional;
        self
    }

    /// Replace the id generator.
    pub fn with_id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Box::new(ids);
        self
    }

    /// Replace the clock.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn config(&self) -> &ExtractionConfig {
        &self.config
    }

    fn factory(&self) -> RecordFactory<'_> {
        RecordFactory::new(&self.config, self.ids.as_ref(), self.clock.as_ref())
    }

    /// Run the flexible extractor.
    pub fn extract(&self, text: &str) -> Vec<VoucherRecord> {
        self.run(text, ExtractionMode::Flexible).records
    }

    /// Run the positional extractor.
    pub fn extract_positional(&self, text: &str) -> Vec<VoucherRecord> {
        self.run(text, ExtractionMode::Positional).records
    }

    /// Run the configured default strategy.
    pub fn extract_default(&self, text: &str) -> ExtractionReport {
        self.run(text, self.config.default_mode)
    }

    /// Run one strategy and report counters alongside the records.
    pub fn run(&self, text: &str, mode: ExtractionMode) -> ExtractionReport {
        info!("Extracting vouchers ({}) from {} characters of text", mode, text.len());

        let factory = self.factory();
        let (records, stats, used) = match mode {
            ExtractionMode::Flexible => {
                let (records, stats) = extract_flexible(text, self.config.min_confidence, &factory);
                (records, stats, ExtractionMode::Flexible)
            }
            ExtractionMode::Positional => {
                let (records, stats) = extract_positional(text, &self.positional, &factory);
                (records, stats, ExtractionMode::Positional)
            }
            ExtractionMode::Auto => {
                let (records, stats) = extract_flexible(text, self.config.min_confidence, &factory);
                if records.is_empty() {
                    debug!("No labeled blocks found, trying positional layout");
                    let (records, stats) = extract_positional(text, &self.positional, &factory);
                    (records, stats, ExtractionMode::Positional)
                } else {
                    (records, stats, ExtractionMode::Flexible)
                }
            }
        };

        debug!(
            "Extracted {} vouchers from {} blocks ({} dropped)",
            records.len(),
            stats.blocks_seen,
            stats.blocks_dropped
        );

        ExtractionReport {
            records,
            mode: used,
            stats,
        }
    }
}

impl Default for VoucherExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Extract vouchers with the flexible strategy and default settings.
pub fn extract(text: &str) -> Vec<VoucherRecord> {
    VoucherExtractor::new().extract(text)
}
