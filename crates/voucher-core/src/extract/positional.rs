//! Rigid positional voucher extraction.
//!
//! Targets exports laid out one value per line:
//!
//! ```text
//! user name
//! x1111y
//! password
//! z2222w
//! 3GB
//! 0000 Afn
//! ```
//!
//! There is no scoring here: a layout either yields two well-formed
//! credentials or nothing.

use super::credential::is_valid_credential;
use super::patterns::{PASSWORD_LABEL, USER_NAME_LABEL};
use super::{split_lines, RecordFactory, ScanStats};
use crate::models::config::PositionalConfig;
use crate::models::voucher::{MAX_CONFIDENCE, VoucherCandidate, VoucherRecord};

/// Extract vouchers from text following the positional layout.
pub fn extract_positional(
    text: &str,
    config: &PositionalConfig,
    factory: &RecordFactory<'_>,
) -> (Vec<VoucherRecord>, ScanStats) {
    let lines = split_lines(text);
    let mut records = Vec::new();
    let mut stats = ScanStats {
        lines: lines.len(),
        ..ScanStats::default()
    };

    // A label needs at least `password_window` lines after it
    for i in 0..lines.len() {
        if i + config.password_window >= lines.len() {
            break;
        }
        if !USER_NAME_LABEL.is_match(lines[i]) {
            continue;
        }

        stats.blocks_seen += 1;
        match read_layout(&lines, i, config) {
            Some(candidate) => records.extend(factory.finalize(candidate)),
            None => stats.blocks_dropped += 1,
        }
    }

    (records, stats)
}

/// Read the layout that starts with the `user name` label at `label`.
fn read_layout(lines: &[&str], label: usize, config: &PositionalConfig) -> Option<VoucherCandidate> {
    let username = *lines.get(label + 1)?;

    let search_start = label + 2;
    let password_end = (search_start + config.password_window).min(lines.len());
    let password_label = (search_start..password_end).find(|&j| PASSWORD_LABEL.is_match(lines[j]))?;
    let password = *lines.get(password_label + 1)?;

    if !is_valid_credential(username) || !is_valid_credential(password) {
        return None;
    }

    let detail_end = (search_start + config.detail_window).min(lines.len());
    let details = lines.get(search_start..detail_end).unwrap_or_default();
    let package = details.iter().find(|l| l.contains("GB") || l.contains("MB"));
    let price = details.iter().find(|l| l.contains("Afn"));

    Some(VoucherCandidate {
        id: None,
        username: Some(username.to_string()),
        password: Some(password.to_string()),
        package_label: package.map(|l| l.to_string()),
        price_label: price.map(|l| l.to_string()),
        location: None,
        confidence_score: MAX_CONFIDENCE,
    })
}
