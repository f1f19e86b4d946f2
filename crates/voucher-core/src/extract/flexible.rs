//! Label-driven voucher extraction with confidence scoring.
//!
//! Lines are fed through a two-state automaton. A block opens on a start
//! signal (`username`, `user:`, the Persian account labels), every line of the
//! block is scanned for labeled fields, and the block closes on an end marker
//! (`---`, `===`, `...`, `end`) or when the *next* line opens a new block.

use tracing::trace;

use super::credential::is_valid_credential;
use super::identity::IdGenerator;
use super::patterns::{
    BLOCK_END, BLOCK_START, PACKAGE_FIELD, PASSWORD_FIELD, PRICE_FIELD, USERNAME_FIELD,
};
use super::{split_lines, RecordFactory, ScanStats};
use crate::models::voucher::{VoucherCandidate, VoucherRecord};

/// Confidence added by a recognized username.
pub const USERNAME_POINTS: u32 = 30;
/// Confidence added by a recognized password.
pub const PASSWORD_POINTS: u32 = 30;
/// Confidence added by a recognized package.
pub const PACKAGE_POINTS: u32 = 20;
/// Confidence added by a recognized price.
pub const PRICE_POINTS: u32 = 20;

/// Scanner state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanState {
    /// Between account blocks.
    Outside,
    /// Inside a block, accumulating its fields.
    InBlock(VoucherCandidate),
}

/// Line-oriented block scanner.
///
/// `step` consumes one line together with a peek at the following one and
/// returns a candidate each time a block closes and passes validation.
pub struct BlockScanner<'a> {
    state: ScanState,
    ids: &'a dyn IdGenerator,
    min_confidence: u32,
    stats: ScanStats,
}

impl<'a> BlockScanner<'a> {
    pub fn new(ids: &'a dyn IdGenerator, min_confidence: u32) -> Self {
        Self {
            state: ScanState::Outside,
            ids,
            min_confidence,
            stats: ScanStats::default(),
        }
    }

    pub fn state(&self) -> &ScanState {
        &self.state
    }

    /// Feed one trimmed, non-empty line.
    pub fn step(&mut self, line: &str, next: Option<&str>) -> Option<VoucherCandidate> {
        self.stats.lines += 1;

        if self.state == ScanState::Outside && is_block_start(line) {
            self.stats.blocks_seen += 1;
            self.state = ScanState::InBlock(VoucherCandidate::with_id(self.ids.next_id()));
        }

        let closes = match &mut self.state {
            ScanState::Outside => return None,
            ScanState::InBlock(candidate) => {
                extract_fields(line, candidate);
                is_block_end(line) || next.is_some_and(is_block_start)
            }
        };

        if !closes {
            return None;
        }

        match std::mem::replace(&mut self.state, ScanState::Outside) {
            ScanState::InBlock(candidate) => self.accept(candidate),
            ScanState::Outside => None,
        }
    }

    /// Close a block left open at end of input.
    pub fn finish(mut self) -> (Option<VoucherCandidate>, ScanStats) {
        let last = match std::mem::replace(&mut self.state, ScanState::Outside) {
            ScanState::InBlock(candidate) => self.accept(candidate),
            ScanState::Outside => None,
        };
        (last, self.stats)
    }

    fn accept(&mut self, candidate: VoucherCandidate) -> Option<VoucherCandidate> {
        if validate_candidate(&candidate, self.min_confidence) {
            Some(candidate)
        } else {
            self.stats.blocks_dropped += 1;
            trace!(
                "Dropping block {:?} (confidence {})",
                candidate.id,
                candidate.confidence_score
            );
            None
        }
    }
}

/// Whether a line opens an account block.
pub fn is_block_start(line: &str) -> bool {
    BLOCK_START.is_match(line)
}

/// Whether a line closes an account block.
pub fn is_block_end(line: &str) -> bool {
    BLOCK_END.is_match(line)
}

/// Apply the field rules to one line. Fields already set are kept.
pub fn extract_fields(line: &str, candidate: &mut VoucherCandidate) {
    if candidate.username.is_none() {
        if let Some(caps) = USERNAME_FIELD.captures(line) {
            candidate.username = Some(caps[1].to_string());
            candidate.add_confidence(USERNAME_POINTS);
        }
    }

    if candidate.password.is_none() {
        if let Some(caps) = PASSWORD_FIELD.captures(line) {
            candidate.password = Some(caps[1].to_string());
            candidate.add_confidence(PASSWORD_POINTS);
        }
    }

    if candidate.package_label.is_none() {
        if let Some(caps) = PACKAGE_FIELD.captures(line) {
            candidate.package_label = Some(format!("{}GB", &caps[1]));
            candidate.add_confidence(PACKAGE_POINTS);
        }
    }

    if candidate.price_label.is_none() {
        if let Some(caps) = PRICE_FIELD.captures(line) {
            candidate.price_label = Some(format!("{} Afn", &caps[1]));
            candidate.add_confidence(PRICE_POINTS);
        }
    }
}

/// Both credentials present and well-formed, and enough confidence.
pub fn validate_candidate(candidate: &VoucherCandidate, min_confidence: u32) -> bool {
    let (Some(username), Some(password)) = (&candidate.username, &candidate.password) else {
        return false;
    };

    is_valid_credential(username)
        && is_valid_credential(password)
        && candidate.confidence_score >= min_confidence
}

/// Extract vouchers from free-form labeled text.
pub fn extract_flexible(
    text: &str,
    min_confidence: u32,
    factory: &RecordFactory<'_>,
) -> (Vec<VoucherRecord>, ScanStats) {
    let lines = split_lines(text);
    let mut scanner = BlockScanner::new(factory.id_generator(), min_confidence);
    let mut records = Vec::new();

    for (i, line) in lines.iter().enumerate() {
        let next = lines.get(i + 1).copied();
        if let Some(candidate) = scanner.step(line, next) {
            records.extend(factory.finalize(candidate));
        }
    }

    let (last, stats) = scanner.finish();
    if let Some(candidate) = last {
        records.extend(factory.finalize(candidate));
    }

    (records, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::identity::{FixedClock, SequentialIdGenerator};
    use crate::models::config::ExtractionConfig;
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    fn run(text: &str) -> (Vec<VoucherRecord>, ScanStats) {
        let config = ExtractionConfig::default();
        let ids = SequentialIdGenerator::default();
        let clock = FixedClock(DateTime::from_timestamp(1_700_000_000, 0).unwrap());
        let factory = RecordFactory::new(&config, &ids, &clock);
        extract_flexible(text, config.min_confidence, &factory)
    }

    #[test]
    fn test_block_signals() {
        assert!(is_block_start("Username: a1234b"));
        assert!(is_block_start("USER: a1234b"));
        assert!(is_block_start("نام کاربری: a1234b"));
        assert!(is_block_start("مشخصات اکانت"));
        assert!(!is_block_start("Password: c5678d"));

        assert!(is_block_end("---"));
        assert!(is_block_end("====="));
        assert!(is_block_end("..."));
        assert!(is_block_end("END"));
        assert!(is_block_end("پایان"));
        assert!(!is_block_end("3GB"));
    }

    #[test]
    fn test_extract_fields_first_match_wins() {
        let mut candidate = VoucherCandidate::default();
        extract_fields("Username: a1234b", &mut candidate);
        extract_fields("Username: z9999z", &mut candidate);
        extract_fields("pass c5678d", &mut candidate);
        extract_fields("5 گیگ", &mut candidate);
        extract_fields("250 افغانی", &mut candidate);

        assert_eq!(candidate.username.as_deref(), Some("a1234b"));
        assert_eq!(candidate.password.as_deref(), Some("c5678d"));
        assert_eq!(candidate.package_label.as_deref(), Some("5GB"));
        assert_eq!(candidate.price_label.as_deref(), Some("250 Afn"));
        assert_eq!(candidate.confidence_score, 100);
    }

    #[test]
    fn test_extract_fields_case_insensitive() {
        let mut candidate = VoucherCandidate::default();
        extract_fields("USERNAME:A1234B PASSWORD:C5678D 10gb 300 AFN", &mut candidate);

        assert_eq!(candidate.username.as_deref(), Some("A1234B"));
        assert_eq!(candidate.password.as_deref(), Some("C5678D"));
        assert_eq!(candidate.package_label.as_deref(), Some("10GB"));
        assert_eq!(candidate.price_label.as_deref(), Some("300 Afn"));
    }

    #[test]
    fn test_validate_candidate() {
        let mut candidate = VoucherCandidate {
            username: Some("a1234b".to_string()),
            password: Some("c5678d".to_string()),
            confidence_score: 60,
            ..VoucherCandidate::default()
        };
        assert!(validate_candidate(&candidate, 50));
        assert!(!validate_candidate(&candidate, 70));

        candidate.password = Some("c5678dd".to_string());
        assert!(!validate_candidate(&candidate, 50));

        candidate.password = None;
        assert!(!validate_candidate(&candidate, 0));
    }

    #[test]
    fn test_scanner_lookahead_closes_block() {
        let ids = SequentialIdGenerator::default();
        let mut scanner = BlockScanner::new(&ids, 50);

        assert_eq!(scanner.step("Username: a1234b", Some("Password: c5678d")), None);
        assert!(matches!(scanner.state(), ScanState::InBlock(_)));

        // The next line opens another block, so this one closes now
        let closed = scanner.step("Password: c5678d", Some("Username: e1111f"));
        assert_eq!(scanner.state(), &ScanState::Outside);

        let closed = closed.unwrap();
        assert_eq!(closed.id.as_deref(), Some("acc_1"));
        assert_eq!(closed.username.as_deref(), Some("a1234b"));
        assert_eq!(closed.confidence_score, 60);
    }

    #[test]
    fn test_scanner_ignores_lines_outside_blocks() {
        let ids = SequentialIdGenerator::default();
        let mut scanner = BlockScanner::new(&ids, 50);

        assert_eq!(scanner.step("Password: c5678d", None), None);
        assert_eq!(scanner.state(), &ScanState::Outside);

        let (last, stats) = scanner.finish();
        assert_eq!(last, None);
        assert_eq!(stats.blocks_seen, 0);
        assert_eq!(stats.lines, 1);
    }

    #[test]
    fn test_basic_block() {
        let text = "Username: a1234b\nPassword: c5678d\n3GB\n500 Afn\n---\n";
        let (records, stats) = run(text);

        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.username(), "a1234b");
        assert_eq!(record.password(), "c5678d");
        assert_eq!(record.package_label(), "3GB");
        assert_eq!(record.price_label(), "500 Afn");
        assert_eq!(record.confidence_score(), 100);
        assert_eq!(record.id(), "acc_1");
        assert_eq!(stats.blocks_seen, 1);
        assert_eq!(stats.blocks_dropped, 0);
    }

    #[test]
    fn test_label_only_blocks_yield_nothing() {
        let (records, stats) = run("Username:\nUsername:\n");
        assert!(records.is_empty());
        assert_eq!(stats.blocks_seen, 2);
        assert_eq!(stats.blocks_dropped, 2);
    }

    #[test]
    fn test_missing_password_drops_block() {
        let text = "Username: a1234b\n10GB\n900 Afn\n---\nUsername: e1111f\nPassword: g2222h\n";
        let (records, stats) = run(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].username(), "e1111f");
        assert_eq!(stats.blocks_dropped, 1);
    }

    #[test]
    fn test_defaults_applied_without_trailing_marker() {
        let (records, _) = run("user: k9131q\npass: a8338g");

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].package_label(), "3GB");
        assert_eq!(records[0].price_label(), "0000 Afn");
        assert_eq!(records[0].location(), "برچی");
        assert_eq!(records[0].confidence_score(), 60);
    }

    #[test]
    fn test_persian_labels() {
        let text = "نام کاربری: a1234b\nرمز: c5678d\n3 گیگابایت\n100 ریال\nپایان";
        let (records, _) = run(text);

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].password(), "c5678d");
        assert_eq!(records[0].package_label(), "3GB");
        assert_eq!(records[0].price_label(), "100 Afn");
    }

    #[test]
    fn test_identical_usernames_each_emit() {
        let text = "Username: a1234b\nPassword: c5678d\n---\nUsername: a1234b\nPassword: c5678d\n---";
        let (records, _) = run(text);

        assert_eq!(records.len(), 2);
        assert_ne!(records[0].id(), records[1].id());
        assert!(records[0].same_voucher(&records[1]));
    }

    #[test]
    fn test_no_blocks() {
        let (records, stats) = run("hello\nnothing to see here\n\n");
        assert!(records.is_empty());
        assert_eq!(stats.lines, 2);
    }
}
