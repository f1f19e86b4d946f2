//! Search, filter and duplicate checks over extracted records.

use std::collections::HashSet;

use crate::models::voucher::{VoucherRecord, VoucherStatus};

/// Exact-match criteria; unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordFilter {
    pub package: Option<String>,
    pub location: Option<String>,
    pub status: Option<VoucherStatus>,
}

impl RecordFilter {
    pub fn matches(&self, record: &VoucherRecord) -> bool {
        self.package.as_deref().is_none_or(|p| record.package_label() == p)
            && self.location.as_deref().is_none_or(|l| record.location() == l)
            && self.status.is_none_or(|s| record.status() == s)
    }
}

/// Case-insensitive substring search on username, package and location.
///
/// A blank query returns every record.
pub fn search<'a>(records: &'a [VoucherRecord], query: &str) -> Vec<&'a VoucherRecord> {
    let term = query.trim().to_lowercase();
    if term.is_empty() {
        return records.iter().collect();
    }

    records
        .iter()
        .filter(|r| {
            r.username().to_lowercase().contains(&term)
                || r.package_label().to_lowercase().contains(&term)
                || r.location().to_lowercase().contains(&term)
        })
        .collect()
}

/// Records matching every criterion of `filter`.
pub fn filter<'a>(records: &'a [VoucherRecord], filter: &RecordFilter) -> Vec<&'a VoucherRecord> {
    records.iter().filter(|r| filter.matches(r)).collect()
}

/// Split records into (new, skipped) by username.
///
/// A record is skipped when its username is already saved or appeared
/// earlier in `records`.
pub fn split_duplicates<I, S>(
    records: Vec<VoucherRecord>,
    existing_usernames: I,
) -> (Vec<VoucherRecord>, Vec<VoucherRecord>)
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut seen: HashSet<String> = existing_usernames.into_iter().map(Into::into).collect();
    let mut fresh = Vec::new();
    let mut skipped = Vec::new();

    for record in records {
        if seen.insert(record.username().to_string()) {
            fresh.push(record);
        } else {
            skipped.push(record);
        }
    }

    (fresh, skipped)
}
