//! Export of records to JSON, CSV and plain-text blocks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{Result, VoucherError};
use crate::models::voucher::VoucherRecord;

/// Export file format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
    Txt,
}

impl ExportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Some(ExportFormat::Json),
            "csv" => Some(ExportFormat::Csv),
            "txt" | "text" => Some(ExportFormat::Txt),
            _ => None,
        }
    }

    /// File extension, without the dot.
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Json => "json",
            ExportFormat::Csv => "csv",
            ExportFormat::Txt => "txt",
        }
    }
}

/// Render records in the given format.
pub fn export_records(records: &[VoucherRecord], format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => to_json(records),
        ExportFormat::Csv => to_csv(records),
        ExportFormat::Txt => Ok(to_txt(records)),
    }
}

/// Pretty-printed JSON array.
pub fn to_json(records: &[VoucherRecord]) -> Result<String> {
    serde_json::to_string_pretty(records).map_err(|e| VoucherError::Export(e.to_string()))
}

/// CSV with a `Username,Password,Type,Price,Location,Status` header.
pub fn to_csv(records: &[VoucherRecord]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["Username", "Password", "Type", "Price", "Location", "Status"])
        .map_err(|e| VoucherError::Export(e.to_string()))?;

    for record in records {
        wtr.write_record([
            record.username(),
            record.password(),
            record.package_label(),
            record.price_label(),
            record.location(),
            record.status().as_str(),
        ])
        .map_err(|e| VoucherError::Export(e.to_string()))?;
    }

    let data = wtr
        .into_inner()
        .map_err(|e| VoucherError::Export(e.to_string()))?;
    String::from_utf8(data).map_err(|e| VoucherError::Export(e.to_string()))
}

/// Labeled blocks separated by `---`, one per record.
///
/// The output is itself valid input for the flexible extractor.
pub fn to_txt(records: &[VoucherRecord]) -> String {
    records
        .iter()
        .map(|r| {
            format!(
                "Username: {}\nPassword: {}\nType: {}\nPrice: {}\nLocation: {}\nStatus: {}\n---\n",
                r.username(),
                r.password(),
                r.package_label(),
                r.price_label(),
                r.location(),
                r.status()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Dated export file name, e.g. `wifi_accounts_2024-06-01.csv`.
pub fn export_file_name(format: ExportFormat, date: NaiveDate) -> String {
    format!("wifi_accounts_{}.{}", date.format("%Y-%m-%d"), format.extension())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{FixedClock, SequentialIdGenerator, VoucherExtractor};
    use chrono::DateTime;
    use pretty_assertions::assert_eq;

    fn extractor() -> VoucherExtractor {
        VoucherExtractor::new()
            .with_id_generator(SequentialIdGenerator::default())
            .with_clock(FixedClock(DateTime::from_timestamp(1_700_000_000, 0).unwrap()))
    }

    fn sample() -> Vec<VoucherRecord> {
        extractor().extract("Username: a1234b\nPassword: c5678d\n3GB\n500 Afn\n---\nuser: e1111f\npass: g2222h")
    }

    #[test]
    fn test_csv() {
        let csv = to_csv(&sample()).unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines[0], "Username,Password,Type,Price,Location,Status");
        assert_eq!(lines[1], "a1234b,c5678d,3GB,500 Afn,برچی,available");
        assert_eq!(lines[2], "e1111f,g2222h,3GB,0000 Afn,برچی,available");
    }

    #[test]
    fn test_txt_layout() {
        let txt = to_txt(&sample()[..1]);
        assert_eq!(
            txt,
            "Username: a1234b\nPassword: c5678d\nType: 3GB\nPrice: 500 Afn\nLocation: برچی\nStatus: available\n---\n"
        );
    }

    #[test]
    fn test_txt_re_extracts() {
        let records = sample();
        let again = extractor().extract(&to_txt(&records));

        assert_eq!(again.len(), records.len());
        for (a, b) in records.iter().zip(&again) {
            assert_eq!(a.username(), b.username());
            assert_eq!(a.password(), b.password());
            assert_eq!(a.price_label(), b.price_label());
        }
    }

    #[test]
    fn test_json_round_trip() {
        let records = sample();
        let json = export_records(&records, ExportFormat::Json).unwrap();
        let back: Vec<VoucherRecord> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, records);
    }

    #[test]
    fn test_file_name() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        assert_eq!(export_file_name(ExportFormat::Csv, date), "wifi_accounts_2024-06-01.csv");
        assert_eq!(ExportFormat::from_str("TEXT"), Some(ExportFormat::Txt));
    }
}
