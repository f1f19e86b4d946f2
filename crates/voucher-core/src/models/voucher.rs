//! Voucher data models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::extract::is_valid_credential;

/// Package label used when a block names none.
pub const DEFAULT_PACKAGE: &str = "3GB";

/// Price label used when a block names none.
pub const DEFAULT_PRICE: &str = "0000 Afn";

/// Sale location used when a block names none (Barchi).
pub const DEFAULT_LOCATION: &str = "برچی";

/// Upper bound of a confidence score.
pub const MAX_CONFIDENCE: u32 = 100;

/// Sale status of a voucher.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoucherStatus {
    /// Not yet handed out.
    #[default]
    Available,
    /// Handed to a seller.
    Assigned,
    /// Sold to a customer.
    Sold,
}

impl VoucherStatus {
    /// Parse a status name.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "available" => Some(VoucherStatus::Available),
            "assigned" => Some(VoucherStatus::Assigned),
            "sold" => Some(VoucherStatus::Sold),
            _ => None,
        }
    }

    /// Wire name of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            VoucherStatus::Available => "available",
            VoucherStatus::Assigned => "assigned",
            VoucherStatus::Sold => "sold",
        }
    }
}

impl std::fmt::Display for VoucherStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Fields collected for one account block while it is being scanned.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoucherCandidate {
    /// Placeholder id assigned when the block opened.
    pub id: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    /// Package label, e.g. `3GB`.
    pub package_label: Option<String>,
    /// Price label, e.g. `500 Afn`.
    pub price_label: Option<String>,
    pub location: Option<String>,
    /// Accumulated score; may exceed 100 until finalized.
    pub confidence_score: u32,
}

impl VoucherCandidate {
    /// Create an empty candidate seeded with a placeholder id.
    pub fn with_id(id: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            ..Self::default()
        }
    }

    pub(crate) fn add_confidence(&mut self, points: u32) {
        self.confidence_score = self.confidence_score.saturating_add(points);
    }
}

/// A finalized voucher.
///
/// Records are only built by the extractors, after validation, and expose
/// read-only accessors. The serialized form uses camelCase keys so browser
/// code sees `packageLabel`, `priceLabel`, `confidenceScore`, `extractedAt`.
///
/// Deserialization re-checks the credential shape and the confidence range.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", try_from = "RecordFields")]
pub struct VoucherRecord {
    pub(crate) id: String,
    pub(crate) username: String,
    pub(crate) password: String,
    pub(crate) package_label: String,
    pub(crate) price_label: String,
    pub(crate) location: String,
    pub(crate) status: VoucherStatus,
    pub(crate) confidence_score: u8,
    pub(crate) extracted_at: DateTime<Utc>,
}

impl VoucherRecord {
    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> &str {
        &self.password
    }

    pub fn package_label(&self) -> &str {
        &self.package_label
    }

    pub fn price_label(&self) -> &str {
        &self.price_label
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn status(&self) -> VoucherStatus {
        self.status
    }

    /// Confidence in the range 0-100.
    pub fn confidence_score(&self) -> u8 {
        self.confidence_score
    }

    pub fn extracted_at(&self) -> DateTime<Utc> {
        self.extracted_at
    }

    /// Compare everything except the identity fields (id and timestamp).
    pub fn same_voucher(&self, other: &VoucherRecord) -> bool {
        self.username == other.username
            && self.password == other.password
            && self.package_label == other.package_label
            && self.price_label == other.price_label
            && self.location == other.location
            && self.status == other.status
            && self.confidence_score == other.confidence_score
    }
}

/// Unchecked wire form of a [`VoucherRecord`].
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecordFields {
    id: String,
    username: String,
    password: String,
    package_label: String,
    price_label: String,
    location: String,
    #[serde(default)]
    status: VoucherStatus,
    confidence_score: u8,
    extracted_at: DateTime<Utc>,
}

impl TryFrom<RecordFields> for VoucherRecord {
    type Error = String;

    fn try_from(fields: RecordFields) -> Result<Self, Self::Error> {
        if !is_valid_credential(&fields.username) {
            return Err(format!("invalid username: {:?}", fields.username));
        }
        if !is_valid_credential(&fields.password) {
            return Err(format!("invalid password for {}", fields.username));
        }
        if u32::from(fields.confidence_score) > MAX_CONFIDENCE {
            return Err(format!("confidence out of range: {}", fields.confidence_score));
        }

        Ok(Self {
            id: fields.id,
            username: fields.username,
            password: fields.password,
            package_label: fields.package_label,
            price_label: fields.price_label,
            location: fields.location,
            status: fields.status,
            confidence_score: fields.confidence_score,
            extracted_at: fields.extracted_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_status_round_trip_names() {
        for status in [VoucherStatus::Available, VoucherStatus::Assigned, VoucherStatus::Sold] {
            assert_eq!(VoucherStatus::from_str(status.as_str()), Some(status));
        }
        assert_eq!(VoucherStatus::from_str(" SOLD "), Some(VoucherStatus::Sold));
        assert_eq!(VoucherStatus::from_str("active"), None);
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let record = VoucherRecord {
            id: "acc_1".to_string(),
            username: "a1234b".to_string(),
            password: "c5678d".to_string(),
            package_label: "3GB".to_string(),
            price_label: "500 Afn".to_string(),
            location: DEFAULT_LOCATION.to_string(),
            status: VoucherStatus::Available,
            confidence_score: 100,
            extracted_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["packageLabel"], "3GB");
        assert_eq!(json["priceLabel"], "500 Afn");
        assert_eq!(json["confidenceScore"], 100);
        assert_eq!(json["status"], "available");
        assert_eq!(json["extractedAt"], "2023-11-14T22:13:20Z");

        let back: VoucherRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_deserialize_rejects_malformed_records() {
        let valid = serde_json::json!({
            "id": "acc_1",
            "username": "a1234b",
            "password": "c5678d",
            "packageLabel": "3GB",
            "priceLabel": "0000 Afn",
            "location": DEFAULT_LOCATION,
            "confidenceScore": 60,
            "extractedAt": "2023-11-14T22:13:20Z"
        });
        let record: VoucherRecord = serde_json::from_value(valid.clone()).unwrap();
        assert_eq!(record.status(), VoucherStatus::Available);

        let mut bogus = valid.clone();
        bogus["username"] = "bogus".into();
        let err = serde_json::from_value::<VoucherRecord>(bogus).unwrap_err();
        assert!(err.to_string().contains("invalid username"));

        let mut bad_password = valid.clone();
        bad_password["password"] = "c5678dd".into();
        assert!(serde_json::from_value::<VoucherRecord>(bad_password).is_err());

        let mut overconfident = valid;
        overconfident["confidenceScore"] = 101.into();
        assert!(serde_json::from_value::<VoucherRecord>(overconfident).is_err());
    }
}
