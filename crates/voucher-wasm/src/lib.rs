//! WASM bindings for Wi-Fi voucher extraction.
//!
//! Used by the admin panel's file picker and drop zone: the browser hands
//! over text or a `File`, and gets plain record objects back.

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use voucher_core::export::{export_records, ExportFormat};
use voucher_core::input::{decode_text, InputKind};
use voucher_core::extract::ScanStats;
use voucher_core::{ExtractionMode, ExtractionReport, InputReadError, VoucherRecord};

/// Initialize panic hook for better error messages in console.
#[wasm_bindgen(start)]
pub fn init() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Version information.
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn to_js<T: Serialize>(value: &T) -> Result<JsValue, JsValue> {
    serde_wasm_bindgen::to_value(value).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Extract accounts from labeled text.
///
/// Returns an array of records; an input with no usable blocks gives `[]`.
#[wasm_bindgen(js_name = extractAccounts)]
pub fn extract_accounts(text: &str) -> Result<JsValue, JsValue> {
    to_js(&voucher_core::extract(text))
}

/// Extract accounts from the fixed "User Name" / "Password" layout.
#[wasm_bindgen(js_name = extractPositional)]
pub fn extract_positional(text: &str) -> Result<JsValue, JsValue> {
    to_js(&voucher_core::VoucherExtractor::new().extract_positional(text))
}

/// Whether a file name has an accepted extension.
#[wasm_bindgen(js_name = isAllowedFile)]
pub fn is_allowed_file(name: &str) -> bool {
    voucher_core::is_allowed_file(name)
}

/// Whether a string has the credential shape: letter, four digits, letter.
#[wasm_bindgen(js_name = isValidCredential)]
pub fn is_valid_credential(s: &str) -> bool {
    voucher_core::is_valid_credential(s)
}

/// Render records as `json`, `csv` or `txt`.
///
/// `records` is either an array of record objects or a JSON string of one.
#[wasm_bindgen(js_name = exportAccounts)]
pub fn export_accounts(records: JsValue, format: &str) -> Result<String, JsValue> {
    let format = ExportFormat::from_str(format)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown export format: {}", format)))?;

    let records: Vec<VoucherRecord> = match records.as_string() {
        Some(json) => serde_json::from_str(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
        None => serde_wasm_bindgen::from_value(records)?,
    };

    export_records(&records, format).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Dated download name for an export, e.g. `wifi_accounts_2024-06-01.csv`.
#[wasm_bindgen(js_name = exportFileName)]
pub fn export_file_name(format: &str) -> Result<String, JsValue> {
    let format = ExportFormat::from_str(format)
        .ok_or_else(|| JsValue::from_str(&format!("Unknown export format: {}", format)))?;

    Ok(voucher_core::export::export_file_name(
        format,
        chrono::Utc::now().date_naive(),
    ))
}

/// Read a picked or dropped file and extract its accounts.
///
/// Rejects files outside the allow-list before reading them. PDF files
/// cannot be decoded in the browser build.
#[wasm_bindgen(js_name = extractFromFile)]
pub async fn extract_from_file(file: web_sys::File) -> Result<JsValue, JsValue> {
    let name = file.name();
    if !voucher_core::is_allowed_file(&name) {
        let ext = name.rsplit_once('.').map(|(_, e)| e).unwrap_or_default();
        return Err(JsValue::from_str(
            &InputReadError::UnsupportedType(ext.to_lowercase()).to_string(),
        ));
    }

    let buffer = JsFuture::from(file.array_buffer()).await?;
    let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

    let kind = InputKind::from_path(std::path::Path::new(&name)).unwrap_or(InputKind::Text);
    let text = decode_text(&bytes, kind).map_err(|e| JsValue::from_str(&e.to_string()))?;

    let report = voucher_core::VoucherExtractor::new().run(&text, ExtractionMode::Auto);
    if report.is_empty() {
        web_sys::console::warn_1(&format!("No accounts found in {}", name).into());
    }

    to_js(&FileExtraction::new(name, report))
}

/// Result of `extractFromFile`, serialized as a plain JS object.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileExtraction {
    file_name: String,
    mode: ExtractionMode,
    stats: ScanStats,
    records: Vec<VoucherRecord>,
}

impl FileExtraction {
    fn new(file_name: String, report: ExtractionReport) -> Self {
        Self {
            file_name,
            mode: report.mode,
            stats: report.stats,
            records: report.records,
        }
    }
}

/// Voucher extractor class for browser use.
#[wasm_bindgen(js_name = VoucherExtractor)]
pub struct VoucherExtractorJs {
    inner: voucher_core::VoucherExtractor,
}

#[wasm_bindgen(js_class = VoucherExtractor)]
impl VoucherExtractorJs {
    /// Create an extractor with default settings.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            inner: voucher_core::VoucherExtractor::new(),
        }
    }

    /// Minimum confidence a labeled block needs to be kept.
    #[wasm_bindgen(getter = minConfidence)]
    pub fn min_confidence(&self) -> u32 {
        self.inner.config().min_confidence
    }

    #[wasm_bindgen(setter = minConfidence)]
    pub fn set_min_confidence(&mut self, min_confidence: u32) {
        let inner = std::mem::take(&mut self.inner);
        self.inner = inner.with_min_confidence(min_confidence);
    }

    /// Extract accounts from labeled text.
    pub fn extract(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.inner.extract(text))
    }

    /// Extract accounts from the positional layout.
    #[wasm_bindgen(js_name = extractPositional)]
    pub fn extract_positional(&self, text: &str) -> Result<JsValue, JsValue> {
        to_js(&self.inner.extract_positional(text))
    }

    /// Extract with `flexible`, `positional` or `auto`, returning records
    /// together with the strategy used and scan counters.
    #[wasm_bindgen(js_name = extractWithReport)]
    pub fn extract_with_report(&self, text: &str, mode: &str) -> Result<JsValue, JsValue> {
        let mode = ExtractionMode::from_str(mode)
            .ok_or_else(|| JsValue::from_str(&format!("Unknown extraction mode: {}", mode)))?;

        to_js(&self.inner.run(text, mode))
    }
}

impl Default for VoucherExtractorJs {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    const TEXT: &str = "Username: a1234b\nPassword: c5678d\n10GB\n---\nuser: e1111f\npass: g2222h\n";

    fn records(value: JsValue) -> Vec<VoucherRecord> {
        serde_wasm_bindgen::from_value(value).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_is_valid_credential() {
        assert!(is_valid_credential("a1234b"));
        assert!(!is_valid_credential("ab1234"));
    }

    #[wasm_bindgen_test]
    fn test_is_allowed_file() {
        assert!(is_allowed_file("accounts.TXT"));
        assert!(!is_allowed_file("accounts.xlsx"));
    }

    #[wasm_bindgen_test]
    fn test_extract_accounts() {
        let found = records(extract_accounts(TEXT).unwrap());
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].package_label(), "10GB");
        assert_eq!(found[1].username(), "e1111f");
    }

    #[wasm_bindgen_test]
    fn test_extract_positional() {
        let text = "user name\nx1111y\npassword\nz2222w\n3GB\n0000 Afn\n";
        let found = records(extract_positional(text).unwrap());
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].confidence_score(), 100);
    }

    #[wasm_bindgen_test]
    fn test_extractor_threshold() {
        let mut extractor = VoucherExtractorJs::new();
        extractor.set_min_confidence(70);
        assert_eq!(extractor.min_confidence(), 70);

        // Second block only reaches 60
        let found = records(extractor.extract(TEXT).unwrap());
        assert_eq!(found.len(), 1);
    }

    fn text_file(text: &str, name: &str) -> web_sys::File {
        let parts = js_sys::Array::of1(&JsValue::from_str(text));
        web_sys::File::new_with_str_sequence(&parts, name).unwrap()
    }

    fn field(value: &JsValue, key: &str) -> JsValue {
        js_sys::Reflect::get(value, &JsValue::from_str(key)).unwrap()
    }

    #[wasm_bindgen_test]
    async fn test_extract_from_file() {
        let file = text_file(TEXT, "accounts.txt");
        let result = extract_from_file(file).await.unwrap();

        assert_eq!(field(&result, "fileName").as_string().as_deref(), Some("accounts.txt"));
        assert_eq!(field(&result, "mode").as_string().as_deref(), Some("flexible"));
        let found = records(field(&result, "records"));
        assert_eq!(found.len(), 2);
        assert_eq!(found[0].username(), "a1234b");
    }

    #[wasm_bindgen_test]
    async fn test_extract_from_file_falls_back_to_positional() {
        let file = text_file("user name\nx1111y\npassword\nz2222w\n3GB\n0000 Afn\n", "export.text");
        let result = extract_from_file(file).await.unwrap();

        assert_eq!(field(&result, "mode").as_string().as_deref(), Some("positional"));
        let found = records(field(&result, "records"));
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].password(), "z2222w");
    }

    #[wasm_bindgen_test]
    async fn test_extract_from_file_rejects_extension() {
        let file = text_file(TEXT, "accounts.xlsx");
        let err = extract_from_file(file).await.unwrap_err();

        assert_eq!(err.as_string().as_deref(), Some("unsupported file type: xlsx"));
    }

    #[wasm_bindgen_test]
    fn test_export_accounts_rejects_malformed_records() {
        let json = r#"[{"id":"x","username":"bogus","password":"c5678d","packageLabel":"3GB",
            "priceLabel":"0000 Afn","location":"x","confidenceScore":60,"extractedAt":"2023-11-14T22:13:20Z"}]"#;
        assert!(export_accounts(JsValue::from_str(json), "csv").is_err());
    }

    #[wasm_bindgen_test]
    fn test_export_accounts() {
        let csv = export_accounts(extract_accounts(TEXT).unwrap(), "csv").unwrap();
        assert!(csv.starts_with("Username,Password,Type,Price,Location,Status\n"));
        assert!(export_accounts(JsValue::from_str("[]"), "xml").is_err());
    }
}
