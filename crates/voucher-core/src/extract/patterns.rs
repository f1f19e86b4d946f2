//! Common regex patterns for voucher extraction.
//!
//! Exports mix English and Persian labels, so most patterns carry both.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Credential shape: letter, four digits, letter (e.g. a8338g)
    pub static ref CREDENTIAL_SHAPE: Regex = Regex::new(
        r"^[A-Za-z][0-9]{4}[A-Za-z]$"
    ).unwrap();

    // Account block boundaries
    // username | نام کاربری (username) | اکانت (account) | user: | مشخصات (specifications)
    pub static ref BLOCK_START: Regex = Regex::new(
        r"(?i)username|نام کاربری|اکانت|user:|مشخصات"
    ).unwrap();

    // --- | === | ... | پایان (end) | end
    pub static ref BLOCK_END: Regex = Regex::new(
        r"(?i)---|===|\.\.\.|پایان|end"
    ).unwrap();

    // Labeled fields
    pub static ref USERNAME_FIELD: Regex = Regex::new(
        r"(?i:username|user|نام کاربری)[:\s]*([A-Za-z][0-9]{4}[A-Za-z])"
    ).unwrap();

    pub static ref PASSWORD_FIELD: Regex = Regex::new(
        r"(?i:password|pass|رمز)[:\s]*([A-Za-z][0-9]{4}[A-Za-z])"
    ).unwrap();

    // 3GB | 3 گیگ | 3 گیگابایت
    pub static ref PACKAGE_FIELD: Regex = Regex::new(
        r"([0-9]+)\s*(?i:GB|گیگ|گیگابایت)"
    ).unwrap();

    // 500 Afn | 500 افغانی | 500 ریال
    pub static ref PRICE_FIELD: Regex = Regex::new(
        r"([0-9]+)\s*(?i:Afn|افغانی|ریال)"
    ).unwrap();

    // Positional layout labels
    pub static ref USER_NAME_LABEL: Regex = Regex::new(
        r"(?i)user name"
    ).unwrap();

    pub static ref PASSWORD_LABEL: Regex = Regex::new(
        r"(?i)password"
    ).unwrap();
}
