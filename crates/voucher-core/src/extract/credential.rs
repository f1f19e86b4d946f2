//! Username/password shape validation shared by both extractors.

use super::patterns::CREDENTIAL_SHAPE;

/// Check that a value is exactly letter, four digits, letter.
///
/// Case-insensitive and anchored at both ends, so `a1234b` passes while
/// `a1234bc`, ` a1234b` and `a123b` do not.
pub fn is_valid_credential(value: &str) -> bool {
    CREDENTIAL_SHAPE.is_match(value)
}
