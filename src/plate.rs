//! Registration plate → registering authority
//!
//! Plates carry their registering jurisdiction as a two-letter prefix
//! (`MH12AB1234`, `DL 3C AB 1234`). Anything that does not start with two
//! letters after normalization is unroutable; no further guessing is done.

use crate::types::AuthorityCode;

/// Strip everything but letters and digits, upper-cased.
pub fn normalize(plate: &str) -> String {
    plate
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_uppercase)
        .collect()
}

/// Extract the registration authority code from free-text plate input.
///
/// Returns `None` for empty input or input not starting with two letters.
pub fn parse_authority_code(plate: &str) -> Option<AuthorityCode> {
    let normalized = normalize(plate);
    let mut chars = normalized.chars();
    let first = chars.next()?;
    let second = chars.next()?;

    if first.is_ascii_alphabetic() && second.is_ascii_alphabetic() {
        AuthorityCode::new(&normalized[..2])
    } else {
        None
    }
}
