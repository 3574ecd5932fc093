use regex::Regex;
use std::sync::LazyLock;

/// Number of digits in a stored phone number
pub const PHONE_DIGITS: usize = 10;

static TEN_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]{10}$").expect("phone pattern is a valid regex"));

/// Strip everything but ASCII digits, keeping only the trailing ten when longer.
///
/// A leading country code such as `+1` is dropped by the truncation, so
/// `+1 (555) 123-4567` normalizes to `5551234567`.
pub fn normalize_phone(raw: &str) -> String {
    let digits: String = raw.trim().chars().filter(char::is_ascii_digit).collect();
    if digits.len() > PHONE_DIGITS {
        digits[digits.len() - PHONE_DIGITS..].to_string()
    } else {
        digits
    }
}

pub fn is_valid_phone(phone: &str) -> bool {
    TEN_DIGITS.is_match(phone)
}
