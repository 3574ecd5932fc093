use std::collections::HashMap;

/// Form field names accepted for the phone number, in lookup order
pub const PHONE_FIELD_ALIASES: [&str; 3] = ["phone", "phoneNumber", "phone-number"];

/// Registration fields pulled out of a submitted form
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationForm {
    pub name: String,
    pub phone: String,
}

impl RegistrationForm {
    /// The first phone alias present wins, even when its value is empty.
    pub fn from_fields(fields: &HashMap<String, String>) -> Self {
        let phone = PHONE_FIELD_ALIASES
            .iter()
            .find_map(|alias| fields.get(*alias))
            .cloned()
            .unwrap_or_default();

        Self {
            name: fields.get("name").cloned().unwrap_or_default(),
            phone,
        }
    }
}

/// Parse the leading integer of a form value: optional whitespace and sign,
/// then digits, ignoring whatever follows. `"3abc"` is 3; `"abc"` is `None`.
pub fn parse_leading_int(raw: &str) -> Option<i64> {
    let trimmed = raw.trim_start();
    let (negative, rest) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let magnitude: i64 = rest[..digits_len].parse().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}

/// Percent-encode a query parameter value, leaving the characters
/// `encodeURIComponent` leaves alone.
pub fn encode_query_component(raw: &str) -> String {
    let mut encoded = String::with_capacity(raw.len());
    for byte in raw.bytes() {
        match byte {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'-'
            | b'_'
            | b'.'
            | b'!'
            | b'~'
            | b'*'
            | b'\''
            | b'('
            | b')' => encoded.push(byte as char),
            _ => encoded.push_str(&format!("%{byte:02X}")),
        }
    }
    encoded
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_phone_aliases_in_order() {
        let form = RegistrationForm::from_fields(&fields(&[
            ("name", "Ann"),
            ("phone-number", "333"),
            ("phoneNumber", "222"),
        ]));
        assert_eq!(form.phone, "222");

        let form = RegistrationForm::from_fields(&fields(&[("phone-number", "333")]));
        assert_eq!(form.phone, "333");
        assert_eq!(form.name, "");
    }

    #[test]
    fn test_empty_primary_alias_still_wins() {
        let form = RegistrationForm::from_fields(&fields(&[("phone", ""), ("phoneNumber", "5551234567")]));
        assert_eq!(form.phone, "");
    }

    #[test]
    fn test_parse_leading_int() {
        assert_eq!(parse_leading_int("3"), Some(3));
        assert_eq!(parse_leading_int(" 4 "), Some(4));
        assert_eq!(parse_leading_int("3abc"), Some(3));
        assert_eq!(parse_leading_int("-1"), Some(-1));
        assert_eq!(parse_leading_int("+2"), Some(2));
        assert_eq!(parse_leading_int("abc"), None);
        assert_eq!(parse_leading_int(""), None);
        assert_eq!(parse_leading_int("-"), None);
        assert_eq!(parse_leading_int("99999999999999999999"), None);
    }

    #[test]
    fn test_encode_query_component() {
        assert_eq!(
            encode_query_component("This phone is already registered for Game 1."),
            "This%20phone%20is%20already%20registered%20for%20Game%201."
        );
        assert_eq!(encode_query_component("a&b=c"), "a%26b%3Dc");
        assert_eq!(encode_query_component("é"), "%C3%A9");
    }
}
