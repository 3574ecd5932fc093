use axum::http::{header::COOKIE, HeaderMap};

use crate::auth::TrustToken;

/// Pull the trust token out of the request's Cookie headers
pub fn read_token(headers: &HeaderMap, cookie_name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == cookie_name)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

/// Set-Cookie value carrying a freshly issued token, readable by the server only
pub fn trust_cookie(cookie_name: &str, token: &TrustToken) -> String {
    format!("{cookie_name}={}; Path=/; HttpOnly; SameSite=Lax", token.as_str())
}

/// Set-Cookie value that makes the browser drop the token
pub fn cleared_cookie(cookie_name: &str) -> String {
    format!("{cookie_name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_reads_named_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark; admin_session=abc-123; lang=en"));

        assert_eq!(read_token(&headers, "admin_session"), Some("abc-123".to_string()));
        assert_eq!(read_token(&headers, "missing"), None);
    }

    #[test]
    fn test_empty_cookie_value_is_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("admin_session="));

        assert_eq!(read_token(&headers, "admin_session"), None);
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = trust_cookie("admin_session", &TrustToken::new("t0k"));
        assert_eq!(cookie, "admin_session=t0k; Path=/; HttpOnly; SameSite=Lax");
        assert!(cleared_cookie("admin_session").contains("Max-Age=0"));
    }
}
