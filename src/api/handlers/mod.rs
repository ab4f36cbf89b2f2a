pub mod health;
pub mod login;
pub mod logout;
pub mod me;
pub mod public_key;
pub mod refresh;
pub mod sessions;

// common helpers for the handlers
use axum::http::{HeaderMap, header::AUTHORIZATION, header::COOKIE, header::USER_AGENT};
use regex::Regex;

use crate::api::cookies::TOKEN_COOKIE;

pub fn valid_username(username: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9_.-]{0,63}$")
        .map_or(false, |re| re.is_match(username))
}

/// Requesting agent descriptor, diagnostic only.
pub(crate) fn client_from(headers: &HeaderMap) -> String {
    headers
        .get(USER_AGENT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("Unknown")
        .to_string()
}

pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let header = headers.get(COOKIE)?;
    let value = header.to_str().ok()?;
    for pair in value.split(';') {
        let trimmed = pair.trim();
        let mut parts = trimmed.splitn(2, '=');
        let key = parts.next()?.trim();
        let val = parts.next()?.trim();
        if key == name {
            return Some(val.to_string());
        }
    }
    None
}

/// Access token from `Authorization: Bearer` or the `token` cookie.
pub(crate) fn access_token(headers: &HeaderMap) -> Option<String> {
    if let Some(token) = bearer_token(headers) {
        return Some(token);
    }
    cookie_value(headers, TOKEN_COOKIE)
}

fn bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let trimmed = value.trim();
    let token = trimmed
        .strip_prefix("Bearer ")
        .or_else(|| trimmed.strip_prefix("bearer "))?
        .trim();
    if token.is_empty() {
        None
    } else {
        Some(token.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn valid_username_accepts_common_names() {
        assert!(valid_username("admin"));
        assert!(valid_username("alice.smith-01"));
        assert!(!valid_username(""));
        assert!(!valid_username(".hidden"));
        assert!(!valid_username("with spaces"));
        assert!(!valid_username(&"x".repeat(65)));
    }

    #[test]
    fn cookie_value_parses_multiple_pairs() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("sessid=abc; refresh=def; token=ghi"),
        );
        assert_eq!(cookie_value(&headers, "sessid").as_deref(), Some("abc"));
        assert_eq!(cookie_value(&headers, "refresh").as_deref(), Some("def"));
        assert_eq!(cookie_value(&headers, "token").as_deref(), Some("ghi"));
        assert_eq!(cookie_value(&headers, "missing"), None);
    }

    #[test]
    fn access_token_prefers_bearer_header() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token=from-cookie"));
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        assert_eq!(access_token(&headers).as_deref(), Some("from-header"));
    }

    #[test]
    fn access_token_falls_back_to_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("token=from-cookie"));
        assert_eq!(access_token(&headers).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn client_defaults_to_unknown() {
        let headers = HeaderMap::new();
        assert_eq!(client_from(&headers), "Unknown");
    }
}
