//! Credential extraction from the `Authorization` header.
//!
//! Two schemes are recognized: `Bearer <token>` for access and refresh
//! tokens, and `ApiKey <key>` for the Polka webhook caller. The scheme
//! is case-sensitive with exactly one space before a non-empty value.

use axum::http::{HeaderMap, header};

/// Failure modes when pulling a credential out of request headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialError {
    /// No `Authorization` header present
    Missing,
    /// Header present but not `<scheme> <value>` with the expected scheme
    Malformed,
}

impl std::fmt::Display for CredentialError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CredentialError::Missing => write!(f, "Missing authorization header"),
            CredentialError::Malformed => write!(f, "Malformed authorization header"),
        }
    }
}

impl std::error::Error for CredentialError {}

fn scheme_value<'a>(headers: &'a HeaderMap, scheme: &str) -> Result<&'a str, CredentialError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .ok_or(CredentialError::Missing)?
        .to_str()
        .map_err(|_| CredentialError::Malformed)?;

    match value.split_once(' ') {
        Some((s, rest)) if s == scheme && !rest.is_empty() && !rest.contains(' ') => Ok(rest),
        _ => Err(CredentialError::Malformed),
    }
}

/// Extract a bearer token from `Authorization: Bearer <token>`.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, CredentialError> {
    scheme_value(headers, "Bearer")
}

/// Extract an API key from `Authorization: ApiKey <key>`.
pub fn api_key(headers: &HeaderMap) -> Result<&str, CredentialError> {
    scheme_value(headers, "ApiKey")
}

/// Compare a presented API key against the configured one in constant
/// time. The key is a shared static secret, not a user credential, so it
/// is compared directly rather than hashed.
pub fn api_key_matches(presented: &str, expected: &str) -> bool {
    let a = presented.as_bytes();
    let b = expected.as_bytes();
    if a.len() != b.len() {
        return false;
    }
    let mut acc: u8 = 0;
    for i in 0..a.len() {
        acc |= a[i] ^ b[i];
    }
    acc == 0
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers_with(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_bearer_token_valid() {
        let headers = headers_with("Bearer abc123");
        assert_eq!(bearer_token(&headers), Ok("abc123"));
    }

    #[test]
    fn test_bearer_token_missing_header() {
        let headers = HeaderMap::new();
        assert_eq!(bearer_token(&headers), Err(CredentialError::Missing));
    }

    #[test]
    fn test_bearer_token_wrong_scheme() {
        let headers = headers_with("Basic abc123");
        assert_eq!(bearer_token(&headers), Err(CredentialError::Malformed));
    }

    #[test]
    fn test_bearer_token_case_sensitive_scheme() {
        let headers = headers_with("bearer abc123");
        assert_eq!(bearer_token(&headers), Err(CredentialError::Malformed));
    }

    #[test]
    fn test_bearer_token_empty_value() {
        let headers = headers_with("Bearer ");
        assert_eq!(bearer_token(&headers), Err(CredentialError::Malformed));

        let headers = headers_with("Bearer");
        assert_eq!(bearer_token(&headers), Err(CredentialError::Malformed));
    }

    #[test]
    fn test_bearer_token_double_space() {
        let headers = headers_with("Bearer  abc123");
        assert_eq!(bearer_token(&headers), Err(CredentialError::Malformed));
    }

    #[test]
    fn test_api_key_valid() {
        let headers = headers_with("ApiKey k-123");
        assert_eq!(api_key(&headers), Ok("k-123"));
    }

    #[test]
    fn test_api_key_rejects_bearer() {
        let headers = headers_with("Bearer k-123");
        assert_eq!(api_key(&headers), Err(CredentialError::Malformed));
    }

    #[test]
    fn test_api_key_matches() {
        assert!(api_key_matches("secret", "secret"));
        assert!(!api_key_matches("secret", "secre7"));
        assert!(!api_key_matches("secret", "secrets"));
        assert!(!api_key_matches("", "secret"));
    }
}
