//! Session tokens and the cookie that carries them.
//!
//! The client holds a random token; only its SHA-256 is stored.

use audiovault_core::constants::SESSION_COOKIE_NAME;
use axum::http::{header, HeaderMap};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use rand::Rng;
use sha2::{Digest, Sha256};

const TOKEN_BYTES: usize = 32;

/// Generate a fresh session token (32 random bytes, URL-safe base64)
pub fn generate_session_token() -> String {
    let mut rng = rand::rng();
    let random_bytes: Vec<u8> = (0..TOKEN_BYTES).map(|_| rng.random()).collect();
    URL_SAFE_NO_PAD.encode(random_bytes)
}

/// Hash a session token for storage and lookup
pub fn hash_session_token(token: &str) -> String {
    hex::encode(Sha256::digest(token.as_bytes()))
}

/// `Set-Cookie` value issuing the session cookie
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{}={}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}",
        SESSION_COOKIE_NAME, token, max_age_secs
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie
pub fn clear_session_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

/// Read the session token from the request's `Cookie` headers
pub fn read_session_cookie(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE_NAME)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_generate_session_token() {
        let token = generate_session_token();
        assert_eq!(token.len(), 43);
        assert!(!token.contains('='));
        assert_ne!(token, generate_session_token());
    }

    #[test]
    fn test_hash_is_stable_hex() {
        let hash = hash_session_token("abc");
        assert_eq!(hash.len(), 64);
        assert_eq!(hash, hash_session_token("abc"));
    }

    #[test]
    fn test_cookie_attributes() {
        let cookie = session_cookie("tok", 600, true);
        assert_eq!(
            cookie,
            "session_token=tok; Path=/; HttpOnly; SameSite=Lax; Max-Age=600; Secure"
        );
        assert!(!session_cookie("tok", 600, false).contains("Secure"));
        assert!(clear_session_cookie(false).contains("Max-Age=0"));
    }

    #[test]
    fn test_read_session_cookie() {
        let mut headers = HeaderMap::new();
        headers.append(header::COOKIE, HeaderValue::from_static("theme=dark"));
        headers.append(
            header::COOKIE,
            HeaderValue::from_static("a=1; session_token=xyz; b=2"),
        );
        assert_eq!(read_session_cookie(&headers).as_deref(), Some("xyz"));

        let mut empty = HeaderMap::new();
        empty.insert(header::COOKIE, HeaderValue::from_static("session_token="));
        assert!(read_session_cookie(&empty).is_none());
    }
}
