//! Double-submit CSRF tokens for the dashboard forms.

use super::{session::read_cookie, DashboardConfig};
use axum::http::{header::InvalidHeaderValue, HeaderMap, HeaderValue};
use base64ct::{Base64UrlUnpadded, Encoding};
use rand::{rngs::OsRng, RngCore};
use subtle::ConstantTimeEq;

pub const CSRF_COOKIE_NAME: &str = "vestibule_csrf";

/// Generate a new random token.
///
/// # Errors
/// Returns an error if the OS random source fails.
pub fn generate_token() -> Result<String, rand::Error> {
    let mut bytes = [0u8; 32];
    OsRng.try_fill_bytes(&mut bytes)?;
    Ok(Base64UrlUnpadded::encode_string(&bytes))
}

/// Build the `SameSite=Strict` cookie that carries the token.
///
/// # Errors
/// Returns an error if the token is not a valid header value.
pub fn cookie(config: &DashboardConfig, token: &str) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie = format!(
        "{CSRF_COOKIE_NAME}={token}; Path=/; HttpOnly; SameSite=Strict; Max-Age={ttl_seconds}"
    );
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// Token for a page render: the one already in the browser, or a new one
/// together with the cookie that must be set.
///
/// # Errors
/// Returns an error if a token cannot be generated or carried in a cookie.
pub fn ensure(
    config: &DashboardConfig,
    headers: &HeaderMap,
) -> anyhow::Result<(String, Option<HeaderValue>)> {
    if let Some(token) = read_cookie(headers, CSRF_COOKIE_NAME) {
        return Ok((token, None));
    }
    let token = generate_token()?;
    let cookie = cookie(config, &token)?;
    Ok((token, Some(cookie)))
}

/// Compare the submitted form token with the cookie in constant time.
#[must_use]
pub fn verify(headers: &HeaderMap, submitted: &str) -> bool {
    let Some(expected) = read_cookie(headers, CSRF_COOKIE_NAME) else {
        return false;
    };
    if submitted.is_empty() || submitted.len() != expected.len() {
        return false;
    }
    expected.as_bytes().ct_eq(submitted.as_bytes()).into()
}
