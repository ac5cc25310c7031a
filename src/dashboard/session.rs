//! Session cookies and account resolution.
//!
//! The session cookie holds the provider id token and the refresh cookie holds
//! the provider refresh token. Nothing is stored server-side.

use super::{gate::LOGIN_PATH, DashboardConfig, DashboardState};
use crate::idp::{Account, AuthTokens};
use axum::{
    http::{
        header::{InvalidHeaderValue, COOKIE, SET_COOKIE},
        HeaderMap, HeaderValue,
    },
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, warn};

pub const SESSION_COOKIE_NAME: &str = "vestibule_session";
pub const REFRESH_COOKIE_NAME: &str = "vestibule_refresh";

/// A signed-in request.
pub struct Session {
    pub account: Account,
    pub id_token: String,
    /// `Set-Cookie` headers to attach when the tokens were refreshed.
    pub renewed: HeaderMap,
}

/// The request has no usable session.
#[derive(Debug)]
pub struct SignedOut;

/// Clear both session cookies and send the browser to the login page.
#[must_use]
pub fn sign_out(config: &DashboardConfig) -> Response {
    (clear_cookies(config.cookie_secure()), Redirect::to(LOGIN_PATH)).into_response()
}

/// Read a cookie value by name. Empty values count as absent.
#[must_use]
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|header| header.to_str().ok())
        .flat_map(|value| value.split(';'))
        .find_map(|pair| {
            let (key, val) = pair.trim().split_once('=')?;
            (key.trim() == name).then(|| val.trim().to_string())
        })
        .filter(|val| !val.is_empty())
}

#[must_use]
pub fn has_session(headers: &HeaderMap) -> bool {
    read_cookie(headers, SESSION_COOKIE_NAME).is_some()
}

/// Build an `HttpOnly` cookie that lives as long as the configured session.
///
/// # Errors
/// Returns an error if the value contains bytes not allowed in a header.
pub fn session_cookie(
    config: &DashboardConfig,
    name: &str,
    value: &str,
) -> Result<HeaderValue, InvalidHeaderValue> {
    let ttl_seconds = config.session_ttl_seconds();
    let mut cookie =
        format!("{name}={value}; Path=/; HttpOnly; SameSite=Lax; Max-Age={ttl_seconds}");
    if config.cookie_secure() {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

fn clear_cookie(name: &str, secure: bool) -> Result<HeaderValue, InvalidHeaderValue> {
    let mut cookie = format!("{name}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0");
    if secure {
        cookie.push_str("; Secure");
    }
    HeaderValue::from_str(&cookie)
}

/// `Set-Cookie` headers for a freshly issued token pair.
///
/// # Errors
/// Returns an error if a token cannot be carried in a header.
pub fn issue_cookies(
    config: &DashboardConfig,
    tokens: &AuthTokens,
) -> Result<HeaderMap, InvalidHeaderValue> {
    let mut headers = HeaderMap::new();
    headers.append(
        SET_COOKIE,
        session_cookie(config, SESSION_COOKIE_NAME, &tokens.id_token)?,
    );
    headers.append(
        SET_COOKIE,
        session_cookie(config, REFRESH_COOKIE_NAME, &tokens.refresh_token)?,
    );
    Ok(headers)
}

/// `Set-Cookie` headers that remove both session cookies.
#[must_use]
pub fn clear_cookies(secure: bool) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for name in [SESSION_COOKIE_NAME, REFRESH_COOKIE_NAME] {
        if let Ok(cookie) = clear_cookie(name, secure) {
            headers.append(SET_COOKIE, cookie);
        }
    }
    headers
}

/// Resolve the account behind the session cookie.
///
/// An expired id token is refreshed once with the refresh cookie; the new
/// cookies are returned in [`Session::renewed`]. Any other failure signs out.
///
/// # Errors
/// Returns [`SignedOut`] when there is no usable session.
pub async fn resolve(state: &DashboardState, headers: &HeaderMap) -> Result<Session, SignedOut> {
    let id_token = read_cookie(headers, SESSION_COOKIE_NAME).ok_or(SignedOut)?;

    match state.idp().lookup(&id_token).await {
        Ok(account) => Ok(Session {
            account,
            id_token,
            renewed: HeaderMap::new(),
        }),
        Err(err) if err.is_session_expired() => {
            debug!("Session token rejected ({err}), trying refresh");
            let refresh_token = read_cookie(headers, REFRESH_COOKIE_NAME).ok_or(SignedOut)?;
            let tokens = state.idp().refresh(&refresh_token).await.map_err(|err| {
                warn!("Failed to refresh session: {err}");
                SignedOut
            })?;
            let account = state.idp().lookup(&tokens.id_token).await.map_err(|err| {
                warn!("Failed to look up refreshed session: {err}");
                SignedOut
            })?;
            let renewed = issue_cookies(state.config(), &tokens).map_err(|err| {
                warn!("Failed to build session cookies: {err}");
                SignedOut
            })?;

            Ok(Session {
                account,
                id_token: tokens.id_token,
                renewed,
            })
        }
        Err(err) => {
            warn!("Failed to resolve session: {err}");
            Err(SignedOut)
        }
    }
}
