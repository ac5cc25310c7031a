pub mod dashboard;
pub mod health;
pub mod login;
pub mod logout;
pub mod not_found;
pub mod settings;

use super::{csrf, session::Session, views::ErrorPage, DashboardConfig};
use axum::http::{header::SET_COOKIE, HeaderMap};
use tracing::error;

/// CSRF token for a page render plus the headers the response must carry:
/// a new CSRF cookie when the browser had none, and renewed session cookies.
pub(super) fn page_headers(
    config: &DashboardConfig,
    request_headers: &HeaderMap,
    session: Option<&mut Session>,
) -> Result<(String, HeaderMap), ErrorPage> {
    let (token, cookie) = csrf::ensure(config, request_headers).map_err(|err| {
        error!("Failed to prepare CSRF token: {err}");
        ErrorPage::internal()
    })?;

    let mut headers = session.map_or_else(HeaderMap::new, |session| {
        std::mem::take(&mut session.renewed)
    });
    if let Some(cookie) = cookie {
        headers.append(SET_COOKIE, cookie);
    }

    Ok((token, headers))
}
