//! Route gating on the presence of the session cookie.
//!
//! The gate only looks at whether the cookie exists. Whether the token behind
//! it is still valid is decided by the provider when a handler resolves the
//! session.

use super::session;
use axum::{
    extract::Request,
    http::{Method, Uri},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};
use tracing::debug;
use url::form_urlencoded;

pub const LOGIN_PATH: &str = "/login";
pub const LOGOUT_PATH: &str = "/logout";
pub const HOME_PATH: &str = "/dashboard";
pub const HEALTH_PATH: &str = "/health";

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Route<'a> {
    Login,
    Public,
    /// Anything else, carrying the path and query to come back to after sign-in.
    Protected(&'a str),
}

impl<'a> Route<'a> {
    #[must_use]
    pub fn classify(uri: &'a Uri) -> Self {
        match uri.path() {
            LOGIN_PATH => Self::Login,
            HEALTH_PATH => Self::Public,
            _ => Self::Protected(
                uri.path_and_query()
                    .map_or_else(|| uri.path(), |pq| pq.as_str()),
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GateDecision {
    Allow,
    Redirect(String),
}

#[must_use]
pub fn decide(route: Route<'_>, has_session: bool) -> GateDecision {
    match (route, has_session) {
        (Route::Login, true) => GateDecision::Redirect(HOME_PATH.to_string()),
        (Route::Login | Route::Public, _) | (Route::Protected(_), true) => GateDecision::Allow,
        (Route::Protected(target), false) => GateDecision::Redirect(login_redirect(target)),
    }
}

/// Build `/login?next=...`, dropping the parameter when it would only point home.
#[must_use]
pub fn login_redirect(target: &str) -> String {
    let next = sanitize_next(Some(target));
    if next == HOME_PATH {
        return LOGIN_PATH.to_string();
    }
    let encoded: String = form_urlencoded::byte_serialize(next.as_bytes()).collect();
    format!("{LOGIN_PATH}?next={encoded}")
}

/// Keep `next` only when it is a same-origin path that does not lead back to
/// login or logout.
#[must_use]
pub fn sanitize_next(next: Option<&str>) -> String {
    let Some(next) = next.map(str::trim) else {
        return HOME_PATH.to_string();
    };

    let path = next.split(['?', '#']).next().unwrap_or_default();
    let is_local = next.starts_with('/') && !next.starts_with("//");
    let is_auth = [LOGIN_PATH, LOGOUT_PATH]
        .iter()
        .any(|auth| {
            path == *auth || path.strip_prefix(*auth).is_some_and(|rest| rest.starts_with('/'))
        });

    if !is_local || is_auth || next.contains('\\') || next.chars().any(char::is_control) {
        return HOME_PATH.to_string();
    }

    next.to_string()
}

pub async fn require_session(request: Request, next: Next) -> Response {
    let has_session = session::has_session(request.headers());
    // Only GET targets can be replayed after sign-in.
    let route = match Route::classify(request.uri()) {
        Route::Protected(_) if request.method() != Method::GET => Route::Protected(HOME_PATH),
        route => route,
    };
    let decision = decide(route, has_session);

    match decision {
        GateDecision::Allow => next.run(request).await,
        GateDecision::Redirect(location) => {
            debug!(path = request.uri().path(), location = %location, "gate redirect");
            Redirect::to(&location).into_response()
        }
    }
}
