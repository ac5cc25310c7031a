//! Sign-in form.

use super::page_headers;
use crate::dashboard::{
    csrf,
    forms::{validate_login, LoginForm, LoginQuery},
    gate::{sanitize_next, HOME_PATH},
    session::issue_cookies,
    views::{render, Alert, ErrorPage, LoginPage},
    DashboardState,
};
use axum::{
    extract::{Extension, Query},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    Form,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{error, info, warn};

pub async fn show(
    headers: HeaderMap,
    Query(query): Query<LoginQuery>,
    Extension(state): Extension<Arc<DashboardState>>,
) -> Response {
    let next = sanitize_next(query.next.as_deref());
    let alert = (next != HOME_PATH).then(|| Alert::info("Sign in to continue."));

    login_page(&state, &headers, StatusCode::OK, String::new(), next, alert)
}

pub async fn submit(
    headers: HeaderMap,
    Extension(state): Extension<Arc<DashboardState>>,
    Form(form): Form<LoginForm>,
) -> Response {
    if !csrf::verify(&headers, &form.csrf_token) {
        warn!("Rejected sign-in with a missing or mismatched CSRF token");
        return ErrorPage::forbidden().into_response();
    }

    let next = sanitize_next(form.next.as_deref());
    let email = match validate_login(&form) {
        Ok(email) => email,
        Err(message) => {
            return login_page(
                &state,
                &headers,
                StatusCode::OK,
                form.email.trim().to_string(),
                next,
                Some(Alert::error(message)),
            );
        }
    };

    let password = SecretString::from(form.password);
    match state.idp().sign_in(&email, &password).await {
        Ok(tokens) => match issue_cookies(state.config(), &tokens) {
            Ok(cookies) => {
                info!(user_id = %tokens.user_id, "signed in");
                (cookies, Redirect::to(&next)).into_response()
            }
            Err(err) => {
                error!("Failed to build session cookies: {err}");
                ErrorPage::internal().into_response()
            }
        },
        Err(err) => {
            warn!("Sign-in failed: {err}");
            let status = StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::BAD_GATEWAY);
            login_page(
                &state,
                &headers,
                status,
                email,
                next,
                Some(Alert::error(err.user_message())),
            )
        }
    }
}

fn login_page(
    state: &DashboardState,
    headers: &HeaderMap,
    status: StatusCode,
    email: String,
    next: String,
    alert: Option<Alert>,
) -> Response {
    let (csrf_token, response_headers) = match page_headers(state.config(), headers, None) {
        Ok(parts) => parts,
        Err(page) => return page.into_response(),
    };

    let page = LoginPage {
        csrf_token,
        email,
        next,
        alert,
    };
    render(status, response_headers, &page)
}
