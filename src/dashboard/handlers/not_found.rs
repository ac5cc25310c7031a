use super::page_headers;
use crate::dashboard::{
    views::{render, NotFoundPage, Shell},
    DashboardState,
};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use std::sync::Arc;

/// Only reached with a session cookie; the gate sends everyone else to login.
pub async fn not_found(
    uri: Uri,
    headers: HeaderMap,
    Extension(state): Extension<Arc<DashboardState>>,
) -> Response {
    let (csrf_token, response_headers) = match page_headers(state.config(), &headers, None) {
        Ok(parts) => parts,
        Err(page) => return page.into_response(),
    };

    let page = NotFoundPage {
        shell: Shell::new(uri.path(), None, csrf_token),
        path: uri.path().to_string(),
    };
    render(StatusCode::NOT_FOUND, response_headers, &page)
}
