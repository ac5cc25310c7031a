use super::page_headers;
use crate::dashboard::{
    gate::HOME_PATH,
    session::{resolve, sign_out},
    views::{render, DashboardPage, Shell},
    DashboardState,
};
use axum::{
    extract::Extension,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
};
use std::sync::Arc;

pub async fn root() -> Redirect {
    Redirect::to(HOME_PATH)
}

pub async fn show(
    headers: HeaderMap,
    Extension(state): Extension<Arc<DashboardState>>,
) -> Response {
    let Ok(mut session) = resolve(&state, &headers).await else {
        return sign_out(state.config());
    };
    let (csrf_token, response_headers) =
        match page_headers(state.config(), &headers, Some(&mut session)) {
            Ok(parts) => parts,
            Err(page) => return page.into_response(),
        };

    let page = DashboardPage {
        shell: Shell::new(HOME_PATH, Some(&session.account), csrf_token),
        account: session.account,
    };
    render(StatusCode::OK, response_headers, &page)
}
