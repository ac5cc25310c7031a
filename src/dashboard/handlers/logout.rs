use crate::dashboard::{
    csrf, forms::LogoutForm, session::sign_out, views::ErrorPage, DashboardState,
};
use axum::{
    extract::Extension,
    http::HeaderMap,
    response::{IntoResponse, Response},
    Form,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Clear the session cookies. The provider has no revocation endpoint for
/// id tokens, so they simply expire on their own.
pub async fn logout(
    headers: HeaderMap,
    Extension(state): Extension<Arc<DashboardState>>,
    Form(form): Form<LogoutForm>,
) -> Response {
    if !csrf::verify(&headers, &form.csrf_token) {
        warn!("Rejected sign-out with a missing or mismatched CSRF token");
        return ErrorPage::forbidden().into_response();
    }

    info!("signed out");
    sign_out(state.config())
}

#[cfg(test)]
mod tests {
    use crate::dashboard::testing::{app, get, location, post_form, set_cookies, FakeIdp, CSRF};
    use axum::http::StatusCode;
    use std::sync::Arc;
    use tower::ServiceExt;

    #[tokio::test]
    async fn logout_clears_cookies() {
        let cookie = format!("vestibule_session=id-1; vestibule_refresh=refresh-1; vestibule_csrf={CSRF}");
        let response = app(Arc::new(FakeIdp::default()))
            .oneshot(post_form("/logout", Some(&cookie), &format!("csrf_token={CSRF}")))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/login"));
        let cookies = set_cookies(&response);
        assert!(cookies.iter().any(|c| c.starts_with("vestibule_session=;")));
        assert!(cookies.iter().any(|c| c.starts_with("vestibule_refresh=;")));
    }

    #[tokio::test]
    async fn logout_requires_csrf() {
        let response = app(Arc::new(FakeIdp::default()))
            .oneshot(post_form(
                "/logout",
                Some("vestibule_session=id-1"),
                "csrf_token=forged",
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn logout_without_session_goes_to_login() {
        let response = app(Arc::new(FakeIdp::default()))
            .oneshot(post_form("/logout", None, ""))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/login"));
    }

    #[tokio::test]
    async fn anonymous_get_logout_does_not_come_back_to_logout() {
        let response = app(Arc::new(FakeIdp::default()))
            .oneshot(get("/logout", None))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/login"));
    }
}
