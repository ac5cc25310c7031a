//! Account settings: display name and password.

use super::page_headers;
use crate::dashboard::{
    csrf,
    forms::{validate_display_name, validate_password_change, PasswordForm, ProfileForm},
    session::{issue_cookies, resolve, sign_out, Session},
    views::{render, Alert, ErrorPage, SettingsPage, Shell},
    DashboardState,
};
use crate::idp::IdpError;
use axum::{
    extract::Extension,
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Form,
};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{error, info, warn};

const SETTINGS_PATH: &str = "/settings";

/// What differs between renders of the settings page.
struct Outcome {
    status: StatusCode,
    display_name: Option<String>,
    profile_alert: Option<Alert>,
    password_alert: Option<Alert>,
    cookies: HeaderMap,
}

impl Outcome {
    fn ok() -> Self {
        Self {
            status: StatusCode::OK,
            display_name: None,
            profile_alert: None,
            password_alert: None,
            cookies: HeaderMap::new(),
        }
    }

    fn profile(status: StatusCode, typed: String, alert: Alert) -> Self {
        Self {
            status,
            display_name: Some(typed),
            profile_alert: Some(alert),
            ..Self::ok()
        }
    }

    fn password(status: StatusCode, alert: Alert) -> Self {
        Self {
            status,
            password_alert: Some(alert),
            ..Self::ok()
        }
    }
}

fn status_of(err: &IdpError) -> StatusCode {
    StatusCode::from_u16(err.http_status()).unwrap_or(StatusCode::BAD_GATEWAY)
}

fn settings_page(
    state: &DashboardState,
    headers: &HeaderMap,
    mut session: Session,
    outcome: Outcome,
) -> Response {
    let (csrf_token, mut response_headers) =
        match page_headers(state.config(), headers, Some(&mut session)) {
            Ok(parts) => parts,
            Err(page) => return page.into_response(),
        };
    for cookie in outcome.cookies.get_all(SET_COOKIE) {
        response_headers.append(SET_COOKIE, cookie.clone());
    }

    let display_name = outcome
        .display_name
        .unwrap_or_else(|| session.account.display_name.clone().unwrap_or_default());

    let page = SettingsPage {
        shell: Shell::new(SETTINGS_PATH, Some(&session.account), csrf_token),
        account: session.account,
        display_name,
        min_password_length: state.config().min_password_length(),
        profile_alert: outcome.profile_alert,
        password_alert: outcome.password_alert,
    };
    render(outcome.status, response_headers, &page)
}

pub async fn show(
    headers: HeaderMap,
    Extension(state): Extension<Arc<DashboardState>>,
) -> Response {
    match resolve(&state, &headers).await {
        Ok(session) => settings_page(&state, &headers, session, Outcome::ok()),
        Err(_) => sign_out(state.config()),
    }
}

pub async fn update_profile(
    headers: HeaderMap,
    Extension(state): Extension<Arc<DashboardState>>,
    Form(form): Form<ProfileForm>,
) -> Response {
    if !csrf::verify(&headers, &form.csrf_token) {
        warn!("Rejected profile update with a missing or mismatched CSRF token");
        return ErrorPage::forbidden().into_response();
    }
    let Ok(mut session) = resolve(&state, &headers).await else {
        return sign_out(state.config());
    };

    let name = match validate_display_name(&form.display_name) {
        Ok(name) => name,
        Err(message) => {
            let outcome = Outcome::profile(StatusCode::OK, form.display_name, Alert::error(message));
            return settings_page(&state, &headers, session, outcome);
        }
    };

    match state
        .idp()
        .update_display_name(&session.id_token, &name)
        .await
    {
        Ok(account) => {
            info!(user_id = %account.user_id, "display name updated");
            session.account = account;
            let outcome = Outcome {
                profile_alert: Some(Alert::success("Profile updated.")),
                ..Outcome::ok()
            };
            settings_page(&state, &headers, session, outcome)
        }
        Err(err) if err.is_session_expired() => {
            warn!("Session expired during profile update: {err}");
            sign_out(state.config())
        }
        Err(err) => {
            warn!("Failed to update display name: {err}");
            let outcome = Outcome::profile(
                status_of(&err),
                form.display_name,
                Alert::error(err.user_message()),
            );
            settings_page(&state, &headers, session, outcome)
        }
    }
}

pub async fn change_password(
    headers: HeaderMap,
    Extension(state): Extension<Arc<DashboardState>>,
    Form(form): Form<PasswordForm>,
) -> Response {
    if !csrf::verify(&headers, &form.csrf_token) {
        warn!("Rejected password change with a missing or mismatched CSRF token");
        return ErrorPage::forbidden().into_response();
    }
    let Ok(mut session) = resolve(&state, &headers).await else {
        return sign_out(state.config());
    };

    if let Err(problem) = validate_password_change(&form, state.config().min_password_length()) {
        let outcome = Outcome::password(StatusCode::OK, Alert::error(problem.message()));
        return settings_page(&state, &headers, session, outcome);
    }

    let current = SecretString::from(form.current_password);
    let reauth = match state.idp().sign_in(&session.account.email, &current).await {
        Ok(tokens) => tokens,
        Err(err) if err.is_bad_credentials() => {
            let outcome = Outcome::password(
                StatusCode::UNAUTHORIZED,
                Alert::error("Current password is incorrect."),
            );
            return settings_page(&state, &headers, session, outcome);
        }
        Err(err) => {
            warn!("Re-authentication failed: {err}");
            let outcome = Outcome::password(status_of(&err), Alert::error(err.user_message()));
            return settings_page(&state, &headers, session, outcome);
        }
    };

    if reauth.user_id != session.account.user_id {
        warn!(
            session_user = %session.account.user_id,
            reauth_user = %reauth.user_id,
            "Re-authenticated as a different account, signing out"
        );
        return sign_out(state.config());
    }

    let new_password = SecretString::from(form.new_password);
    let tokens = match state
        .idp()
        .change_password(&reauth.id_token, &new_password)
        .await
    {
        Ok(tokens) => tokens,
        Err(err) if err.is_session_expired() => {
            warn!("Session expired during password change: {err}");
            return sign_out(state.config());
        }
        Err(err) => {
            warn!("Failed to change password: {err}");
            let outcome = Outcome::password(status_of(&err), Alert::error(err.user_message()));
            return settings_page(&state, &headers, session, outcome);
        }
    };

    let cookies = match issue_cookies(state.config(), &tokens) {
        Ok(cookies) => cookies,
        Err(err) => {
            error!("Failed to build session cookies: {err}");
            return ErrorPage::internal().into_response();
        }
    };
    info!(user_id = %tokens.user_id, "password changed");
    // The rotated tokens supersede any refresh done while resolving the session.
    session.renewed.clear();

    let outcome = Outcome {
        password_alert: Some(Alert::success("Password changed.")),
        cookies,
        ..Outcome::ok()
    };
    settings_page(&state, &headers, session, outcome)
}

#[cfg(test)]
mod tests {
    use crate::dashboard::testing::{
        app, body_text, get, location, post_form, set_cookies, FakeIdp, CSRF, PASSWORD,
    };
    use axum::http::StatusCode;
    use std::sync::Arc;
    use tower::ServiceExt;

    fn signed_in(session: &str) -> String {
        format!("vestibule_session={session}; vestibule_refresh=refresh-1; vestibule_csrf={CSRF}")
    }

    fn password_body(current: &str, new: &str, confirm: &str) -> String {
        format!(
            "current_password={current}&new_password={new}&confirm_password={confirm}&csrf_token={CSRF}"
        )
    }

    #[tokio::test]
    async fn settings_prefills_display_name() {
        let response = app(Arc::new(FakeIdp::default()))
            .oneshot(get("/settings", Some(&signed_in("id-1"))))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_text(response).await;
        assert!(body.contains("value=\"Ada\""));
        assert!(body.contains("aria-current=\"page\""));
    }

    #[tokio::test]
    async fn profile_update_trims_and_saves() {
        let idp = Arc::new(FakeIdp::default());
        let response = app(idp.clone())
            .oneshot(post_form(
                "/settings/profile",
                Some(&signed_in("id-1")),
                &format!("display_name=++Grace+Hopper++&csrf_token={CSRF}"),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(idp.display_name().as_deref(), Some("Grace Hopper"));
        let body = body_text(response).await;
        assert!(body.contains("Profile updated."));
        assert!(body.contains("value=\"Grace Hopper\""));
    }

    #[tokio::test]
    async fn blank_display_name_is_rejected() {
        let idp = Arc::new(FakeIdp::default());
        let response = app(idp.clone())
            .oneshot(post_form(
                "/settings/profile",
                Some(&signed_in("id-1")),
                &format!("display_name=+++&csrf_token={CSRF}"),
            ))
            .await
            .expect("response");

        assert_eq!(idp.display_name().as_deref(), Some("Ada"));
        let body = body_text(response).await;
        assert!(body.contains("Display name is required."));
    }

    #[tokio::test]
    async fn profile_update_requires_csrf() {
        let response = app(Arc::new(FakeIdp::default()))
            .oneshot(post_form(
                "/settings/profile",
                Some("vestibule_session=id-1"),
                "display_name=Mallory&csrf_token=forged",
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn mismatched_confirmation_never_reaches_provider() {
        let idp = Arc::new(FakeIdp::default());
        let response = app(idp.clone())
            .oneshot(post_form(
                "/settings/password",
                Some(&signed_in("id-1")),
                &password_body(PASSWORD, "brand-new-pass", "brand-new-typo"),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(idp.password_changes(), 0);
        let body = body_text(response).await;
        assert!(body.contains("New passwords do not match."));
    }

    #[tokio::test]
    async fn short_password_names_minimum() {
        let response = app(Arc::new(FakeIdp::default()))
            .oneshot(post_form(
                "/settings/password",
                Some(&signed_in("id-1")),
                &password_body(PASSWORD, "short", "short"),
            ))
            .await
            .expect("response");

        let body = body_text(response).await;
        assert!(body.contains("New password must be at least 8 characters."));
    }

    #[tokio::test]
    async fn wrong_current_password_is_reported() {
        let idp = Arc::new(FakeIdp::default());
        let response = app(idp.clone())
            .oneshot(post_form(
                "/settings/password",
                Some(&signed_in("id-1")),
                &password_body("not-my-password", "brand-new-pass", "brand-new-pass"),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(idp.password_changes(), 0);
        let body = body_text(response).await;
        assert!(body.contains("Current password is incorrect."));
    }

    #[tokio::test]
    async fn weak_password_maps_provider_message() {
        let response = app(Arc::new(FakeIdp::default()))
            .oneshot(post_form(
                "/settings/password",
                Some(&signed_in("id-1")),
                &password_body(PASSWORD, "weakpassword", "weakpassword"),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_text(response).await;
        assert!(body.contains("Password is too weak."));
    }

    #[tokio::test]
    async fn password_change_rotates_cookies() {
        let idp = Arc::new(FakeIdp::default());
        let response = app(idp.clone())
            .oneshot(post_form(
                "/settings/password",
                Some(&signed_in("id-1")),
                &password_body(PASSWORD, "brand-new-pass", "brand-new-pass"),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(idp.password_changes(), 1);
        let cookies = set_cookies(&response);
        assert!(cookies.iter().any(|c| c.starts_with("vestibule_session=id-3;")));
        assert!(cookies.iter().any(|c| c.starts_with("vestibule_refresh=refresh-3;")));
        let body = body_text(response).await;
        assert!(body.contains("Password changed."));
        assert!(!body.contains("brand-new-pass"));
    }

    #[tokio::test]
    async fn reauth_as_another_account_signs_out() {
        let idp = Arc::new(FakeIdp::default());
        let response = app(idp.clone())
            .oneshot(post_form(
                "/settings/password",
                Some(&signed_in("id-other")),
                &password_body(PASSWORD, "brand-new-pass", "brand-new-pass"),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/login"));
        assert_eq!(idp.password_changes(), 0);
        let cookies = set_cookies(&response);
        assert!(cookies
            .iter()
            .any(|c| c.starts_with("vestibule_session=;") && c.contains("Max-Age=0")));
        assert!(cookies
            .iter()
            .any(|c| c.starts_with("vestibule_refresh=;") && c.contains("Max-Age=0")));
    }

    #[tokio::test]
    async fn password_change_without_session_goes_to_login() {
        let response = app(Arc::new(FakeIdp::default()))
            .oneshot(post_form(
                "/settings/password",
                None,
                &password_body(PASSWORD, "brand-new-pass", "brand-new-pass"),
            ))
            .await
            .expect("response");

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), Some("/login"));
    }
}
