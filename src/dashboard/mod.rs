//! Server-rendered dashboard: login, account overview, and settings.
//!
//! Every request passes through [`gate::require_session`] before reaching a
//! handler. Handlers that need the account resolve it through the provider
//! with [`session::resolve`].

use crate::idp::IdentityProvider;
use anyhow::Result;
use axum::{
    body::Body,
    extract::MatchedPath,
    http::{HeaderName, HeaderValue, Request},
    middleware,
    routing::{get, post},
    Extension, Router,
};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::PropagateRequestIdLayer, set_header::SetRequestHeaderLayer, trace::TraceLayer,
};
use tracing::{info, info_span, Span};
use ulid::Ulid;
use url::Url;

pub mod csrf;
mod forms;
pub mod gate;
mod handlers;
pub mod session;
mod views;

const DEFAULT_SESSION_TTL_SECONDS: i64 = 7 * 24 * 60 * 60;
const DEFAULT_MIN_PASSWORD_LENGTH: usize = 8;

#[derive(Clone, Debug)]
pub struct DashboardConfig {
    public_url: String,
    session_ttl_seconds: i64,
    min_password_length: usize,
}

impl DashboardConfig {
    #[must_use]
    pub fn new(public_url: &Url) -> Self {
        Self {
            public_url: public_url.as_str().trim_end_matches('/').to_string(),
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            min_password_length: DEFAULT_MIN_PASSWORD_LENGTH,
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_min_password_length(mut self, length: usize) -> Self {
        self.min_password_length = length;
        self
    }

    #[must_use]
    pub fn public_url(&self) -> &str {
        &self.public_url
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    #[must_use]
    pub fn min_password_length(&self) -> usize {
        self.min_password_length
    }

    /// Cookies are only marked `Secure` when the dashboard is served over HTTPS.
    #[must_use]
    pub fn cookie_secure(&self) -> bool {
        self.public_url.starts_with("https://")
    }
}

pub struct DashboardState {
    config: DashboardConfig,
    idp: Arc<dyn IdentityProvider>,
}

impl DashboardState {
    #[must_use]
    pub fn new(config: DashboardConfig, idp: Arc<dyn IdentityProvider>) -> Self {
        Self { config, idp }
    }

    #[must_use]
    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    pub(crate) fn idp(&self) -> &dyn IdentityProvider {
        self.idp.as_ref()
    }
}

/// Build the dashboard router with request ids, tracing, and the session gate.
#[must_use]
pub fn router(state: Arc<DashboardState>) -> Router {
    Router::new()
        .route("/", get(handlers::dashboard::root))
        .route(
            gate::LOGIN_PATH,
            get(handlers::login::show).post(handlers::login::submit),
        )
        .route(gate::LOGOUT_PATH, post(handlers::logout::logout))
        .route(gate::HOME_PATH, get(handlers::dashboard::show))
        .route("/settings", get(handlers::settings::show))
        .route("/settings/profile", post(handlers::settings::update_profile))
        .route(
            "/settings/password",
            post(handlers::settings::change_password),
        )
        .route(
            gate::HEALTH_PATH,
            get(handlers::health::health).options(handlers::health::health),
        )
        .fallback(handlers::not_found::not_found)
        .layer(middleware::from_fn(gate::require_session))
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestHeaderLayer::if_not_present(
                    HeaderName::from_static("x-request-id"),
                    |_req: &_| HeaderValue::from_str(Ulid::new().to_string().as_str()).ok(),
                ))
                .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
                    "x-request-id",
                )))
                .layer(TraceLayer::new_for_http().make_span_with(make_span))
                .layer(Extension(state)),
        )
}

/// Start the server
/// # Errors
/// Return error if failed to bind or serve
pub async fn new(port: u16, config: DashboardConfig, idp: Arc<dyn IdentityProvider>) -> Result<()> {
    let public_url = config.public_url().to_string();
    let app = router(Arc::new(DashboardState::new(config, idp)));

    let listener = TcpListener::bind(format!("::0:{port}")).await?;

    info!("Listening on [::]:{}, public URL {}", port, public_url);

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Gracefully shutdown");
}

fn make_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|val| val.to_str().ok())
        .unwrap_or("none");
    let matched_path = request
        .extensions()
        .get::<MatchedPath>()
        .map_or_else(|| request.uri().path(), MatchedPath::as_str);

    info_span!(
        "http.request",
        http.method = %request.method(),
        http.route = matched_path,
        request_id
    )
}

#[cfg(test)]
pub(crate) mod testing;
