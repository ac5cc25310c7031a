//! In-memory identity provider and request helpers for handler tests.

use super::{router, DashboardConfig, DashboardState};
use crate::idp::{
    Account, AuthTokens, ErrorCode, IdentityProvider, IdpError, IdpFuture,
};
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, Response},
    Router,
};
use secrecy::{ExposeSecret, SecretString};
use std::sync::{Arc, Mutex};

pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "correct-horse";
pub const CSRF: &str = "csrf-test-token";

pub fn config() -> DashboardConfig {
    let url = url::Url::parse("http://localhost:8080").expect("url");
    DashboardConfig::new(&url)
}

pub fn app(idp: Arc<FakeIdp>) -> Router {
    router(Arc::new(DashboardState::new(config(), idp)))
}

fn provider(code: ErrorCode) -> IdpError {
    IdpError::Provider { status: 400, code }
}

pub struct FakeIdp {
    password: Mutex<String>,
    display_name: Mutex<Option<String>>,
    password_changes: Mutex<u32>,
}

impl Default for FakeIdp {
    fn default() -> Self {
        Self {
            password: Mutex::new(PASSWORD.to_string()),
            display_name: Mutex::new(Some("Ada".to_string())),
            password_changes: Mutex::new(0),
        }
    }
}

impl FakeIdp {
    pub fn password_changes(&self) -> u32 {
        *self.password_changes.lock().expect("lock")
    }

    pub fn display_name(&self) -> Option<String> {
        self.display_name.lock().expect("lock").clone()
    }

    fn account(&self) -> Account {
        Account {
            user_id: "uid-1".to_string(),
            email: EMAIL.to_string(),
            display_name: self.display_name(),
            email_verified: true,
        }
    }

    fn tokens(suffix: u32) -> AuthTokens {
        AuthTokens {
            user_id: "uid-1".to_string(),
            email: Some(EMAIL.to_string()),
            id_token: format!("id-{suffix}"),
            refresh_token: format!("refresh-{suffix}"),
            expires_in_seconds: 3600,
        }
    }

    fn check_token(id_token: &str) -> Result<(), IdpError> {
        match id_token {
            "id-1" | "id-2" | "id-3" | "id-other" => Ok(()),
            "expired" => Err(provider(ErrorCode::TokenExpired)),
            _ => Err(provider(ErrorCode::InvalidIdToken)),
        }
    }
}

impl IdentityProvider for FakeIdp {
    fn sign_in<'a>(
        &'a self,
        email: &'a str,
        password: &'a SecretString,
    ) -> IdpFuture<'a, AuthTokens> {
        Box::pin(async move {
            match email {
                "down@example.com" => Err(IdpError::Network("connection refused".to_string())),
                "disabled@example.com" => Err(provider(ErrorCode::UserDisabled)),
                "busy@example.com" => Err(provider(ErrorCode::TooManyAttempts)),
                "other@example.com" => Ok(AuthTokens {
                    user_id: "uid-2".to_string(),
                    ..Self::tokens(9)
                }),
                EMAIL if password.expose_secret() == *self.password.lock().expect("lock") => {
                    Ok(Self::tokens(1))
                }
                _ => Err(provider(ErrorCode::InvalidLoginCredentials)),
            }
        })
    }

    fn lookup<'a>(&'a self, id_token: &'a str) -> IdpFuture<'a, Account> {
        Box::pin(async move {
            Self::check_token(id_token)?;
            if id_token == "id-other" {
                return Ok(Account {
                    email: "other@example.com".to_string(),
                    ..self.account()
                });
            }
            Ok(self.account())
        })
    }

    fn refresh<'a>(&'a self, refresh_token: &'a str) -> IdpFuture<'a, AuthTokens> {
        Box::pin(async move {
            if refresh_token == "refresh-1" {
                Ok(Self::tokens(2))
            } else {
                Err(provider(ErrorCode::InvalidRefreshToken))
            }
        })
    }

    fn update_display_name<'a>(
        &'a self,
        id_token: &'a str,
        display_name: &'a str,
    ) -> IdpFuture<'a, Account> {
        Box::pin(async move {
            Self::check_token(id_token)?;
            *self.display_name.lock().expect("lock") = Some(display_name.to_string());
            Ok(self.account())
        })
    }

    fn change_password<'a>(
        &'a self,
        id_token: &'a str,
        new_password: &'a SecretString,
    ) -> IdpFuture<'a, AuthTokens> {
        Box::pin(async move {
            Self::check_token(id_token)?;
            if new_password.expose_secret().starts_with("weak") {
                return Err(provider(ErrorCode::WeakPassword));
            }
            *self.password.lock().expect("lock") = new_password.expose_secret().to_string();
            *self.password_changes.lock().expect("lock") += 1;
            Ok(Self::tokens(3))
        })
    }
}

pub fn get(path: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).expect("request")
}

pub fn post_form(path: &str, cookie: Option<&str>, body: &str) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(path)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).expect("request")
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    String::from_utf8(bytes.to_vec()).expect("utf8")
}

pub fn set_cookies(response: &Response<Body>) -> Vec<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .map(ToString::to_string)
        .collect()
}

pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
}
