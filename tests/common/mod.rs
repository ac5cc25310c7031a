//! Mock identity provider speaking the Identity Toolkit REST dialect.

#![allow(dead_code)]

use secrecy::SecretString;
use serde_json::{json, Value};
use std::time::Duration;
use url::Url;
use vestibule::idp::{IdentityToolkitClient, IdpConfig};
use wiremock::matchers::{body_partial_json, body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const API_KEY: &str = "test-api-key";
pub const EMAIL: &str = "ada@example.com";
pub const PASSWORD: &str = "correct-horse";
pub const USER_ID: &str = "uid-ada";

pub fn client(server: &MockServer) -> IdentityToolkitClient {
    client_with_timeout(server, Duration::from_secs(5))
}

pub fn client_with_timeout(server: &MockServer, timeout: Duration) -> IdentityToolkitClient {
    let base = Url::parse(&server.uri()).expect("mock server url");
    let token = base.join("/securetoken").expect("token url");
    let config = IdpConfig::new(base, token, SecretString::from(API_KEY.to_string()))
        .with_timeout(timeout);
    IdentityToolkitClient::new(config).expect("client")
}

pub fn provider_error(message: &str) -> Value {
    json!({
        "error": {
            "code": 400,
            "message": message,
            "errors": [{ "message": message, "domain": "global", "reason": "invalid" }]
        }
    })
}

fn accounts(method_name: &str) -> String {
    format!("/v1/accounts:{method_name}")
}

/// Sign-in succeeds for `email`/`password` and returns `id_token`.
pub async fn mount_sign_in(server: &MockServer, email: &str, password: &str, id_token: &str) {
    Mock::given(method("POST"))
        .and(path(accounts("signInWithPassword")))
        .and(query_param("key", API_KEY))
        .and(body_partial_json(json!({
            "email": email,
            "password": password,
            "returnSecureToken": true
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "identitytoolkit#VerifyPasswordResponse",
            "localId": USER_ID,
            "email": email,
            "displayName": "",
            "idToken": id_token,
            "registered": true,
            "refreshToken": format!("refresh-for-{id_token}"),
            "expiresIn": "3600"
        })))
        .mount(server)
        .await;
}

/// Any sign-in not matched by a more specific mock fails with `code`.
pub async fn mount_sign_in_error(server: &MockServer, code: &str) {
    Mock::given(method("POST"))
        .and(path(accounts("signInWithPassword")))
        .respond_with(ResponseTemplate::new(400).set_body_json(provider_error(code)))
        .with_priority(10)
        .mount(server)
        .await;
}

/// Sign-in answers `status` with a body that is not a provider error document.
pub async fn mount_sign_in_raw(server: &MockServer, status: u16, body: &str) {
    Mock::given(method("POST"))
        .and(path(accounts("signInWithPassword")))
        .respond_with(ResponseTemplate::new(status).set_body_string(body))
        .mount(server)
        .await;
}

pub async fn mount_lookup(server: &MockServer, id_token: &str, display_name: Option<&str>) {
    let mut user = json!({
        "localId": USER_ID,
        "email": EMAIL,
        "emailVerified": true,
        "passwordUpdatedAt": 1_700_000_000_000_u64
    });
    if let Some(name) = display_name {
        user["displayName"] = json!(name);
    }

    Mock::given(method("POST"))
        .and(path(accounts("lookup")))
        .and(body_partial_json(json!({ "idToken": id_token })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "identitytoolkit#GetAccountInfoResponse",
            "users": [user]
        })))
        .mount(server)
        .await;
}

pub async fn mount_lookup_error(server: &MockServer, id_token: &str, code: &str) {
    Mock::given(method("POST"))
        .and(path(accounts("lookup")))
        .and(body_partial_json(json!({ "idToken": id_token })))
        .respond_with(ResponseTemplate::new(400).set_body_json(provider_error(code)))
        .mount(server)
        .await;
}

pub async fn mount_refresh(server: &MockServer, refresh_token: &str, new_id_token: &str) {
    Mock::given(method("POST"))
        .and(path("/securetoken/v1/token"))
        .and(query_param("key", API_KEY))
        .and(body_string_contains("grant_type=refresh_token"))
        .and(body_string_contains(format!("refresh_token={refresh_token}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "expires_in": "3600",
            "token_type": "Bearer",
            "refresh_token": format!("refresh-for-{new_id_token}"),
            "id_token": new_id_token,
            "user_id": USER_ID,
            "project_id": "1234"
        })))
        .mount(server)
        .await;
}

pub async fn mount_update_display_name(server: &MockServer, id_token: &str, name: &str) {
    Mock::given(method("POST"))
        .and(path(accounts("update")))
        .and(body_partial_json(json!({ "idToken": id_token, "displayName": name })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "identitytoolkit#SetAccountInfoResponse",
            "localId": USER_ID,
            "email": EMAIL,
            "displayName": name,
            "emailVerified": true
        })))
        .mount(server)
        .await;
}

pub async fn mount_change_password(server: &MockServer, id_token: &str, new_id_token: &str) {
    Mock::given(method("POST"))
        .and(path(accounts("update")))
        .and(body_partial_json(json!({ "idToken": id_token, "returnSecureToken": true })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "kind": "identitytoolkit#SetAccountInfoResponse",
            "localId": USER_ID,
            "email": EMAIL,
            "idToken": new_id_token,
            "refreshToken": format!("refresh-for-{new_id_token}"),
            "expiresIn": "3600"
        })))
        .expect(1)
        .mount(server)
        .await;
}
