//! HTTP client for the Identity Toolkit REST API.
//!
//! Requests carry the web API key as the `key` query parameter, so URLs are
//! stripped from transport errors before they reach logs or the UI.

use super::{Account, AuthTokens, ErrorCode, IdentityProvider, IdpError, IdpFuture};
use reqwest::{Client, Response};
use secrecy::{ExposeSecret, SecretString};
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::Url;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_EXPIRES_IN_SECONDS: u64 = 3600;

#[derive(Clone)]
pub struct IdpConfig {
    base_url: Url,
    token_url: Url,
    api_key: SecretString,
    timeout: Duration,
}

impl IdpConfig {
    #[must_use]
    pub fn new(base_url: Url, token_url: Url, api_key: SecretString) -> Self {
        Self {
            base_url,
            token_url,
            api_key,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl std::fmt::Debug for IdpConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdpConfig")
            .field("base_url", &self.base_url.as_str())
            .field("token_url", &self.token_url.as_str())
            .field("api_key", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug)]
pub struct IdentityToolkitClient {
    config: IdpConfig,
    client: Client,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    local_id: String,
    email: Option<String>,
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<UserRecord>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserRecord {
    local_id: String,
    email: Option<String>,
    display_name: Option<String>,
    #[serde(default)]
    email_verified: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateProfileRequest<'a> {
    id_token: &'a str,
    display_name: &'a str,
    return_secure_token: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdatePasswordRequest<'a> {
    id_token: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
struct RefreshResponse {
    user_id: String,
    id_token: String,
    refresh_token: String,
    expires_in: Option<String>,
}

#[derive(Deserialize)]
struct ProviderErrorBody {
    error: ProviderErrorDetail,
}

#[derive(Deserialize)]
struct ProviderErrorDetail {
    message: String,
}

impl IdentityToolkitClient {
    /// Build a client with the configured timeout and the crate user agent.
    ///
    /// # Errors
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub fn new(config: IdpConfig) -> Result<Self, IdpError> {
        let client = Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(config.timeout)
            .build()
            .map_err(|err| IdpError::Config(format!("Failed to build HTTP client: {err}")))?;

        Ok(Self { config, client })
    }

    fn toolkit_url(&self, method: &str) -> Result<Url, IdpError> {
        self.url_with_key(&self.config.base_url, &format!("v1/accounts:{method}"))
    }

    fn token_url(&self) -> Result<Url, IdpError> {
        self.url_with_key(&self.config.token_url, "v1/token")
    }

    fn url_with_key(&self, base: &Url, path: &str) -> Result<Url, IdpError> {
        let joined = format!(
            "{}/{}",
            base.as_str().trim_end_matches('/'),
            path.trim_start_matches('/')
        );
        let mut url = Url::parse(&joined)
            .map_err(|err| IdpError::Config(format!("Invalid provider URL: {err}")))?;
        url.query_pairs_mut()
            .append_pair("key", self.config.api_key.expose_secret());
        Ok(url)
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, IdpError> {
        let response = self
            .client
            .post(url)
            .json(body)
            .send()
            .await
            .map_err(map_request_error)?;

        handle_json_response(response).await
    }

    #[instrument(skip_all, name = "idp.sign_in")]
    async fn do_sign_in(
        &self,
        email: &str,
        password: &SecretString,
    ) -> Result<AuthTokens, IdpError> {
        let url = self.toolkit_url("signInWithPassword")?;
        let request = SignInRequest {
            email,
            password: password.expose_secret(),
            return_secure_token: true,
        };
        let response: SignInResponse = self.post_json(url, &request).await?;
        debug!(user_id = %response.local_id, "provider sign-in succeeded");

        Ok(tokens_from_sign_in(response))
    }

    #[instrument(skip_all, name = "idp.lookup")]
    async fn do_lookup(&self, id_token: &str) -> Result<Account, IdpError> {
        let url = self.toolkit_url("lookup")?;
        let response: LookupResponse = self.post_json(url, &LookupRequest { id_token }).await?;

        response
            .users
            .into_iter()
            .next()
            .map(account_from_record)
            .ok_or(IdpError::Provider {
                status: 400,
                code: ErrorCode::UserNotFound,
            })
    }

    #[instrument(skip_all, name = "idp.refresh")]
    async fn do_refresh(&self, refresh_token: &str) -> Result<AuthTokens, IdpError> {
        let url = self.token_url()?;
        let response = self
            .client
            .post(url)
            .form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .send()
            .await
            .map_err(map_request_error)?;
        let response: RefreshResponse = handle_json_response(response).await?;

        Ok(AuthTokens {
            user_id: response.user_id,
            email: None,
            id_token: response.id_token,
            refresh_token: response.refresh_token,
            expires_in_seconds: parse_expires_in(response.expires_in.as_deref()),
        })
    }

    #[instrument(skip_all, name = "idp.update_display_name")]
    async fn do_update_display_name(
        &self,
        id_token: &str,
        display_name: &str,
    ) -> Result<Account, IdpError> {
        let url = self.toolkit_url("update")?;
        let request = UpdateProfileRequest {
            id_token,
            display_name,
            return_secure_token: false,
        };
        let record: UserRecord = self.post_json(url, &request).await?;

        Ok(account_from_record(record))
    }

    #[instrument(skip_all, name = "idp.change_password")]
    async fn do_change_password(
        &self,
        id_token: &str,
        new_password: &SecretString,
    ) -> Result<AuthTokens, IdpError> {
        let url = self.toolkit_url("update")?;
        let request = UpdatePasswordRequest {
            id_token,
            password: new_password.expose_secret(),
            return_secure_token: true,
        };
        let response: SignInResponse = self.post_json(url, &request).await?;

        Ok(tokens_from_sign_in(response))
    }
}

impl IdentityProvider for IdentityToolkitClient {
    fn sign_in<'a>(
        &'a self,
        email: &'a str,
        password: &'a SecretString,
    ) -> IdpFuture<'a, AuthTokens> {
        Box::pin(self.do_sign_in(email, password))
    }

    fn lookup<'a>(&'a self, id_token: &'a str) -> IdpFuture<'a, Account> {
        Box::pin(self.do_lookup(id_token))
    }

    fn refresh<'a>(&'a self, refresh_token: &'a str) -> IdpFuture<'a, AuthTokens> {
        Box::pin(self.do_refresh(refresh_token))
    }

    fn update_display_name<'a>(
        &'a self,
        id_token: &'a str,
        display_name: &'a str,
    ) -> IdpFuture<'a, Account> {
        Box::pin(self.do_update_display_name(id_token, display_name))
    }

    fn change_password<'a>(
        &'a self,
        id_token: &'a str,
        new_password: &'a SecretString,
    ) -> IdpFuture<'a, AuthTokens> {
        Box::pin(self.do_change_password(id_token, new_password))
    }
}

fn tokens_from_sign_in(response: SignInResponse) -> AuthTokens {
    AuthTokens {
        user_id: response.local_id,
        email: response.email,
        id_token: response.id_token,
        refresh_token: response.refresh_token,
        expires_in_seconds: parse_expires_in(response.expires_in.as_deref()),
    }
}

fn account_from_record(record: UserRecord) -> Account {
    Account {
        user_id: record.local_id,
        email: record.email.unwrap_or_default(),
        display_name: record.display_name.filter(|name| !name.trim().is_empty()),
        email_verified: record.email_verified,
    }
}

/// The provider sends `expiresIn` as a decimal string.
fn parse_expires_in(value: Option<&str>) -> u64 {
    value
        .and_then(|v| v.trim().parse::<u64>().ok())
        .unwrap_or(DEFAULT_EXPIRES_IN_SECONDS)
}

/// Maps transport errors into `IdpError` without leaking the keyed URL.
fn map_request_error(err: reqwest::Error) -> IdpError {
    if err.is_timeout() {
        IdpError::Timeout
    } else {
        IdpError::Network(err.without_url().to_string())
    }
}

async fn handle_json_response<T: DeserializeOwned>(response: Response) -> Result<T, IdpError> {
    let status = response.status();
    if status.is_success() {
        return response
            .json::<T>()
            .await
            .map_err(|err| IdpError::Parse(format!("Failed to decode response: {}", err.without_url())));
    }

    let body = response.text().await.unwrap_or_default();
    let code = provider_error_code(status.as_u16(), &body);
    warn!(status = status.as_u16(), code = %code, "identity provider rejected request");

    Err(IdpError::Provider {
        status: status.as_u16(),
        code,
    })
}

fn provider_error_code(status: u16, body: &str) -> ErrorCode {
    serde_json::from_str::<ProviderErrorBody>(body).map_or_else(
        |_| ErrorCode::Other(format!("HTTP_{status}")),
        |parsed| ErrorCode::parse(&parsed.error.message),
    )
}
