//! Identity provider seam.
//!
//! Every credential operation (sign-in, token refresh, profile and password
//! updates) is delegated to the provider. Handlers depend on the
//! [`IdentityProvider`] trait so they can be exercised without the network;
//! [`IdentityToolkitClient`] is the HTTP implementation used in production.
//! Passwords and tokens passed through here must never be logged.

mod client;
mod error;

pub use client::{IdentityToolkitClient, IdpConfig};
pub use error::{ErrorCode, IdpError};

use secrecy::SecretString;
use std::{future::Future, pin::Pin};

pub type IdpFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, IdpError>> + Send + 'a>>;

/// Account profile as reported by the provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Account {
    pub user_id: String,
    pub email: String,
    pub display_name: Option<String>,
    pub email_verified: bool,
}

impl Account {
    /// Display name when set, otherwise the email address.
    #[must_use]
    pub fn greeting_name(&self) -> &str {
        self.display_name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or(&self.email)
    }
}

/// Tokens issued by the provider after sign-in, refresh, or password change.
#[derive(Clone)]
pub struct AuthTokens {
    pub user_id: String,
    pub email: Option<String>,
    pub id_token: String,
    pub refresh_token: String,
    pub expires_in_seconds: u64,
}

impl std::fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthTokens")
            .field("user_id", &self.user_id)
            .field("email", &self.email)
            .field("id_token", &"***")
            .field("refresh_token", &"***")
            .field("expires_in_seconds", &self.expires_in_seconds)
            .finish()
    }
}

pub trait IdentityProvider: Send + Sync {
    /// Verify an email/password pair and issue session tokens.
    fn sign_in<'a>(&'a self, email: &'a str, password: &'a SecretString)
        -> IdpFuture<'a, AuthTokens>;

    /// Resolve the account behind an id token.
    fn lookup<'a>(&'a self, id_token: &'a str) -> IdpFuture<'a, Account>;

    /// Exchange a refresh token for a fresh id token.
    fn refresh<'a>(&'a self, refresh_token: &'a str) -> IdpFuture<'a, AuthTokens>;

    fn update_display_name<'a>(
        &'a self,
        id_token: &'a str,
        display_name: &'a str,
    ) -> IdpFuture<'a, Account>;

    /// Set a new password. The provider revokes older tokens and returns new ones.
    fn change_password<'a>(
        &'a self,
        id_token: &'a str,
        new_password: &'a SecretString,
    ) -> IdpFuture<'a, AuthTokens>;
}
