use crate::{
    dashboard::{self, DashboardConfig},
    idp::{IdentityToolkitClient, IdpConfig},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::debug;
use url::Url;

pub struct Args {
    pub port: u16,
    pub public_url: Url,
    pub idp_url: Url,
    pub idp_token_url: Url,
    pub idp_api_key: SecretString,
    pub idp_timeout_seconds: u64,
    pub session_ttl_seconds: i64,
    pub min_password_length: usize,
}

impl std::fmt::Debug for Args {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Args")
            .field("port", &self.port)
            .field("public_url", &self.public_url.as_str())
            .field("idp_url", &self.idp_url.as_str())
            .field("idp_token_url", &self.idp_token_url.as_str())
            .field("idp_api_key", &"***")
            .field("idp_timeout_seconds", &self.idp_timeout_seconds)
            .field("session_ttl_seconds", &self.session_ttl_seconds)
            .field("min_password_length", &self.min_password_length)
            .finish()
    }
}

/// Execute the server action.
/// # Errors
/// Returns an error if the identity provider client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    debug!("Server args: {:?}", args);

    let idp_config = IdpConfig::new(args.idp_url, args.idp_token_url, args.idp_api_key)
        .with_timeout(Duration::from_secs(args.idp_timeout_seconds));
    let idp = IdentityToolkitClient::new(idp_config)
        .context("Failed to build identity provider client")?;

    let config = DashboardConfig::new(&args.public_url)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_min_password_length(args.min_password_length);

    dashboard::new(args.port, config, Arc::new(idp)).await
}
