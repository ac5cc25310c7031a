//! Command-line argument dispatch.
//!
//! Maps validated CLI matches to the action to run, currently always the
//! dashboard server with its identity provider and session settings.

use crate::cli::actions::{server::Args, Action};
use crate::cli::commands::{idp, session};
use anyhow::{anyhow, Context, Result};
use url::Url;

/// Map validated CLI matches to a server action.
///
/// # Errors
/// Returns an error if required arguments are missing or a URL is malformed.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let idp_opts = idp::Options::parse(matches)?;
    let session_opts = session::Options::parse(matches)?;

    let idp_url = parse_http_url(&idp_opts.url).context("invalid VESTIBULE_IDP_URL")?;
    let idp_token_url =
        parse_http_url(&idp_opts.token_url).context("invalid VESTIBULE_IDP_TOKEN_URL")?;
    let public_url =
        parse_http_url(&session_opts.public_url).context("invalid VESTIBULE_PUBLIC_URL")?;

    Ok(Action::Server(Args {
        port,
        public_url,
        idp_url,
        idp_token_url,
        idp_api_key: idp_opts.api_key,
        idp_timeout_seconds: idp_opts.timeout_seconds,
        session_ttl_seconds: session_opts.session_ttl_seconds,
        min_password_length: session_opts.min_password_length,
    }))
}

fn parse_http_url(value: &str) -> Result<Url> {
    let url = Url::parse(value).with_context(|| format!("failed to parse URL: {value}"))?;
    match url.scheme() {
        "http" | "https" => {}
        scheme => return Err(anyhow!("unsupported URL scheme {scheme}: {value}")),
    }
    if url.host_str().is_none() {
        return Err(anyhow!("URL must include a host: {value}"));
    }
    Ok(url)
}
