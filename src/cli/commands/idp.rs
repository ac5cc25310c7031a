use clap::{Arg, ArgMatches, Command};
use secrecy::SecretString;

pub const ARG_IDP_API_KEY: &str = "idp-api-key";
pub const ARG_IDP_URL: &str = "idp-url";
pub const ARG_IDP_TOKEN_URL: &str = "idp-token-url";
pub const ARG_IDP_TIMEOUT_SECONDS: &str = "idp-timeout-seconds";

const DEFAULT_IDP_URL: &str = "https://identitytoolkit.googleapis.com";
const DEFAULT_IDP_TOKEN_URL: &str = "https://securetoken.googleapis.com";

#[derive(Clone)]
pub struct Options {
    pub api_key: SecretString,
    pub url: String,
    pub token_url: String,
    pub timeout_seconds: u64,
}

impl Options {
    /// Parse identity provider arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the API key is missing or blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let api_key = match matches.get_one::<String>(ARG_IDP_API_KEY) {
            Some(value) if !value.trim().is_empty() => SecretString::from(value.trim().to_string()),
            _ => anyhow::bail!("missing required argument: --{ARG_IDP_API_KEY}"),
        };

        let read_url = |id: &str, default: &str| {
            matches
                .get_one::<String>(id)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        Ok(Self {
            api_key,
            url: read_url(ARG_IDP_URL, DEFAULT_IDP_URL),
            token_url: read_url(ARG_IDP_TOKEN_URL, DEFAULT_IDP_TOKEN_URL),
            timeout_seconds: matches
                .get_one::<u64>(ARG_IDP_TIMEOUT_SECONDS)
                .copied()
                .unwrap_or(10),
        })
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("api_key", &"***")
            .field("url", &self.url)
            .field("token_url", &self.token_url)
            .field("timeout_seconds", &self.timeout_seconds)
            .finish()
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_IDP_API_KEY)
                .long(ARG_IDP_API_KEY)
                .help("Identity provider web API key")
                .env("VESTIBULE_IDP_API_KEY")
                .hide_env_values(true),
        )
        .arg(
            Arg::new(ARG_IDP_URL)
                .long(ARG_IDP_URL)
                .help("Identity Toolkit base URL")
                .env("VESTIBULE_IDP_URL")
                .default_value(DEFAULT_IDP_URL),
        )
        .arg(
            Arg::new(ARG_IDP_TOKEN_URL)
                .long(ARG_IDP_TOKEN_URL)
                .help("Secure token service base URL used to refresh id tokens")
                .env("VESTIBULE_IDP_TOKEN_URL")
                .default_value(DEFAULT_IDP_TOKEN_URL),
        )
        .arg(
            Arg::new(ARG_IDP_TIMEOUT_SECONDS)
                .long(ARG_IDP_TIMEOUT_SECONDS)
                .help("Timeout for identity provider requests in seconds")
                .env("VESTIBULE_IDP_TIMEOUT_SECONDS")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..=120)),
        )
}
