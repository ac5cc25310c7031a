use clap::{Arg, ArgMatches, Command};

pub const ARG_PUBLIC_URL: &str = "public-url";
pub const ARG_SESSION_TTL_SECONDS: &str = "session-ttl-seconds";
pub const ARG_MIN_PASSWORD_LENGTH: &str = "min-password-length";

#[derive(Debug, Clone)]
pub struct Options {
    pub public_url: String,
    pub session_ttl_seconds: i64,
    pub min_password_length: usize,
}

impl Options {
    /// Parse session and form arguments from matches.
    ///
    /// # Errors
    /// Returns an error if the public URL is blank.
    pub fn parse(matches: &ArgMatches) -> anyhow::Result<Self> {
        let public_url = matches
            .get_one::<String>(ARG_PUBLIC_URL)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or_else(|| anyhow::anyhow!("missing required argument: --{ARG_PUBLIC_URL}"))?;

        Ok(Self {
            public_url,
            session_ttl_seconds: matches
                .get_one::<i64>(ARG_SESSION_TTL_SECONDS)
                .copied()
                .unwrap_or(604_800),
            min_password_length: matches
                .get_one::<usize>(ARG_MIN_PASSWORD_LENGTH)
                .copied()
                .unwrap_or(8),
        })
    }
}

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_PUBLIC_URL)
                .long(ARG_PUBLIC_URL)
                .help("Public URL the dashboard is served from")
                .long_help(
                    "Public URL the dashboard is served from. Cookies are marked Secure when this URL uses https.",
                )
                .env("VESTIBULE_PUBLIC_URL")
                .default_value("http://localhost:8080"),
        )
        .arg(
            Arg::new(ARG_SESSION_TTL_SECONDS)
                .long(ARG_SESSION_TTL_SECONDS)
                .help("Session cookie TTL in seconds")
                .env("VESTIBULE_SESSION_TTL_SECONDS")
                .default_value("604800")
                .value_parser(clap::value_parser!(i64).range(60..)),
        )
        .arg(
            Arg::new(ARG_MIN_PASSWORD_LENGTH)
                .long(ARG_MIN_PASSWORD_LENGTH)
                .help("Minimum length accepted for a new password")
                .env("VESTIBULE_MIN_PASSWORD_LENGTH")
                .default_value("8")
                .value_parser(clap::value_parser!(usize)),
        )
}
