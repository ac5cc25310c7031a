//! Provider error codes and their user-facing messages.
//!
//! The Identity Toolkit reports failures as `{"error":{"code":400,"message":"CODE"}}`
//! where the message is either a bare code or `"CODE : detail"`. Only the
//! leading code is interpreted; the detail is kept for logs.

use std::fmt;

/// Error codes the dashboard reacts to. Anything else is kept verbatim in `Other`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ErrorCode {
    EmailNotFound,
    InvalidPassword,
    InvalidLoginCredentials,
    UserDisabled,
    TooManyAttempts,
    WeakPassword,
    CredentialTooOld,
    InvalidIdToken,
    TokenExpired,
    UserNotFound,
    InvalidRefreshToken,
    InvalidEmail,
    MissingPassword,
    Other(String),
}

impl ErrorCode {
    /// Parse the leading code of a provider error message.
    #[must_use]
    pub fn parse(message: &str) -> Self {
        let code = message.split(':').next().unwrap_or_default().trim();

        match code {
            "EMAIL_NOT_FOUND" => Self::EmailNotFound,
            "INVALID_PASSWORD" => Self::InvalidPassword,
            "INVALID_LOGIN_CREDENTIALS" => Self::InvalidLoginCredentials,
            "USER_DISABLED" => Self::UserDisabled,
            "TOO_MANY_ATTEMPTS_TRY_LATER" => Self::TooManyAttempts,
            "WEAK_PASSWORD" => Self::WeakPassword,
            "CREDENTIAL_TOO_OLD_LOGIN_AGAIN" => Self::CredentialTooOld,
            "INVALID_ID_TOKEN" => Self::InvalidIdToken,
            "TOKEN_EXPIRED" => Self::TokenExpired,
            "USER_NOT_FOUND" => Self::UserNotFound,
            "INVALID_REFRESH_TOKEN" => Self::InvalidRefreshToken,
            "INVALID_EMAIL" => Self::InvalidEmail,
            "MISSING_PASSWORD" => Self::MissingPassword,
            other => Self::Other(other.to_string()),
        }
    }

    /// Whether the code means the email/password pair was rejected.
    #[must_use]
    pub const fn is_bad_credentials(&self) -> bool {
        matches!(
            self,
            Self::EmailNotFound | Self::InvalidPassword | Self::InvalidLoginCredentials
        )
    }

    /// Whether the code means the session tokens are no longer usable.
    #[must_use]
    pub const fn is_session_expired(&self) -> bool {
        matches!(
            self,
            Self::InvalidIdToken
                | Self::TokenExpired
                | Self::UserNotFound
                | Self::InvalidRefreshToken
                | Self::CredentialTooOld
        )
    }

    fn as_str(&self) -> &str {
        match self {
            Self::EmailNotFound => "EMAIL_NOT_FOUND",
            Self::InvalidPassword => "INVALID_PASSWORD",
            Self::InvalidLoginCredentials => "INVALID_LOGIN_CREDENTIALS",
            Self::UserDisabled => "USER_DISABLED",
            Self::TooManyAttempts => "TOO_MANY_ATTEMPTS_TRY_LATER",
            Self::WeakPassword => "WEAK_PASSWORD",
            Self::CredentialTooOld => "CREDENTIAL_TOO_OLD_LOGIN_AGAIN",
            Self::InvalidIdToken => "INVALID_ID_TOKEN",
            Self::TokenExpired => "TOKEN_EXPIRED",
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::InvalidRefreshToken => "INVALID_REFRESH_TOKEN",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::MissingPassword => "MISSING_PASSWORD",
            Self::Other(code) => code.as_str(),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(self.as_str())
    }
}

#[derive(Clone, Debug)]
pub enum IdpError {
    Config(String),
    Network(String),
    Timeout,
    Provider { status: u16, code: ErrorCode },
    Parse(String),
}

impl IdpError {
    /// Provider code, if the provider answered with one.
    #[must_use]
    pub const fn code(&self) -> Option<&ErrorCode> {
        match self {
            Self::Provider { code, .. } => Some(code),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_session_expired(&self) -> bool {
        self.code().is_some_and(ErrorCode::is_session_expired)
    }

    #[must_use]
    pub fn is_bad_credentials(&self) -> bool {
        self.code().is_some_and(ErrorCode::is_bad_credentials)
    }

    /// Sentence safe to show in the UI.
    #[must_use]
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::Provider { status, code } => match code {
                ErrorCode::EmailNotFound
                | ErrorCode::InvalidPassword
                | ErrorCode::InvalidLoginCredentials => "Invalid email or password.",
                ErrorCode::UserDisabled => "This account has been disabled.",
                ErrorCode::TooManyAttempts => {
                    "Too many attempts. Please wait a moment and try again."
                }
                ErrorCode::WeakPassword => "Password is too weak. Choose a stronger password.",
                ErrorCode::CredentialTooOld => "Please sign in again to continue.",
                ErrorCode::InvalidIdToken
                | ErrorCode::TokenExpired
                | ErrorCode::UserNotFound
                | ErrorCode::InvalidRefreshToken => "Your session has expired. Please sign in again.",
                ErrorCode::InvalidEmail => "Enter a valid email address.",
                ErrorCode::MissingPassword => "Password is required.",
                ErrorCode::Other(_) => match *status {
                    429 => "Too many attempts. Please wait a moment and try again.",
                    500..=599 => "Unable to reach the authentication service. Please try again.",
                    _ => "Something went wrong. Please try again.",
                },
            },
            Self::Network(_) | Self::Timeout => {
                "Unable to reach the authentication service. Please try again."
            }
            Self::Config(_) | Self::Parse(_) => "Something went wrong. Please try again.",
        }
    }

    /// HTTP status the dashboard answers with when rendering this error.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Provider { status, code } => match code {
                ErrorCode::TooManyAttempts => 429,
                ErrorCode::UserDisabled => 403,
                ErrorCode::WeakPassword
                | ErrorCode::InvalidEmail
                | ErrorCode::MissingPassword => 400,
                // Unknown codes keep the class of the provider's own status.
                ErrorCode::Other(_) => match *status {
                    429 => 429,
                    500..=599 => 503,
                    _ => 502,
                },
                _ => 401,
            },
            Self::Network(_) | Self::Timeout => 503,
            Self::Config(_) | Self::Parse(_) => 502,
        }
    }
}

impl fmt::Display for IdpError {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config(message) => write!(formatter, "Config error: {message}"),
            Self::Network(message) => write!(formatter, "Network error: {message}"),
            Self::Timeout => write!(formatter, "Timeout: identity provider did not answer"),
            Self::Provider { status, code } => {
                write!(formatter, "Provider rejected request ({status}): {code}")
            }
            Self::Parse(message) => write!(formatter, "Response error: {message}"),
        }
    }
}

impl std::error::Error for IdpError {}
