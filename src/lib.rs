//! # Vestibule (Account Dashboard)
//!
//! `vestibule` is a small server-rendered dashboard: a login screen, a route
//! gate, and account settings (display name, password change). It owns no
//! credentials and no storage. Sign-in, token issuance, and password hashing
//! are delegated to an external identity provider speaking the Identity
//! Toolkit REST dialect.
//!
//! ## Sessions
//!
//! After a successful sign-in the provider's id token and refresh token are
//! stored in `HttpOnly` cookies. The route gate only checks whether the session
//! cookie is present; pages that need the account resolve it through the
//! provider and refresh the id token once when it has expired.
//!
//! ## Error Messages
//!
//! Provider error codes are mapped to user-facing sentences in
//! [`idp::IdpError::user_message`]. Credential failures never reveal whether an
//! email address is registered.

pub mod cli;
pub mod dashboard;
pub mod idp;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
