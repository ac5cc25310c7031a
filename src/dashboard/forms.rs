//! Form payloads and the checks run before anything reaches the provider.

use regex::Regex;
use serde::Deserialize;

const MAX_DISPLAY_NAME_CHARS: usize = 64;

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
    pub next: Option<String>,
    pub csrf_token: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LogoutForm {
    pub csrf_token: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct ProfileForm {
    pub display_name: String,
    pub csrf_token: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct PasswordForm {
    pub current_password: String,
    pub new_password: String,
    pub confirm_password: String,
    pub csrf_token: String,
}

#[derive(Deserialize, Default)]
#[serde(default)]
pub struct LoginQuery {
    pub next: Option<String>,
}

pub(super) fn valid_email(email: &str) -> bool {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").is_ok_and(|regex| regex.is_match(email))
}

/// Returns the trimmed email, or the message to show.
pub(super) fn validate_login(form: &LoginForm) -> Result<String, &'static str> {
    let email = form.email.trim();
    if email.is_empty() {
        return Err("Email is required.");
    }
    if !valid_email(email) {
        return Err("Enter a valid email address.");
    }
    if form.password.is_empty() {
        return Err("Password is required.");
    }
    Ok(email.to_string())
}

/// Returns the trimmed display name, or the message to show.
pub(super) fn validate_display_name(raw: &str) -> Result<String, &'static str> {
    let name = raw.trim();
    if name.is_empty() {
        return Err("Display name is required.");
    }
    if name.chars().count() > MAX_DISPLAY_NAME_CHARS {
        return Err("Display name must be 64 characters or fewer.");
    }
    if name.chars().any(char::is_control) {
        return Err("Display name contains invalid characters.");
    }
    Ok(name.to_string())
}

#[derive(Debug, PartialEq, Eq)]
pub(super) enum PasswordProblem {
    Missing,
    Mismatch,
    TooShort(usize),
    Unchanged,
}

impl PasswordProblem {
    pub(super) fn message(&self) -> String {
        match self {
            Self::Missing => "All password fields are required.".to_string(),
            Self::Mismatch => "New passwords do not match.".to_string(),
            Self::TooShort(min) => format!("New password must be at least {min} characters."),
            Self::Unchanged => {
                "New password must be different from the current password.".to_string()
            }
        }
    }
}

/// Checks run in order: required, confirmation, length, then reuse.
pub(super) fn validate_password_change(
    form: &PasswordForm,
    min_length: usize,
) -> Result<(), PasswordProblem> {
    if form.current_password.is_empty()
        || form.new_password.is_empty()
        || form.confirm_password.is_empty()
    {
        return Err(PasswordProblem::Missing);
    }
    if form.new_password != form.confirm_password {
        return Err(PasswordProblem::Mismatch);
    }
    if form.new_password.chars().count() < min_length {
        return Err(PasswordProblem::TooShort(min_length));
    }
    if form.new_password == form.current_password {
        return Err(PasswordProblem::Unchanged);
    }
    Ok(())
}
