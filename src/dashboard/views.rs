//! Page templates and the shared pieces they render.
//!
//! Alert text must be safe to show and never include secrets or tokens.

use crate::idp::Account;
use askama::Template;
use axum::{
    http::{HeaderMap, StatusCode},
    response::{Html, IntoResponse, Response},
};
use tracing::error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AlertKind {
    Error,
    Success,
    Info,
}

#[derive(Clone, Debug)]
pub struct Alert {
    pub kind: AlertKind,
    pub message: String,
}

impl Alert {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Error,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Success,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: AlertKind::Info,
            message: message.into(),
        }
    }

    pub fn classes(&self) -> &'static str {
        match self.kind {
            AlertKind::Error => {
                "rounded-lg border border-red-200 bg-red-50 px-4 py-3 text-sm text-red-700 dark:border-red-400 dark:bg-red-900/30 dark:text-red-200"
            }
            AlertKind::Success => {
                "rounded-lg border border-emerald-200 bg-emerald-50 px-4 py-3 text-sm text-emerald-700 dark:border-emerald-400 dark:bg-emerald-900/30 dark:text-emerald-200"
            }
            AlertKind::Info => {
                "rounded-lg border border-blue-200 bg-blue-50 px-4 py-3 text-sm text-blue-700 dark:border-blue-400 dark:bg-blue-900/30 dark:text-blue-200"
            }
        }
    }

    /// Errors interrupt screen readers, the rest are announced politely.
    pub fn role(&self) -> &'static str {
        match self.kind {
            AlertKind::Error => "alert",
            AlertKind::Success | AlertKind::Info => "status",
        }
    }
}

pub struct NavLink {
    pub href: &'static str,
    pub label: &'static str,
    pub icon: &'static str,
    pub active: bool,
}

impl NavLink {
    pub fn classes(&self) -> &'static str {
        if self.active {
            "group flex items-center px-2 py-2 text-sm font-medium rounded-md transition-colors text-blue-600 bg-blue-50 dark:bg-blue-900 dark:text-blue-400"
        } else {
            "group flex items-center px-2 py-2 text-sm font-medium rounded-md transition-colors text-gray-600 dark:text-gray-300 hover:bg-gray-50 dark:hover:bg-gray-800 hover:text-gray-900 dark:hover:text-white"
        }
    }

    pub fn icon_classes(&self) -> &'static str {
        if self.active {
            "material-symbols-outlined mr-3 text-xl transition-colors text-blue-600 dark:text-blue-400"
        } else {
            "material-symbols-outlined mr-3 text-xl transition-colors text-gray-400 group-hover:text-gray-900 dark:group-hover:text-white"
        }
    }
}

/// Sidebar, header, and sign-out form shared by signed-in pages.
pub struct Shell {
    pub links: Vec<NavLink>,
    pub user_label: String,
    pub csrf_token: String,
    pub version: &'static str,
}

impl Shell {
    pub fn new(active: &str, account: Option<&Account>, csrf_token: String) -> Self {
        let links = [
            ("/dashboard", "Dashboard", "dashboard"),
            ("/settings", "Settings", "settings"),
        ]
        .into_iter()
        .map(|(href, label, icon)| NavLink {
            href,
            label,
            icon,
            active: href == active,
        })
        .collect();

        Self {
            links,
            user_label: account
                .map(|account| account.greeting_name().to_string())
                .unwrap_or_default(),
            csrf_token,
            version: env!("CARGO_PKG_VERSION"),
        }
    }
}

#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginPage {
    pub csrf_token: String,
    pub email: String,
    pub next: String,
    pub alert: Option<Alert>,
}

#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardPage {
    pub shell: Shell,
    pub account: Account,
}

#[derive(Template)]
#[template(path = "settings.html")]
pub struct SettingsPage {
    pub shell: Shell,
    pub account: Account,
    pub display_name: String,
    pub min_password_length: usize,
    pub profile_alert: Option<Alert>,
    pub password_alert: Option<Alert>,
}

#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundPage {
    pub shell: Shell,
    pub path: String,
}

#[derive(Template)]
#[template(path = "error.html")]
pub struct ErrorPage {
    pub status: u16,
    pub title: &'static str,
    pub message: &'static str,
}

impl ErrorPage {
    pub fn forbidden() -> Self {
        Self {
            status: StatusCode::FORBIDDEN.as_u16(),
            title: "Request blocked",
            message: "Your form expired or came from another site. Reload the page and try again.",
        }
    }

    pub fn internal() -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR.as_u16(),
            title: "Something went wrong",
            message: "Something went wrong. Please try again.",
        }
    }
}

impl IntoResponse for ErrorPage {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        render(status, HeaderMap::new(), &self)
    }
}

/// Render a template with extra headers, falling back to a plain 500.
pub fn render<T: Template>(status: StatusCode, headers: HeaderMap, template: &T) -> Response {
    match template.render() {
        Ok(html) => (status, headers, Html(html)).into_response(),
        Err(err) => {
            error!("Failed to render template: {err}");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    }
}
