//! Bankdesk is the browser-facing web app for a banking back office.
//!
//! Customers manage their bank accounts and raise fund and transfer requests.
//! Administrators review those requests (pending, processing, completed,
//! rejected) and approve portal access for newly registered users.
//!
//! This library serves HTML pages directly and acts as a thin, typed client
//! of the banking REST backend, which owns all durable data.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum::{
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use axum_htmx::HxRedirect;
use axum_server::Handle;
use tokio::signal;

mod account;
mod alert;
mod api;
mod app_state;
mod auth;
mod dashboard;
mod endpoints;
mod html;
mod internal_server_error;
mod listing;
mod logging;
mod modal;
mod navigation;
mod not_found;
mod pagination;
mod request;
mod review;
mod routing;
mod store;
mod timezone;
mod transaction;
mod user;

#[cfg(test)]
mod test_utils;

pub use api::{ApiClient, DEMO_ADMIN_EMAIL, DEMO_PASSWORD, DEMO_USER_EMAIL, FakeBackend, Gateways};
pub use app_state::AppState;
pub use logging::{LOG_BODY_LENGTH_LIMIT, logging_middleware};
pub use pagination::PaginationConfig;
pub use request::WorkflowError;
pub use routing::build_router;

use crate::{
    alert::Alert, internal_server_error::InternalServerError, not_found::get_404_not_found_response,
};

/// An async task that waits for either the ctrl+c or terminate signal, whichever comes first, and
/// then signals the server to shut down gracefully.
///
/// `handle` is a handle to an Axum `Server`.
pub async fn graceful_shutdown(handle: Handle<SocketAddr>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::debug!("Received ctrl+c signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
            handle.graceful_shutdown(Some(Duration::from_secs(1)));
        },
    }
}

/// The errors that may occur in the application.
#[derive(Debug, Clone, thiserror::Error, PartialEq)]
pub enum Error {
    /// The email and password combination was rejected by the backend.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The auth cookie is missing from the cookie jar in the request.
    #[error("no cookies in the cookie jar :(")]
    CookieMissing,

    /// The auth cookie could not be decoded or has expired.
    #[error("invalid auth token: {0}")]
    InvalidToken(String),

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// User input failed a local check and was not sent to the backend.
    #[error("{0}")]
    Validation(String),

    /// A review action was not valid for the request it targets.
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    /// The requested resource was not found.
    ///
    /// Either the backend answered 404 or an in-memory lookup came up empty.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The backend no longer accepts the session's access token.
    #[error("the session is no longer valid")]
    Unauthorized,

    /// The user is logged in but is not allowed to perform the action.
    #[error("you do not have permission to do that")]
    Forbidden,

    /// The backend answered with an error status.
    ///
    /// `message` is taken from the response envelope when there is one.
    #[error("the backend returned {status}: {message}")]
    Backend {
        /// The HTTP status code returned by the backend.
        status: u16,
        /// The error message returned by the backend.
        message: String,
    },

    /// The backend could not be reached.
    #[error("could not reach the backend: {0}")]
    Network(String),

    /// The backend replied with a body that does not match the expected shape.
    #[error("could not decode the backend response: {0}")]
    Decode(String),

    /// The backend base URL is not a valid absolute URL.
    #[error("invalid API URL \"{0}\"")]
    InvalidApiUrl(String),

    /// An error occurred while getting the local timezone from a canonical timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezoneError(String),

    /// An error occurred while serializing a struct as JSON
    #[error("could not serialize as JSON: {0}")]
    JSONSerializationError(String),

    /// Could not acquire the lock on shared in-memory state.
    #[error("could not acquire the state lock")]
    StateLockError,
}

impl From<reqwest::Error> for Error {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            Error::Decode(error.to_string())
        } else {
            Error::Network(error.to_string())
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::NotFound => get_404_not_found_response(),
            // The log out route clears the stale cookie before sending the user to the log-in page.
            Error::Unauthorized | Error::CookieMissing | Error::InvalidToken(_) => {
                Redirect::to(endpoints::LOG_OUT).into_response()
            }
            Error::Forbidden => InternalServerError {
                status: StatusCode::FORBIDDEN,
                description: "Access denied",
                fix: "This page is only available to administrators.",
            }
            .into_response(),
            Error::Network(error) => {
                tracing::error!("Could not reach the backend: {error}");
                InternalServerError {
                    status: StatusCode::BAD_GATEWAY,
                    description: "The banking service is unavailable",
                    fix: "Try again in a few minutes.",
                }
                .into_response()
            }
            Error::InvalidTimezoneError(timezone) => InternalServerError {
                description: "Invalid Timezone Settings",
                fix: &format!(
                    "Could not get local timezone \"{timezone}\". Check your server settings and \
                    ensure the timezone has been set to valid, canonical timezone string"
                ),
                ..Default::default()
            }
            .into_response(),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                InternalServerError::default().into_response()
            }
        }
    }
}

impl Error {
    /// Render the error as a toast for htmx requests.
    ///
    /// Forms and buttons that issue htmx requests route error responses to
    /// the page's alert container, so every mutation reports failures the same way.
    fn into_alert_response(self) -> Response {
        match self {
            Error::Validation(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::error("Check your input", &message).into_html(),
            )
                .into_response(),
            Error::Workflow(error) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Alert::error("Action not allowed", &error.to_string()).into_html(),
            )
                .into_response(),
            Error::TooWeak(feedback) => (
                StatusCode::BAD_REQUEST,
                Alert::error("Password is too weak", &feedback).into_html(),
            )
                .into_response(),
            Error::NotFound => (
                StatusCode::NOT_FOUND,
                Alert::error(
                    "Not found",
                    "The item could not be found. \
                    Try refreshing the page to see if it has already been removed.",
                )
                .into_html(),
            )
                .into_response(),
            Error::Unauthorized | Error::CookieMissing | Error::InvalidToken(_) => {
                (HxRedirect(endpoints::LOG_OUT.to_owned()), StatusCode::OK).into_response()
            }
            Error::Forbidden => (
                StatusCode::FORBIDDEN,
                Alert::error(
                    "Access denied",
                    "You do not have permission to perform this action.",
                )
                .into_html(),
            )
                .into_response(),
            Error::Backend { status, message } => {
                tracing::warn!("Backend rejected the request with {status}: {message}");
                let status =
                    StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
                (
                    status,
                    Alert::error("The banking service rejected the request", &message).into_html(),
                )
                    .into_response()
            }
            Error::Network(error) => {
                tracing::error!("Could not reach the backend: {error}");
                (
                    StatusCode::BAD_GATEWAY,
                    Alert::error(
                        "The banking service is unavailable",
                        "Nothing was changed. Try again in a few minutes.",
                    )
                    .into_html(),
                )
                    .into_response()
            }
            error => {
                tracing::error!("An unexpected error occurred: {error}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Alert::error(
                        "Something went wrong",
                        "An unexpected error occurred, check the server logs for more details.",
                    )
                    .into_html(),
                )
                    .into_response()
            }
        }
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};
    use axum_htmx::HX_REDIRECT;

    use crate::{Error, WorkflowError, endpoints};

    #[test]
    fn unauthorized_page_request_redirects_to_log_out() {
        let response = Error::Unauthorized.into_response();

        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(
            response.headers().get("location").unwrap(),
            endpoints::LOG_OUT
        );
    }

    #[test]
    fn unauthorized_htmx_request_uses_hx_redirect() {
        let response = Error::Unauthorized.into_alert_response();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers().get(HX_REDIRECT).unwrap(), endpoints::LOG_OUT);
    }

    #[test]
    fn backend_status_is_passed_through_to_alert() {
        let response = Error::Backend {
            status: 409,
            message: "already processed".to_owned(),
        }
        .into_alert_response();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[test]
    fn workflow_errors_are_unprocessable() {
        let response = Error::from(WorkflowError::MissingTransactionId).into_alert_response();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn forbidden_renders_error_page() {
        let response = Error::Forbidden.into_response();

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
    }
}
