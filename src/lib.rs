//! Piggybank is a personal-finance tracker: users record earnings and
//! expenditures, view monthly sums per category, set budgets according to a
//! budgeting style, and browse savings tips.
//!
//! This library provides the REST API server. All records are kept behind a
//! uniform [stores::RecordStore] contract with three interchangeable
//! backends (in-memory, JSON files, SQLite), selected once at startup. The
//! monthly per-category sums are maintained incrementally by
//! [summary::SummaryLedger] as transactions are created, edited, and
//! deleted.

use std::{net::SocketAddr, time::Duration};

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use axum_server::Handle;
use serde_json::json;
use tokio::signal;

pub mod auth;
pub mod budget;
pub mod models;
mod routes;
mod state;
pub mod stores;
pub mod summary;

pub use routes::build_router;
pub use state::AppState;

/// An async task that waits for either the ctrl+c or terminate signal,
/// whichever comes first, and then signals the server to shut down
/// gracefully.
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
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// A required request field was missing or empty.
    #[error("{0} can't be empty")]
    MissingField(&'static str),

    /// The password and its confirmation did not match during registration.
    #[error("passwords don't match")]
    PasswordMismatch,

    /// A user with the given email is already registered.
    #[error("a user with this email already exists")]
    DuplicateEmail,

    /// The email/password combination did not match a registered user.
    #[error("email or password are invalid")]
    InvalidCredentials,

    /// The request carried no auth cookie, or the token in it was invalid
    /// or expired.
    #[error("authentication required")]
    Unauthorized,

    /// The requested record could not be found.
    ///
    /// Aggregate reads translate this into a zero-valued response instead
    /// of an error; every other caller maps it to a 404.
    #[error("the requested record could not be found")]
    NotFound,

    /// The given text was not a valid `YYYY-MM-DD` date.
    #[error("\"{0}\" is not a valid date")]
    InvalidDate(String),

    /// The given text was not a two-digit month between "01" and "12".
    #[error("\"{0}\" is not a valid month")]
    InvalidMonth(String),

    /// The given text was not a four-digit year.
    #[error("\"{0}\" is not a valid year")]
    InvalidYear(String),

    /// The given text was not a decimal amount.
    #[error("\"{0}\" is not a valid amount")]
    InvalidAmount(String),

    /// The given text was not a known category name.
    #[error("\"{0}\" is not a valid category")]
    InvalidCategory(String),

    /// The given text was not one of spender/balanced/saver.
    #[error("\"{0}\" is not a valid budgeting style")]
    InvalidBudgetingStyle(String),

    /// An unexpected error occurred in the password hashing library.
    ///
    /// The error string should only be logged on the server, never sent to
    /// the client.
    #[error("hashing failed: {0}")]
    Hashing(String),

    /// The auth token could not be created.
    #[error("could not create auth token: {0}")]
    TokenCreation(String),

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    Sql(rusqlite::Error),

    /// The JSON-file backend could not read or write its data files.
    #[error("storage I/O failed: {0}")]
    Io(String),

    /// A record could not be encoded to or decoded from its document form.
    #[error("codec error: {0}")]
    Serde(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => Error::Sql(error),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Error::Serde(value.to_string())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Error::Io(value.to_string())
    }
}

impl From<bcrypt::BcryptError> for Error {
    fn from(value: bcrypt::BcryptError) -> Self {
        Error::Hashing(value.to_string())
    }
}

impl IntoResponse for Error {
    /// Map the error onto an HTTP status with a JSON `{"message": ...}`
    /// body. Storage, codec, and hashing errors are logged and reported as
    /// an opaque 500.
    fn into_response(self) -> Response {
        let status = match &self {
            Error::MissingField(_)
            | Error::PasswordMismatch
            | Error::DuplicateEmail
            | Error::InvalidDate(_)
            | Error::InvalidMonth(_)
            | Error::InvalidYear(_)
            | Error::InvalidAmount(_)
            | Error::InvalidCategory(_)
            | Error::InvalidBudgetingStyle(_) => StatusCode::BAD_REQUEST,
            Error::InvalidCredentials | Error::Unauthorized => StatusCode::UNAUTHORIZED,
            Error::NotFound => StatusCode::NOT_FOUND,
            Error::Hashing(_)
            | Error::TokenCreation(_)
            | Error::Sql(_)
            | Error::Io(_)
            | Error::Serde(_) => {
                tracing::error!("An unexpected error occurred: {}", self);

                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "message": "an internal error occurred" })),
                )
                    .into_response();
            }
        };

        (status, Json(json!({ "message": self.to_string() }))).into_response()
    }
}

#[cfg(test)]
mod error_tests {
    use axum::{http::StatusCode, response::IntoResponse};

    use super::Error;

    #[test]
    fn no_rows_maps_to_not_found() {
        assert_eq!(
            Error::from(rusqlite::Error::QueryReturnedNoRows),
            Error::NotFound
        );
    }

    #[test]
    fn validation_errors_map_to_bad_request() {
        let response = Error::MissingField("email").into_response();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn auth_errors_map_to_unauthorized() {
        let response = Error::Unauthorized.into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn storage_errors_map_to_internal_error() {
        let response = Error::Io("disk on fire".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
