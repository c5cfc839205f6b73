//! Defines the app level error type and its conversion into JSON error responses.

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

/// The message sent to clients for any error that is not their fault.
pub(crate) const SERVER_ERROR_MESSAGE: &str = "Server error";

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// The client sent input that is malformed or out of range.
    ///
    /// The string is shown to the client as-is, so it should describe the
    /// violated constraint in plain language.
    #[error("{0}")]
    Validation(String),

    /// The email address used to register is not a plausible email address.
    #[error("invalid email address")]
    InvalidEmail,

    /// The email address used to register already belongs to another user.
    #[error("the email address is already in use")]
    DuplicateEmail,

    /// The user provided a password that is too easy to guess.
    #[error("password is too weak: {0}")]
    TooWeak(String),

    /// The email and password did not match a registered user.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The request did not carry a valid, unexpired auth cookie.
    #[error("the request is not authenticated")]
    NotAuthenticated,

    /// The caller tried to modify a record owned by another user.
    #[error("the caller does not own the requested resource")]
    NotAuthorized,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unexpected error occurred with the underlying hashing library.
    ///
    /// The error string should only be logged for debugging on the server.
    #[error("hashing failed: {0}")]
    HashingError(String),

    /// The auth cookie could not be created or updated.
    #[error("could not set the auth cookie: {0}")]
    CookieError(String),

    /// The configured timezone is not a canonical timezone name.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// A CORS origin in the server config is not a valid header value.
    #[error("invalid allowed origin \"{0}\"")]
    InvalidOrigin(String),

    /// The database could not be opened.
    #[error("the database is unavailable")]
    DatabaseUnavailable,

    /// Could not acquire the database lock.
    #[error("could not acquire the database lock")]
    DatabaseLockError,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                Some(ref desc),
            ) if desc.ends_with("user.email") => Error::DuplicateEmail,
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Error::Validation(rejection.body_text())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        match self {
            Error::Validation(message) => json_message(StatusCode::BAD_REQUEST, &message),
            Error::InvalidEmail => json_message(
                StatusCode::BAD_REQUEST,
                "Please enter a valid email address.",
            ),
            Error::DuplicateEmail => json_message(
                StatusCode::BAD_REQUEST,
                "The email address is already in use.",
            ),
            Error::TooWeak(feedback) => json_message(
                StatusCode::BAD_REQUEST,
                &format!("Password is too weak: {feedback}"),
            ),
            Error::InvalidCredentials => json_message(
                StatusCode::UNAUTHORIZED,
                "Incorrect email or password.",
            ),
            Error::NotAuthenticated => json_message(StatusCode::UNAUTHORIZED, "Not authenticated"),
            Error::NotAuthorized => json_message(StatusCode::FORBIDDEN, "Not authorized"),
            Error::NotFound => json_message(StatusCode::NOT_FOUND, "Expense not found"),
            // Any errors that are not handled above are not intended to be shown to the client.
            error => {
                tracing::error!("An unexpected error occurred: {}", error);
                json_message(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE)
            }
        }
    }
}

/// Build a response with a JSON body of the form `{"message": "..."}`.
pub(crate) fn json_message(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "message": message }))).into_response()
}
