//! The route handler for registering a new user.

use axum::{
    Json,
    extract::{FromRef, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    AppState, Error,
    auth::{Email, PasswordHash, UserProfile, ValidatedPassword, create_user},
    db::Database,
};

/// The state needed to register a user.
#[derive(Debug, Clone)]
pub struct RegistrationState {
    /// The database connection for storing users.
    pub db_connection: Database,
}

impl FromRef<AppState> for RegistrationState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
        }
    }
}

/// The details a client sends to create an account.
#[derive(Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterData {
    /// The address the user will log in with.
    pub email: String,
    /// The new password, in plain text.
    pub password: String,
}

/// Create a new user and respond with their profile.
///
/// # Errors
///
/// Returns a:
/// - [Error::InvalidEmail] if the email does not look like an email address,
/// - [Error::TooWeak] if the password is too easy to guess,
/// - [Error::DuplicateEmail] if the email is already registered,
/// - or an internal error if hashing or the database failed.
pub async fn register_user(
    State(state): State<RegistrationState>,
    payload: Result<Json<RegisterData>, JsonRejection>,
) -> Result<(StatusCode, Json<UserProfile>), Error> {
    let Json(register_data) = payload?;

    let email = Email::new(&register_data.email)?;
    let password = ValidatedPassword::new(&register_data.password, &[email.as_ref()])?;
    let password_hash = PasswordHash::new(password, PasswordHash::DEFAULT_COST)?;

    let user = state
        .db_connection
        .with_connection(|connection| create_user(email, password_hash, connection))?;

    tracing::info!("Registered user {}", user.id);

    Ok((StatusCode::CREATED, Json(UserProfile::from(&user))))
}
