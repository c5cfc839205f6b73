//! Expense Tracker is a JSON API for recording what each user spends.
//!
//! Users register and log in with an email and password. Logged-in users can
//! list their expenses, optionally limited to a year or month, and create,
//! update and delete them. Each expense belongs to exactly one user and
//! nobody else can change it.

#![warn(missing_docs)]

use std::{net::SocketAddr, time::Duration};

use axum_server::Handle;
use tokio::signal;

mod app_state;
mod auth;
mod config;
mod cors;
mod db;
mod endpoints;
mod error;
mod expense;
mod logging;
mod routing;
mod timezone;

#[cfg(test)]
mod test_utils;

pub use app_state::AppState;
pub use auth::{PasswordHash, User, UserID, ValidatedPassword};
pub use config::ServerConfig;
pub use cors::build_cors_layer;
pub use db::{Database, initialize as initialize_db};
pub use error::Error;
pub use expense::{DateFilterQuery, DateRange, Expense, ExpenseId, build_date_range};
pub use logging::{LOG_BODY_LENGTH_LIMIT, MAX_BODY_BYTES, logging_middleware};
pub use routing::build_router;
pub use timezone::get_local_offset;

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
        },
        _ = terminate => {
            tracing::debug!("Received terminate signal.");
        },
    }

    tracing::info!("Shutting down, waiting up to one second for open requests.");
    handle.graceful_shutdown(Some(Duration::from_secs(1)));
}
