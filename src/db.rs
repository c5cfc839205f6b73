//! Database setup and helpers shared by every table.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use rusqlite::{Connection, Transaction, TransactionBehavior};

use crate::{Error, auth::create_user_table, expense::create_expense_table};

/// A shared handle to the application's SQLite database.
///
/// A handle created with [Database::open] may start out without a connection
/// if the database could not be opened at startup. The server keeps running
/// in that case: each request that needs storage tries to open the database
/// again and fails with [Error::DatabaseUnavailable] until it succeeds.
#[derive(Debug, Clone)]
pub struct Database {
    connection: Arc<Mutex<Option<Connection>>>,
    path: Option<PathBuf>,
}

impl Database {
    /// Wrap an open connection, creating the tables if they do not exist.
    ///
    /// # Errors
    /// Returns an [Error::SqlError] if the tables could not be created.
    pub fn new(connection: Connection) -> Result<Self, Error> {
        initialize(&connection)?;

        Ok(Self {
            connection: Arc::new(Mutex::new(Some(connection))),
            path: None,
        })
    }

    /// Open and initialize the database file at `path`.
    ///
    /// Failure is logged and the handle is returned without a connection.
    pub fn open(path: &Path) -> Self {
        Self {
            connection: Arc::new(Mutex::new(open_and_initialize(path))),
            path: Some(path.to_owned()),
        }
    }

    /// Run `f` with the database connection while holding the lock.
    ///
    /// If there is no connection yet, opening the database is tried again
    /// first.
    ///
    /// # Errors
    /// Returns [Error::DatabaseLockError] if the lock is poisoned,
    /// [Error::DatabaseUnavailable] if there is still no connection, or
    /// whatever error `f` returns.
    pub fn with_connection<T>(
        &self,
        f: impl FnOnce(&Connection) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut guard = self.connection.lock().map_err(|error| {
            tracing::error!("could not acquire database lock: {error}");
            Error::DatabaseLockError
        })?;

        if guard.is_none() {
            *guard = self.path.as_deref().and_then(open_and_initialize);
        }

        let Some(connection) = guard.as_ref() else {
            return Err(Error::DatabaseUnavailable);
        };

        f(connection)
    }
}

fn open_and_initialize(path: &Path) -> Option<Connection> {
    let result = Connection::open(path)
        .map_err(Error::from)
        .and_then(|connection| initialize(&connection).map(|_| connection));

    match result {
        Ok(connection) => {
            tracing::info!("Opened database {}", path.display());
            Some(connection)
        }
        Err(error) => {
            tracing::error!("Could not open database {}: {error}", path.display());
            None
        }
    }
}

/// Create all the tables used by the application if they do not already exist.
///
/// Foreign key enforcement is switched on for `connection` so that expenses
/// always refer to a registered user.
///
/// # Errors
/// Returns an [Error::SqlError] if any of the tables could not be created.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    connection.execute_batch("PRAGMA foreign_keys = ON;")?;

    let transaction = Transaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_user_table(&transaction)?;
    create_expense_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

/// Check that the database can answer a trivial query.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn check_health(connection: &Connection) -> Result<(), Error> {
    connection.query_row("SELECT 1", [], |_| Ok(()))?;

    Ok(())
}
