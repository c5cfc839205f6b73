//! Expense tracking for logged-in users.
//!
//! This module contains everything related to expenses:
//! - The `Expense` model and the database functions for storing and querying it
//! - Parsing of client-supplied dates and the year/month list filter
//! - The JSON route handlers for listing, creating, updating and deleting expenses

mod core;
mod create_endpoint;
mod date;
mod date_filter;
mod delete_endpoint;
mod list_endpoint;
mod update_endpoint;

use axum::extract::FromRef;
use time_tz::Tz;

use crate::{AppState, Error, db::Database, timezone::get_timezone};

pub use core::{
    DEFAULT_CATEGORY, Expense, ExpenseId, create_expense, create_expense_table, delete_expense,
    get_expenses, get_owned_expense, update_expense,
};
pub use create_endpoint::create_expense_endpoint;
pub use date::parse_expense_date;
pub use date_filter::{DateFilterQuery, DateRange, build_date_range};
pub use delete_endpoint::delete_expense_endpoint;
pub use list_endpoint::list_expenses_endpoint;
pub use update_endpoint::update_expense_endpoint;

#[cfg(test)]
pub use core::get_expense;

/// The state needed by the expense route handlers.
#[derive(Debug, Clone)]
pub struct ExpenseState {
    /// The database connection for managing expenses.
    pub db_connection: Database,
    /// The local timezone as a canonical timezone name, e.g. "Pacific/Auckland".
    pub local_timezone: String,
}

impl FromRef<AppState> for ExpenseState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            db_connection: state.db_connection.clone(),
            local_timezone: state.local_timezone.clone(),
        }
    }
}

impl ExpenseState {
    /// The configured local timezone.
    ///
    /// # Errors
    /// Returns [Error::InvalidTimezone] if the timezone name is not known.
    pub fn timezone(&self) -> Result<&'static Tz, Error> {
        get_timezone(&self.local_timezone).ok_or_else(|| {
            tracing::error!("Invalid timezone {}", self.local_timezone);
            Error::InvalidTimezone(self.local_timezone.clone())
        })
    }
}
