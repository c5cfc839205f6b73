//! Defines the expense model and its database queries.

use rusqlite::{Connection, Row, params};
use serde::{Deserialize, Serialize};
use time::Date;

use crate::{
    Error,
    auth::UserID,
    expense::{date::midnight_format, date_filter::DateRange},
};

/// The database ID of an expense.
pub type ExpenseId = i64;

/// The category given to expenses created without one.
pub const DEFAULT_CATEGORY: &str = "General";

// ============================================================================
// MODELS
// ============================================================================

/// Money spent by a user on a given day.
///
/// To create a new `Expense`, use [Expense::build].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// The ID of the expense.
    pub id: ExpenseId,
    /// A short description of what the money was spent on.
    pub title: String,
    /// How much was spent. Never negative.
    pub amount: f64,
    /// A free-text grouping such as "Groceries".
    pub category: String,
    /// The day the expense happened.
    #[serde(with = "midnight_format")]
    pub created_at: Date,
    /// The user that owns the expense.
    pub owner: UserID,
}

impl Expense {
    /// Create a new expense.
    ///
    /// Shortcut for [ExpenseBuilder] for discoverability.
    pub fn build(title: &str, amount: f64, created_at: Date) -> ExpenseBuilder {
        ExpenseBuilder {
            title: title.to_owned(),
            amount,
            category: DEFAULT_CATEGORY.to_owned(),
            created_at,
        }
    }

    /// Check the title and amount, trimming the title in place.
    ///
    /// # Errors
    /// Returns [Error::Validation] if the title is blank or the amount is
    /// negative or not finite.
    pub fn validate(&mut self) -> Result<(), Error> {
        self.title = validate_title(&self.title)?;
        validate_amount(self.amount)
    }
}

/// A builder for creating [Expense] instances.
///
/// The owner is supplied when the expense is inserted, see [create_expense].
#[derive(Debug, Clone, PartialEq)]
pub struct ExpenseBuilder {
    /// A short description of what the money was spent on.
    pub title: String,
    /// How much was spent.
    pub amount: f64,
    /// Defaults to [DEFAULT_CATEGORY].
    pub category: String,
    /// The day the expense happened.
    pub created_at: Date,
}

impl ExpenseBuilder {
    /// Set the category, falling back to [DEFAULT_CATEGORY] for `None`.
    pub fn category(mut self, category: Option<String>) -> Self {
        self.category = category.unwrap_or_else(|| DEFAULT_CATEGORY.to_owned());
        self
    }
}

fn validate_title(title: &str) -> Result<String, Error> {
    let title = title.trim();

    if title.is_empty() {
        return Err(Error::Validation("Title is required.".to_owned()));
    }

    Ok(title.to_owned())
}

fn validate_amount(amount: f64) -> Result<(), Error> {
    if !amount.is_finite() {
        return Err(Error::Validation("Amount must be a number.".to_owned()));
    }

    if amount < 0.0 {
        return Err(Error::Validation("Amount cannot be negative.".to_owned()));
    }

    Ok(())
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

/// Create the expense table in the database.
///
/// # Errors
/// Returns an error if the table cannot be created or if there is an SQL error.
pub fn create_expense_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS expense (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL CHECK (length(trim(title)) > 0),
                amount REAL NOT NULL CHECK (amount >= 0),
                category TEXT NOT NULL,
                created_at TEXT NOT NULL,
                user_id INTEGER NOT NULL,
                FOREIGN KEY(user_id) REFERENCES user(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Used by the expense list, which filters by owner and date.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_expense_user_date ON expense(user_id, created_at);",
        (),
    )?;

    Ok(())
}

/// Validate `builder` and insert it as a new expense owned by `owner`.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the title or amount is invalid,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_expense(
    builder: ExpenseBuilder,
    owner: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    let title = validate_title(&builder.title)?;
    validate_amount(builder.amount)?;

    let expense = connection
        .prepare(
            "INSERT INTO expense (title, amount, category, created_at, user_id)
             VALUES (?1, ?2, ?3, ?4, ?5)
             RETURNING id, title, amount, category, created_at, user_id",
        )?
        .query_row(
            params![
                title,
                builder.amount,
                builder.category,
                builder.created_at,
                owner.as_i64()
            ],
            map_expense_row,
        )?;

    Ok(expense)
}

/// Retrieve an expense from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a stored expense,
/// - or [Error::SqlError] there is some other SQL error.
pub fn get_expense(id: ExpenseId, connection: &Connection) -> Result<Expense, Error> {
    let expense = connection
        .prepare(
            "SELECT id, title, amount, category, created_at, user_id FROM expense WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_expense_row)?;

    Ok(expense)
}

/// Get the expenses owned by `owner`, newest first.
///
/// Only expenses inside `date_range` are returned when it is given. Expenses
/// on the same day are ordered by ID.
///
/// # Errors
/// Returns an [Error::SqlError] if the query fails.
pub fn get_expenses(
    owner: UserID,
    date_range: Option<DateRange>,
    connection: &Connection,
) -> Result<Vec<Expense>, Error> {
    let expenses = match date_range {
        Some(DateRange { start, end }) => connection
            .prepare(
                "SELECT id, title, amount, category, created_at, user_id FROM expense
                 WHERE user_id = ?1 AND created_at >= ?2 AND (?3 IS NULL OR created_at < ?3)
                 ORDER BY created_at DESC, id ASC",
            )?
            .query_map(params![owner.as_i64(), start, end], map_expense_row)?
            .collect::<Result<Vec<_>, _>>()?,
        None => connection
            .prepare(
                "SELECT id, title, amount, category, created_at, user_id FROM expense
                 WHERE user_id = ?1
                 ORDER BY created_at DESC, id ASC",
            )?
            .query_map(params![owner.as_i64()], map_expense_row)?
            .collect::<Result<Vec<_>, _>>()?,
    };

    Ok(expenses)
}

/// Overwrite the stored fields of `expense`, except for its ID and owner.
///
/// The expense is validated first.
///
/// # Errors
/// This function will return a:
/// - [Error::Validation] if the title or amount is invalid,
/// - [Error::NotFound] if the expense is not in the database,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_expense(mut expense: Expense, connection: &Connection) -> Result<Expense, Error> {
    expense.validate()?;

    let updated = connection
        .prepare(
            "UPDATE expense SET title = ?1, amount = ?2, category = ?3, created_at = ?4
             WHERE id = ?5
             RETURNING id, title, amount, category, created_at, user_id",
        )?
        .query_row(
            params![
                expense.title,
                expense.amount,
                expense.category,
                expense.created_at,
                expense.id
            ],
            map_expense_row,
        )?;

    Ok(updated)
}

/// Delete the expense with `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if there is no expense with `id`,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn delete_expense(id: ExpenseId, connection: &Connection) -> Result<(), Error> {
    let rows_affected = connection.execute("DELETE FROM expense WHERE id = ?1", [id])?;

    if rows_affected == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

/// Load the expense with `id` and check that it belongs to `user_id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if there is no expense with `id`,
/// - [Error::NotAuthorized] if the expense belongs to another user,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_owned_expense(
    id: ExpenseId,
    user_id: UserID,
    connection: &Connection,
) -> Result<Expense, Error> {
    let expense = get_expense(id, connection)?;

    if expense.owner != user_id {
        tracing::warn!(
            "User {user_id} tried to access expense {id} owned by user {}",
            expense.owner
        );
        return Err(Error::NotAuthorized);
    }

    Ok(expense)
}

/// Map a database row to an [Expense].
fn map_expense_row(row: &Row) -> Result<Expense, rusqlite::Error> {
    let id = row.get(0)?;
    let title = row.get(1)?;
    let amount = row.get(2)?;
    let category = row.get(3)?;
    let created_at = row.get(4)?;
    let owner = UserID::new(row.get(5)?);

    Ok(Expense {
        id,
        title,
        amount,
        category,
        created_at,
        owner,
    })
}

// ============================================================================
// TESTS
// ============================================================================
