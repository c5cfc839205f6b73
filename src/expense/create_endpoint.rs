use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;

use crate::{
    Error,
    auth::UserID,
    expense::{Expense, ExpenseState, create_expense, parse_expense_date},
    timezone::local_today,
};

/// The JSON body for creating an expense.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateExpense {
    title: String,
    amount: f64,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    created_at: Option<String>,
}

/// Create an expense owned by the caller.
///
/// A missing or empty `createdAt` means today in the server's timezone.
pub async fn create_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    payload: Result<Json<CreateExpense>, JsonRejection>,
) -> Result<(StatusCode, Json<Expense>), Error> {
    let Json(payload) = payload?;
    let timezone = state.timezone()?;

    let created_at = match payload.created_at.as_deref() {
        Some(text) if !text.trim().is_empty() => parse_expense_date(text, timezone)?,
        _ => local_today(timezone),
    };

    let builder =
        Expense::build(&payload.title, payload.amount, created_at).category(payload.category);

    let expense = state
        .db_connection
        .with_connection(|connection| create_expense(builder, user_id, connection))?;

    tracing::debug!("User {user_id} created expense {}", expense.id);

    Ok((StatusCode::CREATED, Json(expense)))
}
