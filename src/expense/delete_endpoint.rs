use axum::{
    Extension, Json,
    extract::{Path, State, rejection::PathRejection},
};
use serde_json::{Value, json};

use crate::{
    Error,
    auth::UserID,
    expense::{ExpenseId, ExpenseState, delete_expense, get_owned_expense},
};

/// Delete an expense owned by the caller.
pub async fn delete_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    expense_id: Result<Path<ExpenseId>, PathRejection>,
) -> Result<Json<Value>, Error> {
    let Path(expense_id) = expense_id.map_err(|_| Error::NotFound)?;

    state.db_connection.with_connection(|connection| {
        get_owned_expense(expense_id, user_id, connection)?;
        delete_expense(expense_id, connection)
    })?;

    tracing::debug!("User {user_id} deleted expense {expense_id}");

    Ok(Json(json!({ "message": "Expense deleted" })))
}
