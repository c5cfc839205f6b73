use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};

use crate::{
    Error,
    auth::UserID,
    expense::{DateFilterQuery, Expense, ExpenseState, build_date_range, get_expenses},
};

/// List the caller's expenses, newest first, optionally limited to a year or month.
pub async fn list_expenses_endpoint(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    query: Result<Query<DateFilterQuery>, QueryRejection>,
) -> Result<Json<Vec<Expense>>, Error> {
    let Query(query) = query?;
    let date_range = build_date_range(query.year.as_deref(), query.month.as_deref())?;

    let expenses = state
        .db_connection
        .with_connection(|connection| get_expenses(user_id, date_range, connection))?;

    Ok(Json(expenses))
}
