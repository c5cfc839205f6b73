use axum::{
    Extension, Json,
    extract::{Path, State, rejection::JsonRejection, rejection::PathRejection},
};
use serde::{Deserialize, Deserializer};
use time_tz::Tz;

use crate::{
    Error,
    auth::UserID,
    expense::{
        DEFAULT_CATEGORY, Expense, ExpenseId, ExpenseState, get_owned_expense, parse_expense_date,
        update_expense,
    },
};

/// The JSON body for a partial update of an expense.
///
/// The outer `Option` records whether the key was sent at all, the inner one
/// whether its value was `null`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateExpense {
    #[serde(default, deserialize_with = "present")]
    title: Option<Option<String>>,
    #[serde(default, deserialize_with = "present")]
    amount: Option<Option<f64>>,
    #[serde(default, deserialize_with = "present")]
    category: Option<Option<String>>,
    #[serde(default)]
    created_at: Option<String>,
}

fn present<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Apply the fields sent in `update` to `expense`.
///
/// `title`, `amount` and `category` are replaced whenever they are sent, even
/// if the new value is empty or zero. `createdAt` only replaces the date when
/// it is a non-empty string.
fn apply_update(
    mut expense: Expense,
    update: UpdateExpense,
    local_timezone: &Tz,
) -> Result<Expense, Error> {
    match update.title {
        Some(Some(title)) => expense.title = title,
        Some(None) => return Err(Error::Validation("Title is required.".to_owned())),
        None => {}
    }

    match update.amount {
        Some(Some(amount)) => expense.amount = amount,
        Some(None) => return Err(Error::Validation("Amount is required.".to_owned())),
        None => {}
    }

    if let Some(category) = update.category {
        expense.category = category.unwrap_or_else(|| DEFAULT_CATEGORY.to_owned());
    }

    if let Some(text) = update
        .created_at
        .as_deref()
        .filter(|text| !text.trim().is_empty())
    {
        expense.created_at = parse_expense_date(text, local_timezone)?;
    }

    expense.validate()?;

    Ok(expense)
}

/// Update an expense owned by the caller.
///
/// The expense must exist and belong to the caller before the body is
/// looked at.
pub async fn update_expense_endpoint(
    State(state): State<ExpenseState>,
    Extension(user_id): Extension<UserID>,
    expense_id: Result<Path<ExpenseId>, PathRejection>,
    payload: Result<Json<UpdateExpense>, JsonRejection>,
) -> Result<Json<Expense>, Error> {
    let Path(expense_id) = expense_id.map_err(|_| Error::NotFound)?;
    let timezone = state.timezone()?;

    let expense = state.db_connection.with_connection(|connection| {
        let expense = get_owned_expense(expense_id, user_id, connection)?;

        let Json(update) = payload?;
        let expense = apply_update(expense, update, timezone)?;

        update_expense(expense, connection)
    })?;

    tracing::debug!("User {user_id} updated expense {expense_id}");

    Ok(Json(expense))
}

#[cfg(test)]
mod apply_update_tests {
    use time::macros::date;
    use time_tz::{Tz, timezones};

    use crate::{
        Error,
        auth::UserID,
        expense::{DEFAULT_CATEGORY, Expense},
    };

    use super::{UpdateExpense, apply_update};

    fn expense() -> Expense {
        Expense {
            id: 1,
            title: "Coffee".to_owned(),
            amount: 4.5,
            category: "Drinks".to_owned(),
            created_at: date!(2024 - 06 - 15),
            owner: UserID::new(1),
        }
    }

    fn utc() -> &'static Tz {
        timezones::get_by_name("Etc/UTC").unwrap()
    }

    fn update(json: serde_json::Value) -> UpdateExpense {
        serde_json::from_value(json).expect("Could not parse update")
    }

    #[test]
    fn empty_update_changes_nothing() {
        let got = apply_update(expense(), update(serde_json::json!({})), utc());

        assert_eq!(got, Ok(expense()));
    }

    #[test]
    fn zero_amount_is_applied() {
        let got = apply_update(
            expense(),
            update(serde_json::json!({ "amount": 0 })),
            utc(),
        );

        assert_eq!(got.unwrap().amount, 0.0);
    }

    #[test]
    fn empty_category_is_applied() {
        let got = apply_update(
            expense(),
            update(serde_json::json!({ "category": "" })),
            utc(),
        );

        assert_eq!(got.unwrap().category, "");
    }

    #[test]
    fn null_category_resets_to_default() {
        let got = apply_update(
            expense(),
            update(serde_json::json!({ "category": null })),
            utc(),
        );

        assert_eq!(got.unwrap().category, DEFAULT_CATEGORY);
    }

    #[test]
    fn empty_title_is_rejected() {
        let got = apply_update(
            expense(),
            update(serde_json::json!({ "title": "" })),
            utc(),
        );

        assert_eq!(got, Err(Error::Validation("Title is required.".to_owned())));
    }

    #[test]
    fn null_amount_is_rejected() {
        let got = apply_update(
            expense(),
            update(serde_json::json!({ "amount": null })),
            utc(),
        );

        assert!(matches!(got, Err(Error::Validation(_))));
    }

    #[test]
    fn empty_or_null_date_keeps_date() {
        for created_at in [serde_json::json!(""), serde_json::Value::Null] {
            let got = apply_update(
                expense(),
                update(serde_json::json!({ "createdAt": created_at })),
                utc(),
            );

            assert_eq!(got, Ok(expense()));
        }
    }

    #[test]
    fn new_date_is_normalized() {
        let got = apply_update(
            expense(),
            update(serde_json::json!({ "createdAt": "2024-07-01T15:00:00" })),
            utc(),
        );

        assert_eq!(got.unwrap().created_at, date!(2024 - 07 - 01));
    }
}
