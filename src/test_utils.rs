#![allow(missing_docs)]

use axum_extra::extract::cookie::Cookie;
use axum_test::TestServer;
use rusqlite::Connection;
use serde_json::json;
use time::Date;

use crate::{
    AppState, build_router,
    auth::{COOKIE_TOKEN, Email, PasswordHash, User, UserID, ValidatedPassword, create_user},
    db::initialize,
    endpoints,
    expense::{Expense, create_expense},
};

/// The password given to every user made with [must_create_test_user].
pub(crate) const TEST_PASSWORD: &str = "averysafeandsecurepassword";

pub(crate) fn get_test_connection() -> Connection {
    let connection = Connection::open_in_memory().expect("Could not open database in memory.");
    initialize(&connection).expect("Could not initialize database.");

    connection
}

pub(crate) fn get_test_state(connection: Connection) -> AppState {
    AppState::new(connection, "foobar", "Etc/UTC").expect("Could not create app state.")
}

/// Create a user with [TEST_PASSWORD], using the cheapest bcrypt cost.
pub(crate) fn must_create_test_user(email: &str, connection: &Connection) -> User {
    let password_hash = PasswordHash::new(ValidatedPassword::new_unchecked(TEST_PASSWORD), 4)
        .expect("Could not hash password.");

    create_user(
        Email::new(email).expect("Invalid test email."),
        password_hash,
        connection,
    )
    .expect("Could not create test user.")
}

pub(crate) fn must_create_test_expense(
    title: &str,
    amount: f64,
    created_at: Date,
    owner: UserID,
    connection: &Connection,
) -> Expense {
    create_expense(Expense::build(title, amount, created_at), owner, connection)
        .expect("Could not create test expense.")
}

/// Serve the full router and log in as `email`, returning the auth cookie.
pub(crate) async fn must_log_in(
    connection: Connection,
    email: &str,
) -> (TestServer, Cookie<'static>) {
    let (server, cookie, _) = must_log_in_with_state(connection, email).await;

    (server, cookie)
}

/// Like [must_log_in], but also returns the state so tests can inspect the database.
pub(crate) async fn must_log_in_with_state(
    connection: Connection,
    email: &str,
) -> (TestServer, Cookie<'static>, AppState) {
    let state = get_test_state(connection);
    let (server, cookie) = must_log_in_to(state.clone(), email).await;

    (server, cookie, state)
}

/// Break the storage behind `state` so that every expense query fails.
pub(crate) fn must_drop_expense_table(state: &AppState) {
    state
        .db_connection
        .with_connection(|connection| Ok(connection.execute_batch("DROP TABLE expense;")?))
        .expect("Could not drop the expense table.");
}

/// Serve the full router with `state` and log in as `email`.
pub(crate) async fn must_log_in_to(state: AppState, email: &str) -> (TestServer, Cookie<'static>) {
    let server = TestServer::new(build_router(state));

    let response = server
        .post(endpoints::LOG_IN)
        .json(&json!({ "email": email, "password": TEST_PASSWORD }))
        .await;
    response.assert_status_ok();

    let cookie = response.cookie(COOKIE_TOKEN);

    (server, cookie)
}
