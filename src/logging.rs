//! Middleware for logging requests and responses.

use axum::{
    body::{Body, Bytes},
    extract::Request,
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use serde_json::Value;

use crate::error::{SERVER_ERROR_MESSAGE, json_message};

/// The maximum number of bytes of a body to log at the `info` level.
pub const LOG_BODY_LENGTH_LIMIT: usize = 64;

/// The largest body the middleware will buffer, the same as axum's default body limit.
pub const MAX_BODY_BYTES: usize = 2 * 1024 * 1024;

const REDACTED: &str = "********";

/// Log the request and response for each request.
///
/// Both the request and response are logged at the `info` level.
/// If a body is longer than [LOG_BODY_LENGTH_LIMIT] bytes, it is truncated
/// and the full body is logged at the `debug` level.
/// Any `password` fields in JSON request bodies are redacted.
/// Requests with a body over [MAX_BODY_BYTES] are rejected with 413.
pub async fn logging_middleware(request: Request, next: Next) -> Response {
    let (parts, body) = request.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read request body: {error}");
            return json_message(StatusCode::PAYLOAD_TOO_LARGE, "Request body is too large");
        }
    };

    let body_text = redact_passwords(&String::from_utf8_lossy(&body_bytes));
    log_body(
        &format!("Received request: {} {}", parts.method, parts.uri),
        &body_text,
    );

    let request = Request::from_parts(parts, Body::from(body_bytes));
    let response = next.run(request).await;

    let (parts, body) = response.into_parts();
    let body_bytes = match read_body(body).await {
        Ok(bytes) => bytes,
        Err(error) => {
            tracing::error!("Could not read response body: {error}");
            return json_message(StatusCode::INTERNAL_SERVER_ERROR, SERVER_ERROR_MESSAGE);
        }
    };

    log_body(
        &format!("Sending response: {}", parts.status),
        &String::from_utf8_lossy(&body_bytes),
    );

    Response::from_parts(parts, Body::from(body_bytes))
}

async fn read_body(body: Body) -> Result<Bytes, axum::Error> {
    axum::body::to_bytes(body, MAX_BODY_BYTES).await
}

/// Replace the value of every `password` field in a JSON body.
///
/// Bodies that are not JSON are returned as is.
fn redact_passwords(body_text: &str) -> String {
    let Ok(mut json) = serde_json::from_str::<Value>(body_text) else {
        return body_text.to_owned();
    };

    if !redact_value(&mut json) {
        return body_text.to_owned();
    }

    json.to_string()
}

fn redact_value(value: &mut Value) -> bool {
    match value {
        Value::Object(fields) => {
            let mut redacted = false;

            for (key, field) in fields.iter_mut() {
                if key.to_lowercase().contains("password") {
                    *field = Value::String(REDACTED.to_owned());
                    redacted = true;
                } else {
                    redacted |= redact_value(field);
                }
            }

            redacted
        }
        Value::Array(items) => items
            .iter_mut()
            .fold(false, |redacted, item| redact_value(item) || redacted),
        _ => false,
    }
}

/// Cut `text` to at most `limit` bytes without splitting a character.
fn truncate(text: &str, limit: usize) -> &str {
    if text.len() <= limit {
        return text;
    }

    let mut end = limit;
    while !text.is_char_boundary(end) {
        end -= 1;
    }

    &text[..end]
}

fn log_body(summary: &str, body: &str) {
    if body.len() > LOG_BODY_LENGTH_LIMIT {
        tracing::info!(
            "{summary}\nbody: {:?}...",
            truncate(body, LOG_BODY_LENGTH_LIMIT)
        );
        tracing::debug!("Full body: {body:?}");
    } else {
        tracing::info!("{summary}\nbody: {body:?}");
    }
}

#[cfg(test)]
mod tests {
    use axum::{Json, Router, http::StatusCode, middleware, routing::post};
    use axum_test::TestServer;
    use serde_json::{Value, json};

    use super::{
        LOG_BODY_LENGTH_LIMIT, MAX_BODY_BYTES, logging_middleware, redact_passwords, truncate,
    };

    fn get_echo_server() -> TestServer {
        let app = Router::new()
            .route("/echo", post(|Json(body): Json<Value>| async move { Json(body) }))
            .layer(middleware::from_fn(logging_middleware));

        TestServer::new(app)
    }

    #[test]
    fn redacts_password_fields() {
        let got = redact_passwords(r#"{"email":"foo@bar.baz","password":"hunter2"}"#);

        let got: Value = serde_json::from_str(&got).unwrap();
        assert_eq!(got, json!({ "email": "foo@bar.baz", "password": "********" }));
    }

    #[test]
    fn redacts_nested_password_fields() {
        let got = redact_passwords(r#"{"user":{"newPassword":"hunter2"}}"#);

        assert!(!got.contains("hunter2"), "password leaked in {got}");
    }

    #[test]
    fn leaves_other_bodies_alone() {
        assert_eq!(redact_passwords("not json"), "not json");
        assert_eq!(redact_passwords(r#"{"title":"Coffee"}"#), r#"{"title":"Coffee"}"#);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "é".repeat(LOG_BODY_LENGTH_LIMIT);

        let got = truncate(&text, LOG_BODY_LENGTH_LIMIT - 1);

        assert_eq!(got.len(), LOG_BODY_LENGTH_LIMIT - 2);
        assert!(got.chars().all(|c| c == 'é'));
    }

    #[test]
    fn truncate_keeps_short_text() {
        assert_eq!(truncate("short", LOG_BODY_LENGTH_LIMIT), "short");
    }

    #[tokio::test]
    async fn middleware_passes_bodies_through() {
        let server = get_echo_server();
        let body = json!({ "password": "hunter2", "padding": "x".repeat(100) });

        let response = server.post("/echo").json(&body).await;

        response.assert_status_ok();
        response.assert_json(&body);
    }

    #[tokio::test]
    async fn middleware_rejects_oversized_bodies() {
        let server = get_echo_server();
        let body = json!({ "padding": "x".repeat(MAX_BODY_BYTES) });

        let response = server.post("/echo").json(&body).await;

        response.assert_status(StatusCode::PAYLOAD_TOO_LARGE);
        response.assert_json(&json!({ "message": "Request body is too large" }));
    }
}
