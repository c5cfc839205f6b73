//! Cross-origin access for the browser client.

use axum::http::{HeaderValue, Method, header::CONTENT_TYPE};
use tower_http::cors::{AllowOrigin, CorsLayer};

use crate::Error;

/// Build a CORS layer that only lets `allowed_origins` call the API.
///
/// Credentials are allowed so that the auth cookie is sent with
/// cross-origin requests.
///
/// # Errors
/// Returns [Error::InvalidOrigin] if an origin is not a valid header value.
pub fn build_cors_layer(allowed_origins: &[String]) -> Result<CorsLayer, Error> {
    let origins = allowed_origins
        .iter()
        .map(|origin| {
            HeaderValue::from_str(origin).map_err(|_| Error::InvalidOrigin(origin.to_owned()))
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE])
        .allow_credentials(true))
}
