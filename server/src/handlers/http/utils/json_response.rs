use anyhow::{Context, Result, anyhow};
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use hyper::header::HeaderValue;
use hyper::{Response, StatusCode, header};
use serde::Serialize;
use std::convert::Infallible;
use tracing::{debug, error, warn};

use shared::types::ErrorResponse;

use crate::auth::AuthError;
use crate::handlers::http::utils::deliver_page::full;

/// Serialize any `Serialize` type and deliver it as a JSON response.
/// This is the primary helper all handlers should use instead of
/// writing their own one-off serialization + response-building blocks.
pub fn deliver_serialized_json<T: Serialize>(
    data: &T,
    status: StatusCode,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    let json = serde_json::to_string_pretty(data).context("Failed to serialize response")?;

    debug!("Delivering serialized JSON response, size: {} bytes", json.len());

    let response = Response::builder()
        .status(status)
        .header(header::CONTENT_TYPE, "application/json")
        .body(full(json))
        .map_err(|e| anyhow!("Failed to build JSON response: {}", e))?;

    Ok(response)
}

/// Build a JSON error response. Cannot fail, so middleware can use it
/// without an error path of its own.
pub fn error_json(error_code: &str, message: &str, status: StatusCode) -> Response<BoxBody<Bytes, Infallible>> {
    error_body_json(&ErrorResponse::new(error_code, message), status)
}

/// JSON error response for an [`AuthError`], with the status it maps to.
pub fn auth_error_json(err: &AuthError) -> Response<BoxBody<Bytes, Infallible>> {
    error_body_json(&ErrorResponse::from(err), err.status())
}

fn error_body_json(error: &ErrorResponse, status: StatusCode) -> Response<BoxBody<Bytes, Infallible>> {
    let body = serde_json::to_string(error)
        .unwrap_or_else(|_| r#"{"status":"error"}"#.to_string());

    let mut response = Response::new(full(body));
    *response.status_mut() = status;
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("application/json"),
    );
    response
}

/// Delivers a JSON error response with the specified error code, message, and status.
pub fn deliver_error_json(
    error_code: &str,
    message: &str,
    status: StatusCode,
) -> Result<Response<BoxBody<Bytes, Infallible>>> {
    if status.is_server_error() {
        error!("Delivering error JSON: {} - {} ({})", status.as_u16(), error_code, message);
    } else {
        warn!("Delivering error JSON: {} - {} ({})", status.as_u16(), error_code, message);
    }

    Ok(error_json(error_code, message, status))
}
