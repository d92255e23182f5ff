//! JSON response builders.
//!
//! Handlers build their reply with these functions and return it; the
//! server writes it to the connection exactly once. Every error reply is
//! logged before it is built.

use std::fmt::Display;

use log::{error, warn};
use serde::Serialize;

use crate::server::api_error::{ApiError, ApiErrorMessage, ApiErrors};
use crate::server::error::Error;
use crate::server::response::{HttpResponse, JSON_CONTENT_TYPE, StatusCode};

/// The message a batch envelope carries when it was given no errors.
pub const EMPTY_BATCH_MESSAGE: &str = "Unknown error";

/// `{"api_status": 0, "message": ...}` with `500 Internal Server Error`.
pub fn error(err: &impl Display) -> HttpResponse {
    error_with_http_status_and_api_status(err, StatusCode::InternalServerError, 0)
}

/// `{"api_status": 0, "message": ...}` with the given HTTP status.
pub fn error_with_http_status(err: &impl Display, http_status: impl Into<StatusCode>) -> HttpResponse {
    error_with_http_status_and_api_status(err, http_status, 0)
}

/// `{"api_status": ..., "message": ...}` with the given HTTP status.
pub fn error_with_http_status_and_api_status(
    err: &impl Display,
    http_status: impl Into<StatusCode>,
    api_status: impl Into<i32>,
) -> HttpResponse {
    let message = err.to_string();
    error!("{message}");

    let body = encode_envelope(&ApiError::new(message, api_status));
    json_response(http_status, body)
}

/// `{"api_status": 0, "errors": [...]}` with `500 Internal Server Error`.
pub fn errors<I, E>(errs: I) -> HttpResponse
where
    I: IntoIterator<Item = E>,
    E: Display,
{
    errors_with_http_status_and_api_status(errs, StatusCode::InternalServerError, 0)
}

/// `{"api_status": 0, "errors": [...]}` with the given HTTP status.
pub fn errors_with_http_status<I, E>(errs: I, http_status: impl Into<StatusCode>) -> HttpResponse
where
    I: IntoIterator<Item = E>,
    E: Display,
{
    errors_with_http_status_and_api_status(errs, http_status, 0)
}

/// `{"api_status": ..., "errors": [{"message": ...}, ...]}` with the given
/// HTTP status. Messages keep their input order and are logged one by one.
///
/// A batch is never sent empty: with no errors to report the envelope
/// carries the single message [`EMPTY_BATCH_MESSAGE`] instead.
pub fn errors_with_http_status_and_api_status<I, E>(
    errs: I,
    http_status: impl Into<StatusCode>,
    api_status: impl Into<i32>,
) -> HttpResponse
where
    I: IntoIterator<Item = E>,
    E: Display,
{
    let mut envelope = ApiErrors::new(errs, api_status);
    if envelope.errors.is_empty() {
        warn!("Error batch written without errors");
        envelope.errors.push(ApiErrorMessage {
            message: EMPTY_BATCH_MESSAGE.to_string(),
        });
    }
    for item in &envelope.errors {
        error!("{}", item.message);
    }

    let body = encode_envelope(&envelope);
    json_response(http_status, body)
}

/// Serialize `value` as the JSON body of a success reply.
///
/// # Errors
///
/// Returns [`Error::JsonError`] if `value` cannot be represented as JSON
/// (for example a map with non-string keys).
pub fn ok<T: Serialize + ?Sized>(value: &T, http_status: impl Into<StatusCode>) -> Result<HttpResponse, Error> {
    let body = serde_json::to_vec(value)?;
    Ok(json_response(http_status, body))
}

fn json_response(http_status: impl Into<StatusCode>, body: Vec<u8>) -> HttpResponse {
    HttpResponse::new(http_status)
        .with_content_type(JSON_CONTENT_TYPE)
        .with_body_bytes(body)
}

// Envelopes hold only strings and integers; failing to encode one is a bug.
fn encode_envelope<T: Serialize>(envelope: &T) -> Vec<u8> {
    match serde_json::to_vec(envelope) {
        Ok(body) => body,
        Err(e) => {
            error!("Failed to encode error envelope: {e}");
            std::process::abort();
        }
    }
}
