//! JSON error envelopes and application status codes.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Application status codes shared by handlers.
///
/// Travels in the `api_status` field next to the HTTP status so clients can
/// tell failures apart more finely than the HTTP code allows. Writers accept
/// any `impl Into<i32>`, so services with their own codes can pass plain
/// integers instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiStatus {
    Ok = 1,
    ValidationError = 100,
    UnexpectedError = 900,
}

impl ApiStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ApiStatus> for i32 {
    fn from(status: ApiStatus) -> Self {
        status.code()
    }
}

impl fmt::Display for ApiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single failure: `{"api_status": <int>, "message": <string>}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    pub api_status: i32,
    pub message: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>, api_status: impl Into<i32>) -> Self {
        Self {
            api_status: api_status.into(),
            message: message.into(),
        }
    }
}

/// One entry of a batch envelope. Batch items carry no status of their own.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrorMessage {
    pub message: String,
}

/// A batch of failures reported together:
/// `{"api_status": <int>, "errors": [{"message": <string>}, ...]}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiErrors {
    pub api_status: i32,
    pub errors: Vec<ApiErrorMessage>,
}

impl ApiErrors {
    /// Collect messages in iteration order.
    pub fn new<I, E>(errors: I, api_status: impl Into<i32>) -> Self
    where
        I: IntoIterator<Item = E>,
        E: fmt::Display,
    {
        Self {
            api_status: api_status.into(),
            errors: errors
                .into_iter()
                .map(|err| ApiErrorMessage { message: err.to_string() })
                .collect(),
        }
    }
}
