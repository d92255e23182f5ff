//! Error types for the HTTP server.

use std::time::Duration;

use thiserror::Error;

use crate::parser::Error as ParserError;
use crate::server::response::StatusCode;

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error on a single connection.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The listen address could not be bound.
    #[error("Could not listen: {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Accepting connections failed and the serve loop gave up.
    #[error("Error in Serve: {0}")]
    Serve(#[source] std::io::Error),

    /// The listener was closed by the shutdown trigger.
    #[error("Error in Serve: listener closed")]
    ListenerClosed,

    /// The request was not read within the configured read timeout.
    #[error("Read timed out after {0:?}")]
    ReadTimeout(Duration),

    /// The response was not written within the configured write timeout.
    #[error("Write timed out after {0:?}")]
    WriteTimeout(Duration),

    /// The request head exceeded the configured maximum size.
    #[error("Request header exceeds {0} bytes")]
    HeaderTooLarge(usize),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// Internal server error.
    #[error("Internal server error: {0}")]
    InternalError(String),
}

impl Error {
    /// `true` when the serve loop ended because shutdown was requested,
    /// as opposed to an unexpected listener failure.
    pub fn is_shutdown(&self) -> bool {
        matches!(self, Error::ListenerClosed)
    }

    /// The status a client gets when this error ends a request before a
    /// handler produced a response. `None` means nothing is written back.
    pub(crate) fn client_status(&self) -> Option<StatusCode> {
        match self {
            Error::ParseError(ParserError::InvalidMethod(_)) => Some(StatusCode::NotImplemented),
            Error::ParseError(_) => Some(StatusCode::BadRequest),
            Error::ReadTimeout(_) => Some(StatusCode::RequestTimeout),
            Error::HeaderTooLarge(_) => Some(StatusCode::RequestHeaderFieldsTooLarge),
            _ => None,
        }
    }
}
