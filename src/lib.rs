//! A minimal JSON API service helper.
//!
//! Wraps a pluggable URL router with conventions for JSON replies: error
//! envelopes that carry an application status code next to the HTTP status,
//! routes that always declare a JSON content type, and a listener that stops
//! cleanly on Ctrl+C.
//!
//! # Features
//!
//! - [`Router`] capability trait with the bundled exact-match [`RouteTable`]
//! - Single and batch error envelopes (`{"api_status", "message"}` and
//!   `{"api_status", "errors": [...]}`) built by [`writer`]
//! - Per-connection read/write timeouts and a request header budget
//! - One-shot shutdown through Ctrl+C or a [`ShutdownHandle`]
//!
//! # Examples
//!
//! ## Error envelopes
//!
//! ```
//! use jsonapi_rs::{writer, ApiStatus, StatusCode};
//!
//! let errs = vec!["User: name is required", "User: email is required"];
//! let response = writer::errors_with_http_status_and_api_status(
//!     &errs,
//!     StatusCode::UnprocessableEntity,
//!     ApiStatus::ValidationError,
//! );
//!
//! assert_eq!(response.status, StatusCode::UnprocessableEntity);
//! let body: serde_json::Value = serde_json::from_slice(&response.body).unwrap();
//! assert_eq!(body["api_status"], 100);
//! assert_eq!(body["errors"][0]["message"], "User: name is required");
//! ```
//!
//! ## Serving
//!
//! ```no_run
//! use jsonapi_rs::{Api, HttpResponse, RouteTable, StatusCode};
//!
//! #[tokio::main]
//! async fn main() {
//!     let mut api = Api::new(RouteTable::new());
//!     api.get("/users", |_req| async {
//!         Ok(HttpResponse::new(StatusCode::Ok).with_body_string("[]"))
//!     });
//!
//!     if let Err(e) = api.run("127.0.0.1:8099").await {
//!         eprintln!("{e}");
//!     }
//! }
//! ```

// Export the parser module
pub mod parser;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use server::{
    Api, ApiError, ApiErrors, ApiStatus, Config, Error as ServerError, Handler, HttpResponse,
    LifecycleState, RouteTable, Router, ServerConfig, ShutdownHandle, StatusCode, writer,
};
