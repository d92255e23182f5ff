//! JSON API server: routing, response building and the listener lifecycle.
//!
//! A service is an [`Api`] wrapping any [`Router`]. Handlers registered
//! through the `Api` verb methods always answer with JSON, and use the
//! [`writer`] functions to build error envelopes.

mod api;
mod api_error;
mod config;
mod error;
mod handler;
mod http_server;
mod response;
mod router;
mod shutdown;
pub mod writer;

// Re-export public items
pub use api::Api;
pub use api_error::{ApiError, ApiErrorMessage, ApiErrors, ApiStatus};
pub use config::{Config, DEFAULT_MAX_HEADER_BYTES, ServerConfig};
pub use error::Error;
pub use handler::{BoxedHandler, Handler, HandlerFuture, Router, handler_fn};
pub use response::{HttpResponse, JSON_CONTENT_TYPE, StatusCode};
pub use router::RouteTable;
pub use shutdown::{LifecycleState, ShutdownHandle};
