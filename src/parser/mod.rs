//! HTTP request parsing.
//!
//! The server reads the request head off the socket, hands it to
//! [`parse_request`], then attaches the body announced by `Content-Length`.

mod request;
mod method;
mod version;
mod error;
mod tests;

// Re-export public items
pub use request::{HttpRequest, find_head_end, parse_request};
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;
