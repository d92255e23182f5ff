//! Server tuning and application configuration.

use std::collections::HashMap;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::server::error::Error;

/// Header budget applied when [`ServerConfig::max_header_bytes`] is unset.
pub const DEFAULT_MAX_HEADER_BYTES: usize = 1 << 20;

/// Per-connection limits. `None` means no limit.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerConfig {
    /// Deadline for reading the full request.
    pub read_timeout: Option<Duration>,
    /// Deadline for producing and writing the response once the request is read.
    pub write_timeout: Option<Duration>,
    /// Largest accepted request head, request line included.
    pub max_header_bytes: Option<usize>,
}

impl ServerConfig {
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = Some(timeout);
        self
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = Some(timeout);
        self
    }

    pub fn with_max_header_bytes(mut self, max: usize) -> Self {
        self.max_header_bytes = Some(max);
        self
    }

    /// The header budget actually enforced.
    pub fn header_limit(&self) -> usize {
        self.max_header_bytes.unwrap_or(DEFAULT_MAX_HEADER_BYTES)
    }
}

/// Application options owned by the service: name to arbitrary JSON value.
///
/// Filled during setup and read-only once the server is running.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config(HashMap<String, Value>);

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set an option, returning the previous value if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(name.into(), value.into())
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Decode an option into `T`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JsonError`] if the stored value does not have the shape of `T`.
    pub fn get_as<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>, Error> {
        self.0
            .get(name)
            .map(|value| serde_json::from_value(value.clone()))
            .transpose()
            .map_err(Error::from)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
