//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::str::FromStr;
use serde::de::DeserializeOwned;

use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request path, without the query string
    pub path: String,
    /// The raw request target as it appeared on the request line
    pub target: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    /// The request body
    pub body: Vec<u8>,
    /// Query parameters parsed from the request target
    pub query_params: HashMap<String, String>,
    /// The peer that sent the request, when it arrived over a socket
    pub remote_addr: Option<SocketAddr>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    ///
    /// `target` may carry a query string; it is split off into
    /// [`query_params`](Self::query_params) and [`path`](Self::path) keeps
    /// the part before `?`.
    pub fn new(method: Method, target: String, version: HttpVersion, headers: HashMap<String, String>) -> Self {
        let (path, query_params) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), decode_pairs(query.as_bytes()).into_iter().collect()),
            None => (target.clone(), HashMap::new()),
        };

        Self {
            method,
            path,
            target,
            version,
            headers,
            body: Vec::new(),
            query_params,
            remote_addr: None,
        }
    }

    /// Create a new HTTP request with a body.
    pub fn with_body(method: Method, target: String, version: HttpVersion, headers: HashMap<String, String>, body: Vec<u8>) -> Self {
        let mut request = Self::new(method, target, version, headers);
        request.body = body;
        request
    }

    /// Get a header value. Header names are matched case-insensitively.
    pub fn get_header(&self, name: &str) -> Option<&String> {
        self.headers.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                Some(v)
            } else {
                None
            }
        })
    }

    /// Check if a header exists.
    pub fn has_header(&self, name: &str) -> bool {
        self.get_header(name).is_some()
    }

    /// The body length announced by `Content-Length`, or 0 when absent.
    pub fn content_length(&self) -> Result<usize, Error> {
        match self.get_header("Content-Length") {
            Some(value) => value
                .trim()
                .parse()
                .map_err(|_| Error::InvalidContentLength(value.clone())),
            None => Ok(0),
        }
    }

    /// Parse the request body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingHeader`] when the request is not declared as
    /// JSON, or [`Error::JsonError`] when the body does not decode into `T`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, Error> {
        if !self.is_json() {
            return Err(Error::MissingHeader("Content-Type: application/json".to_string()));
        }

        let json = serde_json::from_slice(&self.body)?;
        Ok(json)
    }

    /// Check if the request has a JSON body.
    pub fn is_json(&self) -> bool {
        self.content_type_is("application/json")
    }

    /// Check if the request body is an urlencoded form.
    pub fn is_form(&self) -> bool {
        self.content_type_is("application/x-www-form-urlencoded")
    }

    fn content_type_is(&self, mime: &str) -> bool {
        self.get_header("Content-Type")
            .map(|content_type| content_type.starts_with(mime))
            .unwrap_or(false)
    }

    /// Look up a form value by name.
    ///
    /// Urlencoded body fields take precedence over query parameters. A
    /// missing field yields an empty string, so callers validate with
    /// `is_empty()`.
    pub fn form_value(&self, name: &str) -> String {
        if self.is_form() {
            if let Some((_, value)) = decode_pairs(&self.body).into_iter().find(|(k, _)| k == name) {
                return value;
            }
        }

        self.get_query_param(name).cloned().unwrap_or_default()
    }

    /// Get a query parameter value.
    pub fn get_query_param(&self, name: &str) -> Option<&String> {
        self.query_params.get(name)
    }

    /// Check if a query parameter exists.
    pub fn has_query_param(&self, name: &str) -> bool {
        self.query_params.contains_key(name)
    }
}

fn decode_pairs(input: &[u8]) -> Vec<(String, String)> {
    serde_urlencoded::from_bytes(input).unwrap_or_default()
}

/// Returns the length of the request head, terminating blank line included,
/// once the whole head is present in `buf`.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|window| window == HEAD_TERMINATOR)
        .map(|pos| pos + HEAD_TERMINATOR.len())
}

/// Parse an HTTP request from a byte slice.
///
/// Everything after the blank line that ends the head is taken as the body
/// verbatim; the caller is responsible for having read `Content-Length`
/// bytes of it.
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    let (head, body) = match find_head_end(input) {
        Some(end) => (&input[..end], &input[end..]),
        None => (input, &input[input.len()..]),
    };

    let head = std::str::from_utf8(head)
        .map_err(|_| Error::MalformedRequestLine("Invalid UTF-8".to_string()))?;

    let mut lines = head.split("\r\n");

    let request_line = match lines.next() {
        Some(line) if !line.trim().is_empty() => line,
        _ => return Err(Error::EmptyRequest),
    };

    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    }

    let method = Method::from_str(parts[0])?;

    let target = parts[1].to_string();
    if !target.starts_with('/') {
        return Err(Error::InvalidPath);
    }

    let version = HttpVersion::from_str(parts[2])?;

    let mut headers = HashMap::new();
    for line in lines {
        if line.is_empty() {
            break;
        }

        let (name, value) = line.split_once(':').ok_or(Error::InvalidHeaderFormat)?;
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }

    if version == HttpVersion::Http11 && !headers.keys().any(|k| k.eq_ignore_ascii_case("Host")) {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    Ok(HttpRequest::with_body(method, target, version, headers, body.to_vec()))
}
