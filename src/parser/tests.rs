//! Tests for the HTTP parser.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use serde::Deserialize;

    use crate::parser::{HttpRequest, Method, HttpVersion, Error, find_head_end, parse_request};

    fn form_request(body: &str, target: &str) -> HttpRequest {
        let mut headers = HashMap::new();
        headers.insert("Host".to_string(), "example.com".to_string());
        headers.insert("Content-Type".to_string(), "application/x-www-form-urlencoded".to_string());
        HttpRequest::with_body(Method::POST, target.to_string(), HttpVersion::Http11, headers, body.as_bytes().to_vec())
    }

    #[test]
    fn test_parse_simple_get_request() {
        let request = b"GET /users HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.method, Method::GET);
        assert_eq!(result.path, "/users");
        assert_eq!(result.version, HttpVersion::Http11);
        assert_eq!(result.headers.get("Host").unwrap(), "example.com");
        assert!(result.body.is_empty());
    }

    #[test]
    fn test_case_insensitive_headers() {
        let request = b"GET /users HTTP/1.1\r\nhost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert!(result.has_header("host"));
        assert!(result.has_header("HOST"));
        assert!(result.has_header("Host"));
    }

    #[test]
    fn test_missing_host_header() {
        let request = b"GET /users HTTP/1.1\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MissingHeader(ref h)) if h == "Host"));
    }

    #[test]
    fn test_http10_without_host() {
        let request = b"GET /users HTTP/1.0\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.version, HttpVersion::Http10);
        assert!(result.headers.is_empty());
    }

    #[test]
    fn test_invalid_method() {
        let request = b"PATCH /users HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidMethod(ref m)) if m == "PATCH"));
    }

    #[test]
    fn test_invalid_http_version() {
        let request = b"GET /users HTTP/2\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidVersion(ref v)) if v == "HTTP/2"));
    }

    #[test]
    fn test_invalid_header_format() {
        let request = b"GET /users HTTP/1.1\r\nInvalidHeader\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::InvalidHeaderFormat)));
    }

    #[test]
    fn test_empty_request() {
        assert!(matches!(parse_request(b""), Err(Error::EmptyRequest)));
        assert!(matches!(parse_request(b"\r\n\r\n"), Err(Error::EmptyRequest)));
    }

    #[test]
    fn test_incomplete_request_line() {
        let result = parse_request(b"GET\r\n");
        assert!(matches!(result, Err(Error::MalformedRequestLine(_))));

        let result = parse_request(b"GET  HTTP/1.1\r\nHost: example.com\r\n\r\n");
        assert!(matches!(result, Err(Error::MalformedRequestLine(_))));
    }

    #[test]
    fn test_target_must_be_absolute_path() {
        let request = b"GET users HTTP/1.1\r\nHost: example.com\r\n\r\n";
        assert!(matches!(parse_request(request), Err(Error::InvalidPath)));
    }

    #[test]
    fn test_all_methods() {
        let methods = [
            ("GET", Method::GET),
            ("HEAD", Method::HEAD),
            ("POST", Method::POST),
            ("PUT", Method::PUT),
            ("DELETE", Method::DELETE),
        ];

        for (name, expected) in methods {
            let request = format!("{name} /users HTTP/1.1\r\nHost: example.com\r\n\r\n");
            let result = parse_request(request.as_bytes()).unwrap();
            assert_eq!(result.method, expected);
            assert_eq!(result.method.to_string(), name);
        }
    }

    #[test]
    fn test_headers_with_multiple_colons_and_whitespace() {
        let request = b"GET /users HTTP/1.1\r\nHost: example.com  \r\nX-Test:  value:with:colons \r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.headers.get("Host").unwrap(), "example.com");
        assert_eq!(result.headers.get("X-Test").unwrap(), "value:with:colons");
    }

    #[test]
    fn test_malformed_utf8_in_request() {
        let request = b"GET /users HTTP/1.1\r\nHost: example.com\r\nX-Test: \xFF\xFF\r\n\r\n";
        let result = parse_request(request);
        assert!(matches!(result, Err(Error::MalformedRequestLine(ref s)) if s == "Invalid UTF-8"));
    }

    #[test]
    fn test_body_after_head_is_kept_verbatim() {
        let request = b"POST /users HTTP/1.1\r\nHost: example.com\r\nContent-Length: 4\r\n\r\n\xFF\x00ab";
        let result = parse_request(request).unwrap();
        assert_eq!(result.body, b"\xFF\x00ab".to_vec());
        assert_eq!(result.content_length().unwrap(), 4);
    }

    #[test]
    fn test_content_length() {
        let request = parse_request(b"GET /users HTTP/1.1\r\nHost: example.com\r\n\r\n").unwrap();
        assert_eq!(request.content_length().unwrap(), 0);

        let request = parse_request(b"POST /users HTTP/1.1\r\nHost: example.com\r\ncontent-length: nope\r\n\r\n").unwrap();
        assert!(matches!(request.content_length(), Err(Error::InvalidContentLength(ref v)) if v == "nope"));
    }

    #[test]
    fn test_find_head_end() {
        assert_eq!(find_head_end(b"GET / HTTP/1.0\r\n\r\nbody"), Some(18));
        assert_eq!(find_head_end(b"GET / HTTP/1.0\r\nHost: x\r\n"), None);
    }

    #[test]
    fn test_path_with_query_parameters() {
        let request = b"GET /search?q=test%20query&page=1&flag HTTP/1.1\r\nHost: example.com\r\n\r\n";
        let result = parse_request(request).unwrap();
        assert_eq!(result.path, "/search");
        assert_eq!(result.target, "/search?q=test%20query&page=1&flag");
        assert_eq!(result.get_query_param("q").unwrap(), "test query");
        assert_eq!(result.get_query_param("page").unwrap(), "1");
        assert!(result.has_query_param("flag"));
        assert!(!result.has_query_param("missing"));
    }

    #[test]
    fn test_form_value_prefers_body_over_query() {
        let request = form_request("name=ToQoz&email=toqoz%40example.com", "/users?name=query");
        assert_eq!(request.form_value("name"), "ToQoz");
        assert_eq!(request.form_value("email"), "toqoz@example.com");
    }

    #[test]
    fn test_form_value_falls_back_to_query_and_empty() {
        let request = form_request("email=a%40b.c", "/users?name=from+query");
        assert_eq!(request.form_value("name"), "from query");
        assert_eq!(request.form_value("missing"), "");
    }

    #[test]
    fn test_form_value_ignores_non_form_body() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "text/plain".to_string());
        let request = HttpRequest::with_body(Method::POST, "/users".to_string(), HttpVersion::Http10, headers, b"name=x".to_vec());
        assert!(!request.is_form());
        assert_eq!(request.form_value("name"), "");
    }

    #[derive(Debug, Deserialize, PartialEq)]
    struct TestUser {
        name: String,
        email: String,
    }

    #[test]
    fn test_json_parsing() {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json; charset=utf-8".to_string());

        let body = br#"{"name":"John Doe","email":"john@example.com"}"#.to_vec();
        let request = HttpRequest::with_body(Method::POST, "/users".to_string(), HttpVersion::Http10, headers.clone(), body.clone());
        let user: TestUser = request.json().unwrap();
        assert_eq!(user, TestUser { name: "John Doe".to_string(), email: "john@example.com".to_string() });

        let mut plain = headers.clone();
        plain.insert("Content-Type".to_string(), "text/plain".to_string());
        let request = HttpRequest::with_body(Method::POST, "/users".to_string(), HttpVersion::Http10, plain, body);
        let result: Result<TestUser, _> = request.json();
        assert!(matches!(result, Err(Error::MissingHeader(_))));

        let request = HttpRequest::with_body(Method::POST, "/users".to_string(), HttpVersion::Http10, headers, br#"{"name":}"#.to_vec());
        let result: Result<TestUser, _> = request.json();
        assert!(matches!(result, Err(Error::JsonError(_))));
    }
}
