//! Exact-match routing table.

use std::fmt;

use crate::parser::{HttpRequest, Method};
use crate::server::error::Error;
use crate::server::handler::{BoxedHandler, Handler, HandlerFuture, Router, handler_fn};
use crate::server::response::StatusCode;
use crate::server::writer;

/// A route in the table.
struct Route {
    path: String,
    method: Method,
    handler: BoxedHandler,
}

/// The bundled [`Router`]: a list of routes matched on the exact request path.
///
/// Unknown paths go to the not-found handler (a JSON 404 unless replaced
/// with [`RouteTable::not_found`]). `HEAD` falls back to the path's `GET`
/// handler when it has no handler of its own. Known paths with an
/// unregistered verb get a JSON 405 listing the registered verbs in `Allow`.
pub struct RouteTable {
    routes: Vec<Route>,
    not_found: BoxedHandler,
}

impl RouteTable {
    pub fn new() -> Self {
        Self {
            routes: Vec::new(),
            not_found: handler_fn(|request: HttpRequest| async move {
                Ok(writer::error_with_http_status(
                    &format!("Not found: {path}", path = request.path),
                    StatusCode::NotFound,
                ))
            }),
        }
    }

    /// Replace the handler answering requests no route matches.
    pub fn not_found(&mut self, handler: BoxedHandler) {
        self.not_found = handler;
    }

    /// Registered `(method, path)` pairs in registration order.
    pub fn routes(&self) -> impl Iterator<Item = (Method, &str)> {
        self.routes.iter().map(|route| (route.method, route.path.as_str()))
    }

    fn add(&mut self, method: Method, path: &str, handler: BoxedHandler) {
        self.routes.push(Route {
            path: path.to_string(),
            method,
            handler,
        });
    }
}

impl Default for RouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RouteTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.routes.iter().map(|route| format!("{} {}", route.method, route.path)))
            .finish()
    }
}

impl Handler for RouteTable {
    fn call(&self, request: HttpRequest) -> HandlerFuture {
        let matching_routes: Vec<&Route> = self
            .routes
            .iter()
            .filter(|route| route.path == request.path)
            .collect();

        if matching_routes.is_empty() {
            return self.not_found.call(request);
        }

        if let Some(route) = matching_routes.iter().find(|route| route.method == request.method) {
            return route.handler.call(request);
        }

        // HEAD is answered by the GET handler; the server drops the body.
        if request.method == Method::HEAD {
            if let Some(route) = matching_routes.iter().find(|route| route.method == Method::GET) {
                return route.handler.call(request);
            }
        }

        let allowed_methods: Vec<String> = matching_routes
            .iter()
            .map(|route| route.method.to_string())
            .collect();
        let allowed = allowed_methods.join(", ");

        let response = writer::error_with_http_status(
            &format!(
                "Method {method} not allowed for path: {path}",
                method = request.method,
                path = request.path,
            ),
            StatusCode::MethodNotAllowed,
        )
        .with_header("Allow", allowed);

        Box::pin(async move { Ok::<_, Error>(response) })
    }
}

impl Router for RouteTable {
    fn get(&mut self, path: &str, handler: BoxedHandler) {
        self.add(Method::GET, path, handler);
    }

    fn head(&mut self, path: &str, handler: BoxedHandler) {
        self.add(Method::HEAD, path, handler);
    }

    fn post(&mut self, path: &str, handler: BoxedHandler) {
        self.add(Method::POST, path, handler);
    }

    fn put(&mut self, path: &str, handler: BoxedHandler) {
        self.add(Method::PUT, path, handler);
    }

    fn delete(&mut self, path: &str, handler: BoxedHandler) {
        self.add(Method::DELETE, path, handler);
    }
}
