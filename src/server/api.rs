//! The service instance and its JSON route registrar.

use std::future::Future;
use std::sync::Arc;

use crate::parser::{HttpRequest, Method};
use crate::server::config::{Config, ServerConfig};
use crate::server::error::Error;
use crate::server::handler::{Handler, HandlerFuture, Router};
use crate::server::response::{HttpResponse, JSON_CONTENT_TYPE};
use crate::server::shutdown::{LifecycleState, ShutdownHandle};

/// A JSON API service: one router, its configuration and server limits.
///
/// Routes are registered through the verb methods below, which make every
/// response carry `Content-Type: application/json; charset=utf-8`. Serving
/// consumes the service; see [`Api::run`].
pub struct Api<R: Router> {
    /// The URL dispatcher requests are handed to.
    pub router: R,
    /// Application options, read-only once serving starts.
    pub config: Config,
    /// Per-connection timeouts and header budget.
    pub server: ServerConfig,
    pub(crate) shutdown: ShutdownHandle,
    pub(crate) endpoints: Vec<(Method, String)>,
}

impl<R: Router> Api<R> {
    pub fn new(router: R) -> Self {
        Self::with_config(router, ServerConfig::default())
    }

    pub fn with_config(router: R, server: ServerConfig) -> Self {
        Self {
            router,
            config: Config::new(),
            server,
            shutdown: ShutdownHandle::new(),
            endpoints: Vec::new(),
        }
    }

    /// A handle that stops the service once it runs, and reports its state.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        self.shutdown.clone()
    }

    pub fn state(&self) -> LifecycleState {
        self.shutdown.state()
    }

    /// Endpoints registered through this service, in registration order.
    pub fn endpoints(&self) -> &[(Method, String)] {
        &self.endpoints
    }

    pub fn get<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.endpoints.push((Method::GET, path.to_string()));
        self.router.get(path, json_content(handler));
    }

    pub fn post<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.endpoints.push((Method::POST, path.to_string()));
        self.router.post(path, json_content(handler));
    }

    pub fn put<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.endpoints.push((Method::PUT, path.to_string()));
        self.router.put(path, json_content(handler));
    }

    pub fn delete<F, Fut>(&mut self, path: &str, handler: F)
    where
        F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.endpoints.push((Method::DELETE, path.to_string()));
        self.router.delete(path, json_content(handler));
    }
}

/// Wraps a handler so its response is declared as JSON.
///
/// A `Content-Type` the handler sets itself is left alone, the same way a
/// handler can overwrite a header that was set before it ran.
struct JsonContent<H> {
    inner: H,
}

impl<H: Handler> Handler for JsonContent<H> {
    fn call(&self, request: HttpRequest) -> HandlerFuture {
        let response = self.inner.call(request);
        Box::pin(async move {
            let response = response.await?;
            Ok::<_, Error>(response.with_default_header("Content-Type", JSON_CONTENT_TYPE))
        })
    }
}

fn json_content<H: Handler>(handler: H) -> Arc<dyn Handler> {
    Arc::new(JsonContent { inner: handler })
}
