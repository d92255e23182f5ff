//! Request handlers and the routing capability.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::parser::HttpRequest;
use crate::server::{HttpResponse, Error};

/// Type alias for a boxed future that returns a Result<HttpResponse, Error>.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send>>;

/// Anything that can answer a request.
///
/// Implemented for every `Fn(HttpRequest) -> impl Future<Output =
/// Result<HttpResponse, Error>>` closure, and by every [`Router`].
pub trait Handler: Send + Sync + 'static {
    fn call(&self, request: HttpRequest) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    fn call(&self, request: HttpRequest) -> HandlerFuture {
        Box::pin(self(request))
    }
}

/// A shared, type-erased handler as stored by routers.
pub type BoxedHandler = Arc<dyn Handler>;

/// Box a handler closure.
///
/// Exists mainly to pin down the closure's argument and output types, which
/// the compiler cannot infer through the blanket [`Handler`] impl alone.
pub fn handler_fn<F, Fut>(f: F) -> BoxedHandler
where
    F: Fn(HttpRequest) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    Arc::new(f)
}

/// URL dispatch as the service sees it.
///
/// A router registers handlers per verb and path pattern, and is itself a
/// [`Handler`] that dispatches each request to the matching registration.
/// The pattern syntax and matching algorithm belong to the implementation;
/// [`RouteTable`](crate::server::RouteTable) is the bundled exact-match one.
pub trait Router: Handler {
    fn get(&mut self, path: &str, handler: BoxedHandler);
    fn head(&mut self, path: &str, handler: BoxedHandler);
    fn post(&mut self, path: &str, handler: BoxedHandler);
    fn put(&mut self, path: &str, handler: BoxedHandler);
    fn delete(&mut self, path: &str, handler: BoxedHandler);
}
