//! A small users service.
//!
//! Run with `RUST_LOG=info cargo run --example users`, then:
//!
//! ```text
//! curl -i localhost:8099/users
//! curl -i -d 'name=Ada&email=ada@example.com' localhost:8099/users
//! curl -i -X POST localhost:8099/users
//! curl -i localhost:8099/error
//! ```

use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use log::{error, info};
use serde::Serialize;

use jsonapi_rs::server::{BoxedHandler, HandlerFuture, handler_fn};
use jsonapi_rs::{
    Api, ApiStatus, Handler, HttpRequest, HttpResponse, RouteTable, Router, ServerConfig,
    ServerError, StatusCode, writer,
};

const ADDR: &str = "0.0.0.0:8099";
const DOCUMENTATION_URL: &str = "https://example.com/docs/users";

#[derive(Debug, Clone, Serialize)]
struct User {
    id: u64,
    name: String,
    email: String,
}

#[derive(Debug, thiserror::Error)]
enum UserError {
    #[error("User: {0} is required")]
    Required(&'static str),

    #[error("User: store is unavailable")]
    StoreUnavailable,
}

#[derive(Default)]
struct Users {
    next_id: u64,
    all: Vec<User>,
}

type Store = Arc<Mutex<Users>>;

/// Logs one line per request in the spirit of the combined log format.
struct AccessLog<R> {
    inner: R,
}

impl<R: Router> Handler for AccessLog<R> {
    fn call(&self, request: HttpRequest) -> HandlerFuture {
        let started = Instant::now();
        let peer = request
            .remote_addr
            .map(|addr| addr.ip().to_string())
            .unwrap_or_else(|| "-".to_string());
        let line = format!("{} {} {}", request.method, request.target, request.version);
        let referer = request.get_header("Referer").cloned().unwrap_or_else(|| "-".to_string());
        let agent = request.get_header("User-Agent").cloned().unwrap_or_else(|| "-".to_string());

        let response = self.inner.call(request);
        Box::pin(async move {
            let result = response.await;
            let (status, size) = match &result {
                Ok(response) => (response.status.as_u16(), response.body.len()),
                Err(_) => (StatusCode::InternalServerError.as_u16(), 0),
            };
            info!(
                "{peer} - - \"{line}\" {status} {size} \"{referer}\" \"{agent}\" {elapsed:?}",
                elapsed = started.elapsed()
            );
            result
        })
    }
}

impl<R: Router> Router for AccessLog<R> {
    fn get(&mut self, path: &str, handler: BoxedHandler) {
        self.inner.get(path, handler);
    }

    fn head(&mut self, path: &str, handler: BoxedHandler) {
        self.inner.head(path, handler);
    }

    fn post(&mut self, path: &str, handler: BoxedHandler) {
        self.inner.post(path, handler);
    }

    fn put(&mut self, path: &str, handler: BoxedHandler) {
        self.inner.put(path, handler);
    }

    fn delete(&mut self, path: &str, handler: BoxedHandler) {
        self.inner.delete(path, handler);
    }
}

fn routes() -> RouteTable {
    let mut table = RouteTable::new();
    table.not_found(handler_fn(|_req| async {
        let body = serde_json::json!({
            "message": "Not Found",
            "documentation_url": DOCUMENTATION_URL,
        });
        writer::ok(&body, StatusCode::NotFound)
    }));
    table
}

fn list_users(store: &Store) -> Result<HttpResponse, ServerError> {
    let users = store.lock().map_err(|_| ServerError::InternalError(UserError::StoreUnavailable.to_string()))?;
    writer::ok(&users.all, StatusCode::Ok)
}

fn create_user(store: &Store, request: &HttpRequest) -> Result<HttpResponse, ServerError> {
    let name = request.form_value("name");
    let email = request.form_value("email");

    let mut missing = Vec::new();
    if name.is_empty() {
        missing.push(UserError::Required("name"));
    }
    if email.is_empty() {
        missing.push(UserError::Required("email"));
    }
    if !missing.is_empty() {
        return Ok(writer::errors_with_http_status_and_api_status(
            &missing,
            StatusCode::UnprocessableEntity,
            ApiStatus::ValidationError,
        ));
    }

    let mut users = store.lock().map_err(|_| ServerError::InternalError(UserError::StoreUnavailable.to_string()))?;
    users.next_id += 1;
    let user = User { id: users.next_id, name, email };
    users.all.push(user.clone());

    writer::ok(&user, StatusCode::Created)
}

#[tokio::main]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = ServerConfig::default()
        .with_read_timeout(Duration::from_secs(10))
        .with_write_timeout(Duration::from_secs(10))
        .with_max_header_bytes(1 << 20);

    let mut api = Api::with_config(AccessLog { inner: routes() }, config);
    api.config.insert("service", "users");

    let store: Store = Arc::new(Mutex::new(Users::default()));

    let users = store.clone();
    api.get("/users", move |_req| {
        let users = users.clone();
        async move { list_users(&users) }
    });

    let users = store.clone();
    api.post("/users", move |req| {
        let users = users.clone();
        async move { create_user(&users, &req) }
    });

    api.get("/error", |_req| async {
        Ok(writer::error_with_http_status_and_api_status(
            &"something went wrong",
            StatusCode::InternalServerError,
            ApiStatus::UnexpectedError,
        ))
    });

    match api.run(ADDR).await {
        Err(e) if e.is_shutdown() => {
            info!("{e}");
            info!("Finished - bye bye.");
        }
        Err(e) => {
            error!("{e}");
            std::process::exit(1);
        }
        Ok(()) => info!("Finished - bye bye."),
    }
}
