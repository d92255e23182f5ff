//! Listener lifecycle and per-connection request handling.

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::signal;

use crate::parser::{HttpRequest, Method, find_head_end, parse_request};
use crate::server::api::Api;
use crate::server::error::Error;
use crate::server::handler::Router;
use crate::server::shutdown::LifecycleState;
use crate::server::writer;

const READ_CHUNK_SIZE: usize = 8192;
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(5);

impl<R: Router> Api<R> {
    /// Serve on `addr` (`host:port`) until the process is interrupted.
    ///
    /// Always ends in an error: [`Error::Bind`] if the address cannot be
    /// bound, [`Error::ListenerClosed`] after Ctrl+C, or [`Error::Serve`] if
    /// the listener fails. The caller decides how the process exits.
    pub async fn run(self, addr: &str) -> Result<(), Error> {
        // The handler is installed here, so an interrupt during bind is caught too.
        let interrupted = interrupt();
        self.run_until(addr, interrupted).await
    }

    /// Like [`run`](Self::run), with `signal` standing in for Ctrl+C.
    pub async fn run_until<F>(self, addr: &str, signal: F) -> Result<(), Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = bind(addr).await?;

        let shutdown = self.shutdown.clone();
        let watcher = tokio::spawn(async move {
            signal.await;
            shutdown.trigger();
        });

        let result = self.serve(listener).await;
        watcher.abort();
        result
    }

    /// Accept connections on `listener` until the shutdown handle fires.
    ///
    /// Each connection is answered on its own task. Shutdown closes the
    /// listener and returns right away; requests already being answered are
    /// not waited for.
    pub async fn serve(self, listener: TcpListener) -> Result<(), Error> {
        let shutdown = self.shutdown.clone();
        self.display_endpoints();

        let api = Arc::new(self);
        shutdown.advance(LifecycleState::Listening);

        loop {
            tokio::select! {
                biased;

                _ = shutdown.triggered() => break,

                accepted = listener.accept() => match accepted {
                    Ok((socket, peer)) => Self::spawn_connection(api.clone(), socket, peer),
                    Err(e) if is_transient(&e) => {
                        warn!("Error accepting connection: {e}; retrying");
                        tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                    }
                    Err(e) => {
                        shutdown.advance(LifecycleState::Stopped);
                        return Err(Error::Serve(e));
                    }
                },
            }
        }

        info!("Stopping the server...");
        shutdown.advance(LifecycleState::ShuttingDown);
        drop(listener);

        info!("Tearing down...");
        shutdown.advance(LifecycleState::Stopped);
        Err(Error::ListenerClosed)
    }

    fn display_endpoints(&self) {
        info!("Registered endpoints:");
        for (method, path) in &self.endpoints {
            info!("  {method} {path}");
        }
    }

    fn spawn_connection(api: Arc<Self>, mut socket: TcpStream, peer: SocketAddr) {
        tokio::spawn(async move {
            debug!("Connection from {peer}");
            if let Err(e) = api.answer(&mut socket, Some(peer)).await {
                warn!("Error handling connection from {peer}: {e}");
            }
        });
    }

    /// Answer one request on `socket`.
    ///
    /// Malformed, oversized or slow requests are answered with a JSON error
    /// before the error is returned; handler errors become a JSON 500.
    pub async fn handle_connection(
        &self,
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
    ) -> Result<(), Error> {
        self.answer(socket, None).await
    }

    async fn answer(
        &self,
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        peer: Option<SocketAddr>,
    ) -> Result<(), Error> {
        let limit = self.server.header_limit();
        let read = within(self.server.read_timeout, read_request(socket, limit), Error::ReadTimeout).await;

        let mut request = match read {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(()),
            Err(e) => {
                if let Some(status) = e.client_status() {
                    let response = writer::error_with_http_status(&e, status)
                        .with_header("Connection", "close");
                    // Best effort; the read error is what gets reported.
                    let _ = socket.write_all(&response.to_bytes()).await;
                }
                return Err(e);
            }
        };

        request.remote_addr = peer;
        let head_only = request.method == Method::HEAD;
        let reply = async {
            let response = match self.router.call(request).await {
                Ok(response) => response,
                Err(e) => writer::error(&e),
            };
            let response = response.with_header("Connection", "close");

            let bytes = if head_only { response.head_bytes() } else { response.to_bytes() };
            socket.write_all(&bytes).await?;
            socket.flush().await?;
            Ok::<(), Error>(())
        };

        within(self.server.write_timeout, reply, Error::WriteTimeout).await
    }
}

async fn bind(addr: &str) -> Result<TcpListener, Error> {
    let listener = TcpListener::bind(addr).await.map_err(|source| Error::Bind {
        addr: addr.to_string(),
        source,
    })?;
    info!("HTTP Server: {addr}", addr = listener.local_addr()?);
    Ok(listener)
}

/// Installs the interrupt handler right away and returns a future that
/// resolves on the first interrupt. If the handler cannot be installed the
/// future never resolves.
pub(crate) fn interrupt() -> impl Future<Output = ()> + Send + 'static {
    let installed = interrupt_stream();
    async move {
        let mut stream = match installed {
            Ok(stream) => stream,
            Err(e) => {
                error!("Error setting up Ctrl+C handler: {e}");
                return std::future::pending::<()>().await;
            }
        };

        match stream.recv().await {
            Some(()) => info!("Received Ctrl+C, initiating shutdown"),
            None => std::future::pending::<()>().await,
        }
    }
}

#[cfg(unix)]
fn interrupt_stream() -> io::Result<signal::unix::Signal> {
    signal::unix::signal(signal::unix::SignalKind::interrupt())
}

#[cfg(windows)]
fn interrupt_stream() -> io::Result<signal::windows::CtrlC> {
    signal::windows::ctrl_c()
}

fn is_transient(e: &io::Error) -> bool {
    matches!(
        e.kind(),
        io::ErrorKind::ConnectionAborted
            | io::ErrorKind::ConnectionReset
            | io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
    )
}

async fn within<T>(
    limit: Option<Duration>,
    fut: impl Future<Output = Result<T, Error>>,
    elapsed: fn(Duration) -> Error,
) -> Result<T, Error> {
    match limit {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .unwrap_or_else(|_| Err(elapsed(limit))),
        None => fut.await,
    }
}

/// Read one request: the head up to the blank line, then `Content-Length`
/// bytes of body. `Ok(None)` means the peer closed without sending anything.
async fn read_request(
    socket: &mut (impl AsyncRead + Unpin),
    max_header_bytes: usize,
) -> Result<Option<HttpRequest>, Error> {
    let mut buf = Vec::with_capacity(READ_CHUNK_SIZE);
    let mut chunk = [0u8; READ_CHUNK_SIZE];

    let head_end = loop {
        if let Some(end) = find_head_end(&buf) {
            break end;
        }
        if buf.len() > max_header_bytes {
            return Err(Error::HeaderTooLarge(max_header_bytes));
        }

        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            // Peer half-closed mid-head; let the parser judge what arrived.
            break buf.len();
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    if head_end > max_header_bytes {
        return Err(Error::HeaderTooLarge(max_header_bytes));
    }

    let mut request = parse_request(&buf[..head_end])?;
    let content_length = request.content_length()?;

    let mut body = buf.split_off(head_end);
    while body.len() < content_length {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            break;
        }
        body.extend_from_slice(&chunk[..n]);
    }
    body.truncate(content_length);
    request.body = body;

    Ok(Some(request))
}
