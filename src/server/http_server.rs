//! HTTP server implementation.

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::signal;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use log::{debug, error, info, warn};

use crate::parser::{find_head_end, parse_request, HttpRequest};
use crate::server::config::ServerConfig;
use crate::server::error::Error;
use crate::server::response::{HttpResponse, StatusCode};
use crate::server::router::{error_response, Router};
use crate::share::ShareRoot;

/// Largest request head accepted before the blank line.
const MAX_HEAD_SIZE: usize = 64 * 1024;

/// Limits applied while reading one request.
#[derive(Debug, Clone, Copy)]
pub struct ReadLimits {
    /// Bytes requested from the socket per read.
    pub read_buffer_size: usize,
    /// The largest accepted request body.
    pub max_body_size: usize,
}

impl From<&ServerConfig> for ReadLimits {
    fn from(config: &ServerConfig) -> Self {
        Self {
            read_buffer_size: config.read_buffer_size,
            max_body_size: config.max_body_size,
        }
    }
}

/// The file-sharing HTTP server.
pub struct HttpServer {
    /// The server configuration.
    pub config: ServerConfig,
    /// The request router.
    pub router: Arc<Router>,
}

impl HttpServer {
    /// Create a server for the configured share root.
    ///
    /// # Errors
    ///
    /// Fails if the root does not exist or is not a directory.
    pub fn new(config: ServerConfig) -> Result<Self, Error> {
        let root = ShareRoot::new(&config.root)?;
        Ok(Self {
            config,
            router: Arc::new(Router::new(root)),
        })
    }

    /// Set up the TCP listener.
    async fn setup_listener(&self) -> Result<TcpListener, Error> {
        let listener = TcpListener::bind(&self.config.addr).await?;
        info!(
            "Sharing {root} on http://{addr}",
            root = self.router.root().path().display(),
            addr = listener.local_addr()?
        );
        Ok(listener)
    }

    /// Set up a Ctrl+C handler for graceful shutdown.
    fn setup_ctrl_c_handler(shutdown_tx: mpsc::Sender<()>, tasks: &mut JoinSet<()>) {
        tasks.spawn(async move {
            match signal::ctrl_c().await {
                Ok(()) => {
                    info!("Received Ctrl+C, initiating graceful shutdown");
                    let _ = shutdown_tx.send(()).await;
                }
                Err(e) => {
                    error!("Error setting up Ctrl+C handler: {e}");
                }
            }
        });
    }

    /// Handle a new connection.
    pub(crate) async fn handle_new_connection(
        mut socket: tokio::net::TcpStream,
        addr: SocketAddr,
        semaphore: Arc<Semaphore>,
        router: Arc<Router>,
        limits: ReadLimits,
        tasks: &mut JoinSet<()>,
    ) {
        // Try to acquire a permit from the semaphore
        let permit = match semaphore.try_acquire_owned() {
            Ok(permit) => permit,
            Err(_) => {
                warn!("Connection limit reached, rejecting connection from {addr}");
                let response = HttpResponse::error_page(
                    StatusCode::ServiceUnavailable,
                    "Server is at capacity, please try again later",
                );
                if let Err(e) = socket.write_all(&response.to_bytes()).await {
                    debug!("Could not send 503 to {addr}: {e}");
                }
                return;
            }
        };

        debug!("Accepted connection from {addr}");

        // Reap finished connection tasks so the set does not grow
        while let Some(res) = tasks.try_join_next() {
            if let Err(e) = res {
                error!("Connection task failed: {e}");
            }
        }

        tasks.spawn(async move {
            // The permit is dropped when the task completes, releasing the semaphore slot
            let _permit = permit;

            if let Err(e) = Self::handle_connection(&mut socket, &router, limits).await {
                warn!("Connection from {addr} ended with error: {e}");
            }
        });
    }

    /// Back off after a failed accept, e.g. when out of file descriptors.
    async fn handle_accept_error(e: std::io::Error) {
        error!("Error accepting connection: {e}");
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;
    }

    /// Perform graceful shutdown.
    async fn perform_shutdown(tasks: &mut JoinSet<()>) {
        info!("Waiting for {len} active connections to complete...", len = tasks.len());
        let shutdown_timeout = tokio::time::Duration::from_secs(30);
        let _ = tokio::time::timeout(shutdown_timeout, async {
            while let Some(res) = tasks.join_next().await {
                if let Err(e) = res {
                    error!("Task failed during shutdown: {e}");
                }
            }
        }).await;

        info!("Server shutdown complete");
    }

    /// Start the server and listen for incoming connections.
    pub async fn start(&self) -> Result<(), Error> {
        let listener = self.setup_listener().await?;

        let semaphore = Arc::new(Semaphore::new(self.config.max_connections));
        let limits = ReadLimits::from(&self.config);

        let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
        let mut tasks = JoinSet::new();
        Self::setup_ctrl_c_handler(shutdown_tx, &mut tasks);

        loop {
            tokio::select! {
                Some(()) = shutdown_rx.recv() => {
                    info!("Shutting down server...");
                    break;
                }

                accept_result = listener.accept() => {
                    match accept_result {
                        Ok((socket, addr)) => {
                            Self::handle_new_connection(
                                socket,
                                addr,
                                semaphore.clone(),
                                self.router.clone(),
                                limits,
                                &mut tasks,
                            ).await;
                        },
                        Err(e) => Self::handle_accept_error(e).await,
                    }
                }
            }
        }

        Self::perform_shutdown(&mut tasks).await;

        Ok(())
    }

    /// Read one request from the socket.
    ///
    /// Returns `Ok(None)` when the peer closes the connection before
    /// sending anything. A body larger than `max_body_size` is refused from
    /// its `Content-Length` alone, before any of it is read.
    pub async fn read_request(
        socket: &mut (impl AsyncRead + Unpin),
        limits: ReadLimits,
    ) -> Result<Option<HttpRequest>, Error> {
        let mut buf = Vec::new();
        let mut chunk = vec![0; limits.read_buffer_size.max(1)];

        // Read until the head is complete
        let head_end = loop {
            if let Some(end) = find_head_end(&buf) {
                break end;
            }
            if buf.len() > MAX_HEAD_SIZE {
                return Err(Error::ParseError(crate::parser::Error::MalformedRequestLine(
                    "request head too large".to_string(),
                )));
            }

            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                if buf.is_empty() {
                    return Ok(None);
                }
                // Peer closed mid-head; parse what arrived
                break buf.len();
            }
            buf.extend_from_slice(&chunk[..n]);
        };

        let head = parse_request(&buf[..head_end])?;
        let body_len = head.content_length()?.unwrap_or(0);
        if body_len > limits.max_body_size {
            return Err(Error::PayloadTooLarge { size: body_len, limit: limits.max_body_size });
        }

        // Read the rest of the body
        let total = head_end + body_len;
        while buf.len() < total {
            let n = socket.read(&mut chunk).await?;
            if n == 0 {
                return Err(Error::IoError(std::io::Error::new(
                    std::io::ErrorKind::UnexpectedEof,
                    format!(
                        "connection closed after {} of {body_len} body bytes",
                        buf.len() - head_end
                    ),
                )));
            }
            buf.extend_from_slice(&chunk[..n]);
        }

        Ok(Some(parse_request(&buf)?))
    }

    /// Handle a single connection: one request, one response.
    pub async fn handle_connection(
        socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
        router: &Router,
        limits: ReadLimits,
    ) -> Result<(), Error> {
        let request = match Self::read_request(socket, limits).await {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(()), // Connection closed
            Err(Error::IoError(e)) => return Err(Error::IoError(e)),
            Err(e) => {
                warn!("Rejected request: {e}");
                let response = error_response(&e);
                socket.write_all(&response.to_bytes()).await?;
                return Err(e);
            }
        };

        let response = router.handle(request).await;

        socket.write_all(&response.to_bytes()).await?;
        socket.flush().await?;

        Ok(())
    }
}
