//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Port used when none is given.
pub const DEFAULT_PORT: u16 = 8888;

/// HTTP server configuration.
///
/// Passed to [`crate::server::HttpServer::new`]; nothing is read from
/// process-wide state.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// The address to bind to.
    pub addr: SocketAddr,
    /// The directory to share.
    pub root: PathBuf,
    /// The maximum number of concurrent connections.
    pub max_connections: usize,
    /// The read buffer size.
    pub read_buffer_size: usize,
    /// The largest accepted request body, in bytes.
    pub max_body_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            root: PathBuf::from("."),
            max_connections: 64,
            read_buffer_size: 8192,
            max_body_size: 1024 * 1024 * 1024,
        }
    }
}
