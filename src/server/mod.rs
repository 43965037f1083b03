//! HTTP server for the file share.
//!
//! [`HttpServer`] owns the accept loop and reads one request per
//! connection; [`Router`] decides what each request means for the share
//! root.

mod response;
mod config;
mod error;
mod mime;
mod router;
mod http_server;

// Re-export public items
pub use response::{HttpResponse, StatusCode};
pub use config::{ServerConfig, DEFAULT_PORT};
pub use error::Error;
pub use mime::content_type_for;
pub use router::{error_response, Router};
pub use http_server::{HttpServer, ReadLimits};
