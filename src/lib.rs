//! Share a directory with other devices on the local network.
//!
//! Devices on the same network browse folders, download files and upload
//! files back into the shared directory from any browser.
//!
//! # Features
//!
//! - Directory listings: folders first, then files, case-insensitively sorted,
//!   with sizes, modification times and type icons (HTML or JSON)
//! - Downloads with exact `Content-Length` and a guessed `Content-Type`
//! - `multipart/form-data` uploads into the share root
//! - Every path, read or written, is confined to the share root
//!
//! # Examples
//!
//! ## Parsing an upload
//!
//! ```
//! use lanshare::multipart::{extract_files, parse_parts};
//!
//! let body = b"--xyz\r\n\
//!     Content-Disposition: form-data; name=\"file\"; filename=\"report.txt\"\r\n\
//!     \r\n\
//!     hello\r\n\
//!     --xyz--\r\n";
//!
//! let parts = parse_parts(body, "xyz").unwrap();
//! let files = extract_files(parts).unwrap();
//! assert_eq!(files[0].filename, "report.txt");
//! assert_eq!(files[0].content, b"hello");
//! ```
//!
//! ## Serving a directory
//!
//! ```no_run
//! use lanshare::{HttpServer, ServerConfig};
//!
//! # async fn run() -> Result<(), lanshare::ServerError> {
//! let config = ServerConfig {
//!     root: "/srv/share".into(),
//!     ..ServerConfig::default()
//! };
//! HttpServer::new(config)?.start().await
//! # }
//! ```

// Export the parser module
pub mod parser;

// Export the multipart module
pub mod multipart;

// Export the listing module
pub mod listing;

// Export the share module
pub mod share;

// Export the server module
pub mod server;

// Re-export commonly used items for convenience
pub use parser::{Error as ParserError, HttpRequest, HttpVersion, Method, parse_request};
pub use multipart::{Error as UploadError, UploadedFile};
pub use listing::{DirEntry, EntryKind, Listing};
pub use share::ShareRoot;
pub use server::{Error as ServerError, HttpResponse, HttpServer, Router, ServerConfig, StatusCode};
