//! HTTP request parser.
//!
//! Parses the request head (request line and headers) and splits off the
//! raw body bytes. Bodies are never decoded here; multipart payloads are
//! handed as-is to [`crate::multipart`].

mod request;
mod method;
mod version;
mod error;

// Re-export public items
pub use request::HttpRequest;
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;

pub use request::{find_head_end, parse_request};
