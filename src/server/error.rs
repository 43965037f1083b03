//! Error types for the HTTP server.

use thiserror::Error;

use crate::multipart::Error as MultipartError;
use crate::parser::{Error as ParserError, Method};
use crate::server::response::StatusCode;

/// Errors that can occur during HTTP server operation.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// Error parsing or saving an upload.
    #[error("Upload error: {0}")]
    UploadError(#[from] MultipartError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Requested resource not found, or outside the share root.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A POST without a multipart/form-data body.
    #[error("Unsupported content type: {0}")]
    BadContentType(String),

    /// Method not allowed for the requested resource.
    #[error("Method {0} not allowed for path: {1}")]
    MethodNotAllowed(Method, String),

    /// The declared body exceeds the configured limit.
    #[error("Request body of {size} bytes exceeds the {limit} byte limit")]
    PayloadTooLarge { size: usize, limit: usize },

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// The response status this error is reported with.
    pub fn status(&self) -> StatusCode {
        match self {
            Error::ParseError(_) | Error::BadContentType(_) => StatusCode::BadRequest,
            Error::UploadError(e) => match e {
                MultipartError::MissingBoundary
                | MultipartError::Malformed(_)
                | MultipartError::NoFileFound => StatusCode::BadRequest,
                MultipartError::WriteDenied { .. } => StatusCode::Forbidden,
                MultipartError::Save { .. } => StatusCode::InternalServerError,
            },
            Error::NotFound(_) => StatusCode::NotFound,
            Error::MethodNotAllowed(..) => StatusCode::MethodNotAllowed,
            Error::PayloadTooLarge { .. } => StatusCode::PayloadTooLarge,
            Error::IoError(_) | Error::JsonError(_) => StatusCode::InternalServerError,
        }
    }
}
