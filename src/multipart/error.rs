//! Error types for multipart upload handling.

use std::io;

use thiserror::Error;

/// Errors that can occur while parsing or saving an upload.
#[derive(Debug, Error)]
pub enum Error {
    /// The Content-Type header carries no usable `boundary` parameter.
    #[error("Missing multipart boundary")]
    MissingBoundary,

    /// The body does not follow the multipart framing.
    #[error("Malformed multipart body: {0}")]
    Malformed(String),

    /// The body parsed, but no part carried a usable file.
    #[error("No file found in upload")]
    NoFileFound,

    /// The share root refused the write.
    #[error("Permission denied writing {filename}")]
    WriteDenied {
        filename: String,
        #[source]
        source: io::Error,
    },

    /// Any other failure while writing an uploaded file.
    #[error("Failed to save {filename}: {source}")]
    Save {
        filename: String,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Classify an I/O failure on `filename` as denied or generic.
    pub fn from_write(filename: impl Into<String>, source: io::Error) -> Self {
        let filename = filename.into();
        if source.kind() == io::ErrorKind::PermissionDenied {
            Error::WriteDenied { filename, source }
        } else {
            Error::Save { filename, source }
        }
    }
}
