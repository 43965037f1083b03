//! Turning file parts into files in the share root.

use std::io;
use std::path::PathBuf;

use log::{error, info, warn};

use crate::multipart::error::Error;
use crate::multipart::parser::Part;
use crate::share::ShareRoot;

/// Form field name the upload form uses for its file input.
pub const FILE_FIELD: &str = "file";

/// Device names Windows refuses as file names, whatever the extension.
const RESERVED_NAMES: [&str; 22] = [
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// A file received in an upload, ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedFile {
    /// Sanitized name: a single path segment
    pub filename: String,
    /// Raw file bytes
    pub content: Vec<u8>,
}

/// Reduce a client-supplied filename to a safe single path segment.
///
/// Directory components (with either separator) are dropped. Returns
/// `None` for names that are empty, `.` or `..`, contain control
/// characters, or are reserved device names.
pub fn sanitize_filename(raw: &str) -> Option<String> {
    let name = raw
        .rsplit(|c: char| c == '/' || c == '\\')
        .next()
        .unwrap_or_default()
        .trim();

    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    if name.chars().any(char::is_control) {
        return None;
    }

    let stem = name.split('.').next().unwrap_or_default();
    if RESERVED_NAMES.iter().any(|reserved| stem.eq_ignore_ascii_case(reserved)) {
        return None;
    }

    Some(name.to_string())
}

/// Collect the uploaded files from parsed parts.
///
/// Only parts named [`FILE_FIELD`] with a `filename` parameter count;
/// everything else is ignored.
///
/// # Errors
///
/// [`Error::NoFileFound`] when no part yields a usable file.
pub fn extract_files(parts: Vec<Part>) -> Result<Vec<UploadedFile>, Error> {
    let mut files = Vec::new();

    for part in parts {
        let Some(disposition) = part.content_disposition() else {
            continue;
        };
        if disposition.name.as_deref() != Some(FILE_FIELD) {
            continue;
        }
        let Some(raw_name) = disposition.filename else {
            continue;
        };

        match sanitize_filename(&raw_name) {
            Some(filename) => files.push(UploadedFile { filename, content: part.body }),
            None if raw_name.is_empty() => {}
            None => warn!("Ignoring upload with unusable filename {raw_name:?}"),
        }
    }

    if files.is_empty() {
        return Err(Error::NoFileFound);
    }
    Ok(files)
}

/// Write uploaded files into the share root, in order.
///
/// Existing files of the same name are overwritten. The first failure
/// aborts the remaining files.
///
/// # Returns
///
/// The paths written
pub async fn store_files(
    root: &ShareRoot,
    files: &[UploadedFile],
) -> Result<Vec<PathBuf>, Error> {
    let mut written = Vec::with_capacity(files.len());

    for file in files {
        let Some(target) = root.upload_target(&file.filename).await else {
            error!(
                "Refusing upload {}: not a writable file inside the share root",
                file.filename
            );
            return Err(Error::WriteDenied {
                filename: file.filename.clone(),
                source: io::Error::new(
                    io::ErrorKind::PermissionDenied,
                    "target is not a file inside the share root",
                ),
            });
        };

        if let Err(e) = tokio::fs::write(&target, &file.content).await {
            error!("Failed to save upload {}: {e}", file.filename);
            return Err(Error::from_write(file.filename.as_str(), e));
        }

        info!("Saved upload {} ({} bytes)", file.filename, file.content.len());
        written.push(target);
    }

    Ok(written)
}
