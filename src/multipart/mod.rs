//! `multipart/form-data` upload handling.
//!
//! A body is split into [`Part`]s by an explicit two-state parser (headers,
//! then body). File parts are turned into [`UploadedFile`]s with sanitized
//! names and written into the share root by [`store_files`].

mod error;
mod parser;
mod upload;
mod tests;

pub use error::Error;
pub use parser::{boundary_from_content_type, parse_parts, ContentDisposition, Part};
pub use upload::{extract_files, sanitize_filename, store_files, UploadedFile, FILE_FIELD};
