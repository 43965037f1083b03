//! Listing model and directory scanning.

use std::io;
use std::path::Path;

use chrono::{DateTime, Local};
use log::debug;
use serde::Serialize;

use crate::listing::size::format_size;

/// Timestamp format shown next to each entry.
const MODIFIED_FORMAT: &str = "%d/%m/%Y %H:%M";

/// Whether an entry is a file or a directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Directory,
}

/// One visible entry of a listed directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DirEntry {
    pub name: String,
    pub kind: EntryKind,
    /// Size in bytes, files only
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u64>,
    pub modified: Option<DateTime<Local>>,
}

impl DirEntry {
    /// Size formatted for display, files only.
    pub fn human_size(&self) -> Option<String> {
        self.size.map(format_size)
    }

    /// Last-modified time formatted for display.
    pub fn modified_display(&self) -> Option<String> {
        self.modified.map(|time| time.format(MODIFIED_FORMAT).to_string())
    }
}

/// The contents of one directory, ready to render.
#[derive(Debug, Clone, Serialize)]
pub struct Listing {
    /// URL path of the directory, `/` for the share root
    pub path: String,
    /// URL path of the parent directory; `None` at the root
    pub parent: Option<String>,
    /// Sub-directories, case-insensitively sorted
    pub directories: Vec<DirEntry>,
    /// Files, case-insensitively sorted
    pub files: Vec<DirEntry>,
}

impl Listing {
    /// Whether the directory has no visible entries.
    pub fn is_empty(&self) -> bool {
        self.directories.is_empty() && self.files.is_empty()
    }

    /// All entries in display order: directories first, then files.
    pub fn entries(&self) -> impl Iterator<Item = &DirEntry> {
        self.directories.iter().chain(self.files.iter())
    }
}

/// Parent URL path of `url_path`, or `None` for the root.
fn parent_of(url_path: &str) -> Option<String> {
    let trimmed = url_path.trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    match trimmed.rsplit_once('/') {
        Some((parent, _)) if !parent.is_empty() => Some(parent.to_string()),
        _ => Some("/".to_string()),
    }
}

/// Scan `dir` and build its listing.
///
/// Names starting with `.` are hidden. Symlinks are classified by their
/// target; entries whose metadata cannot be read (dangling links) are
/// skipped.
///
/// # Arguments
///
/// * `dir` - The directory to scan
/// * `url_path` - The URL path the directory is served under
pub async fn read_listing(dir: &Path, url_path: &str) -> io::Result<Listing> {
    let mut directories = Vec::new();
    let mut files = Vec::new();

    let mut entries = tokio::fs::read_dir(dir).await?;
    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with('.') {
            continue;
        }

        let metadata = match tokio::fs::metadata(entry.path()).await {
            Ok(metadata) => metadata,
            Err(e) => {
                debug!("Skipping {name} in listing: {e}");
                continue;
            }
        };
        let modified = metadata.modified().ok().map(DateTime::<Local>::from);

        if metadata.is_dir() {
            directories.push(DirEntry { name, kind: EntryKind::Directory, size: None, modified });
        } else {
            files.push(DirEntry {
                name,
                kind: EntryKind::File,
                size: Some(metadata.len()),
                modified,
            });
        }
    }

    directories.sort_by_cached_key(|entry| entry.name.to_lowercase());
    files.sort_by_cached_key(|entry| entry.name.to_lowercase());

    Ok(Listing {
        path: url_path.to_string(),
        parent: parent_of(url_path),
        directories,
        files,
    })
}
