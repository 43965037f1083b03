//! The shared directory tree.
//!
//! [`ShareRoot`] is the only way paths from the network reach the
//! filesystem. Both reads and writes go through it so that nothing outside
//! the root is ever served or overwritten.

use std::io;
use std::path::{Component, Path, PathBuf};

use log::debug;

mod tests;

/// Canonical absolute path of the directory being shared.
#[derive(Debug, Clone)]
pub struct ShareRoot {
    path: PathBuf,
}

impl ShareRoot {
    /// Open a share root.
    ///
    /// The path is canonicalized once here; every later containment check
    /// compares canonical paths against it.
    ///
    /// # Errors
    ///
    /// Fails if the path does not exist or is not a directory.
    pub fn new(path: impl AsRef<Path>) -> io::Result<Self> {
        let path = std::fs::canonicalize(path.as_ref())?;
        if !path.is_dir() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} is not a directory", path.display()),
            ));
        }
        Ok(Self { path })
    }

    /// The canonical root path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Resolve a decoded URL path to an existing filesystem path inside the
    /// root.
    ///
    /// Returns `None` when nothing exists there or when the canonical
    /// result (after `..` segments and symlinks) lies outside the root.
    pub async fn resolve(&self, url_path: &str) -> Option<PathBuf> {
        let mut candidate = self.path.clone();
        for segment in url_path.split('/') {
            match segment {
                "" | "." => continue,
                s if s.contains('\0') => return None,
                s => candidate.push(s),
            }
        }

        let canonical = tokio::fs::canonicalize(&candidate).await.ok()?;
        if canonical.starts_with(&self.path) {
            Some(canonical)
        } else {
            debug!("Rejected path outside share root: {url_path}");
            None
        }
    }

    /// Where an upload named `filename` is written.
    ///
    /// `filename` must already be a single sanitized path segment. If
    /// something by that name exists its canonical location must still be
    /// inside the root, and a symlink must point at an existing file.
    /// Returns `None` for targets that escape the root, dangle, or are
    /// directories.
    pub async fn upload_target(&self, filename: &str) -> Option<PathBuf> {
        let target = self.path.join(filename);
        if target.parent() != Some(self.path.as_path()) {
            return None;
        }

        match tokio::fs::symlink_metadata(&target).await {
            Ok(_) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Some(target),
            Err(e) => {
                debug!("Cannot inspect upload target {}: {e}", target.display());
                return None;
            }
        }

        // Exists, possibly as a symlink: the target it names must exist too
        let existing = match tokio::fs::canonicalize(&target).await {
            Ok(existing) => existing,
            Err(e) => {
                debug!("Rejected dangling upload target {}: {e}", target.display());
                return None;
            }
        };
        if !existing.starts_with(&self.path) {
            debug!("Rejected upload target outside share root: {}", target.display());
            return None;
        }
        if tokio::fs::metadata(&existing).await.ok()?.is_dir() {
            return None;
        }
        Some(existing)
    }

    /// The URL path (`/a/b`) of a canonical path inside the root.
    ///
    /// The root itself maps to `/`.
    pub fn url_path(&self, path: &Path) -> String {
        let Ok(relative) = path.strip_prefix(&self.path) else {
            return "/".to_string();
        };

        let segments: Vec<String> = relative
            .components()
            .filter_map(|component| match component {
                Component::Normal(name) => Some(name.to_string_lossy().into_owned()),
                _ => None,
            })
            .collect();

        format!("/{}", segments.join("/"))
    }
}
