//! Directory listings.
//!
//! [`read_listing`] gathers the visible entries of one directory, sorted
//! the way the browser page shows them; [`render_html`] turns that into the
//! page with breadcrumbs, the parent link and the upload form.

mod entry;
mod icon;
mod render;
mod size;

pub use entry::{read_listing, DirEntry, EntryKind, Listing};
pub use icon::file_icon;
pub use render::{escape_html, render_html};
pub use size::{format_size, scale_size};
