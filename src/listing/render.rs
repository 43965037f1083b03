//! HTML rendering of a [`Listing`].

use std::fmt::Write;

use crate::listing::entry::{DirEntry, EntryKind, Listing};
use crate::listing::icon::{file_icon, FOLDER_ICON};
use crate::multipart::FILE_FIELD;

const STYLE: &str = "body{font-family:-apple-system,system-ui,sans-serif;max-width:760px;margin:0 auto;padding:16px}\
a{color:inherit;text-decoration:none}\
.crumbs{margin-bottom:12px}\
.address{margin-bottom:12px;color:#555}\
.entry{display:flex;gap:12px;padding:10px;border-bottom:1px solid #ddd}\
.meta{color:#777;font-size:.85em}\
.empty{padding:32px;text-align:center;color:#777}\
form{margin-top:24px;padding:16px;border:1px dashed #aaa}";

/// Escape text for use in HTML content and attribute values.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Percent-encode each segment of a URL path, keeping the slashes.
fn href(url_path: &str) -> String {
    url_path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

/// URL path of `name` inside the directory at `dir`.
fn child_path(dir: &str, name: &str) -> String {
    format!("{}/{name}", dir.trim_end_matches('/'))
}

fn breadcrumb(path: &str) -> String {
    let mut html = String::from(r#"<nav class="crumbs"><a href="/">🏠 Home</a>"#);
    let mut current = String::new();
    for segment in path.split('/').filter(|s| !s.is_empty()) {
        current.push('/');
        current.push_str(segment);
        let _ = write!(html, r#" › <a href="{}">{}</a>"#, href(&current), escape_html(segment));
    }
    html.push_str("</nav>");
    html
}

fn entry_row(dir: &str, entry: &DirEntry) -> String {
    let path = href(&child_path(dir, &entry.name));
    let name = escape_html(&entry.name);
    let modified = entry.modified_display().unwrap_or_default();

    match entry.kind {
        EntryKind::Directory => format!(
            r#"<a class="entry" href="{path}/"><span>{FOLDER_ICON}</span><div><div>{name}</div><div class="meta">Folder · {modified}</div></div></a>"#
        ),
        EntryKind::File => format!(
            r#"<a class="entry" href="{path}" download><span>{icon}</span><div><div>{name}</div><div class="meta">{size} · {modified}</div></div></a>"#,
            icon = file_icon(&entry.name),
            size = entry.human_size().unwrap_or_default(),
        ),
    }
}

/// Render the listing page.
///
/// `address` is the `host[:port]` other devices can open, normally the
/// request's `Host` header; it is shown above the listing when known. The
/// page always carries the upload form; it posts to the current URL, and
/// uploads land in the share root.
pub fn render_html(listing: &Listing, address: Option<&str>) -> String {
    let title = escape_html(&listing.path);
    let mut html = format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\n\
         <title>LAN Share · {title}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n"
    );

    html.push_str(&breadcrumb(&listing.path));
    if let Some(address) = address.filter(|a| !a.is_empty()) {
        let _ = write!(
            html,
            "\n<div class=\"address\">📡 Open <code>http://{}</code> on another device</div>",
            escape_html(address)
        );
    }
    html.push_str("\n<div class=\"list\">\n");

    if let Some(parent) = &listing.parent {
        let _ = writeln!(
            html,
            r#"<a class="entry" href="{}"><span>⬆️</span><div><div>..</div><div class="meta">Parent folder</div></div></a>"#,
            href(parent)
        );
    }

    for entry in listing.entries() {
        html.push_str(&entry_row(&listing.path, entry));
        html.push('\n');
    }

    if listing.is_empty() {
        html.push_str("<div class=\"empty\">📭 This folder is empty</div>\n");
    }

    let _ = write!(
        html,
        "</div>\n<form method=\"POST\" enctype=\"multipart/form-data\">\n\
         <input type=\"file\" name=\"{FILE_FIELD}\" required>\n\
         <button type=\"submit\">Upload</button>\n</form>\n</body>\n</html>\n"
    );

    html
}
