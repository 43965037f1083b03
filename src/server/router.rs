//! Request routing: browse, download and upload.

use log::{error, info, warn};

use crate::listing::{read_listing, render_html};
use crate::multipart::{boundary_from_content_type, extract_files, parse_parts, store_files};
use crate::parser::{HttpRequest, Method};
use crate::server::error::Error;
use crate::server::mime::content_type_for;
use crate::server::response::{HttpResponse, StatusCode};
use crate::share::ShareRoot;

/// Dispatches requests against one share root.
///
/// Stateless apart from the root itself; every request is handled
/// independently.
#[derive(Debug, Clone)]
pub struct Router {
    root: ShareRoot,
}

impl Router {
    /// Create a router serving `root`.
    pub fn new(root: ShareRoot) -> Self {
        Self { root }
    }

    /// The share root requests are resolved against.
    pub fn root(&self) -> &ShareRoot {
        &self.root
    }

    /// Handle one request, turning every failure into an error page.
    pub async fn handle(&self, request: HttpRequest) -> HttpResponse {
        let method = request.method;
        let path = request.path.clone();

        let response = match self.route(&request).await {
            Ok(response) => response,
            Err(e) => {
                let status = e.status();
                if status.as_u16() >= 500 {
                    error!("{method} {path} failed: {e}");
                } else {
                    warn!("{method} {path} rejected: {e}");
                }
                error_response(&e)
            }
        };

        info!("{method} {path} -> {}", response.status.as_u16());

        if method == Method::HEAD {
            response.without_body()
        } else {
            response
        }
    }

    async fn route(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        match request.method {
            Method::GET | Method::HEAD => self.browse(request).await,
            Method::POST => self.upload(request).await,
            other => Err(Error::MethodNotAllowed(other, request.path.clone())),
        }
    }

    /// Serve a directory listing or a file download.
    async fn browse(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let url_path = request.decoded_path();
        let Some(target) = self.root.resolve(&url_path).await else {
            return Err(Error::NotFound(url_path));
        };

        let metadata = tokio::fs::metadata(&target).await?;

        if metadata.is_dir() {
            let listing = read_listing(&target, &self.root.url_path(&target))
                .await
                .map_err(|e| {
                    warn!("Cannot read directory {}: {e}", target.display());
                    Error::NotFound(url_path.clone())
                })?;

            if request.accepts_json() {
                return HttpResponse::new(StatusCode::Ok).with_json(&listing);
            }
            let address = request.get_header("Host").map(String::as_str);
            return Ok(HttpResponse::new(StatusCode::Ok)
                .with_content_type("text/html; charset=utf-8")
                .with_body_string(render_html(&listing, address)));
        }

        if metadata.is_file() {
            let content = tokio::fs::read(&target).await?;
            return Ok(HttpResponse::new(StatusCode::Ok)
                .with_content_type(content_type_for(&target))
                .with_body_bytes(content));
        }

        Err(Error::NotFound(url_path))
    }

    /// Accept a multipart upload into the share root.
    async fn upload(&self, request: &HttpRequest) -> Result<HttpResponse, Error> {
        let content_type = request.content_type().unwrap_or_default();
        if !content_type.to_ascii_lowercase().contains("multipart/form-data") {
            let shown = if content_type.is_empty() { "(none)" } else { content_type };
            return Err(Error::BadContentType(shown.to_string()));
        }

        let boundary = boundary_from_content_type(content_type)?;
        let parts = parse_parts(&request.body, &boundary)?;
        let files = extract_files(parts)?;
        store_files(&self.root, &files).await?;

        Ok(HttpResponse::redirect("/"))
    }
}

/// The error page for `error`.
pub fn error_response(error: &Error) -> HttpResponse {
    let response = HttpResponse::error_page(error.status(), &error.to_string());

    if let Error::MethodNotAllowed(..) = error {
        let allowed: Vec<String> = Method::SERVED.iter().map(ToString::to_string).collect();
        return response.with_header("Allow", allowed.join(", "));
    }
    response
}
