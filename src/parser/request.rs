//! HTTP request parsing and representation.

use std::collections::HashMap;
use std::str::FromStr;

use crate::parser::error::Error;
use crate::parser::method::Method;
use crate::parser::version::HttpVersion;

/// Represents an HTTP request.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request target exactly as sent, query string included
    pub path: String,
    /// The HTTP version
    pub version: HttpVersion,
    /// The HTTP headers, names in the case the client sent them
    pub headers: HashMap<String, String>,
    /// The raw request body
    pub body: Vec<u8>,
}

impl HttpRequest {
    /// Create a new HTTP request with an empty body.
    pub fn new(
        method: Method,
        path: String,
        version: HttpVersion,
        headers: HashMap<String, String>,
    ) -> Self {
        Self {
            method,
            path,
            version,
            headers,
            body: Vec::new(),
        }
    }

    /// Create a new HTTP request with a body.
    pub fn with_body(
        method: Method,
        path: String,
        version: HttpVersion,
        headers: HashMap<String, String>,
        body: Vec<u8>,
    ) -> Self {
        let mut request = Self::new(method, path, version, headers);
        request.body = body;
        request
    }

    /// Get a header value.
    ///
    /// # Arguments
    ///
    /// * `name` - The header name
    ///
    /// # Returns
    ///
    /// The header value, if it exists
    pub fn get_header(&self, name: &str) -> Option<&String> {
        // Headers are case-insensitive, so we need to do a case-insensitive lookup
        self.headers.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                Some(v)
            } else {
                None
            }
        })
    }

    /// The `Content-Type` header, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.get_header("Content-Type").map(String::as_str)
    }

    /// The declared body length.
    ///
    /// # Returns
    ///
    /// `Ok(None)` when the header is absent, an error when it is not a
    /// non-negative integer
    pub fn content_length(&self) -> Result<Option<usize>, Error> {
        declared_length(&self.headers)
    }

    /// Whether the client asked for a JSON representation.
    pub fn accepts_json(&self) -> bool {
        self.get_header("Accept")
            .is_some_and(|accept| accept.contains("application/json"))
    }

    /// The request path with the query string removed and percent-escapes
    /// decoded.
    ///
    /// Escapes that do not decode to valid UTF-8 are replaced lossily, so
    /// the result never fails; resolution against the share root decides
    /// whether it names anything.
    pub fn decoded_path(&self) -> String {
        let raw = self.path
            .split_once('?')
            .map_or(self.path.as_str(), |(path, _)| path);

        match urlencoding::decode(raw) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => {
                let bytes = urlencoding::decode_binary(raw.as_bytes());
                String::from_utf8_lossy(&bytes).into_owned()
            }
        }
    }
}

/// Locate the end of the request head.
///
/// # Returns
///
/// The offset of the first body byte, i.e. just past the blank line that
/// terminates the headers, or `None` if the head is still incomplete
pub fn find_head_end(input: &[u8]) -> Option<usize> {
    let crlf = find(input, b"\r\n\r\n").map(|i| i + 4);
    let lf = find(input, b"\n\n").map(|i| i + 2);

    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|window| window == needle)
}

fn declared_length(headers: &HashMap<String, String>) -> Result<Option<usize>, Error> {
    let Some(value) = headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case("Content-Length"))
        .map(|(_, v)| v)
    else {
        return Ok(None);
    };

    value
        .parse::<usize>()
        .map(Some)
        .map_err(|_| Error::InvalidContentLength(value.clone()))
}

/// Parse an HTTP request from a byte slice.
///
/// The head must be UTF-8; everything after the blank line is kept as raw
/// bytes, truncated to `Content-Length` when that header is present.
///
/// # Arguments
///
/// * `input` - A byte slice containing the HTTP request to parse
///
/// # Returns
///
/// The parsed HTTP request, or an error if the request is invalid
pub fn parse_request(input: &[u8]) -> Result<HttpRequest, Error> {
    if input.is_empty() {
        return Err(Error::EmptyRequest);
    }

    let (head, body) = match find_head_end(input) {
        Some(end) => input.split_at(end),
        None => (input, &[][..]),
    };

    // Convert the head to a string
    let head_str = match std::str::from_utf8(head) {
        Ok(s) => s,
        Err(_) => return Err(Error::MalformedRequestLine("Invalid UTF-8".to_string())),
    };

    // Split the head into lines
    let mut lines = head_str.lines();

    // Parse the request line
    let request_line = match lines.next() {
        Some(line) => line,
        None => return Err(Error::EmptyRequest),
    };

    // Split the request line into method, path, and version
    let parts: Vec<&str> = request_line.split_whitespace().collect();
    if parts.len() != 3 {
        return Err(Error::MalformedRequestLine(request_line.to_string()));
    }

    let method = Method::from_str(parts[0])?;

    let path = parts[1].to_string();
    if !path.starts_with('/') {
        return Err(Error::InvalidPath);
    }

    let version = HttpVersion::from_str(parts[2])?;

    // Parse the headers
    let mut headers = HashMap::new();
    for line in lines {
        // Empty line indicates the end of headers
        if line.is_empty() {
            break;
        }

        let (name, value) = line.split_once(':').ok_or(Error::InvalidHeaderFormat)?;
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }

    if version.requires_host() && !headers.keys().any(|k| k.eq_ignore_ascii_case("Host")) {
        return Err(Error::MissingHeader("Host".to_string()));
    }

    let body = match declared_length(&headers)? {
        Some(len) if len < body.len() => &body[..len],
        _ => body,
    };

    Ok(HttpRequest::with_body(method, path, version, headers, body.to_vec()))
}
