//! Multipart body framing.

use std::collections::HashMap;

use crate::multipart::error::Error;

/// One section of a multipart body.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Part {
    /// Part headers, names lower-cased
    pub headers: HashMap<String, String>,
    /// Raw payload, without the line ending that precedes the next delimiter
    pub body: Vec<u8>,
}

impl Part {
    /// Get a part header by name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_ascii_lowercase()).map(String::as_str)
    }

    /// The parsed `Content-Disposition` header, if present.
    pub fn content_disposition(&self) -> Option<ContentDisposition> {
        self.header("content-disposition").map(ContentDisposition::parse)
    }
}

/// The parameters of a `Content-Disposition` part header that matter for
/// form uploads.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContentDisposition {
    /// Disposition type, normally `form-data`
    pub kind: String,
    /// Form field name
    pub name: Option<String>,
    /// Client-side file name, if the part is a file
    pub filename: Option<String>,
}

impl ContentDisposition {
    /// Parse a header value such as
    /// `form-data; name="file"; filename="report.txt"`.
    ///
    /// An RFC 5987 `filename*` parameter takes precedence over `filename`.
    pub fn parse(value: &str) -> Self {
        let mut segments = split_outside_quotes(value).into_iter();
        let kind = segments.next().unwrap_or_default().trim().to_ascii_lowercase();

        let mut disposition = ContentDisposition { kind, ..Default::default() };
        let mut extended_filename = None;

        for (key, value) in segments.filter_map(parameter) {
            match key.as_str() {
                "name" => disposition.name = Some(value),
                "filename" => disposition.filename = Some(value),
                "filename*" => extended_filename = decode_extended(&value),
                _ => {}
            }
        }

        if extended_filename.is_some() {
            disposition.filename = extended_filename;
        }
        disposition
    }
}

/// Extract the boundary from a `multipart/form-data` Content-Type value.
///
/// The boundary may be quoted; quotes are removed.
pub fn boundary_from_content_type(content_type: &str) -> Result<String, Error> {
    split_outside_quotes(content_type)
        .into_iter()
        .skip(1)
        .filter_map(parameter)
        .find_map(|(key, value)| (key == "boundary").then_some(value))
        .filter(|boundary| !boundary.is_empty())
        .ok_or(Error::MissingBoundary)
}

/// Split a multipart body into parts.
///
/// The preamble before the first delimiter and the epilogue after the
/// closing `--boundary--` are ignored. A body without a closing delimiter
/// is rejected, so a truncated upload never yields a part.
pub fn parse_parts(body: &[u8], boundary: &str) -> Result<Vec<Part>, Error> {
    if boundary.is_empty() {
        return Err(Error::MissingBoundary);
    }

    let delimiter = format!("--{boundary}").into_bytes();
    let positions = delimiter_positions(body, &delimiter);
    if positions.is_empty() {
        return Err(Error::Malformed("boundary delimiter not found in body".to_string()));
    }

    let mut parts = Vec::new();
    for (i, &start) in positions.iter().enumerate() {
        let after = start + delimiter.len();
        if body[after..].starts_with(b"--") {
            return Ok(parts);
        }

        let end = positions.get(i + 1).copied().unwrap_or(body.len());
        parts.push(parse_part(&body[after..end])?);
    }

    Err(Error::Malformed("missing closing boundary delimiter".to_string()))
}

/// Offsets of every delimiter that fills a line of its own.
///
/// After the delimiter the line may only hold `--` (closing delimiter) or
/// linear whitespace before the line ending.
fn delimiter_positions(body: &[u8], delimiter: &[u8]) -> Vec<usize> {
    let mut positions = Vec::new();
    let mut from = 0;

    while let Some(found) = body[from..]
        .windows(delimiter.len())
        .position(|window| window == delimiter)
    {
        let at = from + found;
        let line_start = at == 0 || body[at - 1] == b'\n';
        if line_start && ends_delimiter_line(&body[at + delimiter.len()..]) {
            positions.push(at);
        }
        from = at + delimiter.len();
    }

    positions
}

fn ends_delimiter_line(rest: &[u8]) -> bool {
    if rest.starts_with(b"--") {
        return true;
    }
    let padding = rest.iter().take_while(|&&b| b == b' ' || b == b'\t').count();
    matches!(rest[padding..].first(), None | Some(b'\r' | b'\n'))
}

#[derive(Clone, Copy)]
enum State {
    Headers,
    Body,
}

/// Parse the bytes between two delimiters.
///
/// The segment starts with the remainder of the delimiter line, then the
/// part headers, a blank line, and the payload.
fn parse_part(segment: &[u8]) -> Result<Part, Error> {
    let Some(mut offset) = next_line_end(segment, 0) else {
        return Err(Error::Malformed("delimiter line is not terminated".to_string()));
    };

    let mut part = Part::default();
    let mut state = State::Headers;

    loop {
        match state {
            State::Headers => {
                let Some(line_end) = next_line_end(segment, offset) else {
                    return Err(Error::Malformed("part headers are not terminated".to_string()));
                };
                let line = trim_line_ending(&segment[offset..line_end]);
                offset = line_end;

                if line.is_empty() {
                    state = State::Body;
                    continue;
                }

                let line = String::from_utf8_lossy(line);
                let (name, value) = line
                    .split_once(':')
                    .ok_or_else(|| Error::Malformed(format!("invalid part header: {line}")))?;
                part.headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
            }
            State::Body => {
                part.body = trim_line_ending(&segment[offset..]).to_vec();
                return Ok(part);
            }
        }
    }
}

/// Offset just past the next `\n` at or after `from`.
fn next_line_end(bytes: &[u8], from: usize) -> Option<usize> {
    bytes[from..]
        .iter()
        .position(|&b| b == b'\n')
        .map(|i| from + i + 1)
}

/// Drop one trailing `\r\n` or `\n`.
fn trim_line_ending(bytes: &[u8]) -> &[u8] {
    bytes
        .strip_suffix(b"\r\n")
        .or_else(|| bytes.strip_suffix(b"\n"))
        .unwrap_or(bytes)
}

/// Split a header value on `;`, ignoring separators inside quoted strings.
fn split_outside_quotes(value: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    let mut in_quotes = false;
    let mut escaped = false;
    let mut start = 0;

    for (i, c) in value.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' if in_quotes => escaped = true,
            '"' => in_quotes = !in_quotes,
            ';' if !in_quotes => {
                segments.push(&value[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    segments.push(&value[start..]);
    segments
}

/// Parse `key=value` into a lower-cased key and an unquoted value.
fn parameter(segment: &str) -> Option<(String, String)> {
    let (key, value) = segment.split_once('=')?;
    Some((key.trim().to_ascii_lowercase(), unquote(value.trim())))
}

/// Remove surrounding double quotes and unescape `\"`.
///
/// Other backslashes are kept: some clients send Windows paths such as
/// `C:\Users\me\a.txt` unescaped.
fn unquote(value: &str) -> String {
    match value.strip_prefix('"').and_then(|v| v.strip_suffix('"')) {
        Some(inner) => inner.replace("\\\"", "\""),
        None => value.to_string(),
    }
}

/// Decode an RFC 5987 value such as `UTF-8''r%C3%A9sum%C3%A9.pdf`.
fn decode_extended(value: &str) -> Option<String> {
    let mut pieces = value.splitn(3, '\'');
    let charset = pieces.next()?;
    let _language = pieces.next()?;
    let encoded = pieces.next()?;

    if !charset.eq_ignore_ascii_case("utf-8") {
        return None;
    }
    urlencoding::decode(encoded).ok().map(|decoded| decoded.into_owned())
}
