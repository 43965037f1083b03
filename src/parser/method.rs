//! HTTP request methods.

use std::fmt;
use std::str::FromStr;

use crate::parser::error::Error;

/// HTTP request methods as defined in RFC 7231 and common extensions.
///
/// Only `GET`, `HEAD` and `POST` are served; the rest parse so that they
/// can be answered with `405 Method Not Allowed` instead of `400`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// Browse a directory or download a file.
    GET,
    /// Upload a file.
    POST,
    PUT,
    DELETE,
    /// Same as GET without the body.
    HEAD,
    OPTIONS,
    PATCH,
}

impl Method {
    /// Methods the file share answers, in `Allow` header order.
    pub const SERVED: [Method; 3] = [Method::GET, Method::HEAD, Method::POST];
}

impl FromStr for Method {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Method::GET),
            "POST" => Ok(Method::POST),
            "PUT" => Ok(Method::PUT),
            "DELETE" => Ok(Method::DELETE),
            "HEAD" => Ok(Method::HEAD),
            "OPTIONS" => Ok(Method::OPTIONS),
            "PATCH" => Ok(Method::PATCH),
            _ => Err(Error::InvalidMethod(s.to_string())),
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}
