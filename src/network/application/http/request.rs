//! HTTP request methods and request head serialization.

use super::headers::{HeaderError, HeaderTable};
use super::response::CONTENT_LENGTH;
use crate::network::error::Error;
use core::fmt::Write;
use heapless::{String, Vec};

/// Maximum size of a serialized request line plus headers.
pub const MAX_REQUEST_HEAD_LEN: usize = 1024;

const HTTP_1_1: &[u8] = b"HTTP/1.1";
const CRLF: &[u8] = b"\r\n";
const HOST: &str = "Host";
const USER_AGENT: &str = "User-Agent";

/// HTTP request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// `GET`
    Get,
    /// `POST`
    Post,
    /// `PUT`
    Put,
    /// `DELETE`
    Delete,
    /// `HEAD`
    Head,
    /// `OPTIONS`
    Options,
    /// `TRACE`
    Trace,
    /// `PATCH`
    Patch,
}

impl Method {
    /// The method token as sent on the wire.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
            Method::Head => "HEAD",
            Method::Options => "OPTIONS",
            Method::Trace => "TRACE",
            Method::Patch => "PATCH",
        }
    }
}

/// An HTTP request.
///
/// `Host` and `User-Agent` are added when serializing unless `headers`
/// already carries them, and `Content-Length` is added for a body.
///
/// # Examples
///
/// ```rust
/// use uphttp::network::application::http::{Method, Request};
///
/// let request = Request::new(Method::Get, "example.com", "/status")
///     .with_header("Accept", "application/json")
///     .unwrap();
///
/// let mut head = heapless::Vec::<u8, 256>::new();
/// request.write_head("uphttp", &mut head).unwrap();
/// assert!(head.starts_with(b"GET /status HTTP/1.1\r\n"));
/// ```
#[derive(Debug, Clone)]
pub struct Request<'a> {
    /// Request method.
    pub method: Method,
    /// Value for the `Host` header, `host` or `host:port`.
    pub host: &'a str,
    /// Path and query, e.g. `/api/data?id=1`.
    pub path: &'a str,
    /// Extra headers.
    pub headers: HeaderTable,
    /// Request body, sent after the head.
    pub body: Option<&'a [u8]>,
}

impl<'a> Request<'a> {
    /// Creates a request without headers or body.
    pub fn new(method: Method, host: &'a str, path: &'a str) -> Self {
        Self {
            method,
            host,
            path,
            headers: HeaderTable::new(),
            body: None,
        }
    }

    /// A `GET` request.
    pub fn get(host: &'a str, path: &'a str) -> Self {
        Self::new(Method::Get, host, path)
    }

    /// A `POST` request carrying `body`.
    pub fn post(host: &'a str, path: &'a str, body: &'a [u8]) -> Self {
        Self::new(Method::Post, host, path).with_body(body)
    }

    /// Adds a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self, HeaderError> {
        self.headers.insert(name, value)?;
        Ok(self)
    }

    /// Sets the body.
    pub fn with_body(mut self, body: &'a [u8]) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes the request line and headers, including the blank line
    /// that ends the head, into `out`.
    pub fn write_head<const N: usize>(
        &self,
        user_agent: &str,
        out: &mut Vec<u8, N>,
    ) -> Result<(), Error> {
        let path = if self.path.is_empty() { "/" } else { self.path };

        // Request line
        push(out, self.method.as_str().as_bytes())?;
        push(out, b" ")?;
        push(out, path.as_bytes())?;
        push(out, b" ")?;
        push(out, HTTP_1_1)?;
        push(out, CRLF)?;

        // Headers
        if self.headers.get_ignore_ascii_case(HOST).is_none() {
            push_header(out, HOST, self.host)?;
        }
        if self.headers.get_ignore_ascii_case(USER_AGENT).is_none() {
            push_header(out, USER_AGENT, user_agent)?;
        }
        for (name, value) in self.headers.iter() {
            if name.eq_ignore_ascii_case(CONTENT_LENGTH) && self.body.is_some() {
                continue;
            }
            push_header(out, name, value)?;
        }
        if let Some(body) = self.body {
            let mut len: String<20> = String::new();
            write!(len, "{}", body.len()).map_err(|_| Error::RequestTooLarge)?;
            push_header(out, CONTENT_LENGTH, &len)?;
        }

        push(out, CRLF)
    }
}

fn push<const N: usize>(out: &mut Vec<u8, N>, bytes: &[u8]) -> Result<(), Error> {
    out.extend_from_slice(bytes)
        .map_err(|_| Error::RequestTooLarge)
}

fn push_header<const N: usize>(out: &mut Vec<u8, N>, name: &str, value: &str) -> Result<(), Error> {
    push(out, name.as_bytes())?;
    push(out, b": ")?;
    push(out, value.as_bytes())?;
    push(out, CRLF)
}
