//! The response object produced by [`ResponseParser`](super::ResponseParser).

use super::headers::HeaderTable;
use heapless::String;

/// Maximum length of the protocol token (`HTTP/1.1`).
pub const MAX_PROTOCOL_LEN: usize = 16;
/// Maximum length of the reason phrase.
pub const MAX_REASON_LEN: usize = 128;

pub(crate) const CONTENT_LENGTH: &str = "Content-Length";
pub(crate) const CONTENT_TYPE: &str = "Content-Type";
pub(crate) const TRANSFER_ENCODING: &str = "Transfer-Encoding";
pub(crate) const CHUNKED: &str = "chunked";

/// Well-known HTTP status codes.
///
/// [`Response::status_code`] keeps the raw number, so codes missing here are
/// still reported; [`Response::status`] maps the common ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u16)]
pub enum StatusCode {
    /// 200 OK
    Ok = 200,
    /// 201 Created
    Created = 201,
    /// 204 No Content
    NoContent = 204,
    /// 302 Found
    Found = 302,
    /// 400 Bad Request
    BadRequest = 400,
    /// 401 Unauthorized
    Unauthorized = 401,
    /// 403 Forbidden
    Forbidden = 403,
    /// 404 Not Found
    NotFound = 404,
    /// 405 Method Not Allowed
    MethodNotAllowed = 405,
    /// 500 Internal Server Error
    InternalServerError = 500,
    /// 503 Service Unavailable
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Maps a numeric code to a known status.
    pub fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(StatusCode::Ok),
            201 => Some(StatusCode::Created),
            204 => Some(StatusCode::NoContent),
            302 => Some(StatusCode::Found),
            400 => Some(StatusCode::BadRequest),
            401 => Some(StatusCode::Unauthorized),
            403 => Some(StatusCode::Forbidden),
            404 => Some(StatusCode::NotFound),
            405 => Some(StatusCode::MethodNotAllowed),
            500 => Some(StatusCode::InternalServerError),
            503 => Some(StatusCode::ServiceUnavailable),
            _ => None,
        }
    }

    /// The numeric value.
    pub fn as_u16(self) -> u16 {
        self as u16
    }
}

/// A parsed HTTP response.
///
/// Status line and headers are filled in by the parser, phase by phase. The
/// body is not part of this struct: it is read through the
/// [`Body`](super::Body) handle that `parse` hands to its callback.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    pub(crate) protocol: String<MAX_PROTOCOL_LEN>,
    pub(crate) status_code: u16,
    pub(crate) reason_phrase: String<MAX_REASON_LEN>,
    pub(crate) headers: HeaderTable,
}

impl Response {
    /// Protocol version, e.g. `HTTP/1.1`.
    pub fn protocol(&self) -> &str {
        &self.protocol
    }

    /// Numeric status code.
    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    /// The status code as a [`StatusCode`], if it is a well-known one.
    pub fn status(&self) -> Option<StatusCode> {
        StatusCode::from_u16(self.status_code)
    }

    /// Reason phrase. Words are joined without separators, so
    /// `404 Not Found` yields `NotFound`.
    pub fn reason_phrase(&self) -> &str {
        &self.reason_phrase
    }

    /// Response headers.
    pub fn headers(&self) -> &HeaderTable {
        &self.headers
    }

    /// Value of `Content-Length`, or 0 when absent or not a number.
    pub fn content_length(&self) -> usize {
        self.headers
            .get_ignore_ascii_case(CONTENT_LENGTH)
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Raw value of `Transfer-Encoding`, if present.
    pub fn transfer_encoding(&self) -> Option<&str> {
        self.headers.get_ignore_ascii_case(TRANSFER_ENCODING)
    }

    /// Value of `Content-Type`, if present.
    pub fn content_type(&self) -> Option<&str> {
        self.headers.get_ignore_ascii_case(CONTENT_TYPE)
    }

    /// Returns `true` if the body uses chunked transfer coding.
    pub fn is_chunked(&self) -> bool {
        self.transfer_encoding()
            .is_some_and(|te| te.trim().eq_ignore_ascii_case(CHUNKED))
    }
}
