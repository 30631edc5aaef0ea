//! Common error types for network operations

use crate::network::application::http::parser::ParseError;

/// A common error type for network operations.
///
/// This enum defines the errors a transport or the HTTP client can report.
/// It is designed to be simple and portable for `no_std` environments.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Error {
    /// An operation was attempted on a connection that is not open.
    NotOpen,
    /// An error occurred during a write operation.
    WriteError,
    /// An error occurred during a read operation.
    ReadError,
    /// A connection attempt was refused.
    ConnectionRefused,
    /// A timeout occurred.
    Timeout,
    /// The connection was closed.
    ConnectionClosed,
    /// An invalid address was provided.
    InvalidAddress,
    /// A protocol-specific error occurred.
    ProtocolError,
    /// The request head does not fit in the request buffer.
    RequestTooLarge,
    /// The server sent a response the parser rejected.
    MalformedResponse(ParseError),
    /// The stream ended (or went quiet) before the response was complete.
    IncompleteResponse,
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::NotOpen => f.write_str("connection is not open"),
            Error::WriteError => f.write_str("write failed"),
            Error::ReadError => f.write_str("read failed"),
            Error::ConnectionRefused => f.write_str("connection refused"),
            Error::Timeout => f.write_str("operation timed out"),
            Error::ConnectionClosed => f.write_str("connection closed"),
            Error::InvalidAddress => f.write_str("invalid address"),
            Error::ProtocolError => f.write_str("protocol error"),
            Error::RequestTooLarge => f.write_str("request head too large"),
            Error::MalformedResponse(e) => write!(f, "malformed response: {}", e),
            Error::IncompleteResponse => f.write_str("response ended before completion"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

#[cfg(feature = "defmt")]
impl defmt::Format for Error {
    fn format(&self, f: defmt::Formatter) {
        match self {
            Error::NotOpen => defmt::write!(f, "NotOpen"),
            Error::WriteError => defmt::write!(f, "WriteError"),
            Error::ReadError => defmt::write!(f, "ReadError"),
            Error::ConnectionRefused => defmt::write!(f, "ConnectionRefused"),
            Error::Timeout => defmt::write!(f, "Timeout"),
            Error::ConnectionClosed => defmt::write!(f, "ConnectionClosed"),
            Error::InvalidAddress => defmt::write!(f, "InvalidAddress"),
            Error::ProtocolError => defmt::write!(f, "ProtocolError"),
            Error::RequestTooLarge => defmt::write!(f, "RequestTooLarge"),
            Error::MalformedResponse(e) => defmt::write!(f, "MalformedResponse({})", e),
            Error::IncompleteResponse => defmt::write!(f, "IncompleteResponse"),
        }
    }
}
