//! HTTP/1.1 protocol implementation for embedded systems.
//!
//! The heart of this module is [`ResponseParser`], an incremental state machine
//! that consumes receive buffers of any size and rebuilds a [`Response`]. It
//! never copies body bytes into its own storage: while a response body is
//! arriving, `parse` hands a [`Body`] to the caller, who pulls as many bytes
//! as it wants out of the current buffer. Parser memory therefore stays
//! constant no matter how large the body is.
//!
//! # Layout
//!
//! - [`headers`]: the [`HeaderTable`] with RFC 2616 §4.2 duplicate merging
//! - [`response`]: the [`Response`] produced by the parser
//! - [`parser`]: line extractor, phase machine and body framing
//! - [`request`]: request head serialization
//! - [`client`]: the read loop that drives the parser over a connection
//!
//! # Usage
//!
//! ```rust
//! use uphttp::network::application::http::{ParseResult, ResponseParser};
//!
//! let mut parser = ResponseParser::new();
//! let raw = b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n5\r\nhello\r\n0\r\n\r\n";
//!
//! let mut body = [0u8; 16];
//! let mut len = 0;
//! let result = parser.parse(raw, |chunk| len += chunk.read(&mut body[len..]));
//!
//! assert_eq!(result, ParseResult::Completed);
//! assert_eq!(&body[..len], b"hello");
//! ```

/// Blocking and async clients driving the parser over a connection.
pub mod client;

/// Header storage shared by requests and responses.
pub mod headers;

/// The incremental response parser.
pub mod parser;

/// Request methods and request head serialization.
pub mod request;

/// Parsed response and status codes.
pub mod response;


pub use client::{Client, Options};
pub use headers::{Header, HeaderError, HeaderTable};
pub use parser::{Body, ParseError, ParseResult, Phase, ResponseParser};
pub use request::{Method, Request};
pub use response::{Response, StatusCode};
