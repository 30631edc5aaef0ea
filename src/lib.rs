//! # uphttp - incremental HTTP/1.1 responses for embedded devices
//!
//! A small HTTP/1.1 stack for devices that cannot afford to hold a whole
//! response in memory. The core is a byte-stream state machine that accepts
//! arbitrarily fragmented network buffers and rebuilds the status line and
//! headers of a response, while the body is pulled by the caller straight out
//! of the current receive buffer.
//!
//! ## Features
//!
//! - **Incremental parsing**: a line, a header or a chunk-size may straddle any
//!   number of reads
//! - **Two body framings**: `Content-Length` and `Transfer-Encoding: chunked`
//! - **Pull-based body delivery**: body bytes are never buffered by the parser
//! - **Fixed memory**: every container is a `heapless` collection
//! - **Blocking client**: a driver over any [`network::Connection`] that can be
//!   polled for readability
//!
//! ## Usage
//!
//! Feed the parser buffers as they arrive and read the body from inside the
//! body callback:
//!
//! ```rust
//! use uphttp::network::application::http::{ParseResult, ResponseParser};
//!
//! let mut parser = ResponseParser::new();
//! let mut body = [0u8; 5];
//! let mut received = 0;
//!
//! let first = b"HTTP/1.1 200 OK\r\nContent-Le";
//! let second = b"ngth: 5\r\n\r\nhello";
//!
//! assert_eq!(parser.parse(first, |_| {}), ParseResult::NotCompleted);
//! let result = parser.parse(second, |chunk| {
//!     received += chunk.read(&mut body[received..]);
//! });
//!
//! assert_eq!(result, ParseResult::Completed);
//! assert_eq!(&body, b"hello");
//! assert_eq!(parser.response().unwrap().status_code(), 200);
//! ```
//!
//! ### Blocking client
//!
//! ```rust,no_run
//! use uphttp::network::application::http::Client;
//! # use uphttp::network::{Close, Connection, Poll, Read, Write};
//! # use core::time::Duration;
//! # struct MockConnection;
//! # impl Connection for MockConnection {}
//! # impl Read for MockConnection {
//! #     type Error = ();
//! #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
//! # }
//! # impl Write for MockConnection {
//! #     type Error = ();
//! #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
//! #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Close for MockConnection {
//! #     type Error = ();
//! #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
//! # }
//! # impl Poll for MockConnection {
//! #     type Error = ();
//! #     fn poll_read(&mut self, _timeout: Duration) -> Result<bool, Self::Error> { Ok(true) }
//! # }
//!
//! let mut client = Client::new(MockConnection);
//! let mut total = 0;
//! let response = client.get("example.com", "/status", |body| {
//!     let mut scratch = [0u8; 64];
//!     total += body.read(&mut scratch);
//! });
//! ```
//!
//! ## Optional Features
//!
//! - `std`: implement `std::error::Error` for the error types
//! - `async`: an [`AsyncClient`](network::application::http::client::AsyncClient)
//!   over the async transport traits
//! - `defmt`: `defmt` logging and `defmt::Format` for the error types

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(missing_docs)]
#![warn(missing_debug_implementations)]

#[macro_use]
mod fmt;

/// Network abstraction layer: transport traits, errors and the HTTP layer.
///
/// The transport traits keep the HTTP code independent of the TCP stack, so
/// the same client runs over smoltcp, an AT-command modem or `std::net`.
pub mod network;
