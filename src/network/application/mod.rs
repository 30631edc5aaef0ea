//! # Application Layer Network Protocols
//!
//! Application layer (OSI Layer 7) protocols built on the core network traits.
//!
//! - **[`http`]**: incremental HTTP/1.1 response parser and a blocking client
//!
//! Protocol implementations here follow the same rules:
//!
//! - **Connection Agnostic**: Work with any type implementing [`Connection`](crate::network::Connection)
//! - **No-std Compatible**: No heap allocation
//! - **Resource Conscious**: Fixed-size buffers with compile-time capacities

/// HTTP/1.1 response parser and client.
///
/// Reconstructs responses from fragmented reads and hands body bytes to the
/// caller without buffering them.
pub mod http;
