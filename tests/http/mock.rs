//! Scripted connection for client tests

use core::time::Duration;
use std::collections::VecDeque;
use uphttp::network::error::Error;
use uphttp::network::{Close, Connection, Poll, Read, Write};

/// What happens once every scripted fragment has been read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AtEnd {
    /// `read` returns 0, as after a FIN.
    Close,
    /// `poll_read` reports a timeout.
    Silence,
}

/// Mock connection that returns the response in the given fragments, one
/// fragment per `read`, and records everything written to it.
#[derive(Debug)]
pub struct MockConnection {
    fragments: VecDeque<Vec<u8>>,
    at_end: AtEnd,
    pub written: Vec<u8>,
    pub flushed: bool,
    pub polls: usize,
}

impl MockConnection {
    pub fn new(fragments: &[&[u8]], at_end: AtEnd) -> Self {
        Self {
            fragments: fragments.iter().map(|f| f.to_vec()).collect(),
            at_end,
            written: Vec::new(),
            flushed: false,
            polls: 0,
        }
    }

    /// Serves `response` in fragments of `size` bytes.
    pub fn fragmented(response: &[u8], size: usize, at_end: AtEnd) -> Self {
        let fragments: Vec<&[u8]> = response.chunks(size).collect();
        Self::new(&fragments, at_end)
    }

    pub fn written_str(&self) -> &str {
        core::str::from_utf8(&self.written).unwrap()
    }
}

impl Read for MockConnection {
    type Error = Error;

    fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
        let Some(mut fragment) = self.fragments.pop_front() else {
            return Ok(0);
        };

        let len = buf.len().min(fragment.len());
        buf[..len].copy_from_slice(&fragment[..len]);
        if len < fragment.len() {
            fragment.drain(..len);
            self.fragments.push_front(fragment);
        }
        Ok(len)
    }
}

impl Write for MockConnection {
    type Error = Error;

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        // accept at most 10 bytes per call to exercise partial writes
        let len = buf.len().min(10);
        self.written.extend_from_slice(&buf[..len]);
        Ok(len)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        self.flushed = true;
        Ok(())
    }
}

impl Close for MockConnection {
    type Error = Error;

    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Poll for MockConnection {
    type Error = Error;

    fn poll_read(&mut self, _timeout: Duration) -> Result<bool, Self::Error> {
        self.polls += 1;
        Ok(!self.fragments.is_empty() || self.at_end == AtEnd::Close)
    }
}

impl Connection for MockConnection {}

/// A connection whose reads always fail.
#[derive(Debug)]
pub struct BrokenConnection;

impl Read for BrokenConnection {
    type Error = ();

    fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
        Err(())
    }
}

impl Write for BrokenConnection {
    type Error = ();

    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        Ok(buf.len())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Close for BrokenConnection {
    type Error = ();

    fn close(self) -> Result<(), Self::Error> {
        Ok(())
    }
}

impl Poll for BrokenConnection {
    type Error = ();

    fn poll_read(&mut self, _timeout: Duration) -> Result<bool, Self::Error> {
        Ok(true)
    }
}

impl Connection for BrokenConnection {}

#[cfg(feature = "async")]
pub mod asynch {
    use std::collections::VecDeque;
    use uphttp::network::error::Error;
    use uphttp::network::{AsyncClose, AsyncConnection, AsyncRead, AsyncWrite};

    /// Async counterpart of [`MockConnection`](super::MockConnection).
    #[derive(Debug)]
    pub struct AsyncMockConnection {
        fragments: VecDeque<Vec<u8>>,
        pub written: Vec<u8>,
    }

    impl AsyncMockConnection {
        pub fn fragmented(response: &[u8], size: usize) -> Self {
            Self {
                fragments: response.chunks(size).map(|f| f.to_vec()).collect(),
                written: Vec::new(),
            }
        }
    }

    impl AsyncRead for AsyncMockConnection {
        type Error = Error;

        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            let Some(fragment) = self.fragments.pop_front() else {
                return Ok(0);
            };
            // fragments are never larger than the client's receive buffer here
            buf[..fragment.len()].copy_from_slice(&fragment);
            Ok(fragment.len())
        }
    }

    impl AsyncWrite for AsyncMockConnection {
        type Error = Error;

        async fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
            self.written.extend_from_slice(buf);
            Ok(buf.len())
        }

        async fn flush(&mut self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl AsyncClose for AsyncMockConnection {
        type Error = Error;

        async fn close(self) -> Result<(), Self::Error> {
            Ok(())
        }
    }

    impl AsyncConnection for AsyncMockConnection {}
}
