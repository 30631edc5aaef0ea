//! Blocking HTTP client driving [`ResponseParser`] over a connection.
//!
//! The client owns the receive loop: it polls the connection for readability,
//! reads into a fixed buffer, feeds the parser and forwards body
//! notifications to the caller's closure. Body bytes are read by the caller
//! straight out of the receive buffer, so memory use does not depend on the
//! body size.

use super::parser::{Body, ParseResult, ResponseParser};
use super::request::{MAX_REQUEST_HEAD_LEN, Method, Request};
use super::response::Response;
use crate::network::error::Error;
use crate::network::{Connection, Poll, Write};
use core::time::Duration;
use heapless::Vec;

/// Size of the receive buffer handed to the parser.
pub const RECEIVE_BUFFER_SIZE: usize = 1024;
/// Default time to wait for the connection to become readable.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(30);
/// Default `User-Agent` value.
pub const DEFAULT_USER_AGENT: &str = "uphttp";

/// Client configuration.
///
/// # Examples
///
/// ```rust
/// use core::time::Duration;
/// use uphttp::network::application::http::Options;
///
/// let options = Options {
///     poll_timeout: Duration::from_secs(5),
///     ..Options::default()
/// };
/// assert_eq!(options.user_agent, "uphttp");
/// ```
#[derive(Debug, Clone)]
pub struct Options<'a> {
    /// How long to wait for response bytes before giving up.
    ///
    /// The wait restarts after every successful read.
    pub poll_timeout: Duration,

    /// `User-Agent` sent unless the request sets its own.
    pub user_agent: &'a str,
}

impl Default for Options<'_> {
    fn default() -> Self {
        Self {
            poll_timeout: DEFAULT_POLL_TIMEOUT,
            user_agent: DEFAULT_USER_AGENT,
        }
    }
}

/// A blocking HTTP/1.1 client.
///
/// One request is sent per call; the connection is not reused for a second
/// response unless the server keeps it open and the caller sends again.
///
/// # Examples
///
/// ```rust,no_run
/// use uphttp::network::application::http::{Client, Request};
/// # use uphttp::network::{Close, Connection, Poll, Read, Write};
/// # use core::time::Duration;
/// # struct TcpConnection;
/// # impl Connection for TcpConnection {}
/// # impl Read for TcpConnection {
/// #     type Error = ();
/// #     fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> { Ok(0) }
/// # }
/// # impl Write for TcpConnection {
/// #     type Error = ();
/// #     fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> { Ok(buf.len()) }
/// #     fn flush(&mut self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # impl Close for TcpConnection {
/// #     type Error = ();
/// #     fn close(self) -> Result<(), Self::Error> { Ok(()) }
/// # }
/// # impl Poll for TcpConnection {
/// #     type Error = ();
/// #     fn poll_read(&mut self, _timeout: Duration) -> Result<bool, Self::Error> { Ok(true) }
/// # }
///
/// let mut client = Client::new(TcpConnection);
/// let request = Request::post("api.example.com", "/readings", b"{\"t\":23.5}")
///     .with_header("Content-Type", "application/json")
///     .unwrap();
///
/// let mut echoed = [0u8; 128];
/// let mut len = 0;
/// let response = client.request(&request, |body| {
///     len += body.read(&mut echoed[len..]);
/// });
/// ```
#[derive(Debug)]
pub struct Client<'a, C: Connection + Poll> {
    connection: C,
    options: Options<'a>,
}

impl<'a, C: Connection + Poll> Client<'a, C> {
    /// Creates a client with default [`Options`].
    pub fn new(connection: C) -> Self {
        Self::with_options(connection, Options::default())
    }

    /// Creates a client with custom options.
    pub fn with_options(connection: C, options: Options<'a>) -> Self {
        Self {
            connection,
            options,
        }
    }

    /// Sends `request` and reads the response.
    ///
    /// `on_body` is called from inside the read loop whenever body bytes are
    /// in the receive buffer; see [`ResponseParser::parse`].
    ///
    /// # Errors
    ///
    /// * [`Error::RequestTooLarge`] - the request head does not fit
    /// * [`Error::WriteError`] - sending failed
    /// * [`Error::ReadError`] - polling or reading failed
    /// * [`Error::MalformedResponse`] - the parser rejected the response
    /// * [`Error::IncompleteResponse`] - the connection closed or stayed
    ///   silent for `poll_timeout` before the response was complete
    pub fn request<F>(&mut self, request: &Request<'_>, mut on_body: F) -> Result<Response, Error>
    where
        F: FnMut(&mut Body<'_>),
    {
        let mut head: Vec<u8, MAX_REQUEST_HEAD_LEN> = Vec::new();
        request.write_head(self.options.user_agent, &mut head)?;

        debug!("http: {=str} {=str}", request.method.as_str(), request.path);
        write_all(&mut self.connection, &head)?;
        if let Some(body) = request.body {
            write_all(&mut self.connection, body)?;
        }
        self.connection.flush().map_err(|_| Error::WriteError)?;

        let mut parser = parser_for(request.method);
        let mut buffer = [0u8; RECEIVE_BUFFER_SIZE];

        loop {
            let readable = self
                .connection
                .poll_read(self.options.poll_timeout)
                .map_err(|_| Error::ReadError)?;
            if !readable {
                debug!("http: no data within poll timeout");
                return Err(Error::IncompleteResponse);
            }

            let received = match self.connection.read(&mut buffer) {
                Ok(0) => {
                    debug!("http: connection closed before response completed");
                    return Err(Error::IncompleteResponse);
                }
                Ok(n) => n,
                Err(_) => return Err(Error::ReadError),
            };

            if let Some(response) = feed(&mut parser, &buffer[..received], &mut on_body)? {
                return Ok(response);
            }
        }
    }

    /// Sends a `GET` request.
    pub fn get<F>(&mut self, host: &str, path: &str, on_body: F) -> Result<Response, Error>
    where
        F: FnMut(&mut Body<'_>),
    {
        self.request(&Request::get(host, path), on_body)
    }

    /// Sends a `POST` request with `body`.
    pub fn post<F>(
        &mut self,
        host: &str,
        path: &str,
        body: &[u8],
        on_body: F,
    ) -> Result<Response, Error>
    where
        F: FnMut(&mut Body<'_>),
    {
        self.request(&Request::post(host, path, body), on_body)
    }

    /// Returns the underlying connection.
    pub fn into_inner(self) -> C {
        self.connection
    }

    /// Closes the underlying connection.
    pub fn close(self) -> Result<(), Error> {
        self.connection.close().map_err(|_| Error::ConnectionClosed)
    }
}

fn parser_for(method: Method) -> ResponseParser {
    match method {
        Method::Head => ResponseParser::without_body(),
        _ => ResponseParser::new(),
    }
}

/// Feeds one receive buffer to the parser. Returns the response once it is
/// complete.
fn feed<F>(
    parser: &mut ResponseParser,
    received: &[u8],
    on_body: &mut F,
) -> Result<Option<Response>, Error>
where
    F: FnMut(&mut Body<'_>),
{
    match parser.parse(received, on_body) {
        ParseResult::Completed => parser.take_response().map(Some).ok_or(Error::ProtocolError),
        ParseResult::Malformed => Err(parser
            .error()
            .map_or(Error::ProtocolError, Error::MalformedResponse)),
        ParseResult::NotCompleted => Ok(None),
    }
}

fn write_all<W: Write>(writer: &mut W, mut bytes: &[u8]) -> Result<(), Error> {
    while !bytes.is_empty() {
        match writer.write(bytes) {
            Ok(0) | Err(_) => return Err(Error::WriteError),
            Ok(n) => bytes = &bytes[n..],
        }
    }
    Ok(())
}

#[cfg(feature = "async")]
pub use self::asynch::AsyncClient;

#[cfg(feature = "async")]
mod asynch {
    use super::{Options, RECEIVE_BUFFER_SIZE, feed, parser_for};
    use crate::network::application::http::parser::Body;
    use crate::network::application::http::request::{MAX_REQUEST_HEAD_LEN, Request};
    use crate::network::application::http::response::Response;
    use crate::network::error::Error;
    use crate::network::{AsyncClose, AsyncConnection, AsyncRead, AsyncWrite};
    use heapless::Vec;

    /// An async HTTP/1.1 client.
    ///
    /// Same contract as [`Client`](super::Client); readiness is awaited by
    /// the connection's `read`, so the transport is responsible for timeouts.
    #[derive(Debug)]
    pub struct AsyncClient<'a, C: AsyncConnection> {
        connection: C,
        options: Options<'a>,
    }

    impl<'a, C: AsyncConnection> AsyncClient<'a, C> {
        /// Creates a client with default [`Options`].
        pub fn new(connection: C) -> Self {
            Self::with_options(connection, Options::default())
        }

        /// Creates a client with custom options.
        pub fn with_options(connection: C, options: Options<'a>) -> Self {
            Self {
                connection,
                options,
            }
        }

        /// Sends `request` and reads the response.
        pub async fn request<F>(
            &mut self,
            request: &Request<'_>,
            mut on_body: F,
        ) -> Result<Response, Error>
        where
            F: FnMut(&mut Body<'_>),
        {
            let mut head: Vec<u8, MAX_REQUEST_HEAD_LEN> = Vec::new();
            request.write_head(self.options.user_agent, &mut head)?;

            debug!("http: {=str} {=str}", request.method.as_str(), request.path);
            self.write_all(&head).await?;
            if let Some(body) = request.body {
                self.write_all(body).await?;
            }
            self.connection
                .flush()
                .await
                .map_err(|_| Error::WriteError)?;

            let mut parser = parser_for(request.method);
            let mut buffer = [0u8; RECEIVE_BUFFER_SIZE];

            loop {
                let received = match self.connection.read(&mut buffer).await {
                    Ok(0) => return Err(Error::IncompleteResponse),
                    Ok(n) => n,
                    Err(_) => return Err(Error::ReadError),
                };

                if let Some(response) = feed(&mut parser, &buffer[..received], &mut on_body)? {
                    return Ok(response);
                }
            }
        }

        /// Returns the underlying connection.
        pub fn into_inner(self) -> C {
            self.connection
        }

        /// Closes the underlying connection.
        pub async fn close(self) -> Result<(), Error> {
            self.connection
                .close()
                .await
                .map_err(|_| Error::ConnectionClosed)
        }

        async fn write_all(&mut self, mut bytes: &[u8]) -> Result<(), Error> {
            while !bytes.is_empty() {
                match self.connection.write(bytes).await {
                    Ok(0) | Err(_) => return Err(Error::WriteError),
                    Ok(n) => bytes = &bytes[n..],
                }
            }
            Ok(())
        }
    }
}
