//! Incremental HTTP/1.1 response parser.
//!
//! [`ResponseParser`] is fed receive buffers one at a time through
//! [`parse`](ResponseParser::parse). Every call may cross several phases:
//!
//! ```text
//!             status line            blank line (no body)
//!  ResponseLine ───────────► Headers ─────────────────────► Completed
//!       ▲                       │
//!       │                       │ blank line, Content-Length > 0 or chunked
//!       │                       ▼
//!       └──────────────────── Body ── body delivered ─────► Completed
//! ```
//!
//! Any phase may end in `Malformed`, which is terminal for the session.
//!
//! Text lines are collected by a small line extractor that accepts `CRLF` as
//! well as a bare `LF`, and keeps its partial line across calls, so a status
//! line, header or chunk-size line may be split over any number of reads.
//!
//! Body bytes are never copied into the parser. While body bytes are present
//! in the current buffer, `parse` invokes its callback with a [`Body`] handle
//! and the callback pulls bytes directly from the buffer. Chunk-size lines and
//! chunk terminators are consumed by the parser and never reach the callback.

use super::headers::{HeaderError, HeaderTable, MAX_HEADERS};
use super::response::{CONTENT_LENGTH, Response, TRANSFER_ENCODING};
use heapless::{String, Vec};

/// Maximum length of a status, header or chunk-size line, terminator excluded.
pub const MAX_LINE_LEN: usize = 512;

const CR: u8 = b'\r';
const LF: u8 = b'\n';

const LINE_SEPARATOR: char = ' ';
const HEADER_SEPARATOR: char = ':';
const CHUNK_EXTENSION_SEPARATOR: char = ';';

/// Outcome of a [`ResponseParser::parse`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseResult {
    /// The response is complete.
    Completed,
    /// All input was consumed; more bytes are needed.
    NotCompleted,
    /// The input is not a response this parser accepts.
    Malformed,
}

/// The reason a session ended in [`ParseResult::Malformed`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseError {
    /// The status line has too few tokens or an oversized token.
    InvalidStatusLine,
    /// The status code is not a number.
    InvalidStatusCode,
    /// A header line has no `:` or an empty name.
    InvalidHeader,
    /// A framing header (`Content-Length`, `Transfer-Encoding`) exceeds the
    /// header table limits.
    HeaderTooLong,
    /// No room is left in the header table for a framing header.
    TooManyHeaders,
    /// `Content-Length` is not a number.
    InvalidContentLength,
    /// A chunk-size line is not hexadecimal.
    InvalidChunkSize,
    /// Chunk data is not followed by a line terminator.
    MissingChunkTerminator,
    /// Trailer fields follow the last chunk.
    UnsupportedTrailer,
    /// A line exceeds [`MAX_LINE_LEN`].
    LineTooLong,
    /// A text line is not valid UTF-8.
    InvalidUtf8,
}

impl core::fmt::Display for ParseError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            ParseError::InvalidStatusLine => f.write_str("invalid status line"),
            ParseError::InvalidStatusCode => f.write_str("invalid status code"),
            ParseError::InvalidHeader => f.write_str("invalid header line"),
            ParseError::HeaderTooLong => f.write_str("header too long"),
            ParseError::TooManyHeaders => f.write_str("too many headers"),
            ParseError::InvalidContentLength => f.write_str("invalid content length"),
            ParseError::InvalidChunkSize => f.write_str("invalid chunk size"),
            ParseError::MissingChunkTerminator => f.write_str("missing chunk terminator"),
            ParseError::UnsupportedTrailer => f.write_str("trailer fields are not supported"),
            ParseError::LineTooLong => f.write_str("line too long"),
            ParseError::InvalidUtf8 => f.write_str("line is not valid UTF-8"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for ParseError {}

#[cfg(feature = "defmt")]
impl defmt::Format for ParseError {
    fn format(&self, f: defmt::Formatter) {
        match self {
            ParseError::InvalidStatusLine => defmt::write!(f, "InvalidStatusLine"),
            ParseError::InvalidStatusCode => defmt::write!(f, "InvalidStatusCode"),
            ParseError::InvalidHeader => defmt::write!(f, "InvalidHeader"),
            ParseError::HeaderTooLong => defmt::write!(f, "HeaderTooLong"),
            ParseError::TooManyHeaders => defmt::write!(f, "TooManyHeaders"),
            ParseError::InvalidContentLength => defmt::write!(f, "InvalidContentLength"),
            ParseError::InvalidChunkSize => defmt::write!(f, "InvalidChunkSize"),
            ParseError::MissingChunkTerminator => defmt::write!(f, "MissingChunkTerminator"),
            ParseError::UnsupportedTrailer => defmt::write!(f, "UnsupportedTrailer"),
            ParseError::LineTooLong => defmt::write!(f, "LineTooLong"),
            ParseError::InvalidUtf8 => defmt::write!(f, "InvalidUtf8"),
        }
    }
}

impl From<HeaderError> for ParseError {
    fn from(error: HeaderError) -> Self {
        match error {
            HeaderError::EmptyName | HeaderError::NotFound => ParseError::InvalidHeader,
            HeaderError::NameTooLong | HeaderError::ValueTooLong => ParseError::HeaderTooLong,
            HeaderError::TableFull => ParseError::TooManyHeaders,
        }
    }
}

/// Top-level parsing phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the status line.
    ResponseLine,
    /// Reading header lines.
    Headers,
    /// Reading the body.
    Body,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LineState {
    Idle,
    SawCr,
    Done,
}

/// Collects one text line at a time from a fragmented byte stream.
#[derive(Debug)]
struct LineExtractor {
    state: LineState,
    line: Vec<u8, MAX_LINE_LEN>,
    overflow: bool,
}

impl LineExtractor {
    const fn new() -> Self {
        Self {
            state: LineState::Idle,
            line: Vec::new(),
            overflow: false,
        }
    }

    /// Consumes `input[start..end]` until a terminator is seen and returns the
    /// number of bytes consumed. Without a terminator the whole range is
    /// consumed and the partial line is kept for the next call.
    fn extract(&mut self, input: &[u8], start: usize, end: usize) -> usize {
        let mut i = start;

        while i < end && self.state != LineState::Done {
            let byte = input[i];
            match self.state {
                LineState::Idle => match byte {
                    CR => self.state = LineState::SawCr,
                    // some servers terminate lines with a bare LF
                    LF => self.state = LineState::Done,
                    _ => self.push(byte),
                },
                LineState::SawCr => match byte {
                    LF => self.state = LineState::Done,
                    CR => {}
                    _ => {
                        // stray CR inside a line is dropped
                        self.push(byte);
                        self.state = LineState::Idle;
                    }
                },
                LineState::Done => {}
            }
            i += 1;
        }

        i - start
    }

    fn push(&mut self, byte: u8) {
        if self.line.push(byte).is_err() {
            self.overflow = true;
        }
    }

    fn is_done(&self) -> bool {
        self.state == LineState::Done
    }

    fn overflowed(&self) -> bool {
        self.overflow
    }

    fn text(&self) -> Result<&str, ParseError> {
        if self.overflow {
            return Err(ParseError::LineTooLong);
        }
        core::str::from_utf8(&self.line).map_err(|_| ParseError::InvalidUtf8)
    }

    fn reset(&mut self) {
        self.state = LineState::Idle;
        self.line.clear();
        self.overflow = false;
    }
}

/// Position inside a chunked body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChunkPhase {
    /// Expecting a chunk-size line.
    Size,
    /// Delivering chunk data.
    Data,
    /// Expecting the empty line that closes chunk data.
    DataEnd,
    /// After the zero-size chunk, expecting the final empty line.
    Trailer,
}

enum Step {
    Continue,
    Complete,
    Fail(ParseError),
}

/// Pull handle for body bytes in the buffer currently being parsed.
///
/// A `Body` only exists inside the callback passed to
/// [`ResponseParser::parse`]; it borrows the input buffer of that call.
#[derive(Debug)]
pub struct Body<'a> {
    input: &'a [u8],
    pos: &'a mut usize,
    remaining: &'a mut usize,
    response: &'a Response,
}

impl Body<'_> {
    /// The response the body belongs to, status line and headers complete.
    pub fn response(&self) -> &Response {
        self.response
    }

    /// Body bytes that can be read right now without more input.
    pub fn available(&self) -> usize {
        (*self.remaining).min(self.input.len() - *self.pos)
    }

    /// Copies up to `dest.len()` available body bytes into `dest` and returns
    /// how many were copied. Returns 0 when nothing is available.
    pub fn read(&mut self, dest: &mut [u8]) -> usize {
        let count = self.available().min(dest.len());
        let start = *self.pos;
        dest[..count].copy_from_slice(&self.input[start..start + count]);
        *self.pos += count;
        *self.remaining -= count;
        count
    }

    /// Copies up to `max_count` available body bytes into `dest` starting at
    /// `offset`. Returns how many bytes were copied.
    pub fn read_into(&mut self, dest: &mut [u8], offset: usize, max_count: usize) -> usize {
        match dest.get_mut(offset..) {
            Some(tail) => {
                let end = max_count.min(tail.len());
                self.read(&mut tail[..end])
            }
            None => 0,
        }
    }
}

/// Incremental HTTP/1.1 response parser.
///
/// One parser reconstructs one response at a time from buffers of any size.
/// See the [module documentation](self) for the phase machine.
///
/// # Examples
///
/// ```rust
/// use uphttp::network::application::http::{ParseResult, ResponseParser};
///
/// let mut parser = ResponseParser::new();
///
/// assert_eq!(parser.parse(b"HTTP/1.1 204 No Content\r\n", |_| {}), ParseResult::NotCompleted);
/// assert_eq!(parser.parse(b"Server: demo\r\n\r\n", |_| {}), ParseResult::Completed);
///
/// let response = parser.into_response().unwrap();
/// assert_eq!(response.status_code(), 204);
/// assert_eq!(response.headers().get("Server"), Some("demo"));
/// ```
#[derive(Debug)]
pub struct ResponseParser {
    phase: Phase,
    line: LineExtractor,
    response: Response,
    body_remaining: usize,
    is_chunked: bool,
    chunk: ChunkPhase,
    expects_body: bool,
    complete: bool,
    consumed: usize,
    error: Option<ParseError>,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseParser {
    /// Creates a parser waiting for a status line.
    pub fn new() -> Self {
        Self {
            phase: Phase::ResponseLine,
            line: LineExtractor::new(),
            response: Response::default(),
            body_remaining: 0,
            is_chunked: false,
            chunk: ChunkPhase::Size,
            expects_body: true,
            complete: false,
            consumed: 0,
            error: None,
        }
    }

    /// Creates a parser for a response that carries no body regardless of its
    /// framing headers, such as the answer to a `HEAD` request.
    pub fn without_body() -> Self {
        Self {
            expects_body: false,
            ..Self::new()
        }
    }

    /// Parses the next buffer of the response.
    ///
    /// `on_body` is called whenever body bytes are available in `input`; it
    /// pulls them with [`Body::read`]. It is called again as long as it keeps
    /// pulling and bytes remain. If a call pulls nothing, the bytes available
    /// at that moment are skipped so that framing stays intact.
    ///
    /// Parsing stops at the end of the response even if `input` holds more
    /// bytes; [`consumed`](Self::consumed) tells how many were used. A call
    /// after completion starts a new response on the same parser.
    pub fn parse<F>(&mut self, input: &[u8], mut on_body: F) -> ParseResult
    where
        F: FnMut(&mut Body<'_>),
    {
        self.consumed = 0;

        if self.error.is_some() {
            return ParseResult::Malformed;
        }
        if self.complete {
            if input.is_empty() {
                return ParseResult::Completed;
            }
            self.start_next();
        }

        let mut pos = 0;
        while pos < input.len() {
            let step = match self.phase {
                Phase::ResponseLine => self.on_response_line(input, &mut pos),
                Phase::Headers => self.on_header_line(input, &mut pos),
                Phase::Body => self.on_body_bytes(input, &mut pos, &mut on_body),
            };

            match step {
                Step::Continue => {}
                Step::Complete => {
                    self.finish();
                    self.consumed = pos;
                    return ParseResult::Completed;
                }
                Step::Fail(error) => {
                    self.fail(error);
                    self.consumed = pos;
                    return ParseResult::Malformed;
                }
            }
        }

        self.consumed = input.len();
        ParseResult::NotCompleted
    }

    /// The response parsed so far, or `None` after a malformed input.
    pub fn response(&self) -> Option<&Response> {
        match self.error {
            Some(_) => None,
            None => Some(&self.response),
        }
    }

    /// Consumes the parser and returns the response, or `None` after a
    /// malformed input.
    pub fn into_response(self) -> Option<Response> {
        match self.error {
            Some(_) => None,
            None => Some(self.response),
        }
    }

    /// Takes a completed response out of the parser, leaving it ready for the
    /// next one. Returns `None` if no response is complete.
    pub fn take_response(&mut self) -> Option<Response> {
        if !self.complete {
            return None;
        }
        let response = core::mem::take(&mut self.response);
        self.complete = false;
        Some(response)
    }

    /// Returns `true` once a full response has been parsed.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// Why the session became malformed.
    pub fn error(&self) -> Option<ParseError> {
        self.error
    }

    /// Current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Bytes of the last `parse` input that belong to the response.
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Discards all state, including a malformed result, and waits for a new
    /// status line.
    pub fn reset(&mut self) {
        let expects_body = self.expects_body;
        *self = Self::new();
        self.expects_body = expects_body;
    }

    fn on_response_line(&mut self, input: &[u8], pos: &mut usize) -> Step {
        *pos += self.line.extract(input, *pos, input.len());
        if !self.line.is_done() {
            return self.check_line_overflow();
        }

        let result = self
            .line
            .text()
            .and_then(|line| parse_status_line(line, &mut self.response));
        if let Err(error) = result {
            return Step::Fail(error);
        }

        trace!("http: status {=u16}, reading headers", self.response.status_code);
        self.phase = Phase::Headers;
        self.line.reset();
        Step::Continue
    }

    fn on_header_line(&mut self, input: &[u8], pos: &mut usize) -> Step {
        *pos += self.line.extract(input, *pos, input.len());
        if !self.line.is_done() {
            return self.check_line_overflow();
        }

        let line = match self.line.text() {
            Ok(line) => line,
            Err(error) => return Step::Fail(error),
        };

        if line.is_empty() {
            self.line.reset();
            return self.on_headers_end();
        }

        let result = parse_header_line(line, &mut self.response.headers);
        self.line.reset();
        match result {
            Ok(()) => Step::Continue,
            Err(error) => Step::Fail(error),
        }
    }

    fn on_headers_end(&mut self) -> Step {
        let content_length = match declared_content_length(&self.response.headers) {
            Ok(length) => length,
            Err(error) => return Step::Fail(error),
        };

        if !self.expects_body {
            trace!("http: headers done, body not expected");
            return Step::Complete;
        }

        if self.response.is_chunked() {
            debug!("http: chunked body");
            self.is_chunked = true;
            self.chunk = ChunkPhase::Size;
            self.body_remaining = 0;
            self.phase = Phase::Body;
            return Step::Continue;
        }

        match content_length {
            Some(length) if length > 0 => {
                debug!("http: fixed-length body of {=usize} bytes", length);
                self.is_chunked = false;
                self.body_remaining = length;
                self.phase = Phase::Body;
                Step::Continue
            }
            _ => {
                trace!("http: headers done, no body");
                Step::Complete
            }
        }
    }

    fn on_body_bytes<F>(&mut self, input: &[u8], pos: &mut usize, on_body: &mut F) -> Step
    where
        F: FnMut(&mut Body<'_>),
    {
        if !self.is_chunked {
            self.deliver(input, pos, on_body);
            return if self.body_remaining == 0 {
                Step::Complete
            } else {
                Step::Continue
            };
        }

        match self.chunk {
            ChunkPhase::Data => {
                self.deliver(input, pos, on_body);
                if self.body_remaining == 0 {
                    self.chunk = ChunkPhase::DataEnd;
                }
                Step::Continue
            }
            ChunkPhase::Size | ChunkPhase::DataEnd | ChunkPhase::Trailer => {
                *pos += self.line.extract(input, *pos, input.len());
                if !self.line.is_done() {
                    return self.check_line_overflow();
                }
                let line = self.line.text().map(|text| match text {
                    "" => None,
                    text => Some(parse_chunk_size(text)),
                });
                self.line.reset();
                match line {
                    Ok(line) => self.on_chunk_line(line),
                    Err(error) => Step::Fail(error),
                }
            }
        }
    }

    /// `line` is `None` for an empty line, otherwise the line parsed as a
    /// chunk size.
    fn on_chunk_line(&mut self, line: Option<Result<usize, ParseError>>) -> Step {
        match (self.chunk, line) {
            // an empty line where a size is expected ends the body as well
            (ChunkPhase::Size, None) | (ChunkPhase::Trailer, None) => Step::Complete,
            (ChunkPhase::Size, Some(Ok(0))) => {
                trace!("http: last chunk");
                self.chunk = ChunkPhase::Trailer;
                Step::Continue
            }
            (ChunkPhase::Size, Some(Ok(size))) => {
                trace!("http: chunk of {=usize} bytes", size);
                self.body_remaining = size;
                self.chunk = ChunkPhase::Data;
                Step::Continue
            }
            (ChunkPhase::Size, Some(Err(error))) => Step::Fail(error),
            (ChunkPhase::DataEnd, None) => {
                self.chunk = ChunkPhase::Size;
                Step::Continue
            }
            (ChunkPhase::DataEnd, Some(_)) => Step::Fail(ParseError::MissingChunkTerminator),
            (ChunkPhase::Trailer, Some(_)) => Step::Fail(ParseError::UnsupportedTrailer),
            (ChunkPhase::Data, _) => Step::Continue,
        }
    }

    /// Hands the body bytes available in `input` to `on_body`.
    fn deliver<F>(&mut self, input: &[u8], pos: &mut usize, on_body: &mut F)
    where
        F: FnMut(&mut Body<'_>),
    {
        loop {
            let window = self.body_remaining.min(input.len() - *pos);
            if window == 0 {
                return;
            }

            let before = *pos;
            let mut body = Body {
                input,
                pos: &mut *pos,
                remaining: &mut self.body_remaining,
                response: &self.response,
            };
            on_body(&mut body);

            if *pos == before {
                trace!("http: {=usize} body bytes not pulled, skipping", window);
                *pos += window;
                self.body_remaining -= window;
                return;
            }
        }
    }

    fn check_line_overflow(&self) -> Step {
        if self.line.overflowed() {
            Step::Fail(ParseError::LineTooLong)
        } else {
            Step::Continue
        }
    }

    fn finish(&mut self) {
        self.phase = Phase::ResponseLine;
        self.line.reset();
        self.body_remaining = 0;
        self.is_chunked = false;
        self.chunk = ChunkPhase::Size;
        self.complete = true;
    }

    fn fail(&mut self, error: ParseError) {
        warn!("http: malformed response: {}", error);
        self.error = Some(error);
        self.response = Response::default();
        self.line.reset();
    }

    fn start_next(&mut self) {
        self.response = Response::default();
        self.complete = false;
    }
}

/// Splits `protocol SP status-code SP reason-phrase`. The reason phrase words
/// are concatenated without separators.
fn parse_status_line(line: &str, response: &mut Response) -> Result<(), ParseError> {
    let mut tokens = line.split(LINE_SEPARATOR);

    let protocol = tokens
        .next()
        .filter(|t| !t.is_empty())
        .ok_or(ParseError::InvalidStatusLine)?;
    let code = tokens.next().ok_or(ParseError::InvalidStatusLine)?;
    let status_code = code
        .parse::<u16>()
        .map_err(|_| ParseError::InvalidStatusCode)?;

    let mut reason_phrase = String::new();
    for token in tokens {
        reason_phrase
            .push_str(token)
            .map_err(|_| ParseError::InvalidStatusLine)?;
    }

    response.protocol = String::try_from(protocol).map_err(|_| ParseError::InvalidStatusLine)?;
    response.status_code = status_code;
    response.reason_phrase = reason_phrase;
    Ok(())
}

/// Stores one header line. Headers that do not fit the table are dropped,
/// except the framing headers: slots are kept free for them, and a framing
/// header that still does not fit fails the response.
fn parse_header_line(line: &str, headers: &mut HeaderTable) -> Result<(), ParseError> {
    let (name, value) = line
        .split_once(HEADER_SEPARATOR)
        .ok_or(ParseError::InvalidHeader)?;
    let (name, value) = (name.trim(), value.trim());
    if name.is_empty() {
        return Err(ParseError::InvalidHeader);
    }

    let framing = is_framing_header(name);
    let table_full = headers.len() + reserved_slots(headers) >= MAX_HEADERS;
    if !framing && table_full && !headers.contains(name) {
        warn!("http: header table full, dropping {=str}", name);
        return Ok(());
    }

    match headers.insert(name, value) {
        Ok(()) => Ok(()),
        Err(error) if framing => Err(error.into()),
        Err(HeaderError::EmptyName) => Err(ParseError::InvalidHeader),
        Err(_) => {
            warn!("http: header does not fit, dropping {=str}", name);
            Ok(())
        }
    }
}

fn is_framing_header(name: &str) -> bool {
    name.eq_ignore_ascii_case(CONTENT_LENGTH) || name.eq_ignore_ascii_case(TRANSFER_ENCODING)
}

/// Framing headers not seen yet; each keeps one table slot free.
fn reserved_slots(headers: &HeaderTable) -> usize {
    [CONTENT_LENGTH, TRANSFER_ENCODING]
        .iter()
        .filter(|name| headers.get_ignore_ascii_case(name).is_none())
        .count()
}

/// `Content-Length`, if present. Repeated identical values (merged as
/// `n,n`) are accepted.
fn declared_content_length(headers: &HeaderTable) -> Result<Option<usize>, ParseError> {
    let value = match headers.get_ignore_ascii_case(CONTENT_LENGTH) {
        Some(value) => value,
        None => return Ok(None),
    };

    let mut length = None;
    for part in value.split(',') {
        let part = part.trim();
        if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::InvalidContentLength);
        }
        let parsed = part
            .parse::<usize>()
            .map_err(|_| ParseError::InvalidContentLength)?;
        match length {
            Some(previous) if previous != parsed => return Err(ParseError::InvalidContentLength),
            _ => length = Some(parsed),
        }
    }
    Ok(length)
}

/// Hex chunk size with any `;` extensions stripped.
fn parse_chunk_size(line: &str) -> Result<usize, ParseError> {
    let size = match line.split_once(CHUNK_EXTENSION_SEPARATOR) {
        Some((size, _extensions)) => size,
        None => line,
    }
    .trim();

    if size.is_empty() || !size.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(ParseError::InvalidChunkSize);
    }
    usize::from_str_radix(size, 16).map_err(|_| ParseError::InvalidChunkSize)
}
