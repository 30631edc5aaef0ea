mod mock;

use mock::{AtEnd, BrokenConnection, MockConnection};
use rand::{Rng, SeedableRng, rngs::StdRng};
use uphttp::network::application::http::{
    Client, Method, Options, ParseError, Request, StatusCode,
};
use uphttp::network::error::Error;

const JSON_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
Content-Type: application/json\r\n\
Content-Length: 27\r\n\
Connection: close\r\n\
\r\n\
{\"temperature\":23.5,\"ok\":1}";

const CHUNKED_RESPONSE: &[u8] = b"HTTP/1.1 200 OK\r\n\
Transfer-Encoding: chunked\r\n\
\r\n\
4\r\nWiki\r\n\
6\r\npedia \r\n\
E\r\nin \r\n\r\nchunks.\r\n\
0\r\n\
\r\n";

fn collect<C>(client: &mut Client<'_, C>, request: &Request<'_>) -> (Result<StatusCode, Error>, Vec<u8>)
where
    C: uphttp::network::Connection + uphttp::network::Poll,
{
    let mut body = Vec::new();
    let result = client.request(request, |chunk| {
        let mut scratch = [0u8; 16];
        let n = chunk.read(&mut scratch);
        body.extend_from_slice(&scratch[..n]);
    });
    let status = result.map(|response| response.status().unwrap());
    (status, body)
}

#[test]
fn test_get_with_content_length() {
    let connection = MockConnection::fragmented(JSON_RESPONSE, 5, AtEnd::Silence);
    let mut client = Client::new(connection);

    let mut body = Vec::new();
    let response = client
        .get("sensor.local", "/api/data", |chunk| {
            let mut scratch = [0u8; 8];
            let n = chunk.read(&mut scratch);
            body.extend_from_slice(&scratch[..n]);
        })
        .unwrap();

    assert_eq!(response.status(), Some(StatusCode::Ok));
    assert_eq!(response.content_type(), Some("application/json"));
    assert_eq!(response.headers().get("Connection"), Some("close"));
    assert_eq!(body, br#"{"temperature":23.5,"ok":1}"#);

    let connection = client.into_inner();
    assert!(connection.flushed);
    assert_eq!(
        connection.written_str(),
        "GET /api/data HTTP/1.1\r\nHost: sensor.local\r\nUser-Agent: uphttp\r\n\r\n"
    );
}

#[test]
fn test_post_writes_body() {
    let connection = MockConnection::new(&[b"HTTP/1.1 201 Created\r\n\r\n"], AtEnd::Close);
    let mut client = Client::new(connection);

    let response = client
        .post("example.com", "/readings", b"{\"t\":23.5}", |_| {})
        .unwrap();
    assert_eq!(response.status(), Some(StatusCode::Created));
    assert_eq!(response.reason_phrase(), "Created");

    let connection = client.into_inner();
    assert_eq!(
        connection.written_str(),
        "POST /readings HTTP/1.1\r\nHost: example.com\r\nUser-Agent: uphttp\r\n\
Content-Length: 10\r\n\r\n{\"t\":23.5}"
    );
}

#[test]
fn test_chunked_body_in_tiny_fragments() {
    for size in 1..=CHUNKED_RESPONSE.len() {
        let connection = MockConnection::fragmented(CHUNKED_RESPONSE, size, AtEnd::Silence);
        let mut client = Client::new(connection);

        let (status, body) = collect(&mut client, &Request::get("en.wikipedia.org", "/"));
        assert_eq!(status, Ok(StatusCode::Ok));
        assert_eq!(body, b"Wikipedia in \r\n\r\nchunks.");
    }
}

#[test]
fn test_random_fragment_sizes() {
    let mut rng = StdRng::seed_from_u64(42);

    for _ in 0..100 {
        let mut fragments = Vec::new();
        let mut rest = CHUNKED_RESPONSE;
        while !rest.is_empty() {
            let (fragment, tail) = rest.split_at(rng.gen_range(1..=rest.len()));
            fragments.push(fragment);
            rest = tail;
        }

        let mut client = Client::new(MockConnection::new(&fragments, AtEnd::Close));
        let (status, body) = collect(&mut client, &Request::get("example.com", "/"));
        assert_eq!(status, Ok(StatusCode::Ok));
        assert_eq!(body, b"Wikipedia in \r\n\r\nchunks.");
    }
}

#[test]
fn test_head_ignores_content_length() {
    let connection = MockConnection::new(
        &[b"HTTP/1.1 200 OK\r\nContent-Length: 4096\r\n\r\n"],
        AtEnd::Silence,
    );
    let mut client = Client::new(connection);

    let request = Request::new(Method::Head, "example.com", "/firmware.bin");
    let response = client
        .request(&request, |_| panic!("HEAD responses have no body"))
        .unwrap();
    assert_eq!(response.content_length(), 4096);
}

#[test]
fn test_connection_closed_early() {
    let truncated = &JSON_RESPONSE[..JSON_RESPONSE.len() - 3];
    let mut client = Client::new(MockConnection::fragmented(truncated, 64, AtEnd::Close));

    let (status, _) = collect(&mut client, &Request::get("example.com", "/"));
    assert_eq!(status, Err(Error::IncompleteResponse));
}

#[test]
fn test_poll_timeout() {
    let mut client = Client::new(MockConnection::new(
        &[b"HTTP/1.1 200 OK\r\nContent-Le"],
        AtEnd::Silence,
    ));

    let (status, _) = collect(&mut client, &Request::get("example.com", "/"));
    assert_eq!(status, Err(Error::IncompleteResponse));
    assert_eq!(client.into_inner().polls, 2);
}

#[test]
fn test_malformed_response() {
    let mut client = Client::new(MockConnection::new(
        &[b"HTTP/1.1 OK\r\n\r\n"],
        AtEnd::Close,
    ));

    let (status, _) = collect(&mut client, &Request::get("example.com", "/"));
    assert_eq!(
        status,
        Err(Error::MalformedResponse(ParseError::InvalidStatusCode))
    );
}

#[test]
fn test_bad_chunk_size() {
    let mut client = Client::new(MockConnection::new(
        &[b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\nnope\r\n"],
        AtEnd::Close,
    ));

    let (status, _) = collect(&mut client, &Request::get("example.com", "/"));
    assert_eq!(
        status,
        Err(Error::MalformedResponse(ParseError::InvalidChunkSize))
    );
}

#[test]
fn test_read_error() {
    let mut client = Client::new(BrokenConnection);
    let result = client.get("example.com", "/", |_| {});
    assert_eq!(result.unwrap_err(), Error::ReadError);
}

#[test]
fn test_request_too_large() {
    let path = "/x".repeat(600);
    let mut client = Client::new(MockConnection::new(&[], AtEnd::Close));

    let result = client.get("example.com", &path, |_| {});
    assert_eq!(result.unwrap_err(), Error::RequestTooLarge);
    assert!(client.into_inner().written.is_empty());
}

#[test]
fn test_custom_user_agent() {
    let options = Options {
        user_agent: "thermostat/2.1",
        ..Options::default()
    };
    let connection = MockConnection::new(&[b"HTTP/1.1 204 No Content\r\n\r\n"], AtEnd::Close);
    let mut client = Client::with_options(connection, options);

    let response = client.get("example.com", "/ping", |_| {}).unwrap();
    assert_eq!(response.status(), Some(StatusCode::NoContent));
    assert!(
        client
            .into_inner()
            .written_str()
            .contains("\r\nUser-Agent: thermostat/2.1\r\n")
    );
}

#[test]
fn test_two_requests_on_one_connection() {
    let connection = MockConnection::new(
        &[
            b"HTTP/1.1 200 OK\r\nContent-Length: 3\r\n\r\none",
            b"HTTP/1.1 404 Not Found\r\nContent-Length: 0\r\n\r\n",
        ],
        AtEnd::Close,
    );
    let mut client = Client::new(connection);

    let (first, body) = collect(&mut client, &Request::get("example.com", "/a"));
    assert_eq!(first, Ok(StatusCode::Ok));
    assert_eq!(body, b"one");

    let (second, body) = collect(&mut client, &Request::get("example.com", "/b"));
    assert_eq!(second, Ok(StatusCode::NotFound));
    assert!(body.is_empty());
    assert!(client.close().is_ok());
}

#[test]
fn test_response_with_many_headers() {
    let mut raw = b"HTTP/1.1 200 OK\r\n".to_vec();
    for i in 0..20 {
        raw.extend_from_slice(format!("X-Cache-Hop-{}: HIT\r\n", i).as_bytes());
    }
    raw.extend_from_slice(format!("Set-Cookie: session={}\r\n", "s".repeat(300)).as_bytes());
    raw.extend_from_slice(b"Content-Length: 5\r\n\r\nhello");

    let mut client = Client::new(MockConnection::fragmented(&raw, 50, AtEnd::Silence));
    let (status, body) = collect(&mut client, &Request::get("cdn.example", "/"));

    assert_eq!(status, Ok(StatusCode::Ok));
    assert_eq!(body, b"hello");
}

#[cfg(feature = "async")]
#[test]
fn test_async_client() {
    use mock::asynch::AsyncMockConnection;
    use uphttp::network::application::http::client::AsyncClient;

    let connection = AsyncMockConnection::fragmented(CHUNKED_RESPONSE, 7);
    let mut client = AsyncClient::new(connection);

    let mut body = Vec::new();
    let response = futures::executor::block_on(client.request(
        &Request::get("example.com", "/wiki"),
        |chunk| {
            let mut scratch = [0u8; 4];
            let n = chunk.read(&mut scratch);
            body.extend_from_slice(&scratch[..n]);
        },
    ))
    .unwrap();

    assert!(response.is_chunked());
    assert_eq!(body, b"Wikipedia in \r\n\r\nchunks.");
    assert!(
        client
            .into_inner()
            .written
            .starts_with(b"GET /wiki HTTP/1.1\r\n")
    );
}
