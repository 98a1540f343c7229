//! Minimal HTTP-shaped request decoding and response writing.
//!
//! The control endpoint speaks just enough HTTP for one request per
//! connection: a request line, headers up to a blank line, and an optional
//! `Content-Length`-bounded body. It is not a conformant HTTP/1.1
//! implementation (no keep-alive, no chunked encoding), and a malformed
//! request line degrades to best-effort output instead of failing the
//! connection, so the caller can still answer with a 404.

use log::debug;

use crate::errors::Error;
use crate::runtime::AsyncTcpStream;

type Result<T> = std::result::Result<T, Error>;

/// Stored route capacity in bytes; anything longer is truncated silently.
pub const ROUTE_CAPACITY: usize = 20;

const HEADER_BUFFER_SIZE: usize = 512;
const BODY_BUFFER_SIZE: usize = 1024;
const BODY_RX_CHUNK_SIZE: usize = 256;

/// The path component of a request line, bounded by [`ROUTE_CAPACITY`].
pub type Route = heapless::String<ROUTE_CAPACITY>;

/// HTTP method of a parsed request line.
///
/// Anything other than `GET` or `POST` maps to [`HttpMethod::Unknown`],
/// which no route matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
    Unknown,
}

impl HttpMethod {
    fn parse(token: &str) -> Self {
        match token {
            "GET" => HttpMethod::Get,
            "POST" => HttpMethod::Post,
            _ => HttpMethod::Unknown,
        }
    }
}

/// One decoded client request.
#[derive(Debug, Clone)]
pub struct ParsedRequest {
    pub method: HttpMethod,
    pub route: Route,
    pub body: Vec<u8>,
}

impl ParsedRequest {
    /// Check whether this request addresses the given route with the given
    /// method.
    pub fn matches(&self, method: HttpMethod, route: &str) -> bool {
        self.method == method && self.route.as_str() == route
    }
}

/// Decode one request from the connection.
///
/// Reads until the blank line that ends the headers, then pulls in the body
/// if a `Content-Length` header announced one. A client that disconnects
/// mid-request yields whatever was decodable up to that point.
pub async fn read_request<S: AsyncTcpStream>(stream: &mut S) -> Result<ParsedRequest> {
    let mut buf = [0u8; HEADER_BUFFER_SIZE];
    let (header_end, header_len) = read_heading(&mut buf, stream).await?;

    let (method, route, content_length) = match core::str::from_utf8(&buf[..header_end]) {
        Ok(header_str) => {
            let (method, route) = parse_request_line(header_str);
            (method, route, find_content_length(header_str))
        }
        Err(_) => {
            debug!("http: request head is not valid utf-8");
            (HttpMethod::Unknown, Route::new(), None)
        }
    };

    let leftover = &buf[header_end..header_len];
    let body = read_body(stream, leftover, content_length).await?;

    Ok(ParsedRequest {
        method,
        route,
        body,
    })
}

/// Read the request line and headers from the connection.
///
/// Returns the offset just past the blank line and the total number of
/// bytes buffered (which may include the start of the body). Both are 0
/// for a connection that closed without sending anything.
async fn read_heading<S: AsyncTcpStream>(
    buf: &mut [u8],
    stream: &mut S,
) -> Result<(usize, usize)> {
    let mut header_len = 0;
    let mut header_end = None;
    loop {
        let n = stream
            .read(&mut buf[header_len..])
            .await
            .map_err(|e| Error::socket("read", e))?;
        if n == 0 {
            break;
        }
        header_len += n;
        // Check for end of headers
        if let Some(pos) = buf[..header_len].windows(4).position(|w| w == b"\r\n\r\n") {
            header_end = Some(pos + 4);
            break;
        }
        if header_len >= buf.len() {
            break;
        }
    }

    let header_end = header_end.unwrap_or(header_len);

    Ok((header_end, header_len))
}

/// Split the request line into method and route, best-effort.
///
/// A missing route token leaves the route empty and an unrecognized method
/// token becomes [`HttpMethod::Unknown`]; neither is an error. A route
/// longer than [`ROUTE_CAPACITY`] is truncated without complaint.
fn parse_request_line(header_str: &str) -> (HttpMethod, Route) {
    let line_end = header_str.find("\r\n").unwrap_or(header_str.len());
    let first_line = &header_str[..line_end];
    let mut parts = first_line.split_whitespace();

    let method = parts.next().map_or(HttpMethod::Unknown, HttpMethod::parse);

    let mut route = Route::new();
    if let Some(raw_route) = parts.next() {
        for c in raw_route.chars() {
            if route.push(c).is_err() {
                debug!("http: route truncated to {} bytes", ROUTE_CAPACITY);
                break;
            }
        }
    }

    (method, route)
}

/// Find the content length in the header string.
///
/// Returns the content length if found, otherwise None.
fn find_content_length(header: &str) -> Option<usize> {
    const TARGET: &str = "content-length:";
    for line in header.lines() {
        let lower = line.to_ascii_lowercase();
        if lower.starts_with(TARGET) {
            return line[TARGET.len()..].trim().parse::<usize>().ok();
        }
    }
    None
}

/// Read the request body.
///
/// Without a `Content-Length` header only the bytes already buffered behind
/// the headers count as body. The body is capped at an internal limit; a
/// short read (client gone) returns what arrived.
async fn read_body<S: AsyncTcpStream>(
    stream: &mut S,
    leftover: &[u8],
    content_length: Option<usize>,
) -> Result<Vec<u8>> {
    let mut body = leftover.to_vec();

    match content_length {
        Some(announced) => {
            let wanted = announced.min(BODY_BUFFER_SIZE);
            while body.len() < wanted {
                let mut chunk = [0u8; BODY_RX_CHUNK_SIZE];
                let n = stream
                    .read(&mut chunk)
                    .await
                    .map_err(|e| Error::socket("read", e))?;
                if n == 0 {
                    break;
                }
                body.extend_from_slice(&chunk[..n]);
            }
            body.truncate(wanted);
        }
        None => body.truncate(BODY_BUFFER_SIZE),
    }

    Ok(body)
}

/// Response status for the control endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok,
    BadRequest,
    NotFound,
}

impl StatusCode {
    fn code(self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
        }
    }

    fn reason(self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
        }
    }
}

/// A response to one request.
///
/// The wire format is fixed: status line, `Connection: close`, a blank
/// line, then the body if there is one. There is no `Content-Length` or
/// `Content-Type`: existing clients of this device parse exactly this
/// shape, and the connection close delimits the body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: StatusCode,
    body: Option<Vec<u8>>,
}

impl Response {
    /// A 200 response with no body.
    pub fn ok() -> Self {
        Response {
            status: StatusCode::Ok,
            body: None,
        }
    }

    /// A 404 response with no body.
    pub fn not_found() -> Self {
        Response {
            status: StatusCode::NotFound,
            body: None,
        }
    }

    /// A 400 response with no body.
    pub fn bad_request() -> Self {
        Response {
            status: StatusCode::BadRequest,
            body: None,
        }
    }

    /// Attach a JSON body serialized from `data`.
    pub fn with_json<T: serde::Serialize>(mut self, data: &T) -> Result<Self> {
        self.body = Some(serde_json::to_vec(data).map_err(Error::JsonDump)?);
        Ok(self)
    }

    /// Get the response status.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Get the response body, if one was attached.
    pub fn body(&self) -> Option<&[u8]> {
        self.body.as_deref()
    }

    /// Write the response to the connection.
    pub async fn write_to<S: AsyncTcpStream>(&self, stream: &mut S) -> Result<()> {
        let head = format!(
            "HTTP/1.1 {} {}\r\nConnection: close\r\n\r\n",
            self.status.code(),
            self.status.reason(),
        );
        stream
            .write_all(head.as_bytes())
            .await
            .map_err(|e| Error::socket("write", e))?;
        if let Some(body) = &self.body {
            stream
                .write_all(body)
                .await
                .map_err(|e| Error::socket("write", e))?;
        }
        Ok(())
    }
}


#[cfg(test)]
mod tests {
    use super::testing::MockStream;
    use super::*;
    use futures::executor::block_on;

    fn request(raw: &[u8]) -> ParsedRequest {
        block_on(read_request(&mut MockStream::new(raw))).unwrap()
    }

    #[test]
    fn parses_post_command_with_body() {
        let raw = b"POST /command HTTP/1.1\r\nHost: strip\r\nContent-Length: 4\r\n\r\nabcd";
        let req = request(raw);
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.route.as_str(), "/command");
        assert_eq!(req.body, b"abcd");
        assert!(req.matches(HttpMethod::Post, "/command"));
    }

    #[test]
    fn reassembles_fragmented_request() {
        let raw = b"POST /command HTTP/1.1\r\nContent-Length: 11\r\n\r\nhello world";
        let mut stream = MockStream::chunked(raw, 7);
        let req = block_on(read_request(&mut stream)).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.body, b"hello world");
    }

    #[test]
    fn parses_get_without_body() {
        let req = request(b"GET /status HTTP/1.1\r\n\r\n");
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.route.as_str(), "/status");
        assert!(req.body.is_empty());
    }

    #[test]
    fn unrecognized_method_token_degrades() {
        let req = request(b"BREW /teapot HTTP/1.1\r\n\r\n");
        assert_eq!(req.method, HttpMethod::Unknown);
        assert_eq!(req.route.as_str(), "/teapot");
    }

    #[test]
    fn request_line_without_space_degrades() {
        let req = request(b"GARBAGE\r\n\r\n");
        assert_eq!(req.method, HttpMethod::Unknown);
        assert!(req.route.is_empty());
    }

    #[test]
    fn empty_connection_degrades() {
        let req = request(b"");
        assert_eq!(req.method, HttpMethod::Unknown);
        assert!(req.route.is_empty());
        assert!(req.body.is_empty());
    }

    #[test]
    fn oversized_route_is_truncated() {
        let req = request(b"POST /a-route-far-longer-than-the-buffer-holds HTTP/1.1\r\n\r\n");
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.route.len(), ROUTE_CAPACITY);
        assert_eq!(req.route.as_str(), "/a-route-far-longer-");
    }

    #[test]
    fn content_length_is_case_insensitive() {
        let req = request(b"POST /command HTTP/1.1\r\ncontent-length: 2\r\n\r\nok");
        assert_eq!(req.body, b"ok");
    }

    #[test]
    fn short_body_returns_what_arrived() {
        let req = request(b"POST /command HTTP/1.1\r\nContent-Length: 64\r\n\r\npartial");
        assert_eq!(req.body, b"partial");
    }

    #[test]
    fn missing_content_length_keeps_only_buffered_tail() {
        let req = request(b"POST /command HTTP/1.1\r\n\r\ntrailing");
        assert_eq!(req.body, b"trailing");
    }

    #[test]
    fn ok_response_wire_format_is_exact() {
        let mut stream = MockStream::new(b"");
        block_on(Response::ok().write_to(&mut stream)).unwrap();
        assert_eq!(stream.written, b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n");
    }

    #[test]
    fn not_found_response_has_no_body() {
        let mut stream = MockStream::new(b"");
        block_on(Response::not_found().write_to(&mut stream)).unwrap();
        assert_eq!(
            stream.written,
            b"HTTP/1.1 404 Not Found\r\nConnection: close\r\n\r\n"
        );
    }

    #[test]
    fn json_body_follows_blank_line() {
        let mut stream = MockStream::new(b"");
        let response = Response::ok()
            .with_json(&serde_json::json!({"power": true}))
            .unwrap();
        block_on(response.write_to(&mut stream)).unwrap();
        let text = String::from_utf8(stream.written).unwrap();
        assert_eq!(
            text,
            "HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n{\"power\":true}"
        );
    }
}
