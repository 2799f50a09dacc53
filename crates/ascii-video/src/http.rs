//! Minimal HTTP/1.1 request parsing and response writing.
//!
//! Only what the server needs: a request line, headers, a query string.
//! Request bodies are never read and every connection is closed after one
//! response.

use std::collections::HashMap;

use tokio::io::{AsyncRead, AsyncReadExt};

use ascii_video_core::{Error, Result};

/// Largest request head accepted (request line plus headers).
pub const MAX_HEAD_BYTES: usize = 8 * 1024;

/// A parsed request head.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    /// Request method, as sent
    pub method: String,
    /// Decoded path without the query string
    pub path: String,
    /// Decoded query parameters; the first occurrence of a key wins
    pub query: HashMap<String, String>,
    /// Header names lowercased
    pub headers: HashMap<String, String>,
}

impl Request {
    /// Header value by case-insensitive name.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    /// Query parameter by name.
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// The client's `User-Agent`, if sent.
    pub fn user_agent(&self) -> Option<&str> {
        self.header("user-agent")
    }
}

/// Decode `%XX` escapes and `+` as space. Malformed escapes are kept literally.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b'%' => {
                let hex = bytes
                    .get(i + 1..i + 3)
                    .filter(|h| h.iter().all(u8::is_ascii_hexdigit))
                    .and_then(|h| std::str::from_utf8(h).ok())
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }

    String::from_utf8_lossy(&out).into_owned()
}

/// Split a query string into decoded key/value pairs.
pub fn parse_query(query: &str) -> HashMap<String, String> {
    let mut params = HashMap::new();
    for pair in query.split('&').filter(|p| !p.is_empty()) {
        let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
        params
            .entry(percent_decode(key))
            .or_insert_with(|| percent_decode(value));
    }
    params
}

/// Parse a complete request head (everything before the blank line).
pub fn parse_request(head: &[u8]) -> Result<Request> {
    let text = std::str::from_utf8(head)
        .map_err(|_| Error::BadRequest("request head is not UTF-8".to_string()))?;
    let mut lines = text.split("\r\n").flat_map(|l| l.split('\n'));

    let request_line = lines
        .next()
        .filter(|l| !l.is_empty())
        .ok_or_else(|| Error::BadRequest("empty request".to_string()))?;
    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version)) = (parts.next(), parts.next(), parts.next())
    else {
        return Err(Error::BadRequest(format!(
            "malformed request line '{request_line}'"
        )));
    };
    if !version.starts_with("HTTP/") || parts.next().is_some() {
        return Err(Error::BadRequest(format!(
            "malformed request line '{request_line}'"
        )));
    }

    let (raw_path, raw_query) = target.split_once('?').unwrap_or((target, ""));
    if !raw_path.starts_with('/') {
        return Err(Error::BadRequest(format!("unsupported target '{target}'")));
    }

    let mut headers = HashMap::new();
    for line in lines.take_while(|l| !l.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| Error::BadRequest(format!("malformed header '{line}'")))?;
        headers.insert(name.trim().to_ascii_lowercase(), value.trim().to_string());
    }

    Ok(Request {
        method: method.to_string(),
        path: percent_decode_path(raw_path),
        query: parse_query(raw_query),
        headers,
    })
}

/// Paths keep `+` literally; only `%XX` is decoded.
fn percent_decode_path(path: &str) -> String {
    percent_decode(&path.replace('+', "%2B"))
}

/// Position just past the blank line ending the head, if present.
fn head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
        .map(|p| p + 4)
        .or_else(|| buf.windows(2).position(|w| w == b"\n\n").map(|p| p + 2))
}

/// Read and parse one request head.
///
/// Fails with `BadRequest` when the head exceeds [`MAX_HEAD_BYTES`] or is
/// malformed, and with `Io` when the connection drops first.
pub async fn read_request<R: AsyncRead + Unpin>(reader: &mut R) -> Result<Request> {
    let mut buf: Vec<u8> = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];

    loop {
        if let Some(end) = head_end(&buf) {
            return parse_request(&buf[..end]);
        }
        if buf.len() > MAX_HEAD_BYTES {
            return Err(Error::BadRequest(format!(
                "request head larger than {MAX_HEAD_BYTES} bytes"
            )));
        }

        let n = reader.read(&mut chunk).await?;
        if n == 0 {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "connection closed before request head",
            )));
        }
        buf.extend_from_slice(&chunk[..n]);
    }
}

/// A complete, non-streaming response.
#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    /// Status code
    pub status: u16,
    /// Extra headers, written after the standard ones
    pub headers: Vec<(String, String)>,
    /// Body bytes
    pub body: Vec<u8>,
}

impl Response {
    /// Response with a body and content type.
    pub fn new(status: u16, content_type: &str, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: vec![("Content-Type".to_string(), content_type.to_string())],
            body: body.into(),
        }
    }

    /// Plain-text response.
    pub fn text(status: u16, body: impl Into<String>) -> Self {
        Self::new(status, "text/plain; charset=utf-8", body.into())
    }

    /// JSON response.
    pub fn json(status: u16, value: &serde_json::Value) -> Self {
        Self::new(status, "application/json", value.to_string())
    }

    /// `302 Found` pointing at `location`.
    pub fn redirect(location: &str) -> Self {
        Self::text(302, format!("Redirecting to {location}\n"))
            .with_header("Location", location)
    }

    /// Add a header.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    /// Serialize status line, headers and body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("HTTP/1.1 {} {}\r\n", self.status, reason(self.status));
        for (name, value) in &self.headers {
            head.push_str(&format!("{name}: {value}\r\n"));
        }
        head.push_str(&format!("Content-Length: {}\r\n", self.body.len()));
        head.push_str("Connection: close\r\n\r\n");

        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}

/// Head of an animation stream: no length, no caching, no keep-alive.
pub fn stream_head() -> &'static str {
    "HTTP/1.1 200 OK\r\n\
     Content-Type: text/plain; charset=utf-8\r\n\
     Cache-Control: no-cache, no-store, must-revalidate\r\n\
     Pragma: no-cache\r\n\
     Expires: 0\r\n\
     Connection: close\r\n\
     \r\n"
}

/// Reason phrase for the status codes this server sends.
pub fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        302 => "Found",
        400 => "Bad Request",
        404 => "Not Found",
        405 => "Method Not Allowed",
        500 => "Internal Server Error",
        _ => "Unknown",
    }
}
