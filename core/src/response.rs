//! Responses: the raw buffer a transport returns and the parsed view.
//!
//! # Design
//! A transport reports a status code, the raw bytes it received (header
//! section followed by body) and the size of the header section. `Response`
//! splits the buffer at that size, parses the header blocks once, and keeps
//! the body as text. The JSON views decode on demand so a caller who only
//! wants the raw body never pays for parsing.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::HttpError;
use crate::headers::{parse_header_blocks, HeaderList, HeaderLookup};

/// Raw transfer result as reported by a `Transport`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub raw: Vec<u8>,
    pub header_size: usize,
}

impl RawResponse {
    pub fn new(status: u16, raw: Vec<u8>, header_size: usize) -> Self {
        Self {
            status,
            raw,
            header_size,
        }
    }

    /// Build from a complete HTTP message, locating the header section and
    /// status code the way a transfer library would report them.
    ///
    /// Consecutive blocks that start with `HTTP/` (interim responses,
    /// redirect hops) all count as headers; the status comes from the last.
    pub fn from_message(message: impl Into<Vec<u8>>) -> Self {
        let raw = message.into();
        let mut header_size = 0;
        let mut status = 0;

        while raw[header_size..].starts_with(b"HTTP/") {
            let rest = &raw[header_size..];
            status = status_of(rest).unwrap_or(0);
            match blank_line_end(rest) {
                Some(end) => header_size += end,
                None => {
                    header_size = raw.len();
                    break;
                }
            }
        }

        Self {
            status,
            raw,
            header_size,
        }
    }
}

fn blank_line_end(bytes: &[u8]) -> Option<usize> {
    let crlf = bytes.windows(4).position(|w| w == b"\r\n\r\n").map(|i| i + 4);
    let lf = bytes.windows(2).position(|w| w == b"\n\n").map(|i| i + 2);
    match (crlf, lf) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

fn status_of(block: &[u8]) -> Option<u16> {
    let line_end = block.iter().position(|&b| b == b'\n').unwrap_or(block.len());
    let line = std::str::from_utf8(&block[..line_end]).ok()?;
    line.split_whitespace().nth(1)?.parse().ok()
}

/// A completed HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: u16,
    raw_headers: String,
    header_blocks: Vec<HeaderList>,
    body: String,
}

impl From<RawResponse> for Response {
    fn from(raw: RawResponse) -> Self {
        let split = raw.header_size.min(raw.raw.len());
        let (head, body) = raw.raw.split_at(split);
        let raw_headers = String::from_utf8_lossy(head).into_owned();
        let header_blocks = parse_header_blocks(&raw_headers);
        Self {
            status: raw.status,
            raw_headers,
            header_blocks,
            body: String::from_utf8_lossy(body).into_owned(),
        }
    }
}

impl Response {
    pub fn status_code(&self) -> u16 {
        self.status
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The header section exactly as received.
    pub fn raw_headers(&self) -> &str {
        &self.raw_headers
    }

    /// The first header block, or `None` if nothing was received.
    pub fn headers(&self) -> Option<&HeaderList> {
        self.header_blocks.first()
    }

    /// Every header block, including interim and redirect responses.
    pub fn header_blocks(&self) -> &[HeaderList] {
        &self.header_blocks
    }

    /// Look up one header in the first block.
    pub fn header(&self, name: &str) -> HeaderLookup<'_> {
        match self.headers() {
            None => HeaderLookup::NoHeaders,
            Some(list) => list.get(name).map_or(HeaderLookup::Missing, HeaderLookup::Found),
        }
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    pub fn into_body(self) -> String {
        self.body
    }

    /// Decode the body as a JSON object.
    pub fn json(&self) -> Result<Map<String, Value>, HttpError> {
        match self.object()? {
            Value::Object(map) => Ok(map),
            _ => Err(HttpError::UnexpectedJson { expected: "object" }),
        }
    }

    /// Decode the body as any JSON value.
    pub fn object(&self) -> Result<Value, HttpError> {
        serde_json::from_str(&self.body).map_err(HttpError::Decode)
    }

    /// Decode the body into `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, HttpError> {
        serde_json::from_str(&self.body).map_err(HttpError::Decode)
    }
}
