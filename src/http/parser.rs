use bytes::Bytes;
use thiserror::Error;

use crate::http::request::{RequestLine, HTTP_VERSION};
use crate::http::response::{Message, StatusLine};

/// Largest request or response either side accepts, in bytes.
pub const MAX_MESSAGE_SIZE: usize = 1512;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    #[error("request line is missing a token")]
    InvalidRequest,
    #[error("request line has more than three tokens")]
    ExtraToken,
    #[error("unsupported protocol version {0:?}")]
    UnsupportedVersion(String),
    #[error("malformed status line")]
    InvalidStatusLine,
    #[error("invalid status code {0:?}")]
    InvalidStatusCode(String),
    #[error("header block is not terminated")]
    Incomplete,
    #[error("message exceeds {0} bytes")]
    TooLarge(usize),
}

/// Parses the request line of an inbound request.
///
/// The line runs up to the first carriage return. Tokens are separated by
/// runs of spaces. Exactly three tokens are accepted and the third must be
/// `HTTP/1.1`; the method is not checked here.
pub fn parse_request_line(buf: &[u8]) -> Result<RequestLine, ParseError> {
    let line_end = buf.iter().position(|&b| b == b'\r').unwrap_or(buf.len());
    let line = String::from_utf8_lossy(&buf[..line_end]);

    let mut parts = line.split(' ').filter(|part| !part.is_empty());

    let method = parts.next().ok_or(ParseError::InvalidRequest)?;
    let path = parts.next().ok_or(ParseError::InvalidRequest)?;
    let version = parts.next().ok_or(ParseError::InvalidRequest)?;

    if parts.next().is_some() {
        return Err(ParseError::ExtraToken);
    }
    if version != HTTP_VERSION {
        return Err(ParseError::UnsupportedVersion(version.to_string()));
    }

    Ok(RequestLine {
        method: method.to_string(),
        path: path.to_string(),
        version: version.to_string(),
    })
}

/// Parses a complete response as received by the client.
///
/// The status line must read `HTTP/1.1 <code> <reason>` with a code that
/// parses entirely as a base-10 integer. Header lines are kept verbatim.
pub fn parse_response(buf: Bytes) -> Result<Message, ParseError> {
    let line_end = buf.iter().position(|&b| b == b'\n').unwrap_or(buf.len());
    let status = parse_status_line(&buf[..line_end])?;

    let (header_bytes, body) = match find_headers_end(&buf) {
        Some(end) => (&buf[..end], Some(buf.slice(end + 4..))),
        None => (&buf[..], None),
    };

    let headers = String::from_utf8_lossy(header_bytes)
        .split("\r\n")
        .skip(1)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect();

    Ok(Message {
        status,
        headers,
        body,
    })
}

fn parse_status_line(line: &[u8]) -> Result<StatusLine, ParseError> {
    let line = std::str::from_utf8(line).map_err(|_| ParseError::InvalidStatusLine)?;
    let line = line.strip_suffix('\r').unwrap_or(line);

    // Protocol and code are separated by runs of spaces; the reason is the
    // rest of the line.
    let (protocol, rest) = next_token(line);
    if protocol != HTTP_VERSION {
        return Err(ParseError::UnsupportedVersion(protocol.to_string()));
    }

    let (code_str, rest) = next_token(rest);
    if code_str.is_empty() {
        return Err(ParseError::InvalidStatusLine);
    }
    let code = code_str
        .parse::<i64>()
        .map_err(|_| ParseError::InvalidStatusCode(code_str.to_string()))?;

    let reason = rest.trim().to_string();

    Ok(StatusLine {
        protocol: protocol.to_string(),
        code,
        reason,
    })
}

/// Splits off the first space-delimited token, skipping leading spaces.
fn next_token(s: &str) -> (&str, &str) {
    let s = s.trim_start_matches(' ');
    s.split_once(' ').unwrap_or((s, ""))
}

/// Offset of the first CRLF-CRLF in `buf`.
pub fn find_headers_end(buf: &[u8]) -> Option<usize> {
    buf.windows(4)
        .position(|w| w == b"\r\n\r\n")
}
