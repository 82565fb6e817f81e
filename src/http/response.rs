use std::fmt::Write as _;

use bytes::Bytes;
use chrono::Local;

/// `strftime`-style layout of the `Date` header.
pub const DATE_FORMAT: &str = "%a, %d %b %y %T %Z";

/// HTTP status codes the server produces.
///
/// - `Ok` (200): file found and served
/// - `BadRequest` (400): malformed request line or wrong protocol version
/// - `NotFound` (404): no file at the resolved path
/// - `NotImplemented` (501): any method other than GET
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    /// 200 OK
    Ok,
    /// 400 Bad Request
    BadRequest,
    /// 404 Not Found
    NotFound,
    /// 501 Not Implemented
    NotImplemented,
}

impl StatusCode {
    /// Returns the numeric HTTP status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use minihttp::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.as_u16(), 200);
    /// assert_eq!(StatusCode::NotImplemented.as_u16(), 501);
    /// ```
    pub fn as_u16(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::NotImplemented => 501,
        }
    }

    /// Returns the standard HTTP reason phrase for this status code.
    ///
    /// # Example
    ///
    /// ```
    /// # use minihttp::http::response::StatusCode;
    /// assert_eq!(StatusCode::Ok.reason_phrase(), "OK");
    /// assert_eq!(StatusCode::NotFound.reason_phrase(), "Not Found");
    /// ```
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::NotImplemented => "Not Implemented",
        }
    }
}

/// Represents a complete HTTP response ready to be sent to a client.
///
/// Headers keep their insertion order, which is the order they are written
/// on the wire.
#[derive(Debug)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers as ordered name/value pairs
    pub headers: Vec<(String, String)>,
    /// Response body as bytes
    pub body: Bytes,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```ignore
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Date", date)
///     .body(body)
///     .build();
/// ```
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Vec<(String, String)>,
    body: Option<Bytes>,
}

impl ResponseBuilder {
    /// Creates a new response builder with the specified status code.
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Appends a header.
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((key.into(), value.into()));
        self
    }

    /// Sets the response body.
    ///
    /// A `Content-Length` header carrying the exact byte count is appended
    /// at this point.
    pub fn body(mut self, body: impl Into<Bytes>) -> Self {
        let body = body.into();
        self.headers
            .push(("Content-Length".to_string(), body.len().to_string()));
        self.body = Some(body);
        self
    }

    /// Builds the final Response.
    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body.unwrap_or_default(),
        }
    }
}

impl Response {
    /// Creates the 200 OK response that carries a served file.
    pub fn ok(date: impl Into<String>, body: impl Into<Bytes>) -> Self {
        ResponseBuilder::new(StatusCode::Ok)
            .header("Date", date)
            .body(body)
            .header("Connection", "Close")
            .build()
    }

    /// Creates a header-only error response.
    pub fn error(status: StatusCode) -> Self {
        ResponseBuilder::new(status)
            .header("Connection", "close")
            .build()
    }

    /// Looks up the first header with the given name, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v.as_str())
    }
}

/// Formats the current local time for the `Date` header.
pub fn http_date() -> anyhow::Result<String> {
    let mut out = String::new();
    write!(out, "{}", Local::now().format(DATE_FORMAT))
        .map_err(|_| anyhow::anyhow!("failed to format Date header with {DATE_FORMAT:?}"))?;
    Ok(out)
}

/// First line of a response as the client parsed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusLine {
    pub protocol: String,
    pub code: i64,
    /// Human-readable text following the status code, possibly empty
    pub reason: String,
}

/// A response received by the client, parsed once and shared by the status
/// check, the error report and body delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub status: StatusLine,
    /// Raw header lines between the status line and the blank line,
    /// verbatim and in order
    pub headers: Vec<String>,
    /// Everything after the first CRLF-CRLF, or `None` when the header
    /// block was never terminated
    pub body: Option<Bytes>,
}

impl Message {
    /// Value of the first header line named `key`, ignoring ASCII case.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.iter().find_map(|line| {
            let (name, value) = line.split_once(':')?;
            name.trim().eq_ignore_ascii_case(key).then(|| value.trim())
        })
    }

    pub fn is_ok(&self) -> bool {
        self.status.code == i64::from(StatusCode::Ok.as_u16())
    }
}
