use crate::http::url::Url;

/// The only protocol version either side speaks.
pub const HTTP_VERSION: &str = "HTTP/1.1";

/// Request methods the client issues and the server serves.
///
/// Anything else arriving at the server is answered with 501 Not
/// Implemented.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    GET,
}

impl Method {
    /// Parses an HTTP method from a string. Method names are
    /// case-sensitive.
    ///
    /// # Example
    ///
    /// ```
    /// # use minihttp::http::request::Method;
    /// assert_eq!(Method::from_str("GET"), Some(Method::GET));
    /// assert_eq!(Method::from_str("get"), None);
    /// assert_eq!(Method::from_str("POST"), None);
    /// ```
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "GET" => Some(Method::GET),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Method::GET => "GET",
        }
    }
}

/// The three tokens of an inbound request line, as the server received
/// them.
///
/// Tokens are kept verbatim so that unknown methods and foreign versions can
/// still be reported. [`crate::http::parser::parse_request_line`] decides
/// which of them are acceptable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    pub method: String,
    pub path: String,
    pub version: String,
}

impl RequestLine {
    pub fn is_get(&self) -> bool {
        Method::from_str(&self.method) == Some(Method::GET)
    }
}

/// Outbound GET request issued by the client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    pub method: Method,
    /// Request target, always starting with `/`
    pub path: String,
    /// Value of the `Host` header
    pub host: String,
}

impl Request {
    pub fn get(url: &Url) -> Self {
        Self {
            method: Method::GET,
            path: url.path.clone(),
            host: url.host.clone(),
        }
    }

    /// Serialises the request exactly as it goes on the wire.
    ///
    /// `Host` and `Connection: close` are the only headers ever emitted.
    pub fn to_bytes(&self) -> Vec<u8> {
        format!(
            "{} {} {}\r\nHost: {}\r\nConnection: close\r\n\r\n",
            self.method.as_str(),
            self.path,
            HTTP_VERSION,
            self.host
        )
        .into_bytes()
    }
}
