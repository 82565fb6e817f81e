//! Decomposition of an absolute `http://` URL into host, optional port and
//! request path.
//!
//! The authority ends at the first of `; / : @ = &` after the scheme
//! prefix. The request path is the first `/`-initiated substring after the
//! prefix, or `/` when the URL has none.

use thiserror::Error;

const SCHEME_PREFIX: &str = "http://";

const AUTHORITY_DELIMITERS: &[char] = &[';', '/', ':', '@', '=', '&'];

/// Shortest input accepted as a URL: the scheme prefix plus one host byte.
pub const MIN_URL_LEN: usize = 8;

/// Longest accepted port, in digits.
pub const MAX_PORT_DIGITS: usize = 6;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UrlError {
    #[error("URL must be at least 8 characters")]
    TooShort,
    #[error("URL must start with http://")]
    UnsupportedScheme,
    #[error("invalid host {0:?}")]
    InvalidHost(String),
    #[error("invalid port {0:?}")]
    InvalidPort(String),
}

/// A URL split into the parts the client needs to issue one GET.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Url {
    /// Host exactly as written in the URL, never empty
    pub host: String,
    /// Port given in the authority (`http://host:8000/`), if any
    pub port: Option<String>,
    /// Request path, always starting with `/`
    pub path: String,
}

impl Url {
    pub fn parse(input: &str) -> Result<Self, UrlError> {
        if input.len() < MIN_URL_LEN {
            return Err(UrlError::TooShort);
        }

        let prefix = input
            .get(..SCHEME_PREFIX.len())
            .ok_or(UrlError::UnsupportedScheme)?;
        if !prefix.eq_ignore_ascii_case(SCHEME_PREFIX) {
            return Err(UrlError::UnsupportedScheme);
        }

        let rest = &input[SCHEME_PREFIX.len()..];
        let host_end = rest.find(AUTHORITY_DELIMITERS).unwrap_or(rest.len());
        let host = &rest[..host_end];

        if host.is_empty() || url::Host::parse(host).is_err() {
            return Err(UrlError::InvalidHost(host.to_string()));
        }

        let port = parse_authority_port(&rest[host_end..])?;

        let path = match rest.find('/') {
            Some(start) => rest[start..].to_string(),
            None => "/".to_string(),
        };

        Ok(Self {
            host: host.to_string(),
            port,
            path,
        })
    }

    /// Port to connect to: an explicit override, then the URL's own port,
    /// then `default`.
    pub fn effective_port<'a>(&'a self, overridden: Option<&'a str>, default: &'a str) -> &'a str {
        overridden
            .or(self.port.as_deref())
            .unwrap_or(default)
    }

    /// Final `/`-delimited segment of the path, or `None` when the path
    /// names a directory.
    pub fn file_name(&self) -> Option<&str> {
        match self.path.rsplit_once('/') {
            Some((_, name)) if !name.is_empty() => Some(name),
            _ => None,
        }
    }
}

/// Returns true when `value` is 1 to [`MAX_PORT_DIGITS`] decimal digits.
pub fn is_valid_port(value: &str) -> bool {
    !value.is_empty()
        && value.len() <= MAX_PORT_DIGITS
        && value.bytes().all(|b| b.is_ascii_digit())
}

fn parse_authority_port(after_host: &str) -> Result<Option<String>, UrlError> {
    let Some(spec) = after_host.strip_prefix(':') else {
        return Ok(None);
    };

    let port = spec.split('/').next().unwrap_or_default();
    if !is_valid_port(port) {
        return Err(UrlError::InvalidPort(port.to_string()));
    }

    Ok(Some(port.to_string()))
}
