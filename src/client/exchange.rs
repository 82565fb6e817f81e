//! One connect-send-receive-close exchange with a server.

use std::net::SocketAddr;

use anyhow::Context;
use bytes::{Bytes, BytesMut};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWriteExt};
use tokio::net::{lookup_host, TcpStream};

use crate::client::error::ClientError;
use crate::http::parser::{parse_response, ParseError, MAX_MESSAGE_SIZE};
use crate::http::request::Request;
use crate::http::url::Url;

/// Issues a single GET and hands back the body of a 200 response.
pub struct Exchange {
    host: String,
    port: String,
    request: Request,
    max_response_size: usize,
}

impl Exchange {
    pub fn new(url: &Url, port: impl Into<String>) -> Self {
        Self {
            host: url.host.clone(),
            port: port.into(),
            request: Request::get(url),
            max_response_size: MAX_MESSAGE_SIZE,
        }
    }

    pub fn with_max_response_size(mut self, max: usize) -> Self {
        self.max_response_size = max;
        self
    }

    /// Runs the exchange.
    ///
    /// A response with a status other than 200 is reported as
    /// [`ClientError::Status`] carrying the server's reason phrase.
    pub async fn run(&self) -> Result<Bytes, ClientError> {
        let mut stream = self.connect().await?;

        stream
            .write_all(&self.request.to_bytes())
            .await
            .context("send() failed")?;
        stream.flush().await.context("send() failed")?;

        tracing::debug!(path = %self.request.path, "Request sent");

        let raw = read_response(&mut stream, self.max_response_size).await?;
        drop(stream);

        let message = parse_response(raw)?;

        if !message.is_ok() {
            tracing::debug!(code = message.status.code, "Server refused request");
            return Err(ClientError::Status {
                code: message.status.code,
                reason: message.status.reason,
            });
        }

        if let Some(length) = message.header("Content-Length") {
            tracing::debug!(content_length = length, "Response received");
        }

        message.body.ok_or(ClientError::Protocol(ParseError::Incomplete))
    }

    /// Connects to the first IPv4 address of the host that accepts.
    async fn connect(&self) -> anyhow::Result<TcpStream> {
        let target = format!("{}:{}", self.host, self.port);
        let addrs: Vec<SocketAddr> = lookup_host(&target)
            .await
            .with_context(|| format!("getaddrinfo() failed for {target}"))?
            .filter(SocketAddr::is_ipv4)
            .collect();

        tracing::info!(%target, candidates = addrs.len(), "Connecting to the host");

        let mut last_error = None;
        for addr in addrs {
            match TcpStream::connect(addr).await {
                Ok(stream) => {
                    tracing::trace!(%addr, "Connected");
                    return Ok(stream);
                }
                Err(e) => {
                    tracing::debug!(%addr, error = %e, "connect() failed, trying next address");
                    last_error = Some(e);
                }
            }
        }

        let error = last_error.map_or_else(
            || anyhow::anyhow!("{target} has no IPv4 address"),
            anyhow::Error::from,
        );
        Err(error.context("socket() or connect() failed"))
    }
}

/// Reads the whole response, until the server closes the connection.
///
/// A response longer than `max` bytes is rejected instead of being cut
/// short.
pub async fn read_response<R>(stream: &mut R, max: usize) -> Result<Bytes, ClientError>
where
    R: AsyncRead + Unpin,
{
    let mut buffer = BytesMut::with_capacity(max + 1);
    let mut limited = stream.take(max as u64 + 1);

    loop {
        let n = limited
            .read_buf(&mut buffer)
            .await
            .context("recv() failed")?;
        if n == 0 {
            break;
        }
    }

    if buffer.len() > max {
        return Err(ParseError::TooLarge(max).into());
    }

    Ok(buffer.freeze())
}
