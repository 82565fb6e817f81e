use bytes::BytesMut;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::http::parser::{find_headers_end, parse_request_line, ParseError, MAX_MESSAGE_SIZE};
use crate::http::request::RequestLine;
use crate::http::response::{http_date, Response, StatusCode};
use crate::http::writer::ResponseWriter;
use crate::server::files::{self, DocumentRoot};

#[derive(Debug, Error)]
pub enum ConnectionError {
    /// Failure confined to this connection; the server keeps accepting.
    #[error("connection I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// Failure that stops the whole server.
    #[error(transparent)]
    Fatal(#[from] anyhow::Error),
}

impl ConnectionError {
    pub fn is_fatal(&self) -> bool {
        matches!(self, ConnectionError::Fatal(_))
    }
}

/// Drives one exchange: read a request, answer it, close.
pub struct Connection<'a, S> {
    stream: S,
    docs: &'a DocumentRoot,
    buffer: BytesMut,
    state: ConnectionState,
}

pub enum ConnectionState {
    Reading,
    Processing(Result<RequestLine, ParseError>),
    Writing(ResponseWriter, StatusCode),
    Closed,
}

impl<'a, S> Connection<'a, S>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    pub fn new(stream: S, docs: &'a DocumentRoot) -> Self {
        Self {
            stream,
            docs,
            buffer: BytesMut::with_capacity(MAX_MESSAGE_SIZE),
            state: ConnectionState::Reading,
        }
    }

    /// Runs the exchange to completion and returns the status sent, or
    /// `None` when the peer closed without sending anything.
    pub async fn run(&mut self) -> Result<Option<StatusCode>, ConnectionError> {
        let mut sent = None;

        loop {
            match &mut self.state {
                ConnectionState::Reading => {
                    if self.read_request().await? {
                        let parsed = parse_request_line(&self.buffer);
                        self.state = ConnectionState::Processing(parsed);
                    } else {
                        tracing::debug!("Peer closed before sending a request");
                        self.state = ConnectionState::Closed;
                    }
                }

                ConnectionState::Processing(parsed) => {
                    let response = Self::handle_request(self.docs, parsed).await?;
                    let status = response.status;
                    self.state = ConnectionState::Writing(ResponseWriter::new(&response), status);
                }

                ConnectionState::Writing(writer, status) => {
                    writer.write_to_stream(&mut self.stream).await?;
                    sent = Some(*status);
                    self.state = ConnectionState::Closed;
                }

                ConnectionState::Closed => {
                    if let Err(e) = self.stream.shutdown().await {
                        tracing::debug!(error = %e, "Shutdown of connection failed");
                    }
                    break;
                }
            }
        }

        Ok(sent)
    }

    /// Reads until the header block is complete, the peer stops sending, or
    /// [`MAX_MESSAGE_SIZE`] bytes have arrived. Returns false when nothing
    /// was received at all.
    async fn read_request(&mut self) -> std::io::Result<bool> {
        let mut temp = [0u8; 1024];

        while find_headers_end(&self.buffer).is_none() && self.buffer.len() < MAX_MESSAGE_SIZE {
            let want = temp.len().min(MAX_MESSAGE_SIZE - self.buffer.len());
            let n = self.stream.read(&mut temp[..want]).await?;

            if n == 0 {
                break;
            }

            self.buffer.extend_from_slice(&temp[..n]);
        }

        Ok(!self.buffer.is_empty())
    }

    /// Picks the response for a parsed request line.
    ///
    /// Checks run in a fixed order: framing and version (400), method
    /// (501), file existence (404). Only a request passing all three is
    /// served.
    async fn handle_request(
        docs: &DocumentRoot,
        parsed: &Result<RequestLine, ParseError>,
    ) -> Result<Response, ConnectionError> {
        let line = match parsed {
            Ok(line) => line,
            Err(e) => {
                tracing::info!(error = %e, "Rejecting malformed request");
                return Ok(Response::error(StatusCode::BadRequest));
            }
        };

        if !line.is_get() {
            tracing::info!(method = %line.method, path = %line.path, "Method not implemented");
            return Ok(Response::error(StatusCode::NotImplemented));
        }

        let resolved = match docs.resolve(&line.path) {
            Some(path) if files::is_servable(&path).await => path,
            _ => {
                tracing::info!(path = %line.path, "No file for request");
                return Ok(Response::error(StatusCode::NotFound));
            }
        };

        let body = files::load(&resolved).await?;
        let date = http_date()?;

        let response = Response::ok(date, body);
        tracing::info!(
            path = %line.path,
            file = %resolved.display(),
            content_length = response.header("Content-Length").unwrap_or_default(),
            "Serving file"
        );

        Ok(response)
    }
}
