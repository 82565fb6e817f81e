use bytes::Bytes;
use tokio::io::{AsyncWrite, AsyncWriteExt};

use crate::http::request::HTTP_VERSION;
use crate::http::response::Response;

/// Serialises the status line and header block, including the blank line
/// that ends it.
pub fn serialize_head(resp: &Response) -> Vec<u8> {
    let mut buf = Vec::new();

    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    for (k, v) in &resp.headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");

    buf
}

/// Sends a response as two writes: the header block, then the body.
pub struct ResponseWriter {
    head: Vec<u8>,
    body: Bytes,
}

impl ResponseWriter {
    pub fn new(response: &Response) -> Self {
        Self {
            head: serialize_head(response),
            body: response.body.clone(),
        }
    }

    pub async fn write_to_stream<W>(&self, stream: &mut W) -> std::io::Result<()>
    where
        W: AsyncWrite + Unpin,
    {
        stream.write_all(&self.head).await?;

        if !self.body.is_empty() {
            stream.write_all(&self.body).await?;
        }

        stream.flush().await
    }
}
