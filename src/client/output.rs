//! Where the client puts a received body.

use std::path::PathBuf;

use anyhow::Context;
use tokio::io::AsyncWriteExt;

use crate::http::url::Url;
use crate::server::files::DEFAULT_INDEX;

/// Exactly one destination is active per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputSink {
    /// Write to the named file (`-o FILE`)
    File(PathBuf),
    /// Write into a directory, named after the URL (`-d DIR`)
    Directory(PathBuf),
    /// Write to stdout followed by a newline
    Stdout,
}

impl OutputSink {
    /// File the body will be written to, or `None` for stdout.
    ///
    /// In directory mode the name is the URL's last path segment, or the
    /// default document name when the URL path ends in `/`.
    pub fn target(&self, url: &Url) -> Option<PathBuf> {
        match self {
            OutputSink::File(path) => Some(path.clone()),
            OutputSink::Directory(dir) => {
                Some(dir.join(url.file_name().unwrap_or(DEFAULT_INDEX)))
            }
            OutputSink::Stdout => None,
        }
    }

    pub async fn deliver(&self, url: &Url, body: &[u8]) -> anyhow::Result<()> {
        match self.target(url) {
            Some(path) => {
                tokio::fs::write(&path, body)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                tracing::debug!(path = %path.display(), bytes = body.len(), "Body written");
            }
            None => {
                let mut stdout = tokio::io::stdout();
                stdout.write_all(body).await.context("failed to write stdout")?;
                stdout.write_all(b"\n").await.context("failed to write stdout")?;
                stdout.flush().await.context("failed to write stdout")?;
            }
        }

        Ok(())
    }
}
