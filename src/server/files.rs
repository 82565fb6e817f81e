//! Mapping of request paths onto the document root, and loading of the
//! files found there.

use std::path::{Path, PathBuf};

use bytes::{Bytes, BytesMut};
use tokio::fs::File;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Default document served for paths ending in `/`.
pub const DEFAULT_INDEX: &str = "index.html";

/// Longest accepted default document name, in characters.
pub const MAX_INDEX_LEN: usize = 31;

/// Directory the server publishes, together with its default document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentRoot {
    root: String,
    index: String,
}

impl DocumentRoot {
    pub fn new(root: impl Into<String>, index: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            index: index.into(),
        }
    }

    pub fn root(&self) -> &str {
        &self.root
    }

    pub fn index(&self) -> &str {
        &self.index
    }

    /// Filesystem path for `request_path`.
    ///
    /// The result is the document root followed by the request path, plus
    /// the default document when the request path ends in `/`. Returns
    /// `None` for paths that do not start with `/` or that have a `..`
    /// segment, since either could name a file outside the root.
    pub fn resolve(&self, request_path: &str) -> Option<PathBuf> {
        if !request_path.starts_with('/') {
            return None;
        }
        if request_path.split('/').any(|segment| segment == "..") {
            return None;
        }

        let mut resolved = String::with_capacity(
            self.root.len() + request_path.len() + self.index.len(),
        );
        resolved.push_str(&self.root);
        resolved.push_str(request_path);
        if request_path.ends_with('/') {
            resolved.push_str(&self.index);
        }

        Some(PathBuf::from(resolved))
    }
}

/// Whether `path` names an existing regular file.
pub async fn is_servable(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|meta| meta.is_file())
        .unwrap_or(false)
}

/// Reads the whole file into one buffer, line by line.
///
/// Every byte of the file is kept, line terminators included, so the
/// result is exactly the file's content.
pub async fn load(path: &Path) -> std::io::Result<Bytes> {
    let file = File::open(path).await?;
    let capacity = file.metadata().await.map(|m| m.len() as usize).unwrap_or(0);

    let mut reader = BufReader::new(file);
    let mut body = BytesMut::with_capacity(capacity);
    let mut line = Vec::new();

    loop {
        line.clear();
        if reader.read_until(b'\n', &mut line).await? == 0 {
            break;
        }
        body.extend_from_slice(&line);
    }

    Ok(body.freeze())
}
