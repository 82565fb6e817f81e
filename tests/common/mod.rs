#![allow(dead_code)]

use std::net::SocketAddr;

use minihttp::config::ServerConfig;
use minihttp::server::{Server, Shutdown};
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

/// Scratch directory removed on drop, named after the test using it.
pub fn scratch_dir(tag: &str) -> TempDir {
    tempfile::Builder::new()
        .prefix(&format!("minihttp-{tag}-"))
        .tempdir()
        .unwrap()
}

/// Helpers for laying out a document tree inside a scratch directory.
pub trait DocTree {
    fn root(&self) -> String;
    fn write(&self, relative: &str, contents: &[u8]);
}

impl DocTree for TempDir {
    fn root(&self) -> String {
        self.path().to_str().unwrap().to_string()
    }

    fn write(&self, relative: &str, contents: &[u8]) {
        let path = self.path().join(relative);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(path, contents).unwrap();
    }
}

pub struct RunningServer {
    pub addr: SocketAddr,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<anyhow::Result<()>>,
}

impl RunningServer {
    pub fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.addr.port(), path)
    }

    pub fn port(&self) -> String {
        self.addr.port().to_string()
    }
}

/// Binds a server on an ephemeral loopback port and runs it in the
/// background.
pub async fn start_server(docs: &TempDir, index: &str) -> RunningServer {
    let cfg = ServerConfig {
        host: "127.0.0.1".to_string(),
        port: "0".to_string(),
        index: index.to_string(),
        doc_root: docs.root(),
    };

    let shutdown = Shutdown::new();
    let server = Server::bind(&cfg, shutdown.clone()).await.unwrap();
    let addr = server.local_addr().unwrap();
    let handle = tokio::spawn(server.run());

    RunningServer {
        addr,
        shutdown,
        handle,
    }
}

/// Sends raw bytes and returns everything the server answers.
pub async fn raw_exchange(addr: SocketAddr, request: &[u8]) -> Vec<u8> {
    let mut stream = TcpStream::connect(addr).await.unwrap();
    stream.write_all(request).await.unwrap();

    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();
    out
}
