use std::net::SocketAddr;

use anyhow::Context;
use tokio::net::{lookup_host, TcpListener, TcpSocket};
use tracing::info;

use crate::config::ServerConfig;
use crate::http::connection::Connection;
use crate::server::files::DocumentRoot;
use crate::server::shutdown::Shutdown;

/// Only one pending connection is ever queued.
const LISTEN_BACKLOG: u32 = 1;

/// Resolves `host:port` to the IPv4 addresses it names.
pub async fn resolve_ipv4(host: &str, port: &str) -> anyhow::Result<Vec<SocketAddr>> {
    let addrs: Vec<SocketAddr> = lookup_host(format!("{host}:{port}"))
        .await
        .with_context(|| format!("failed to resolve {host}:{port}"))?
        .filter(SocketAddr::is_ipv4)
        .collect();

    if addrs.is_empty() {
        anyhow::bail!("{host}:{port} has no IPv4 address");
    }

    Ok(addrs)
}

/// Binds the first candidate address that accepts an address-reusing
/// socket, then listens on it.
pub async fn bind(host: &str, port: &str) -> anyhow::Result<TcpListener> {
    let mut last_error = None;

    for addr in resolve_ipv4(host, port).await? {
        match try_bind(addr) {
            Ok(listener) => return Ok(listener),
            Err(e) => {
                tracing::debug!(%addr, error = %e, "bind() failed, trying next address");
                last_error = Some(e);
            }
        }
    }

    let error = last_error.map_or_else(|| anyhow::anyhow!("no address to bind"), anyhow::Error::from);
    Err(error.context(format!("socket() or bind() failed for port {port}")))
}

fn try_bind(addr: SocketAddr) -> std::io::Result<TcpListener> {
    let socket = TcpSocket::new_v4()?;
    socket.set_reuseaddr(true)?;
    socket.bind(addr)?;
    socket.listen(LISTEN_BACKLOG)
}

/// The accept-serve-close loop.
pub struct Server {
    listener: TcpListener,
    docs: DocumentRoot,
    shutdown: Shutdown,
}

impl Server {
    pub async fn bind(cfg: &ServerConfig, shutdown: Shutdown) -> anyhow::Result<Self> {
        let listener = bind(&cfg.host, &cfg.port).await?;

        Ok(Self {
            listener,
            docs: DocumentRoot::new(cfg.doc_root.clone(), cfg.index.clone()),
            shutdown,
        })
    }

    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    /// Serves one connection at a time until shutdown is requested.
    ///
    /// Failures on a single connection are logged and the loop goes on;
    /// failures of the listening socket end the loop with an error.
    pub async fn run(self) -> anyhow::Result<()> {
        let addr = self.local_addr()?;
        info!(
            %addr,
            doc_root = self.docs.root(),
            index = self.docs.index(),
            "Waiting for a connection"
        );

        loop {
            if !self.shutdown.is_running() {
                info!("Shutdown requested, leaving accept loop");
                break;
            }

            self.shutdown.set_accepting(true);
            let accepted = tokio::select! {
                res = self.listener.accept() => Some(res),
                _ = self.shutdown.cancelled() => None,
            };
            self.shutdown.set_accepting(false);

            let Some(res) = accepted else {
                info!("Shutdown requested while idle");
                break;
            };
            let (socket, peer) = res.context("accept() failed")?;
            info!(%peer, "Accepted connection");

            let mut conn = Connection::new(socket, &self.docs);
            match conn.run().await {
                Ok(Some(status)) => {
                    info!(%peer, status = status.as_u16(), "Exchange complete");
                }
                Ok(None) => {
                    info!(%peer, "Connection closed without a request");
                }
                Err(e) if e.is_fatal() => {
                    tracing::error!(%peer, error = %e, "Fatal error while serving");
                    return Err(e.into());
                }
                Err(e) => {
                    tracing::warn!(%peer, error = %e, "Connection dropped");
                }
            }
        }

        Ok(())
    }
}
