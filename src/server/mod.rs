//! The serving side: a single-connection accept loop over a document root.

pub mod files;
pub mod listener;
pub mod shutdown;

pub use listener::Server;
pub use shutdown::{Shutdown, ShutdownMode, SignalListener};

use anyhow::Context;

use crate::config::ServerConfig;

/// Installs signal handling, binds, and serves until told to stop.
pub async fn run(cfg: &ServerConfig) -> anyhow::Result<()> {
    let shutdown = Shutdown::new();
    let signals = SignalListener::install().context("failed to install signal handlers")?;
    tokio::spawn(signals.run(shutdown.clone()));

    Server::bind(cfg, shutdown).await?.run().await
}
