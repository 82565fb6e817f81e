//! The fetching side: one GET per run, body delivered to a sink.

pub mod error;
pub mod exchange;
pub mod output;

pub use error::ClientError;
pub use exchange::Exchange;
pub use output::OutputSink;

use crate::config::ClientConfig;

/// Fetches the configured URL and delivers the body.
pub async fn run(cfg: &ClientConfig) -> Result<(), ClientError> {
    let body = Exchange::new(&cfg.url, cfg.port.as_str()).run().await?;
    cfg.sink.deliver(&cfg.url, &body).await?;
    Ok(())
}
