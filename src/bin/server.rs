use std::process::ExitCode;

use minihttp::config::{self, ServerArgs, ServerConfig, SERVER_USAGE};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let args: ServerArgs = match config::parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    let cfg = match ServerConfig::from_args(args) {
        Ok(cfg) => cfg,
        Err(e) => {
            config::report_usage_error(SERVER_USAGE, &e);
            return ExitCode::from(1);
        }
    };

    match minihttp::server::run(&cfg).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}
