use std::process::ExitCode;

use minihttp::client::ClientError;
use minihttp::config::{self, ClientArgs, ClientConfig, CLIENT_USAGE};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    // stdout carries the body, so logs go to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_level(true)
        .init();

    let args: ClientArgs = match config::parse_args() {
        Ok(args) => args,
        Err(code) => return code,
    };

    let result = match ClientConfig::from_args(args) {
        Ok(cfg) => minihttp::client::run(&cfg).await,
        Err(e) => Err(ClientError::Usage(e)),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(ClientError::Usage(e)) => {
            config::report_usage_error(CLIENT_USAGE, &e);
            ExitCode::from(1)
        }
        Err(e) => {
            eprintln!("{e}");
            ExitCode::from(e.exit_code())
        }
    }
}
