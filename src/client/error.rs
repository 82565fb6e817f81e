use thiserror::Error;

use crate::config::ConfigError;
use crate::http::parser::ParseError;

/// Why a client run failed, and the exit status that reports it.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Usage(#[from] ConfigError),

    #[error("Protocol error! {0}")]
    Protocol(#[from] ParseError),

    /// The server answered with something other than 200.
    #[error("{reason}")]
    Status { code: i64, reason: String },

    #[error("{0:#}")]
    Transport(#[from] anyhow::Error),
}

impl ClientError {
    pub fn exit_code(&self) -> u8 {
        match self {
            ClientError::Usage(_) => 1,
            ClientError::Protocol(_) => 2,
            ClientError::Status { .. } => 3,
            ClientError::Transport(_) => 1,
        }
    }
}
