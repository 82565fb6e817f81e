//! Command-line surfaces of both programs and the configuration they
//! produce.
//!
//! Every rejection here is a usage error: the process reports it and exits
//! with status 1 before touching the network.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use serde::Deserialize;
use thiserror::Error;

use crate::client::output::OutputSink;
use crate::http::url::{is_valid_port, Url, UrlError};
use crate::server::files::{DEFAULT_INDEX, MAX_INDEX_LEN};

pub const CLIENT_DEFAULT_PORT: &str = "80";
pub const SERVER_DEFAULT_PORT: &str = "8080";
pub const SERVER_DEFAULT_HOST: &str = "0.0.0.0";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid argument to the option 'p': {0:?}")]
    InvalidPort(String),
    #[error("Invalid argument to the option 'i': {0:?}")]
    InvalidIndex(String),
    #[error("Invalid directory: {0}")]
    InvalidDirectory(PathBuf),
    #[error("Missing DOC_ROOT")]
    MissingDocRoot,
    #[error("Invalid URL: {0}")]
    Url(#[from] UrlError),
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Yaml {
        path: PathBuf,
        source: serde_yaml::Error,
    },
}

/// Parses the process arguments, printing clap's own message on failure.
///
/// Help and version requests exit with 0; every other parse failure is a
/// usage error and exits with 1.
pub fn parse_args<T: Parser>() -> Result<T, ExitCode> {
    T::try_parse().map_err(|e| {
        let _ = e.print();
        if e.use_stderr() {
            ExitCode::from(1)
        } else {
            ExitCode::SUCCESS
        }
    })
}

/// Reports a usage error on stderr.
pub fn report_usage_error(usage: &str, error: &ConfigError) {
    eprintln!("Usage Error! \tProper input: {usage}\n{error}");
}

pub const CLIENT_USAGE: &str = "client [-p PORT] [ -o FILE | -d DIR ] URL";

/// Fetches one file over HTTP/1.1.
#[derive(Debug, Parser)]
#[command(name = "client", override_usage = CLIENT_USAGE)]
pub struct ClientArgs {
    /// Port to connect to (1-6 digits)
    #[arg(short = 'p', value_name = "PORT")]
    pub port: Option<String>,

    /// Write the body to FILE
    #[arg(short = 'o', value_name = "FILE", conflicts_with = "dir")]
    pub output: Option<PathBuf>,

    /// Write the body into DIR, named after the URL's last path segment
    #[arg(short = 'd', value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Absolute http:// URL to fetch
    #[arg(value_name = "URL")]
    pub url: String,
}

/// Everything the client needs for one exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub url: Url,
    pub port: String,
    pub sink: OutputSink,
}

impl ClientConfig {
    pub fn from_args(args: ClientArgs) -> Result<Self, ConfigError> {
        if let Some(port) = &args.port {
            check_port(port)?;
        }

        let url = Url::parse(&args.url)?;

        let sink = match (args.output, args.dir) {
            (Some(file), _) => OutputSink::File(file),
            (None, Some(dir)) => {
                check_directory(&dir)?;
                OutputSink::Directory(dir)
            }
            (None, None) => OutputSink::Stdout,
        };

        let port = url
            .effective_port(args.port.as_deref(), CLIENT_DEFAULT_PORT)
            .to_string();

        Ok(Self { url, port, sink })
    }
}

pub const SERVER_USAGE: &str = "server [-p PORT] [-i INDEX] [-c CONFIG] DOC_ROOT";

/// Serves files from a document root over HTTP/1.1, one client at a time.
#[derive(Debug, Parser)]
#[command(name = "server", override_usage = SERVER_USAGE)]
pub struct ServerArgs {
    /// Port to listen on (1-6 digits)
    #[arg(short = 'p', value_name = "PORT")]
    pub port: Option<String>,

    /// Default document for paths ending in '/'
    #[arg(short = 'i', value_name = "INDEX")]
    pub index: Option<String>,

    /// YAML file with defaults for the other settings
    #[arg(short = 'c', long = "config", value_name = "CONFIG")]
    pub config: Option<PathBuf>,

    /// Directory to serve
    #[arg(value_name = "DOC_ROOT")]
    pub doc_root: Option<String>,
}

/// Optional YAML layer under the server's command line.
///
/// ```yaml
/// host: 127.0.0.1
/// port: 8080
/// index: index.html
/// doc_root: /srv/www
/// ```
#[derive(Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct ServerFileConfig {
    pub host: Option<String>,
    pub port: Option<PortSetting>,
    pub index: Option<String>,
    pub doc_root: Option<String>,
}

/// A port written either as a YAML number or a string.
#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum PortSetting {
    Number(u64),
    Text(String),
}

impl PortSetting {
    fn into_string(self) -> String {
        match self {
            PortSetting::Number(n) => n.to_string(),
            PortSetting::Text(s) => s,
        }
    }
}

impl ServerFileConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        Self::from_yaml(&text).map_err(|source| ConfigError::Yaml {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_yaml(text: &str) -> Result<Self, serde_yaml::Error> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text)
    }
}

/// Validated server settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: String,
    pub index: String,
    pub doc_root: String,
}

impl ServerConfig {
    /// Settings for `doc_root` with every other value at its default.
    pub fn new(doc_root: impl Into<String>) -> Self {
        Self {
            host: SERVER_DEFAULT_HOST.to_string(),
            port: SERVER_DEFAULT_PORT.to_string(),
            index: DEFAULT_INDEX.to_string(),
            doc_root: doc_root.into(),
        }
    }

    pub fn from_args(args: ServerArgs) -> Result<Self, ConfigError> {
        let file = match &args.config {
            Some(path) => ServerFileConfig::load(path)?,
            None => ServerFileConfig::default(),
        };

        Self::merge(args, file)
    }

    /// Combines command line and file: a flag wins over the file, the file
    /// wins over the built-in default.
    pub fn merge(args: ServerArgs, file: ServerFileConfig) -> Result<Self, ConfigError> {
        let doc_root = args
            .doc_root
            .or(file.doc_root)
            .ok_or(ConfigError::MissingDocRoot)?;
        let port = args
            .port
            .or(file.port.map(PortSetting::into_string))
            .unwrap_or_else(|| SERVER_DEFAULT_PORT.to_string());
        let index = args
            .index
            .or(file.index)
            .unwrap_or_else(|| DEFAULT_INDEX.to_string());
        let host = file
            .host
            .unwrap_or_else(|| SERVER_DEFAULT_HOST.to_string());

        check_port(&port)?;
        if index.is_empty() || index.chars().count() > MAX_INDEX_LEN {
            return Err(ConfigError::InvalidIndex(index));
        }
        check_directory(Path::new(&doc_root))?;

        Ok(Self {
            host,
            port,
            index,
            doc_root,
        })
    }
}

fn check_port(port: &str) -> Result<(), ConfigError> {
    if is_valid_port(port) {
        Ok(())
    } else {
        Err(ConfigError::InvalidPort(port.to_string()))
    }
}

fn check_directory(dir: &Path) -> Result<(), ConfigError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(ConfigError::InvalidDirectory(dir.to_path_buf()))
    }
}
