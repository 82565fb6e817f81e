//! minihttp - single-exchange HTTP/1.1 client and file server
//!
//! Core library shared by the `client` and `server` binaries.

pub mod client;
pub mod config;
pub mod http;
pub mod server;
