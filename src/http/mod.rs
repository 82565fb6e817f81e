//! HTTP/1.1 protocol pieces shared by the client and the server.
//!
//! Exactly one GET request travels over each connection, and the connection
//! closes after the response.
//!
//! # Architecture
//!
//! - **`url`**: splits an absolute `http://` URL into host, port and path
//! - **`request`**: request line types and the client's wire-format GET
//! - **`parser`**: server-side request line parsing, client-side response parsing
//! - **`response`**: status codes, the server's response builder, the client's parsed `Message`
//! - **`writer`**: serialises a response and sends header block then body
//! - **`connection`**: the server's per-connection state machine
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for the request
//!        └──────┬──────┘
//!               │ Request line received
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← 400 / 501 / 404 / 200
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Header block, then body
//!        └──────┬───────────┘
//!               │
//!               ▼
//!            Closed
//! ```
//!
//! # Wire format
//!
//! ```text
//! GET /index.html HTTP/1.1\r\n
//! Host: example.com\r\n
//! Connection: close\r\n
//! \r\n
//! ```
//!
//! ```text
//! HTTP/1.1 200 OK\r\n
//! Date: Mon, 03 Jan 22 14:05:09 +01:00\r\n
//! Content-Length: 6\r\n
//! Connection: Close\r\n
//! \r\n
//! hello
//! ```

pub mod connection;
pub mod parser;
pub mod request;
pub mod response;
pub mod url;
pub mod writer;
