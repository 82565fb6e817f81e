//! End-to-end exchanges between the client and a live server.

mod common;

use std::time::Duration;

use common::{raw_exchange, scratch_dir, start_server, DocTree};
use minihttp::client::{self, ClientError, Exchange, OutputSink};
use minihttp::config::{ClientArgs, ClientConfig, ConfigError};
use minihttp::http::parser::{ParseError, MAX_MESSAGE_SIZE};
use minihttp::http::url::{Url, UrlError};
use minihttp::server::ShutdownMode;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;

fn header_lines(raw: &[u8]) -> Vec<String> {
    let text = String::from_utf8_lossy(raw);
    let head = text.split("\r\n\r\n").next().unwrap_or_default();
    head.split("\r\n").map(str::to_string).collect()
}

#[tokio::test]
async fn test_index_served_for_root() {
    let docs = scratch_dir("index");
    docs.write("index.html", b"hello\n");
    let server = start_server(&docs, "index.html").await;

    let url = Url::parse(&server.url("/")).unwrap();
    let body = Exchange::new(&url, server.port()).run().await.unwrap();

    assert_eq!(&body[..], b"hello\n");
}

#[tokio::test]
async fn test_custom_index_name() {
    let docs = scratch_dir("custom-index");
    docs.write("sub/home.htm", b"<p>home</p>");
    let server = start_server(&docs, "home.htm").await;

    let url = Url::parse(&server.url("/sub/")).unwrap();
    let body = Exchange::new(&url, server.port()).run().await.unwrap();

    assert_eq!(&body[..], b"<p>home</p>");
}

#[tokio::test]
async fn test_missing_file_reports_reason() {
    let docs = scratch_dir("missing");
    let server = start_server(&docs, "index.html").await;

    let url = Url::parse(&server.url("/nope.txt")).unwrap();
    let err = Exchange::new(&url, server.port()).run().await.unwrap_err();

    match &err {
        ClientError::Status { code, reason } => {
            assert_eq!(*code, 404);
            assert_eq!(reason, "Not Found");
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(err.exit_code(), 3);
    assert_eq!(err.to_string(), "Not Found");
}

#[test]
fn test_short_url_is_usage_error() {
    let args = ClientArgs {
        port: None,
        output: None,
        dir: None,
        url: "http://".to_string(),
    };

    let err = ClientConfig::from_args(args).unwrap_err();
    assert!(matches!(err, ConfigError::Url(UrlError::TooShort)));
    assert_eq!(ClientError::from(err).exit_code(), 1);
}

#[tokio::test]
async fn test_body_written_to_file_matches_source() {
    let docs = scratch_dir("roundtrip-src");
    let out = scratch_dir("roundtrip-out");
    let content = b"line one\nline two\r\nno trailing newline";
    docs.write("data.txt", content);
    let server = start_server(&docs, "index.html").await;

    let target = out.path().join("saved.txt");
    let cfg = ClientConfig {
        url: Url::parse(&server.url("/data.txt")).unwrap(),
        port: server.port(),
        sink: OutputSink::File(target.clone()),
    };
    client::run(&cfg).await.unwrap();

    assert_eq!(std::fs::read(target).unwrap(), content.to_vec());
}

#[tokio::test]
async fn test_directory_mode_names_file_after_url() {
    let docs = scratch_dir("dirmode-src");
    let out = scratch_dir("dirmode-out");
    docs.write("a/page.txt", b"page");
    docs.write("a/index.html", b"index");
    let server = start_server(&docs, "index.html").await;

    for (path, file, expected) in [
        ("/a/page.txt", "page.txt", &b"page"[..]),
        ("/a/", "index.html", &b"index"[..]),
    ] {
        let args = ClientArgs {
            port: Some(server.port()),
            output: None,
            dir: Some(out.path().to_path_buf()),
            url: server.url(path),
        };
        let cfg = ClientConfig::from_args(args).unwrap();
        client::run(&cfg).await.unwrap();

        assert_eq!(std::fs::read(out.path().join(file)).unwrap(), expected);
    }
}

#[tokio::test]
async fn test_status_dispatch() {
    let docs = scratch_dir("dispatch");
    docs.write("index.html", b"x");
    docs.write("sub/index.html", b"y");
    let server = start_server(&docs, "index.html").await;

    let cases: [(&[u8], &str); 7] = [
        (b"GET / HTTP/1.1 extra\r\n\r\n", "HTTP/1.1 400 Bad Request"),
        (b"GET / HTTP/1.0\r\n\r\n", "HTTP/1.1 400 Bad Request"),
        (b"POST / HTTP/1.1\r\n\r\n", "HTTP/1.1 501 Not Implemented"),
        (b"GET /absent HTTP/1.1\r\n\r\n", "HTTP/1.1 404 Not Found"),
        (b"GET /sub HTTP/1.1\r\n\r\n", "HTTP/1.1 404 Not Found"),
        (b"GET /../index.html HTTP/1.1\r\n\r\n", "HTTP/1.1 404 Not Found"),
        (b"GET index.html HTTP/1.1\r\n\r\n", "HTTP/1.1 404 Not Found"),
    ];

    for (request, status_line) in cases {
        let raw = raw_exchange(server.addr, request).await;
        let expected = format!("{status_line}\r\nConnection: close\r\n\r\n");
        assert_eq!(String::from_utf8_lossy(&raw), expected);
    }

    // The loop is still serving after the error responses.
    let raw = raw_exchange(server.addr, b"GET / HTTP/1.1\r\nHost: x\r\n\r\n").await;
    assert!(raw.starts_with(b"HTTP/1.1 200 OK\r\n"));
}

#[tokio::test]
async fn test_relative_target_cannot_reach_sibling_directory() {
    let docs = scratch_dir("relative");
    docs.write("index.html", b"x");
    let sibling = std::path::PathBuf::from(format!("{}2", docs.root()));
    std::fs::create_dir_all(&sibling).unwrap();
    std::fs::write(sibling.join("secret.txt"), b"TOP SECRET").unwrap();
    let server = start_server(&docs, "index.html").await;

    let raw = raw_exchange(server.addr, b"GET 2/secret.txt HTTP/1.1\r\n\r\n").await;
    std::fs::remove_dir_all(&sibling).unwrap();

    assert_eq!(
        String::from_utf8_lossy(&raw),
        "HTTP/1.1 404 Not Found\r\nConnection: close\r\n\r\n"
    );
}

#[tokio::test]
async fn test_bad_version_wins_over_bad_method() {
    let docs = scratch_dir("order");
    let server = start_server(&docs, "index.html").await;

    let raw = raw_exchange(server.addr, b"PUT /missing HTTP/2\r\n\r\n").await;
    assert!(raw.starts_with(b"HTTP/1.1 400 Bad Request\r\n"));

    let raw = raw_exchange(server.addr, b"PUT /missing HTTP/1.1\r\n\r\n").await;
    assert!(raw.starts_with(b"HTTP/1.1 501 Not Implemented\r\n"));
}

#[tokio::test]
async fn test_content_length_and_repeatable_headers() {
    let docs = scratch_dir("headers");
    let content = b"0123456789\nabcdef\n";
    docs.write("f.txt", content);
    let server = start_server(&docs, "index.html").await;

    let request = b"GET /f.txt HTTP/1.1\r\nHost: 127.0.0.1\r\nConnection: close\r\n\r\n";
    let first = raw_exchange(server.addr, request).await;
    let second = raw_exchange(server.addr, request).await;

    let first_lines = header_lines(&first);
    assert_eq!(first_lines[0], "HTTP/1.1 200 OK");
    assert!(first_lines[1].starts_with("Date: "));
    assert_eq!(first_lines[2], format!("Content-Length: {}", content.len()));
    assert_eq!(first_lines[3], "Connection: Close");
    assert!(first.ends_with(content));

    let without_date = |lines: Vec<String>| -> Vec<String> {
        lines.into_iter().filter(|l| !l.starts_with("Date: ")).collect()
    };
    assert_eq!(without_date(first_lines), without_date(header_lines(&second)));
}

#[tokio::test]
async fn test_oversized_response_rejected_and_server_survives() {
    let docs = scratch_dir("oversized");
    docs.write("big.txt", &vec![b'z'; MAX_MESSAGE_SIZE * 2]);
    docs.write("small.txt", b"ok");
    let server = start_server(&docs, "index.html").await;

    let url = Url::parse(&server.url("/big.txt")).unwrap();
    let err = Exchange::new(&url, server.port()).run().await.unwrap_err();
    assert!(matches!(err, ClientError::Protocol(ParseError::TooLarge(_))));
    assert_eq!(err.exit_code(), 2);

    let body = Exchange::new(&url, server.port())
        .with_max_response_size(MAX_MESSAGE_SIZE * 4)
        .run()
        .await
        .unwrap();
    assert_eq!(body.len(), MAX_MESSAGE_SIZE * 2);

    let url = Url::parse(&server.url("/small.txt")).unwrap();
    let body = Exchange::new(&url, server.port()).run().await.unwrap();
    assert_eq!(&body[..], b"ok");
}

#[tokio::test]
async fn test_connection_refused_is_transport_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let url = Url::parse(&format!("http://127.0.0.1:{port}/")).unwrap();
    let err = Exchange::new(&url, port.to_string()).run().await.unwrap_err();

    assert!(matches!(err, ClientError::Transport(_)));
    assert_eq!(err.exit_code(), 1);
}

#[tokio::test]
async fn test_shutdown_while_idle_stops_loop() {
    let docs = scratch_dir("idle-stop");
    let server = start_server(&docs, "index.html").await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(server.shutdown.trigger(), ShutdownMode::Immediate);

    let result = tokio::time::timeout(Duration::from_secs(2), server.handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}

#[tokio::test]
async fn test_shutdown_mid_exchange_finishes_response() {
    let docs = scratch_dir("busy-stop");
    docs.write("index.html", b"still served");
    let server = start_server(&docs, "index.html").await;

    let mut stream = TcpStream::connect(server.addr).await.unwrap();
    stream.write_all(b"GET / HTTP/1.1\r\n").await.unwrap();
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(server.shutdown.trigger(), ShutdownMode::AfterExchange);

    stream.write_all(b"\r\n").await.unwrap();
    let mut out = Vec::new();
    stream.read_to_end(&mut out).await.unwrap();

    assert!(out.starts_with(b"HTTP/1.1 200 OK\r\n"));
    assert!(out.ends_with(b"still served"));

    let result = tokio::time::timeout(Duration::from_secs(2), server.handle)
        .await
        .unwrap()
        .unwrap();
    assert!(result.is_ok());
}
