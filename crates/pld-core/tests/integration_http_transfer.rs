//! Integration test: HttpTransfer and the HEAD probe against a local HTTP server.

mod common;

use std::collections::HashMap;

use common::static_server::{self, StaticServerOptions};
use pld_core::config::HttpConfig;
use pld_core::provider::{ProgressEvent, StreamHandle, StreamId};
use pld_core::transfer::{head, HttpTransfer, TransferError};
use tempfile::tempdir;

fn handle(url: &str, size: u64) -> StreamHandle {
    StreamHandle {
        id: StreamId::new("local:251"),
        title: "Local Stream".to_string(),
        total_size: size,
        extension: "webm".to_string(),
        source_url: url.to_string(),
        headers: HashMap::new(),
    }
}

#[test]
fn fetch_writes_file_and_reports_every_byte() {
    let body: Vec<u8> = (0u8..=250).cycle().take(200 * 1024).collect();
    let server = static_server::start(body.clone());
    let dir = tempdir().unwrap();

    let mut events: Vec<ProgressEvent> = Vec::new();
    let path = HttpTransfer::default()
        .fetch(
            &handle(&server.url, body.len() as u64),
            dir.path(),
            "Local Stream.webm",
            &mut |e| events.push(e),
        )
        .unwrap();

    assert_eq!(path, dir.path().join("Local Stream.webm"));
    assert_eq!(std::fs::read(&path).unwrap(), body);
    assert!(!dir.path().join("Local Stream.webm.part").exists());

    assert!(!events.is_empty());
    let sum: u64 = events.iter().map(|e| e.chunk_bytes).sum();
    assert_eq!(sum, body.len() as u64);
    assert!(events
        .windows(2)
        .all(|w| w[1].remaining_bytes <= w[0].remaining_bytes));
    assert_eq!(events.last().unwrap().remaining_bytes, 0);
}

#[test]
fn fetch_forwards_stream_headers() {
    let server = static_server::start(b"abc".to_vec());
    let dir = tempdir().unwrap();
    let mut h = handle(&server.url, 3);
    h.headers
        .insert("User-Agent".to_string(), "pld-test/1.0".to_string());

    HttpTransfer::default()
        .fetch(&h, dir.path(), "a.webm", &mut |_| {})
        .unwrap();

    let requests = server.requests.lock().unwrap();
    assert!(requests
        .iter()
        .any(|r| r.to_ascii_lowercase().contains("user-agent: pld-test/1.0")));
}

#[test]
fn short_body_is_partial_transfer_and_leaves_nothing() {
    let server = static_server::start(vec![7u8; 1000]);
    let dir = tempdir().unwrap();

    let err = HttpTransfer::default()
        .fetch(&handle(&server.url, 4000), dir.path(), "short.webm", &mut |_| {})
        .unwrap_err();

    match err {
        TransferError::PartialTransfer { expected, received } => {
            assert_eq!(expected, 4000);
            assert_eq!(received, 1000);
        }
        other => panic!("expected PartialTransfer, got {}", other),
    }
    assert!(!dir.path().join("short.webm").exists());
    assert!(!dir.path().join("short.webm.part").exists());
}

#[test]
fn http_error_status_is_reported_without_progress() {
    let server = static_server::start_with_options(
        vec![1u8; 64],
        StaticServerOptions {
            status: 403,
            ..Default::default()
        },
    );
    let dir = tempdir().unwrap();

    let mut events = 0usize;
    let err = HttpTransfer::default()
        .fetch(&handle(&server.url, 64), dir.path(), "x.webm", &mut |_| events += 1)
        .unwrap_err();

    assert!(matches!(err, TransferError::Http(403)));
    assert_eq!(events, 0);
    assert!(!dir.path().join("x.webm").exists());
}

#[test]
fn body_without_content_length_still_completes() {
    let body = vec![9u8; 5000];
    let server = static_server::start_with_options(
        body.clone(),
        StaticServerOptions {
            send_length: false,
            ..Default::default()
        },
    );
    let dir = tempdir().unwrap();
    let path = HttpTransfer::new(HttpConfig::default())
        .fetch(&handle(&server.url, 5000), dir.path(), "n.webm", &mut |_| {})
        .unwrap();
    assert_eq!(std::fs::read(path).unwrap(), body);
}

#[test]
fn head_probe_reads_content_length() {
    let server = static_server::start(vec![0u8; 4321]);
    let result = head::probe(&server.url, &HashMap::new(), &HttpConfig::default()).unwrap();
    assert_eq!(result.content_length, Some(4321));
    assert_eq!(result.content_type.as_deref(), Some("audio/webm"));
}

#[test]
fn head_probe_rejects_error_status() {
    let server = static_server::start_with_options(
        vec![0u8; 10],
        StaticServerOptions {
            head_allowed: false,
            ..Default::default()
        },
    );
    assert!(head::probe(&server.url, &HashMap::new(), &HttpConfig::default()).is_err());
}
