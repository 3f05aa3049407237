//! Minimal HTTP/1.1 server for integration tests.
//!
//! Serves one static body to HEAD and GET. Raw request heads are recorded so
//! tests can check forwarded headers.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::{Arc, Mutex};
use std::thread;

#[derive(Debug, Clone, Copy)]
pub struct StaticServerOptions {
    /// Status line code for GET; bodies are only sent for 200.
    pub status: u16,
    /// If false, HEAD returns 405.
    pub head_allowed: bool,
    /// If false, responses carry no Content-Length (body ends at close).
    pub send_length: bool,
}

impl Default for StaticServerOptions {
    fn default() -> Self {
        Self {
            status: 200,
            head_allowed: true,
            send_length: true,
        }
    }
}

pub struct StaticServer {
    pub url: String,
    pub requests: Arc<Mutex<Vec<String>>>,
}

/// Starts a server in a background thread serving `body`. It runs until the
/// process exits.
pub fn start(body: Vec<u8>) -> StaticServer {
    start_with_options(body, StaticServerOptions::default())
}

pub fn start_with_options(body: Vec<u8>, opts: StaticServerOptions) -> StaticServer {
    let listener = TcpListener::bind("127.0.0.1:0").expect("bind");
    let port = listener.local_addr().unwrap().port();
    let body = Arc::new(body);
    let requests = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&requests);
    thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let body = Arc::clone(&body);
            let seen = Arc::clone(&seen);
            thread::spawn(move || handle(stream, &body, opts, &seen));
        }
    });
    StaticServer {
        url: format!("http://127.0.0.1:{}/stream", port),
        requests,
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        _ => "Error",
    }
}

fn handle(mut stream: TcpStream, body: &[u8], opts: StaticServerOptions, seen: &Mutex<Vec<String>>) {
    let _ = stream.set_read_timeout(Some(std::time::Duration::from_secs(2)));
    let _ = stream.set_write_timeout(Some(std::time::Duration::from_secs(2)));
    let mut buf = [0u8; 8192];
    let n = match stream.read(&mut buf) {
        Ok(0) | Err(_) => return,
        Ok(n) => n,
    };
    let request = String::from_utf8_lossy(&buf[..n]).into_owned();
    let method = request.split_whitespace().next().unwrap_or("").to_string();
    seen.lock().unwrap().push(request);

    let length_header = |len: usize| {
        if opts.send_length {
            format!("Content-Length: {}\r\n", len)
        } else {
            String::new()
        }
    };

    if method.eq_ignore_ascii_case("HEAD") {
        let response = if opts.head_allowed {
            format!(
                "HTTP/1.1 200 OK\r\n{}Content-Type: audio/webm\r\n\r\n",
                length_header(body.len())
            )
        } else {
            "HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n".to_string()
        };
        let _ = stream.write_all(response.as_bytes());
        return;
    }
    if method.eq_ignore_ascii_case("GET") {
        let payload: &[u8] = if opts.status == 200 { body } else { b"denied" };
        let response = format!(
            "HTTP/1.1 {} {}\r\n{}Connection: close\r\n\r\n",
            opts.status,
            reason(opts.status),
            length_header(payload.len())
        );
        let _ = stream.write_all(response.as_bytes());
        let _ = stream.write_all(payload);
        return;
    }
    let _ = stream.write_all(b"HTTP/1.1 405 Method Not Allowed\r\nContent-Length: 0\r\n\r\n");
}
