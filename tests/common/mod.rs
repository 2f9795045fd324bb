//! Shared utilities for integration testing.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use console_proxy::config::ProxyConfig;
use console_proxy::http::HttpServer;
use console_proxy::lifecycle::Shutdown;

/// Request heads received by a mock backend, in arrival order.
pub type Captured = Arc<Mutex<Vec<String>>>;

/// One write to the socket; `pause` is slept before the next write.
#[derive(Clone)]
pub struct Chunk {
    pub bytes: Vec<u8>,
    pub pause: Duration,
}

impl Chunk {
    pub fn now(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
            pause: Duration::ZERO,
        }
    }

    pub fn then_wait(bytes: impl Into<Vec<u8>>, pause: Duration) -> Self {
        Self {
            bytes: bytes.into(),
            pause,
        }
    }
}

/// Start a mock backend that records each request head and answers with
/// the given raw chunks, then closes the connection.
pub async fn start_raw_backend(chunks: Vec<Chunk>) -> (SocketAddr, Captured) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let seen = captured.clone();

    tokio::spawn(async move {
        loop {
            match listener.accept().await {
                Ok((mut socket, _)) => {
                    let chunks = chunks.clone();
                    let seen = seen.clone();
                    tokio::spawn(async move {
                        let head = read_head(&mut socket).await;
                        seen.lock().unwrap().push(head);
                        for chunk in chunks {
                            if socket.write_all(&chunk.bytes).await.is_err() {
                                return;
                            }
                            let _ = socket.flush().await;
                            if !chunk.pause.is_zero() {
                                tokio::time::sleep(chunk.pause).await;
                            }
                        }
                        let _ = socket.shutdown().await;
                    });
                }
                Err(_) => break,
            }
        }
    });

    (addr, captured)
}

/// Start a mock backend answering every request with one complete response.
pub async fn start_mock_backend(status_line: &str, headers: &[(&str, &str)], body: &[u8]) -> (SocketAddr, Captured) {
    let mut response = format!("HTTP/1.1 {}\r\n", status_line);
    for (k, v) in headers {
        response.push_str(&format!("{}: {}\r\n", k, v));
    }
    response.push_str("Connection: close\r\n\r\n");
    let mut bytes = response.into_bytes();
    bytes.extend_from_slice(body);
    start_raw_backend(vec![Chunk::now(bytes)]).await
}

async fn read_head(socket: &mut tokio::net::TcpStream) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1024];
    while !buf.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => break,
            Ok(n) => buf.extend_from_slice(&chunk[..n]),
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// Start the console proxy in front of a 404 fallback, pointed at `backend`.
pub async fn start_proxy(backend: SocketAddr) -> (SocketAddr, Shutdown) {
    let mut config = ProxyConfig::default();
    config.console.endpoint = format!("http://{}", backend);
    config.timeouts.request_secs = 5;
    start_proxy_with(config).await
}

pub async fn start_proxy_with(mut config: ProxyConfig) -> (SocketAddr, Shutdown) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    config.listener.bind_address = addr.to_string();

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config).unwrap();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    (addr, shutdown)
}

/// Client that neither follows redirects nor uses a system proxy.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Case-insensitive lookup of a header line in a captured request head.
#[allow(dead_code)]
pub fn head_has_header(head: &str, name: &str, value: &str) -> bool {
    head.lines().any(|line| {
        line.split_once(':').is_some_and(|(k, v)| {
            k.trim().eq_ignore_ascii_case(name) && v.trim() == value
        })
    })
}
