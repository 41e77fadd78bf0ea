//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tokio::task::JoinHandle;

use post_logger::config::{ListenerConfig, ServerConfig};
use post_logger::sink::MemorySink;
use post_logger::{HttpServer, Listener, Shutdown};

/// A server running in the background of the current test runtime.
pub struct TestServer {
    pub addr: SocketAddr,
    pub sink: Arc<MemorySink>,
    pub shutdown: Shutdown,
    pub handle: JoinHandle<()>,
}

impl TestServer {
    /// Start on an ephemeral loopback port.
    pub async fn start(mut config: ServerConfig) -> Self {
        config.listener = ListenerConfig {
            host: "127.0.0.1".into(),
            port: 0,
        };

        let listener = Listener::bind(&config.listener).await.unwrap();
        let addr = listener.local_addr();
        let sink = Arc::new(MemorySink::new());
        let shutdown = Shutdown::new();

        let server = HttpServer::with_sink(config, sink.clone());
        let signal = shutdown.subscribe();
        let handle = tokio::spawn(async move {
            server.run(listener, signal).await;
        });

        Self {
            addr,
            sink,
            shutdown,
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Write `request` verbatim and read until the server closes.
    pub async fn raw(&self, request: &[u8]) -> String {
        let mut stream = TcpStream::connect(self.addr).await.unwrap();
        stream.write_all(request).await.unwrap();
        read_all(&mut stream).await
    }

    pub async fn post(&self, body: &str) -> String {
        let request = format!(
            "POST /submit HTTP/1.1\r\nHost: test\r\nContent-Length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        self.raw(request.as_bytes()).await
    }

    pub async fn stop(self) {
        self.shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(5), self.handle)
            .await
            .expect("server did not stop")
            .unwrap();
    }
}

/// Read a response to EOF, tolerating a reset from a server that gave up.
pub async fn read_all(stream: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let _ = tokio::time::timeout(Duration::from_secs(10), stream.read_to_end(&mut buf))
        .await
        .expect("server never closed the connection");
    String::from_utf8_lossy(&buf).into_owned()
}

/// Status line of a raw response.
pub fn status_line(response: &str) -> &str {
    response.lines().next().unwrap_or("")
}

/// Body of a raw response.
pub fn body(response: &str) -> &str {
    response.split_once("\r\n\r\n").map(|(_, b)| b).unwrap_or("")
}

static SCRATCH_COUNTER: AtomicU32 = AtomicU32::new(0);

/// A fresh directory under the system temp dir.
pub fn scratch_dir() -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "post-logger-it-{}-{}",
        std::process::id(),
        SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed)
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}
