//! HTTP server setup and the accept loop.
//!
//! # Responsibilities
//! - Create the Axum Router: POST handler plus static file fallback
//! - Wire up middleware (request ID, tracing, request timeout)
//! - Accept connections one at a time and serve each to completion
//! - Drain the in-flight connection on shutdown

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::Request;
use axum::routing::post;
use axum::{Extension, Router};
use hyper::server::conn::http1;
use hyper_util::rt::{TokioIo, TokioTimer};
use hyper_util::service::TowerToHyperService;
use tokio::net::TcpStream;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::Instrument;

use crate::config::ServerConfig;
use crate::http::files::{self, StaticFiles};
use crate::http::handler;
use crate::http::request::{request_id, UuidRequestId};
use crate::lifecycle::ShutdownSignal;
use crate::net::{Connection, ConnectionState, Listener};
use crate::sink::{BodySink, StdoutSink};

/// Pause after a failed accept (e.g. out of file descriptors).
const ACCEPT_BACKOFF: Duration = Duration::from_millis(100);

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub sink: Arc<dyn BodySink>,
    pub max_body_bytes: usize,
    pub files: StaticFiles,
}

/// Sequential HTTP/1.1 server logging POST bodies.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
    http: http1::Builder,
}

impl HttpServer {
    /// Create a server that logs bodies to stdout.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_sink(config, Arc::new(StdoutSink))
    }

    /// Create a server that hands bodies to `sink`.
    pub fn with_sink(config: ServerConfig, sink: Arc<dyn BodySink>) -> Self {
        let state = AppState {
            sink,
            max_body_bytes: config.limits.max_body_bytes,
            files: StaticFiles::new(config.files.root.clone()),
        };

        let router = Self::build_router(&config, state);

        // One request per connection: the accept loop is sequential, so an
        // idle keep-alive client would block everybody else.
        let mut http = http1::Builder::new();
        http.keep_alive(false)
            .half_close(true)
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(config.timeouts.header_read_secs));

        Self {
            router,
            config,
            http,
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        let methods = post(handler::log_body).fallback(files::serve_static);

        Router::new()
            .route("/", methods.clone())
            .route("/{*path}", methods)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http().make_span_with(request_span))
            .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
    }

    /// The fully layered router, e.g. for driving it without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Accept and serve connections until `shutdown` fires.
    pub async fn run(self, listener: Listener, mut shutdown: ShutdownSignal) {
        tracing::info!(address = %listener.local_addr(), "HTTP server starting");

        while !shutdown.is_triggered() {
            let accepted = tokio::select! {
                biased;
                _ = shutdown.recv() => break,
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => self.serve_connection(stream, peer, &mut shutdown).await,
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                    tokio::time::sleep(ACCEPT_BACKOFF).await;
                }
            }
        }

        tracing::info!("HTTP server stopped");
    }

    async fn serve_connection(
        &self,
        stream: TcpStream,
        peer: SocketAddr,
        shutdown: &mut ShutdownSignal,
    ) {
        let connection = Connection::new(peer);
        let span = tracing::debug_span!(
            "connection",
            connection_id = %connection.id(),
            peer_addr = %peer
        );

        async {
            let app = self.router.clone().layer(Extension(connection.clone()));
            let conn = self
                .http
                .serve_connection(TokioIo::new(stream), TowerToHyperService::new(app));
            tokio::pin!(conn);

            let deadline = tokio::time::sleep(Duration::from_secs(self.config.timeouts.connection_secs));
            tokio::pin!(deadline);
            let mut draining = false;

            loop {
                tokio::select! {
                    result = conn.as_mut() => {
                        if let Err(e) = result {
                            tracing::debug!(error = %e, "Connection ended with error");
                        }
                        break;
                    }
                    _ = &mut deadline => {
                        tracing::warn!(state = ?connection.state(), "Connection deadline exceeded, dropping");
                        break;
                    }
                    _ = shutdown.recv(), if !draining => {
                        tracing::debug!("Draining connection for shutdown");
                        conn.as_mut().graceful_shutdown();
                        draining = true;
                    }
                }
            }

            connection.advance(ConnectionState::Closed);
            tracing::debug!(peer_addr = %connection.peer(), "Connection closed");
        }
        .instrument(span)
        .await
    }
}

fn request_span(request: &Request) -> tracing::Span {
    tracing::info_span!(
        "request",
        request_id = %request_id(request.headers()),
        method = %request.method(),
        uri = %request.uri()
    )
}
