//! POST body logger.
//!
//! Listens on a TCP port (8082 by default), prints the body of every POST to
//! stdout followed by a `---` separator, answers `200 OK`, and serves files
//! from a directory for every other method.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ net::Listener ──▶ http::HttpServer (one connection at a time)
//!                                        │
//!                         POST ──────────┼────────── GET / HEAD / other
//!                          ▼                              ▼
//!                    http::handler                   http::files
//!                   (Content-Length,               (ServeDir, listings)
//!                    exact body read)
//!                          │
//!                          ▼
//!                    sink::StdoutSink
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use post_logger::config::{load_config, validate_config, ConfigError, LogFormat, ServerConfig};
use post_logger::lifecycle::{signals, Shutdown};
use post_logger::net::Listener;
use post_logger::observability::logging;
use post_logger::HttpServer;

#[derive(Parser, Debug)]
#[command(name = "post-logger")]
#[command(about = "Log the body of every POST request to stdout", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long)]
    bind: Option<String>,

    /// Directory served to non-POST requests
    #[arg(short, long)]
    directory: Option<PathBuf>,

    /// Log level for diagnostics on stderr
    #[arg(long)]
    log_level: Option<String>,

    /// Diagnostic output format
    #[arg(long)]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn into_config(self) -> Result<ServerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ServerConfig::default(),
        };

        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(host) = self.bind {
            config.listener.host = host;
        }
        if let Some(root) = self.directory {
            config.files.root = root;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init(&config.observability)?;

    tracing::info!(
        bind_address = %config.listener.bind_address(),
        root = %config.files.root.display(),
        max_body_bytes = config.limits.max_body_bytes,
        "Configuration loaded"
    );

    let listener = match Listener::bind(&config.listener).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, "Cannot start listener");
            return Err(e.into());
        }
    };

    println!("Server running on port {}", listener.port());

    let shutdown = Arc::new(Shutdown::new());
    signals::trigger_on_signal(shutdown.clone());

    let server = HttpServer::new(config);
    server.run(listener, shutdown.subscribe()).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
