//! Poll a JSON endpoint on an interval and forward each response to a webhook,
//! normally a running `post-logger`.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use post_logger::config::{
    load_poller_config, validate_poller_config, ConfigError, LogFormat, PollerConfig,
};
use post_logger::lifecycle::{signals, Shutdown};
use post_logger::observability::logging;
use post_logger::Poller;

#[derive(Parser, Debug)]
#[command(name = "polldancer")]
#[command(about = "Poll a URL and forward each response body to a webhook", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// URL fetched on every tick
    #[arg(long)]
    poll_url: Option<String>,

    /// URL the polled body is POSTed to
    #[arg(long)]
    webhook_url: Option<String>,

    /// Milliseconds between polls
    #[arg(long)]
    interval_ms: Option<u64>,

    /// Required Content-Type prefix of the polled response
    #[arg(long)]
    mime_type: Option<String>,

    /// Bearer token for error notifications (enables them)
    #[arg(long)]
    notify_token: Option<String>,

    /// Channel for error notifications
    #[arg(long)]
    notify_channel: Option<String>,

    /// Log level for diagnostics on stderr
    #[arg(long)]
    log_level: Option<String>,

    /// Diagnostic output format
    #[arg(long)]
    log_format: Option<LogFormat>,
}

impl Cli {
    fn into_config(self) -> Result<PollerConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_poller_config(path)?,
            None => PollerConfig::default(),
        };

        if let Some(url) = self.poll_url {
            config.poll_url = url;
        }
        if let Some(url) = self.webhook_url {
            config.webhook_url = url;
        }
        if let Some(interval) = self.interval_ms {
            config.interval_ms = interval;
        }
        if let Some(mime_type) = self.mime_type {
            config.expected_mime_type = mime_type;
        }
        if let Some(token) = self.notify_token {
            config.notify.token = Some(token);
        }
        if let Some(channel) = self.notify_channel {
            config.notify.channel = channel;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if let Some(format) = self.log_format {
            config.observability.log_format = format;
        }

        validate_poller_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Cli::parse().into_config()?;

    logging::init(&config.observability)?;

    let poller = Poller::new(&config)?;

    let shutdown = Arc::new(Shutdown::new());
    signals::trigger_on_signal(shutdown.clone());

    poller.run(shutdown.subscribe()).await;

    tracing::info!("Shutdown complete");
    Ok(())
}
