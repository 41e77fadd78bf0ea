//! Fetch a URL on a fixed interval and relay the body to a webhook.
//!
//! # Responsibilities
//! - GET the polling URL and reject unexpected content types
//! - POST the body, with its content type, to the webhook
//! - Treat any webhook status other than `200 OK` as a failure
//! - Report failures and keep polling until shutdown
//!
//! # Design Decisions
//! - The first poll happens one interval after start, not immediately
//! - A poll in progress is finished before shutdown is honoured

use std::time::Duration;

use axum::body::Bytes;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::config::PollerConfig;
use crate::lifecycle::ShutdownSignal;
use crate::poller::notify::Notifier;

/// Why one poll-and-forward round failed.
#[derive(Debug, thiserror::Error)]
pub enum PollError {
    #[error("error polling {url}: {source}")]
    Poll {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("unexpected Content-Type, expected {expected} but got {actual}")]
    UnexpectedContentType { expected: String, actual: String },
    #[error("error reading response body: {0}")]
    ReadBody(#[source] reqwest::Error),
    #[error("error sending to webhook {url}: {source}")]
    Forward {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("non-OK HTTP status from webhook {url}: {status}\n{body}")]
    WebhookStatus {
        url: String,
        status: StatusCode,
        body: String,
    },
}

/// Polls one URL and forwards what it returns.
#[derive(Debug)]
pub struct Poller {
    client: reqwest::Client,
    poll_url: String,
    webhook_url: String,
    expected_mime_type: String,
    interval: Duration,
    notifier: Notifier,
}

impl Poller {
    /// Build a poller with its own HTTP client.
    pub fn new(config: &PollerConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self::with_client(config, client))
    }

    /// Build a poller around an existing client, used as given.
    pub fn with_client(config: &PollerConfig, client: reqwest::Client) -> Self {
        Self {
            notifier: Notifier::new(client.clone(), config.notify.clone()),
            client,
            poll_url: config.poll_url.clone(),
            webhook_url: config.webhook_url.clone(),
            expected_mime_type: config.expected_mime_type.clone(),
            interval: Duration::from_millis(config.interval_ms),
        }
    }

    /// Poll once and forward the body. Returns the number of bytes forwarded.
    pub async fn poll_once(&self) -> Result<usize, PollError> {
        let response = self
            .client
            .get(&self.poll_url)
            .send()
            .await
            .map_err(|source| PollError::Poll {
                url: self.poll_url.clone(),
                source,
            })?;

        let mime_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if !mime_type.starts_with(&self.expected_mime_type) {
            return Err(PollError::UnexpectedContentType {
                expected: self.expected_mime_type.clone(),
                actual: mime_type,
            });
        }

        let body = response.bytes().await.map_err(PollError::ReadBody)?;
        let forwarded = body.len();
        self.forward(&mime_type, body).await?;

        tracing::debug!(
            bytes = forwarded,
            webhook_url = %self.webhook_url,
            "Forwarded poll response"
        );
        Ok(forwarded)
    }

    async fn forward(&self, mime_type: &str, body: Bytes) -> Result<(), PollError> {
        let response = self
            .client
            .post(&self.webhook_url)
            .header(CONTENT_TYPE, mime_type)
            .body(body)
            .send()
            .await
            .map_err(|source| PollError::Forward {
                url: self.webhook_url.clone(),
                source,
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(PollError::WebhookStatus {
                url: self.webhook_url.clone(),
                status,
                body,
            });
        }

        Ok(())
    }

    /// Poll on every tick until `shutdown` fires.
    pub async fn run(&self, mut shutdown: ShutdownSignal) {
        tracing::info!(
            poll_url = %self.poll_url,
            webhook_url = %self.webhook_url,
            interval_ms = self.interval.as_millis() as u64,
            notifications = self.notifier.is_enabled(),
            "Polling started"
        );

        let mut ticker = interval_at(Instant::now() + self.interval, self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::debug!("Polling cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.poll_once().await {
                        tracing::error!(error = %e, "Error in poll and forward");
                        let message = format!("Error in poll and forward: {e}");
                        if let Err(e) = self.notifier.notify(&message).await {
                            tracing::warn!(error = %e, "Failed to send error notification");
                        }
                    }
                }
            }
        }
    }
}
