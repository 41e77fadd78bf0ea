//! Chat notifications for poll failures.

use reqwest::StatusCode;
use serde::Serialize;

use crate::config::NotifyConfig;

#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("notification request failed: {0}")]
    Send(#[from] reqwest::Error),
    #[error("notification endpoint answered {0}")]
    Status(StatusCode),
}

#[derive(Serialize)]
struct Message<'a> {
    channel: &'a str,
    text: &'a str,
}

/// Posts `{"channel", "text"}` messages with a bearer token.
#[derive(Debug, Clone)]
pub struct Notifier {
    client: reqwest::Client,
    config: NotifyConfig,
}

impl Notifier {
    pub fn new(client: reqwest::Client, config: NotifyConfig) -> Self {
        Self { client, config }
    }

    /// Whether a token is configured.
    pub fn is_enabled(&self) -> bool {
        self.config.token.is_some()
    }

    /// Send `text` to the configured channel. A no-op without a token.
    pub async fn notify(&self, text: &str) -> Result<(), NotifyError> {
        let Some(token) = &self.config.token else {
            return Ok(());
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(token)
            .json(&Message {
                channel: &self.config.channel,
                text,
            })
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NotifyError::Status(response.status()));
        }
        Ok(())
    }
}
