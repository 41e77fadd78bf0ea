//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the listener
//! and for the `polldancer` poller that feeds it.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the body logger.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (host, port).
    pub listener: ListenerConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Request size limits.
    pub limits: LimitsConfig,

    /// Static file serving for non-POST requests.
    pub files: FilesConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Interface to bind (e.g., "0.0.0.0").
    pub host: String,

    /// TCP port. `0` picks an ephemeral port.
    pub port: u16,
}

impl ListenerConfig {
    /// `host:port` string suitable for `SocketAddr` parsing.
    pub fn bind_address(&self) -> String {
        if self.host.contains(':') {
            format!("[{}]:{}", self.host, self.port)
        } else {
            format!("{}:{}", self.host, self.port)
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8082,
        }
    }
}

/// Timeout configuration. A single slow client must not stall the
/// sequential accept loop forever.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Time allowed for the request line and headers to arrive.
    pub header_read_secs: u64,

    /// Time allowed for reading the body and producing the response.
    pub request_secs: u64,

    /// Hard deadline for a whole connection.
    pub connection_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            header_read_secs: 10,
            request_secs: 30,
            connection_secs: 60,
        }
    }
}

/// Request size limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Largest `Content-Length` accepted on POST.
    pub max_body_bytes: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 16 * 1024 * 1024, // 16MiB
        }
    }
}

/// Static file serving configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct FilesConfig {
    /// Directory served to GET/HEAD requests.
    pub root: PathBuf,
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
        }
    }
}

/// Diagnostic log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl std::str::FromStr for LogFormat {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format `{other}` (expected pretty or json)")),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Diagnostic output format.
    pub log_format: LogFormat,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
        }
    }
}

/// Root configuration for the `polldancer` companion binary.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PollerConfig {
    /// URL fetched on every tick.
    pub poll_url: String,

    /// URL the polled body is POSTed to (normally a running body logger).
    pub webhook_url: String,

    /// Time between polls, in milliseconds.
    pub interval_ms: u64,

    /// Required prefix of the polled response's `Content-Type`.
    pub expected_mime_type: String,

    /// Timeout for each outgoing HTTP request.
    pub request_timeout_secs: u64,

    /// Where failures are reported.
    pub notify: NotifyConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            poll_url: "https://jsonplaceholder.typicode.com/todos/1".to_string(),
            webhook_url: "http://localhost:8082".to_string(),
            interval_ms: 5_000,
            expected_mime_type: "application/json".to_string(),
            request_timeout_secs: 10,
            notify: NotifyConfig::default(),
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                log_format: LogFormat::Json,
            },
        }
    }
}

/// Chat notifications for poll failures (Slack `chat.postMessage` shape).
///
/// Disabled while `token` is unset.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct NotifyConfig {
    /// Bearer token; `None` turns notifications off.
    pub token: Option<String>,

    /// Channel the message is posted to.
    pub channel: String,

    /// Endpoint receiving `{"channel", "text"}` JSON.
    pub api_url: String,
}

impl Default for NotifyConfig {
    fn default() -> Self {
        Self {
            token: None,
            channel: "#channel-name".to_string(),
            api_url: "https://slack.com/api/chat.postMessage".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_listen_on_8082() {
        let config = ServerConfig::default();
        assert_eq!(config.listener.port, 8082);
        assert_eq!(config.listener.bind_address(), "0.0.0.0:8082");
        assert_eq!(config.files.root, PathBuf::from("."));
    }

    #[test]
    fn log_format_from_flag() {
        assert_eq!("JSON".parse::<LogFormat>(), Ok(LogFormat::Json));
        assert_eq!("pretty".parse::<LogFormat>(), Ok(LogFormat::Pretty));
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn ipv6_host_is_bracketed() {
        let listener = ListenerConfig {
            host: "::1".to_string(),
            port: 9000,
        };
        assert_eq!(listener.bind_address(), "[::1]:9000");
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            [listener]
            port = 9999

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.listener.port, 9999);
        assert_eq!(config.listener.host, "0.0.0.0");
        assert_eq!(config.timeouts.request_secs, 30);
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn poller_defaults_forward_to_local_logger() {
        let config = PollerConfig::default();
        assert_eq!(config.webhook_url, "http://localhost:8082");
        assert_eq!(config.interval_ms, 5_000);
        assert_eq!(config.expected_mime_type, "application/json");
        assert!(config.notify.token.is_none());
        assert_eq!(config.observability.log_format, LogFormat::Json);
    }

    #[test]
    fn poller_notify_section_is_optional() {
        let config: PollerConfig = toml::from_str(
            r#"
            poll_url = "http://127.0.0.1:9000/status.json"

            [notify]
            token = "xoxb-test"
            "#,
        )
        .unwrap();

        assert_eq!(config.poll_url, "http://127.0.0.1:9000/status.json");
        assert_eq!(config.notify.token.as_deref(), Some("xoxb-test"));
        assert_eq!(config.notify.channel, "#channel-name");
    }
}
