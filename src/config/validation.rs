//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, limits > 0)
//! - Check the bind host and log level are usable
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//!   (likewise for PollerConfig)
//! - Runs before config is accepted into the system

use std::net::IpAddr;

use reqwest::Url;

use crate::config::schema::{PollerConfig, ServerConfig};

const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("listener.host `{0}` is not an IP address")]
    InvalidHost(String),
    #[error("timeouts.{0} must be greater than zero")]
    ZeroTimeout(&'static str),
    #[error("limits.max_body_bytes must be greater than zero")]
    ZeroBodyLimit,
    #[error("files.root must not be empty")]
    EmptyRoot,
    #[error("observability.log_level `{0}` is not one of trace, debug, info, warn, error")]
    UnknownLogLevel(String),
    #[error("{0} `{1}` is not an http(s) URL")]
    InvalidUrl(&'static str, String),
    #[error("interval_ms must be greater than zero")]
    ZeroInterval,
    #[error("request_timeout_secs must be greater than zero")]
    ZeroRequestTimeout,
    #[error("expected_mime_type must not be empty")]
    EmptyMimeType,
}

/// Check every semantic constraint, collecting all failures.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.host.parse::<IpAddr>().is_err() {
        errors.push(ValidationError::InvalidHost(config.listener.host.clone()));
    }

    let timeouts = &config.timeouts;
    for (name, value) in [
        ("header_read_secs", timeouts.header_read_secs),
        ("request_secs", timeouts.request_secs),
        ("connection_secs", timeouts.connection_secs),
    ] {
        if value == 0 {
            errors.push(ValidationError::ZeroTimeout(name));
        }
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError::ZeroBodyLimit);
    }

    if config.files.root.as_os_str().is_empty() {
        errors.push(ValidationError::EmptyRoot);
    }

    check_log_level(&config.observability.log_level, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Same contract as [`validate_config`], for the poller.
pub fn validate_poller_config(config: &PollerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let mut urls = vec![
        ("poll_url", &config.poll_url),
        ("webhook_url", &config.webhook_url),
    ];
    if config.notify.token.is_some() {
        urls.push(("notify.api_url", &config.notify.api_url));
    }
    for (name, value) in urls {
        let usable = Url::parse(value)
            .map(|url| matches!(url.scheme(), "http" | "https"))
            .unwrap_or(false);
        if !usable {
            errors.push(ValidationError::InvalidUrl(name, value.clone()));
        }
    }

    if config.interval_ms == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if config.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.expected_mime_type.trim().is_empty() {
        errors.push(ValidationError::EmptyMimeType);
    }

    check_log_level(&config.observability.log_level, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_log_level(level: &str, errors: &mut Vec<ValidationError>) {
    if !LOG_LEVELS.contains(&level.to_ascii_lowercase().as_str()) {
        errors.push(ValidationError::UnknownLogLevel(level.to_string()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn default_config_is_valid() {
        assert_eq!(validate_config(&ServerConfig::default()), Ok(()));
    }

    #[test]
    fn collects_every_error() {
        let mut config = ServerConfig::default();
        config.listener.host = "localhost".into();
        config.timeouts.request_secs = 0;
        config.timeouts.connection_secs = 0;
        config.limits.max_body_bytes = 0;
        config.files.root = PathBuf::new();
        config.observability.log_level = "loud".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidHost("localhost".into()),
                ValidationError::ZeroTimeout("request_secs"),
                ValidationError::ZeroTimeout("connection_secs"),
                ValidationError::ZeroBodyLimit,
                ValidationError::EmptyRoot,
                ValidationError::UnknownLogLevel("loud".into()),
            ]
        );
    }

    #[test]
    fn default_poller_config_is_valid() {
        assert_eq!(validate_poller_config(&PollerConfig::default()), Ok(()));
    }

    #[test]
    fn poller_rejects_bad_urls_and_zeroes() {
        let mut config = PollerConfig::default();
        config.poll_url = "not a url".into();
        config.webhook_url = "ftp://example.com/drop".into();
        config.interval_ms = 0;
        config.expected_mime_type = " ".into();

        let errors = validate_poller_config(&config).unwrap_err();
        assert_eq!(
            errors,
            vec![
                ValidationError::InvalidUrl("poll_url", "not a url".into()),
                ValidationError::InvalidUrl("webhook_url", "ftp://example.com/drop".into()),
                ValidationError::ZeroInterval,
                ValidationError::EmptyMimeType,
            ]
        );
    }

    #[test]
    fn notify_url_checked_only_when_enabled() {
        let mut config = PollerConfig::default();
        config.notify.api_url = "nowhere".into();
        assert!(validate_poller_config(&config).is_ok());

        config.notify.token = Some("token".into());
        assert_eq!(
            validate_poller_config(&config),
            Err(vec![ValidationError::InvalidUrl("notify.api_url", "nowhere".into())])
        );
    }

    #[test]
    fn log_level_is_case_insensitive() {
        let mut config = ServerConfig::default();
        config.observability.log_level = "DEBUG".into();
        assert!(validate_config(&config).is_ok());
    }
}
