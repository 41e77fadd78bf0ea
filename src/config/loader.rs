//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use crate::config::schema::{PollerConfig, ServerConfig};
use crate::config::validation::{validate_config, validate_poller_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<ServerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<ServerConfig, ConfigError> {
    let config: ServerConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

/// Load and validate poller configuration from a TOML file.
pub fn load_poller_config(path: &Path) -> Result<PollerConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_poller_config(&content)
}

/// Parse and validate poller configuration from TOML text.
pub fn parse_poller_config(content: &str) -> Result<PollerConfig, ConfigError> {
    let config: PollerConfig = toml::from_str(content)?;
    validate_poller_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}
