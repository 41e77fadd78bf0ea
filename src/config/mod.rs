//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse & deserialize)
//!     → CLI flag overrides (main.rs)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → moved into HttpServer
//!
//! polldancer: same path with PollerConfig, moved into poller::Poller
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults so the listener runs with no config at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_poller_config, ConfigError};
pub use schema::{
    FilesConfig, LimitsConfig, ListenerConfig, LogFormat, NotifyConfig, ObservabilityConfig,
    PollerConfig, ServerConfig, TimeoutConfig,
};
pub use validation::{validate_config, validate_poller_config, ValidationError};
