//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → tracing events and spans (connection, request)
//!     → logging.rs subscriber → stderr (pretty or JSON)
//! ```
//!
//! Logged POST bodies are not diagnostics; they go through `crate::sink`.

pub mod logging;
