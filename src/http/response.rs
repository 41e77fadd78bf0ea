//! Response handling.
//!
//! # Responsibilities
//! - Build the fixed POST success response
//! - Map per-request failures to status codes
//!
//! # Design Decisions
//! - Success is a bare `200 OK` with an empty body; hyper adds the framing
//!   headers (`content-length: 0`, `date`, `connection: close`)
//! - Every failure is confined to its request; nothing here can stop the
//!   accept loop

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::http::request::ContentLengthError;

/// Why a POST could not be logged.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    /// Missing or unusable `Content-Length`.
    #[error("malformed request: {0}")]
    MalformedRequest(#[from] ContentLengthError),

    /// Peer stopped sending before the declared length arrived.
    #[error("body truncated: expected {expected} bytes: {reason}")]
    TruncatedBody { expected: u64, reason: String },

    /// Declared length is above the configured limit.
    #[error("declared body of {declared} bytes exceeds the {limit} byte limit")]
    BodyTooLarge { declared: u64, limit: usize },

    /// The body could not be written out.
    #[error("failed to record body: {0}")]
    Sink(#[source] std::io::Error),
}

impl RequestError {
    pub fn status(&self) -> StatusCode {
        match self {
            RequestError::MalformedRequest(_) | RequestError::TruncatedBody { .. } => {
                StatusCode::BAD_REQUEST
            }
            RequestError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::Sink(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        (self.status(), self.to_string()).into_response()
    }
}

/// The fixed answer to a logged POST.
pub fn ok() -> Response {
    StatusCode::OK.into_response()
}
