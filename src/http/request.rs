//! Request handling.
//!
//! # Responsibilities
//! - Generate unique request ID (UUID v4)
//! - Parse `Content-Length` strictly
//! - Read exactly the declared number of body bytes into an [`IncomingRequest`]
//!
//! # Design Decisions
//! - Request ID added as early as possible for tracing
//! - The declared length is checked against the limit before any body byte is read
//! - Only `Content-Length` framing is accepted; a chunked body without it is malformed

use std::borrow::Cow;

use axum::body::{Body, Bytes};
use axum::extract::Request;
use axum::http::{header, HeaderMap, HeaderValue, Method};
use tower_http::request_id::{MakeRequestId, RequestId};

use crate::http::response::RequestError;

/// Header carrying the request ID.
pub const X_REQUEST_ID: &str = "x-request-id";

/// Generates a fresh UUID v4 request ID.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &axum::http::Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// The request ID assigned by `SetRequestIdLayer`, or `"unknown"`.
pub fn request_id(headers: &HeaderMap) -> &str {
    headers
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown")
}

/// Problems with the `Content-Length` header.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentLengthError {
    #[error("missing Content-Length header")]
    Missing,
    #[error("Content-Length `{0}` is not an unsigned integer")]
    Invalid(String),
    #[error("conflicting Content-Length values")]
    Conflicting,
}

/// Read the declared body length.
///
/// Repeated headers are accepted only when every value agrees.
///
/// Over a socket, hyper already refuses non-numeric or conflicting values
/// with a 400 before routing, so only `Missing` is reachable from the
/// network. The other variants cover requests built in-process (e.g. a
/// `Router` driven with `oneshot`).
pub fn content_length(headers: &HeaderMap) -> Result<u64, ContentLengthError> {
    let mut declared = None;

    for value in headers.get_all(header::CONTENT_LENGTH) {
        let text = value
            .to_str()
            .map_err(|_| ContentLengthError::Invalid(String::from_utf8_lossy(value.as_bytes()).into_owned()))?
            .trim();

        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ContentLengthError::Invalid(text.to_string()));
        }
        let length: u64 = text
            .parse()
            .map_err(|_| ContentLengthError::Invalid(text.to_string()))?;

        match declared {
            Some(previous) if previous != length => return Err(ContentLengthError::Conflicting),
            _ => declared = Some(length),
        }
    }

    declared.ok_or(ContentLengthError::Missing)
}

/// One POST, fully read. Dropped once the response is sent.
#[derive(Debug, Clone)]
pub struct IncomingRequest {
    pub method: Method,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl IncomingRequest {
    /// Split `request` and read exactly `Content-Length` bytes of body.
    pub async fn read(request: Request, max_body_bytes: usize) -> Result<Self, RequestError> {
        let (parts, body) = request.into_parts();
        let declared = content_length(&parts.headers)?;

        if declared > max_body_bytes as u64 {
            return Err(RequestError::BodyTooLarge {
                declared,
                limit: max_body_bytes,
            });
        }

        let body = read_exact(body, declared).await?;

        Ok(Self {
            method: parts.method,
            headers: parts.headers,
            body,
        })
    }

    /// Body decoded as UTF-8; invalid sequences become U+FFFD.
    ///
    /// `Cow::Owned` means at least one replacement happened.
    pub fn body_text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }
}

async fn read_exact(body: Body, expected: u64) -> Result<Bytes, RequestError> {
    // `expected` is bounded by the body limit, which is a usize
    let limit = usize::try_from(expected).unwrap_or(usize::MAX);

    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| RequestError::TruncatedBody {
            expected,
            reason: e.to_string(),
        })?;

    if bytes.len() as u64 != expected {
        return Err(RequestError::TruncatedBody {
            expected,
            reason: format!("received {} bytes", bytes.len()),
        });
    }

    Ok(bytes)
}
