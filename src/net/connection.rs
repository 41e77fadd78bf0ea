//! Connection state machine and lifecycle tracking.
//!
//! # Responsibilities
//! - Track connection state (AwaitRequest → ReadHeaders → ReadBody → WriteResponse → Closed)
//! - Generate unique connection IDs for tracing
//!
//! A [`Connection`] is created per accepted socket and travels into the
//! request handlers as a request extension, so the handlers advance the same
//! state the accept loop started.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};
use std::sync::Arc;

/// Global atomic counter for connection IDs.
static CONNECTION_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(u64);

impl ConnectionId {
    /// Generate a new unique connection ID.
    pub fn new() -> Self {
        Self(CONNECTION_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Per-connection request lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ConnectionState {
    /// Accepted, waiting for the request line.
    AwaitRequest = 0,
    /// Request line and headers parsed.
    ReadHeaders = 1,
    /// Reading the `Content-Length` delimited body.
    ReadBody = 2,
    /// Response being produced.
    WriteResponse = 3,
    /// Connection finished or dropped.
    Closed = 4,
}

impl ConnectionState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::AwaitRequest,
            1 => Self::ReadHeaders,
            2 => Self::ReadBody,
            3 => Self::WriteResponse,
            _ => Self::Closed,
        }
    }

    /// Whether `next` is a legal successor of `self`.
    ///
    /// Non-POST requests go straight from `ReadHeaders` to `WriteResponse`.
    /// Every state may close.
    pub fn can_advance_to(self, next: ConnectionState) -> bool {
        use ConnectionState::*;
        matches!(
            (self, next),
            (AwaitRequest, ReadHeaders)
                | (ReadHeaders, ReadBody)
                | (ReadHeaders, WriteResponse)
                | (ReadBody, WriteResponse)
                | (_, Closed)
        ) && self != Closed
    }
}

/// Shared handle to one accepted connection.
#[derive(Debug, Clone)]
pub struct Connection {
    id: ConnectionId,
    peer: SocketAddr,
    state: Arc<AtomicU8>,
}

impl Connection {
    /// Start tracking a freshly accepted connection.
    pub fn new(peer: SocketAddr) -> Self {
        Self {
            id: ConnectionId::new(),
            peer,
            state: Arc::new(AtomicU8::new(ConnectionState::AwaitRequest as u8)),
        }
    }

    pub fn id(&self) -> ConnectionId {
        self.id
    }

    pub fn peer(&self) -> SocketAddr {
        self.peer
    }

    pub fn state(&self) -> ConnectionState {
        ConnectionState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Move to `next`. Illegal transitions are logged and ignored.
    pub fn advance(&self, next: ConnectionState) -> bool {
        let current = self.state();
        if !current.can_advance_to(next) {
            tracing::warn!(
                connection_id = %self.id,
                from = ?current,
                to = ?next,
                "Ignoring illegal connection state transition"
            );
            return false;
        }

        self.state.store(next as u8, Ordering::Release);
        tracing::trace!(connection_id = %self.id, from = ?current, to = ?next, "Connection state");
        true
    }
}
