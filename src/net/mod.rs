//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming TCP connection
//!     → listener.rs (sequential accept)
//!     → connection.rs (id, state machine)
//!     → Hand off to HTTP layer
//!
//! Connection States:
//!     AwaitRequest → ReadHeaders → ReadBody → WriteResponse → Closed
//! ```

pub mod connection;
pub mod listener;

pub use connection::{Connection, ConnectionId, ConnectionState};
pub use listener::{Listener, ListenerError};
