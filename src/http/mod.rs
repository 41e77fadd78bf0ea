//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper HTTP/1.1, one request per connection, middleware)
//!     → POST:  handler.rs → request.rs (Content-Length, exact body read)
//!              → sink (stdout) → response.rs (200 / 4xx / 5xx)
//!     → other: files.rs (static files, directory listings, 501)
//!     → Send to client, close
//! ```

pub mod files;
pub mod handler;
pub mod request;
pub mod response;
pub mod server;

pub use request::{IncomingRequest, UuidRequestId, X_REQUEST_ID};
pub use response::RequestError;
pub use server::{AppState, HttpServer};
