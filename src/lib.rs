//! POST body logger library, plus the poller that feeds it.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod poller;
pub mod sink;

pub use config::schema::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use net::Listener;
pub use poller::Poller;
