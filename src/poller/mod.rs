//! Poll-and-forward subsystem behind the `polldancer` binary.
//!
//! # Data Flow
//! ```text
//! interval tick
//!     → forward.rs: GET poll_url, check Content-Type prefix
//!     → POST body to webhook_url (a running body logger), expect 200
//!     → on failure: error log + notify.rs chat message (when a token is set)
//! ```

pub mod forward;
pub mod notify;

pub use forward::{PollError, Poller};
pub use notify::{NotifyError, Notifier};
