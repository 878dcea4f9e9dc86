//! Forwarding HTTP relay with an asynchronous retry queue.

pub mod config;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod retry;

pub use config::RelayConfig;
pub use forward::HttpForwarder;
pub use http::RelayServer;
pub use lifecycle::Shutdown;
pub use retry::{Action, Item, Retrier};
