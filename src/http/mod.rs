//! HTTP ingress subsystem.
//!
//! # Data Flow
//! ```text
//! Inbound request
//!     → server.rs (axum catch-all, middleware, body read)
//!     → request.rs (capture method/headers/body, re-aim at target)
//!     → Retrier::add
//!     → 200 to the caller (507 when the queue is full)
//! ```

pub mod request;
pub mod server;

pub use request::ForwardedRequest;
pub use server::RelayServer;
