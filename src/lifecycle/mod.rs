//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! SIGINT/SIGTERM → signals.rs → Shutdown::trigger
//!     → ingress stops accepting, drains for a bounded grace period
//!     → retry loop exits between ticks, queued items abandoned
//! ```

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
