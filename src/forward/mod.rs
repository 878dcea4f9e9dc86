//! Downstream delivery subsystem.
//!
//! Every external call has a deadline: each attempt runs under the
//! configured per-attempt timeout, so a stalled target can never wedge
//! the retry cycle.

pub mod client;

pub use client::{DeliveryError, HttpForwarder};
