//! Retry engine subsystem.
//!
//! # Data Flow
//! ```text
//! Producer (ingress handler):
//!     Retrier::add → atomic check-and-insert into the bounded queue
//!                  → QueueFullError when at capacity (never blocks)
//!
//! Consumer (one task per Retrier, armed by Retrier::start):
//!     interval tick → Retrier::retry
//!         → check out everything queued at cycle start
//!         → per item, FIFO: bump retry count → expire / attempt
//!             success          → discard
//!             retryable fail   → re-enqueue at the back
//!             exhausted fail   → drop
//!             fail + abort     → defer failed item and the whole
//!                                unprocessed remainder to next cycle
//! ```
//!
//! # Design Decisions
//! - Capacity counts checked-out items too, so a full cycle can always
//!   put its items back without overflowing the bound
//! - Items are processed strictly sequentially within a cycle: at most
//!   one delivery in flight per Retrier
//! - The engine sees only success/failure from an action, never why
//! - Shutdown is observed between ticks; queued items are abandoned

mod item;
mod queue;
mod retrier;

pub use item::Item;
pub use queue::QueueFullError;
pub use retrier::{Action, ActionError, Retrier};
