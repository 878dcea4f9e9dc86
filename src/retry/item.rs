//! Queued unit of retryable work.

use std::time::{Duration, Instant};

/// A payload captured for delivery, plus the retry metadata the engine
/// keeps about it.
///
/// All metadata is owned by the engine; the payload itself is never
/// mutated after capture.
#[derive(Debug, Clone)]
pub struct Item<T> {
    payload: T,
    retry_count: u32,
    enqueued_at: Instant,
}

impl<T> Item<T> {
    pub(crate) fn new(payload: T) -> Self {
        Self {
            payload,
            retry_count: 0,
            enqueued_at: Instant::now(),
        }
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    /// How many times the engine has picked this item up, counting the
    /// attempt currently in flight.
    pub fn retry_count(&self) -> u32 {
        self.retry_count
    }

    /// Time elapsed since the item entered the queue.
    pub fn age(&self) -> Duration {
        self.enqueued_at.elapsed()
    }

    /// Incremented exactly once per cycle that picks the item up.
    pub(crate) fn bump_retry_count(&mut self) {
        self.retry_count += 1;
    }
}
