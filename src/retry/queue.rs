//! Bounded FIFO buffer backing the retry engine.
//!
//! The queue tracks two kinds of occupancy: items sitting in the buffer
//! and items checked out by the retry cycle currently running. Capacity
//! bounds their sum, which keeps the bound honest for producers while
//! guaranteeing that a cycle can always put its items back.

use std::collections::VecDeque;
use std::sync::Mutex;

use thiserror::Error;

/// Returned by an insert against a queue that is at capacity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("the queue is full")]
pub struct QueueFullError;

pub(crate) struct BoundedQueue<T> {
    state: Mutex<State<T>>,
    capacity: usize,
}

struct State<T> {
    buf: VecDeque<T>,
    /// Slots held by items checked out via [`BoundedQueue::take_batch`].
    reserved: usize,
}

impl<T> BoundedQueue<T> {
    pub(crate) fn new(capacity: usize) -> Self {
        Self {
            state: Mutex::new(State {
                buf: VecDeque::with_capacity(capacity),
                reserved: 0,
            }),
            capacity,
        }
    }

    /// Insert at the back unless the queue is at capacity. The capacity
    /// check and the insert happen under one lock section, so concurrent
    /// producers can never overflow the bound.
    pub(crate) fn try_push(&self, value: T) -> Result<(), QueueFullError> {
        let mut state = self.lock();
        if state.buf.len() + state.reserved >= self.capacity {
            return Err(QueueFullError);
        }
        state.buf.push_back(value);
        Ok(())
    }

    /// Check out everything currently buffered, keeping the slots
    /// reserved until each item is settled via [`release`],
    /// [`requeue_back`] or [`requeue_front`].
    ///
    /// [`release`]: BoundedQueue::release
    /// [`requeue_back`]: BoundedQueue::requeue_back
    /// [`requeue_front`]: BoundedQueue::requeue_front
    pub(crate) fn take_batch(&self) -> VecDeque<T> {
        let mut state = self.lock();
        let batch: VecDeque<T> = state.buf.drain(..).collect();
        state.reserved += batch.len();
        batch
    }

    /// Settle a checked-out item that reached a terminal state.
    pub(crate) fn release(&self) {
        let mut state = self.lock();
        state.reserved = state.reserved.saturating_sub(1);
    }

    /// Put a checked-out item back at the end of the queue.
    pub(crate) fn requeue_back(&self, value: T) {
        let mut state = self.lock();
        state.buf.push_back(value);
        state.reserved = state.reserved.saturating_sub(1);
    }

    /// Put checked-out items back at the front of the queue, preserving
    /// their order and jumping ahead of anything enqueued since they
    /// were taken.
    pub(crate) fn requeue_front(&self, batch: VecDeque<T>) {
        let mut state = self.lock();
        state.reserved = state.reserved.saturating_sub(batch.len());
        for value in batch.into_iter().rev() {
            state.buf.push_front(value);
        }
    }

    /// Logical length: buffered items plus checked-out items.
    pub(crate) fn len(&self) -> usize {
        let state = self.lock();
        state.buf.len() + state.reserved
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, State<T>> {
        self.state.lock().expect("retry queue mutex poisoned")
    }
}
