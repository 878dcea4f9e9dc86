//! The retry engine: bounded queue + periodic delivery cycle.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::observability::metrics;

use super::item::Item;
use super::queue::{BoundedQueue, QueueFullError};

/// Opaque failure reported by an [`Action`]. The engine never looks past
/// its presence.
pub type ActionError = Box<dyn std::error::Error + Send + Sync>;

/// Delivery attempt for one queued item.
///
/// Called sequentially, one item at a time, from the retry cycle; an
/// implementation may spawn its own concurrent sub-work (an HTTP call
/// with a deadline, say) as long as it resolves before returning.
#[async_trait]
pub trait Action<T>: Send + Sync {
    async fn attempt(&self, item: &Item<T>) -> Result<(), ActionError>;
}

#[async_trait]
impl<T: Send + Sync, A: Action<T> + ?Sized> Action<T> for Arc<A> {
    async fn attempt(&self, item: &Item<T>) -> Result<(), ActionError> {
        (**self).attempt(item).await
    }
}

/// At-least-once delivery engine over a bounded FIFO queue.
///
/// Producers enqueue through [`add`]; a single periodic task, armed by
/// [`start`], drains the queue once per interval and hands each item to
/// the action, re-enqueueing retryable failures until the retry or age
/// budget runs out.
///
/// [`add`]: Retrier::add
/// [`start`]: Retrier::start
pub struct Retrier<T> {
    queue: BoundedQueue<Item<T>>,
    interval: Duration,
    abort_on_error: bool,
    /// 0 = unlimited.
    max_retries: u32,
    /// Zero = unlimited.
    max_age: Duration,
    action: Box<dyn Action<T>>,
}

impl<T: Send + Sync + 'static> Retrier<T> {
    pub fn new(
        interval: Duration,
        capacity: usize,
        abort_on_error: bool,
        action: impl Action<T> + 'static,
    ) -> Self {
        Self {
            queue: BoundedQueue::new(capacity),
            interval,
            abort_on_error,
            max_retries: 0,
            max_age: Duration::ZERO,
            action: Box::new(action),
        }
    }

    /// Cap the number of reattempts per item; 0 keeps retrying forever.
    /// An item is re-enqueued up to `max_retries` times and dropped on
    /// the attempt after that.
    pub fn with_max_retries(mut self, max_retries: u32) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Drop items older than `max_age` without attempting them; zero
    /// disables the check.
    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    /// Enqueue a payload for delivery on the next cycle.
    ///
    /// Never blocks: a full queue is reported immediately as
    /// [`QueueFullError`] and nothing is inserted. This is the system's
    /// sole backpressure signal.
    pub fn add(&self, payload: T) -> Result<(), QueueFullError> {
        match self.queue.try_push(Item::new(payload)) {
            Ok(()) => {
                let depth = self.queue.len();
                tracing::debug!(depth, "item added to retry queue");
                metrics::record_enqueued(depth);
                Ok(())
            }
            Err(err) => {
                tracing::warn!("retry queue is full");
                metrics::record_queue_full();
                Err(err)
            }
        }
    }

    /// Number of items currently owned by the queue, including any
    /// checked out by an in-progress cycle.
    pub fn queued(&self) -> usize {
        self.queue.len()
    }

    /// Arm the periodic retry cycle on a dedicated task and return its
    /// handle. Returns immediately; the first cycle runs one full
    /// interval after this call. The task exits when the shutdown signal
    /// fires, between ticks, abandoning whatever is still queued.
    pub fn start(self: Arc<Self>, mut shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // An interval yields its first tick immediately; swallow it
            // so cycles line up one interval apart from start.
            ticker.tick().await;

            loop {
                tokio::select! {
                    _ = ticker.tick() => self.retry().await,
                    _ = shutdown.recv() => {
                        tracing::info!(abandoned = self.queue.len(), "retry loop stopping");
                        break;
                    }
                }
            }
        })
    }

    /// Run one retry cycle over the items queued at this instant. Items
    /// enqueued while the cycle runs wait for the next tick.
    pub async fn retry(&self) {
        let mut batch = self.queue.take_batch();
        let count = batch.len();
        if count == 0 {
            return;
        }
        tracing::debug!(count, "retrying queued items");

        while let Some(mut item) = batch.pop_front() {
            item.bump_retry_count();

            if !self.max_age.is_zero() && item.age() >= self.max_age {
                tracing::warn!(
                    age = ?item.age(),
                    max_age = ?self.max_age,
                    "max age reached, dropping item"
                );
                metrics::record_dropped("expired");
                self.queue.release();
                continue;
            }

            tracing::debug!(
                attempt = %n_of_max(item.retry_count(), self.max_retries),
                "attempting delivery"
            );

            match self.action.attempt(&item).await {
                Ok(()) => {
                    tracing::info!(
                        retries = item.retry_count() - 1,
                        age = ?item.age(),
                        "delivered"
                    );
                    metrics::record_attempt("success");
                    self.queue.release();
                }
                Err(err) => {
                    tracing::warn!(
                        error = %err,
                        attempt = %n_of_max(item.retry_count(), self.max_retries),
                        "delivery attempt failed"
                    );
                    metrics::record_attempt("failure");

                    let within_budget =
                        self.max_retries == 0 || item.retry_count() <= self.max_retries;

                    if self.abort_on_error {
                        // Defer the failed item and everything not yet
                        // processed to the next cycle, in order, ahead
                        // of anything enqueued mid-cycle.
                        if within_budget {
                            batch.push_front(item);
                        } else {
                            self.drop_exhausted(&item);
                        }
                        tracing::debug!(deferred = batch.len(), "aborting cycle on failure");
                        self.queue.requeue_front(batch);
                        metrics::record_queue_depth(self.queue.len());
                        return;
                    }

                    if within_budget {
                        self.queue.requeue_back(item);
                    } else {
                        self.drop_exhausted(&item);
                    }
                }
            }
        }

        if self.queue.is_empty() {
            tracing::debug!("retry queue drained");
        }
        metrics::record_queue_depth(self.queue.len());
    }

    fn drop_exhausted(&self, item: &Item<T>) {
        tracing::warn!(
            attempt = %n_of_max(item.retry_count(), self.max_retries),
            age = ?item.age(),
            "max retries reached, dropping item"
        );
        metrics::record_dropped("exhausted");
        self.queue.release();
    }
}

fn n_of_max(n: u32, max: u32) -> String {
    if max != 0 {
        format!("{n} of {max}")
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct AlwaysFail;

    #[async_trait]
    impl Action<u32> for AlwaysFail {
        async fn attempt(&self, _item: &Item<u32>) -> Result<(), ActionError> {
            Err("downstream unavailable".into())
        }
    }

    /// Records (payload, retry_count) per attempt; fails payloads in
    /// `fail`.
    #[derive(Default)]
    struct Recording {
        attempts: Mutex<Vec<(u32, u32)>>,
        fail: Vec<u32>,
    }

    #[async_trait]
    impl Action<u32> for Recording {
        async fn attempt(&self, item: &Item<u32>) -> Result<(), ActionError> {
            self.attempts
                .lock()
                .unwrap()
                .push((*item.payload(), item.retry_count()));
            if self.fail.contains(item.payload()) {
                Err("scripted failure".into())
            } else {
                Ok(())
            }
        }
    }

    fn short() -> Duration {
        Duration::from_millis(10)
    }

    #[tokio::test]
    async fn add_rejects_when_full_without_changing_length() {
        let retrier = Retrier::new(short(), 2, false, AlwaysFail);
        retrier.add(1).unwrap();
        retrier.add(2).unwrap();
        assert_eq!(retrier.add(3), Err(QueueFullError));
        assert_eq!(retrier.queued(), 2);
    }

    #[tokio::test]
    async fn retry_count_increments_once_per_cycle() {
        let action = Arc::new(Recording {
            fail: vec![7],
            ..Recording::default()
        });
        let retrier = Retrier::new(short(), 4, false, action.clone());
        retrier.add(7).unwrap();

        for _ in 0..3 {
            retrier.retry().await;
        }

        let attempts = action.attempts.lock().unwrap().clone();
        assert_eq!(attempts, vec![(7, 1), (7, 2), (7, 3)]);
        assert_eq!(retrier.queued(), 1);
    }

    #[tokio::test]
    async fn success_removes_item_for_good() {
        let action = Arc::new(Recording::default());
        let retrier = Retrier::new(short(), 4, false, action.clone());
        retrier.add(1).unwrap();

        retrier.retry().await;
        assert_eq!(retrier.queued(), 0);

        retrier.retry().await;
        assert_eq!(action.attempts.lock().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn expired_item_is_dropped_without_an_attempt() {
        let action = Arc::new(Recording {
            fail: vec![1],
            ..Recording::default()
        });
        let retrier = Retrier::new(short(), 4, false, action.clone())
            .with_max_age(Duration::from_millis(20));
        retrier.add(1).unwrap();

        tokio::time::sleep(Duration::from_millis(30)).await;
        retrier.retry().await;

        assert!(action.attempts.lock().unwrap().is_empty());
        assert_eq!(retrier.queued(), 0);
    }
}
