//! Relay metrics.
//!
//! # Metrics
//! - `relay_requests_total` (counter): ingress requests by response status
//! - `relay_enqueued_total` (counter): requests accepted into the queue
//! - `relay_queue_full_total` (counter): requests rejected with 507
//! - `relay_attempts_total` (counter): delivery attempts by outcome
//! - `relay_dropped_total` (counter): terminal drops by reason
//!   (`expired`, `exhausted`)
//! - `relay_queue_depth` (gauge): items currently owned by the queue

use std::net::SocketAddr;

use metrics::{counter, describe_counter, describe_gauge, gauge};
use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus exporter on `addr`. Failure is logged, not
/// fatal; the relay runs fine without metrics.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => {
            describe_metrics();
            tracing::info!(address = %addr, "metrics exporter listening");
        }
        Err(err) => {
            tracing::error!(error = %err, "failed to install metrics exporter");
        }
    }
}

fn describe_metrics() {
    describe_counter!(
        "relay_requests_total",
        "Ingress requests by response status"
    );
    describe_counter!(
        "relay_enqueued_total",
        "Requests accepted into the retry queue"
    );
    describe_counter!(
        "relay_queue_full_total",
        "Requests rejected because the retry queue was full"
    );
    describe_counter!("relay_attempts_total", "Delivery attempts by outcome");
    describe_counter!(
        "relay_dropped_total",
        "Requests dropped without delivery, by reason"
    );
    describe_gauge!(
        "relay_queue_depth",
        "Requests currently owned by the retry queue"
    );
}

pub fn record_ingress(status: u16) {
    counter!("relay_requests_total", "status" => status.to_string()).increment(1);
}

pub fn record_enqueued(depth: usize) {
    counter!("relay_enqueued_total").increment(1);
    record_queue_depth(depth);
}

pub fn record_queue_full() {
    counter!("relay_queue_full_total").increment(1);
}

pub fn record_attempt(outcome: &'static str) {
    counter!("relay_attempts_total", "outcome" => outcome).increment(1);
}

pub fn record_dropped(reason: &'static str) {
    counter!("relay_dropped_total", "reason" => reason).increment(1);
}

pub fn record_queue_depth(depth: usize) {
    gauge!("relay_queue_depth").set(depth as f64);
}
