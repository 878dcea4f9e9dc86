//! relayq — forwarding HTTP relay with an asynchronous retry queue.
//!
//! # Architecture Overview
//!
//! ```text
//!                 ┌────────────────────────────────────────────────┐
//!                 │                     RELAY                      │
//!  Client         │  ┌─────────┐   ┌──────────────┐                │
//!  ───────────────┼─▶│  http   │──▶│ retry queue  │                │
//!  200 / 507      │  │ ingress │   │  (bounded)   │                │
//!  ◀──────────────┼──┘         │   └──────┬───────┘                │
//!                 │                       │ interval tick          │
//!                 │                       ▼                        │
//!                 │               ┌──────────────┐                 │     Downstream
//!                 │               │   forward    │─────────────────┼──▶  target
//!                 │               │   client     │◀────────────────┼───  (2xx = done,
//!                 │               └──────────────┘   retry on fail │      else retry)
//!                 │                                                │
//!                 │  config · lifecycle · observability            │
//!                 └────────────────────────────────────────────────┘
//! ```
//!
//! The caller is acknowledged as soon as its request is queued; delivery
//! happens later, at-least-once, until success or the retry/age budget
//! runs out.

use std::sync::Arc;
use std::time::Duration;

use axum::http::Uri;
use clap::Parser;
use tokio::net::TcpListener;

use relayq::config::{load_config, validate_config, Cli, ConfigError, RelayConfig};
use relayq::forward::HttpForwarder;
use relayq::http::RelayServer;
use relayq::lifecycle::{signals, Shutdown};
use relayq::observability::{logging, metrics};
use relayq::retry::Retrier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => RelayConfig::default(),
    };
    cli.apply(&mut config);
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability.log_level);

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "relayq starting");
    tracing::info!(
        target = %config.forward.target,
        interval_ms = config.retry.interval_ms,
        capacity = config.retry.capacity,
        abort_on_error = config.retry.abort_on_error,
        max_retries = config.retry.max_retries,
        max_age_ms = config.retry.max_age_ms,
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        metrics::init_metrics(config.observability.metrics_address.parse()?);
    }

    let shutdown = Shutdown::new();

    let forwarder = HttpForwarder::new(Duration::from_millis(config.forward.request_timeout_ms));
    let retrier = Arc::new(
        Retrier::new(
            Duration::from_millis(config.retry.interval_ms),
            config.retry.capacity,
            config.retry.abort_on_error,
            forwarder,
        )
        .with_max_retries(config.retry.max_retries)
        .with_max_age(Duration::from_millis(config.retry.max_age_ms)),
    );
    let retry_task = retrier.clone().start(shutdown.subscribe());

    let target: Uri = config.forward.target.parse()?;
    let server = RelayServer::new(&config, target, retrier);
    let server_shutdown = shutdown.subscribe();

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(
        address = %listener.local_addr()?,
        target = %config.forward.target,
        "relay ready"
    );

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        signals::wait_for_signal().await;
        tracing::info!("shutting down");
        signal_shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    // If the server stopped on its own, make sure the retry loop
    // follows before joining it.
    shutdown.trigger();
    let _ = retry_task.await;

    tracing::info!("shutdown complete");
    Ok(())
}
