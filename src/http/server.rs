//! HTTP ingress for the relay.
//!
//! # Responsibilities
//! - Build the axum Router: one catch-all route, any method, any path
//! - Wire up middleware (tracing, request timeout, request ID)
//! - Read and capture each inbound request, hand it to the retry queue
//! - Acknowledge immediately: 200 enqueued, 507 queue full
//! - Serve with graceful shutdown and a bounded drain grace period
//!
//! Delivery happens later, on the retry cycle; its outcome is never
//! reported back to the original caller.

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::RelayConfig;
use crate::http::request::ForwardedRequest;
use crate::observability::metrics;
use crate::retry::Retrier;

/// State injected into the ingress handler.
#[derive(Clone)]
struct AppState {
    retrier: Arc<Retrier<ForwardedRequest>>,
    target: Uri,
    max_body_size: usize,
}

/// Ingress server: accepts anything, enqueues it, answers right away.
pub struct RelayServer {
    router: Router,
    grace: Duration,
}

impl RelayServer {
    pub fn new(
        config: &RelayConfig,
        target: Uri,
        retrier: Arc<Retrier<ForwardedRequest>>,
    ) -> Self {
        let state = AppState {
            retrier,
            target,
            max_body_size: config.listener.max_body_size,
        };

        let router = Router::new()
            .route("/{*path}", any(relay_handler))
            .route("/", any(relay_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(
                config.listener.request_timeout_secs,
            )))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(TraceLayer::new_for_http());

        Self {
            router,
            grace: Duration::from_secs(config.listener.shutdown_grace_secs),
        }
    }

    /// Serve until the shutdown signal fires, then stop accepting and
    /// give in-flight requests up to the configured grace period.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP ingress listening");

        let mut drained = shutdown.resubscribe();
        let mut serve = std::pin::pin!(axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
            })
            .into_future());

        tokio::select! {
            result = &mut serve => result?,
            _ = drained.recv() => {
                tracing::info!(grace = ?self.grace, "shutdown signal received, draining in-flight requests");
                match tokio::time::timeout(self.grace, &mut serve).await {
                    Ok(result) => result?,
                    Err(_) => {
                        tracing::warn!("grace period expired with requests still in flight");
                    }
                }
            }
        }

        tracing::info!("HTTP ingress stopped");
        Ok(())
    }
}

/// Catch-all ingress handler: capture, enqueue, acknowledge.
async fn relay_handler(State(state): State<AppState>, request: Request<Body>) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let (parts, body) = request.into_parts();
    let body = match axum::body::to_bytes(body, state.max_body_size).await {
        Ok(bytes) => bytes,
        Err(err) => {
            tracing::warn!(method = %method, path = %path, error = %err, "failed to read request body");
            metrics::record_ingress(500);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    let forwarded = match ForwardedRequest::clone_from(&parts, body, &state.target) {
        Ok(forwarded) => forwarded,
        Err(err) => {
            tracing::warn!(method = %method, path = %path, error = %err, "failed to capture request");
            metrics::record_ingress(500);
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    match state.retrier.add(forwarded) {
        Ok(()) => {
            tracing::debug!(method = %method, path = %path, "request enqueued");
            metrics::record_ingress(200);
            StatusCode::OK.into_response()
        }
        Err(_) => {
            tracing::warn!(method = %method, path = %path, "rejecting request, retry queue full");
            metrics::record_ingress(507);
            StatusCode::INSUFFICIENT_STORAGE.into_response()
        }
    }
}
