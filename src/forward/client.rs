//! Delivery of captured requests to the downstream target.

use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::StatusCode;
use hyper_util::{
    client::legacy::{connect::HttpConnector, Client},
    rt::TokioExecutor,
};
use thiserror::Error;

use crate::http::ForwardedRequest;
use crate::retry::{Action, ActionError, Item};

/// One failed delivery attempt. The retry engine only cares that it
/// happened; the detail is for logs.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("target responded with {0}")]
    Status(StatusCode),
    #[error("no response within {0:?}")]
    Timeout(Duration),
    #[error("transport error: {0}")]
    Transport(#[from] hyper_util::client::legacy::Error),
    #[error("failed to rebuild forwarded request: {0}")]
    Rebuild(#[from] axum::http::Error),
}

/// The relay's delivery action: rebuild the captured request, send it to
/// the target under a per-attempt deadline, and classify the outcome.
/// Any 2xx response is success; everything else is a retryable failure.
pub struct HttpForwarder {
    client: Client<HttpConnector, Body>,
    timeout: Duration,
}

impl HttpForwarder {
    pub fn new(timeout: Duration) -> Self {
        let client = Client::builder(TokioExecutor::new()).build(HttpConnector::new());
        Self { client, timeout }
    }
}

#[async_trait]
impl Action<ForwardedRequest> for HttpForwarder {
    async fn attempt(&self, item: &Item<ForwardedRequest>) -> Result<(), ActionError> {
        let captured = item.payload();
        let request = captured.to_http_request().map_err(DeliveryError::Rebuild)?;

        tracing::debug!(
            method = %captured.method(),
            target = %captured.target(),
            body_bytes = captured.body_len(),
            "forwarding request"
        );

        let response = tokio::time::timeout(self.timeout, self.client.request(request))
            .await
            .map_err(|_| DeliveryError::Timeout(self.timeout))?
            .map_err(DeliveryError::Transport)?;

        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(DeliveryError::Status(status).into())
        }
    }
}
