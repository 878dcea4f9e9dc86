//! Semantic configuration validation.
//!
//! Serde handles the syntactic layer; this module checks meaning: the
//! forward target must be a usable http(s) URL, addresses must parse,
//! and the queue geometry must be workable. All errors are collected
//! and reported together, not just the first.

use std::net::SocketAddr;

use axum::http::Uri;
use thiserror::Error;

use crate::config::schema::RelayConfig;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("forward.target is not a valid URL: {0}")]
    InvalidTarget(String),
    #[error("forward.target must use http or https, got {0:?}")]
    UnsupportedScheme(String),
    #[error("forward.request_timeout_ms must be greater than zero")]
    ZeroRequestTimeout,
    #[error("retry.interval_ms must be greater than zero")]
    ZeroInterval,
    #[error("retry.capacity must be greater than zero")]
    ZeroCapacity,
    #[error("listener.bind_address is not a valid socket address: {0}")]
    InvalidBindAddress(String),
    #[error("observability.metrics_address is not a valid socket address: {0}")]
    InvalidMetricsAddress(String),
}

/// Validate a loaded configuration, returning every violation found.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    match config.forward.target.parse::<Uri>() {
        Ok(uri) => {
            match uri.scheme_str() {
                Some("http") | Some("https") => {}
                other => {
                    errors.push(ValidationError::UnsupportedScheme(
                        other.unwrap_or("none").to_string(),
                    ));
                }
            }
            if uri.authority().is_none() {
                errors.push(ValidationError::InvalidTarget(format!(
                    "{} has no host",
                    config.forward.target
                )));
            }
        }
        Err(err) => {
            errors.push(ValidationError::InvalidTarget(format!(
                "{}: {err}",
                config.forward.target
            )));
        }
    }

    if config.forward.request_timeout_ms == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }
    if config.retry.interval_ms == 0 {
        errors.push(ValidationError::ZeroInterval);
    }
    if config.retry.capacity == 0 {
        errors.push(ValidationError::ZeroCapacity);
    }

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
