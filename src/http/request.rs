//! Cloning inbound requests into relayable form.
//!
//! An inbound request is consumed by the ingress handler, so everything
//! needed for delivery is captured up front: method, headers, body bytes
//! and the rewritten target URI. Each delivery attempt rebuilds a fresh
//! outbound request from this capture.

use axum::body::{Body, Bytes};
use axum::http::request::Parts;
use axum::http::uri::{InvalidUriParts, PathAndQuery, Scheme};
use axum::http::{header, HeaderMap, Method, Request, Uri};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CloneRequestError {
    #[error("failed to assemble target uri: {0}")]
    Uri(#[from] InvalidUriParts),
}

/// A captured inbound request, re-aimed at the forward target.
#[derive(Debug, Clone)]
pub struct ForwardedRequest {
    method: Method,
    target: Uri,
    headers: HeaderMap,
    body: Bytes,
}

impl ForwardedRequest {
    /// Capture an inbound request: keep its method, path, query, headers
    /// and body; replace scheme and authority with the target's. The
    /// `Host` header is dropped so the client re-derives it from the
    /// target authority.
    pub fn clone_from(parts: &Parts, body: Bytes, target: &Uri) -> Result<Self, CloneRequestError> {
        let mut uri_parts = parts.uri.clone().into_parts();
        uri_parts.scheme = target.scheme().cloned().or(Some(Scheme::HTTP));
        uri_parts.authority = target.authority().cloned();
        if uri_parts.path_and_query.is_none() {
            uri_parts.path_and_query = Some(PathAndQuery::from_static("/"));
        }
        let target = Uri::from_parts(uri_parts)?;

        let mut headers = parts.headers.clone();
        headers.remove(header::HOST);

        Ok(Self {
            method: parts.method.clone(),
            target,
            headers,
            body,
        })
    }

    /// Build a fresh outbound request for one delivery attempt.
    pub fn to_http_request(&self) -> Result<Request<Body>, axum::http::Error> {
        let mut builder = Request::builder()
            .method(self.method.clone())
            .uri(self.target.clone());

        if let Some(headers) = builder.headers_mut() {
            for (name, value) in self.headers.iter() {
                headers.insert(name.clone(), value.clone());
            }
        }

        builder.body(Body::from(self.body.clone()))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn target(&self) -> &Uri {
        &self.target
    }

    pub fn body_len(&self) -> usize {
        self.body.len()
    }
}
