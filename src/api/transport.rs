//! HTTP transport seam for the Alma client.
//!
//! The client never talks to `reqwest` directly; it hands a fully-described
//! GET request to an [`HttpTransport`] and gets back a status code and raw
//! body. That keeps the three-tier fetch policy testable with a scripted
//! fake and keeps the host free to supply its own transport (proxy
//! handling, instrumentation, and so on).

use std::future::Future;
use std::time::Duration;

use thiserror::Error;
use tracing::trace;

/// A fully-described outbound GET request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRequest {
    /// Absolute URL, without query parameters.
    pub url: String,
    /// Request headers.
    pub headers: Vec<(String, String)>,
    /// Query parameters, appended in order.
    pub query: Vec<(String, String)>,
    /// Per-call timeout.
    pub timeout: Duration,
}

/// Status code and raw body of a completed request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// HTTP status code.
    pub status: u16,
    /// Raw response body.
    pub body: String,
}

/// A transport-level failure: connection, TLS, timeout, or body read.
///
/// The client treats every transport error the same way - log and fall
/// back to the cache - so one opaque reason string is enough.
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Issues authenticated GET requests on behalf of the Alma client.
pub trait HttpTransport: Send + Sync {
    /// Perform the request, returning the status and body of whatever the
    /// server answered (including error statuses). `Err` is reserved for
    /// failures where no response was received at all.
    fn get(
        &self,
        request: TransportRequest,
    ) -> impl Future<Output = Result<HttpResponse, TransportError>> + Send;
}

/// The production [`HttpTransport`] backed by [`reqwest`].
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Build a transport with the crate's user agent.
    ///
    /// # Errors
    ///
    /// Returns [`crate::LegantoError::Transport`] when the underlying client
    /// cannot be constructed.
    pub fn new() -> Result<Self, crate::LegantoError> {
        let client = reqwest::Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| crate::LegantoError::Transport {
                reason: e.to_string(),
            })?;
        Ok(Self { client })
    }
}

impl HttpTransport for ReqwestTransport {
    async fn get(&self, request: TransportRequest) -> Result<HttpResponse, TransportError> {
        trace!(url = %request.url, "issuing GET request");

        let mut builder = self
            .client
            .get(&request.url)
            .query(&request.query)
            .timeout(request.timeout);
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| TransportError(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| TransportError(e.to_string()))?;

        Ok(HttpResponse { status, body })
    }
}
