//! HTTP JSON-RPC client backed by `reqwest`.

use async_trait::async_trait;
use std::time::Duration;

use crate::codec::from_slice_unbounded;
use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::transport::RpcTransport;

/// Configuration for `HttpRpcClient`.
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Upper bound on a whole request, connect to last byte.
    pub request_timeout: Duration,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// HTTP JSON-RPC client. Requests are not retried.
pub struct HttpRpcClient {
    url: String,
    http: reqwest::Client,
    request_timeout: Duration,
}

impl HttpRpcClient {
    /// Create a new client for the given JSON-RPC endpoint URL.
    pub fn new(url: impl Into<String>, config: HttpClientConfig) -> Result<Self, TransportError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| TransportError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            url: url.into(),
            http,
            request_timeout: config.request_timeout,
        })
    }

    /// Create with default configuration.
    pub fn default_for(url: impl Into<String>) -> Result<Self, TransportError> {
        Self::new(url, HttpClientConfig::default())
    }

    fn map_err(&self, err: reqwest::Error) -> TransportError {
        if err.is_timeout() {
            TransportError::Timeout {
                ms: self.request_timeout.as_millis() as u64,
            }
        } else {
            TransportError::Http(err.to_string())
        }
    }
}

#[async_trait]
impl RpcTransport for HttpRpcClient {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        tracing::debug!(method = %req.method, id = %req.id, url = %self.url, "sending JSON-RPC request");

        let resp = self
            .http
            .post(&self.url)
            .json(&req)
            .send()
            .await
            .map_err(|e| self.map_err(e))?;

        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let body = resp.text().await.unwrap_or_default();
            return Err(TransportError::Http(format!("HTTP {status}: {body}")));
        }

        let body = resp.bytes().await.map_err(|e| self.map_err(e))?;
        Ok(from_slice_unbounded(&body)?)
    }

    fn url(&self) -> &str {
        &self.url
    }
}
