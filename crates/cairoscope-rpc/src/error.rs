//! Transport-level error types.

use thiserror::Error;

use crate::request::JsonRpcError;

/// Errors that can occur while talking to a JSON-RPC endpoint.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection failure or non-success HTTP status.
    #[error("HTTP error: {0}")]
    Http(String),

    /// JSON-RPC error object returned by the node.
    #[error("RPC error {}: {}", .0.code, .0.message)]
    Rpc(JsonRpcError),

    #[error("Request timed out after {ms}ms")]
    Timeout { ms: u64 },

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

impl TransportError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Returns `true` if the node answered with an error object.
    pub fn is_rpc_error(&self) -> bool {
        matches!(self, Self::Rpc(_))
    }
}
