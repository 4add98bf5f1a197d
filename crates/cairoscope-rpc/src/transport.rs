//! The `RpcTransport` trait: the seam between Cairoscope and a node.

use async_trait::async_trait;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};

/// An async JSON-RPC transport.
///
/// The trait is object-safe and is shared as `Arc<dyn RpcTransport>`, which
/// lets tests substitute scripted transports for the HTTP client.
#[async_trait]
pub trait RpcTransport: Send + Sync + 'static {
    /// Send a single JSON-RPC request and return the response envelope.
    ///
    /// A node-side error object is returned inside `Ok(JsonRpcResponse)`;
    /// only transport failures are `Err`.
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError>;

    /// The transport's identifier (URL or name).
    fn url(&self) -> &str;
}
