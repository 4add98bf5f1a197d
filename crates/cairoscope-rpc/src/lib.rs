//! cairoscope-rpc: JSON-RPC plumbing for talking to a Starknet node.
//!
//! - [`RpcTransport`]: the async trait every transport implements
//! - [`HttpRpcClient`]: `reqwest`-backed transport with a bounded timeout
//! - [`JsonRpcRequest`] / [`JsonRpcResponse`]: wire types
//! - [`from_slice_unbounded`]: JSON parsing for arbitrarily nested traces
//! - [`StarknetRpc`]: typed `starknet_*` calls on top of any transport

pub mod codec;
pub mod error;
pub mod http;
pub mod request;
pub mod starknet;
pub mod transport;

pub use codec::{from_slice_unbounded, from_value_unbounded};
pub use error::TransportError;
pub use http::{HttpClientConfig, HttpRpcClient};
pub use request::{JsonRpcError, JsonRpcRequest, JsonRpcResponse, RpcId};
pub use starknet::{BlockId, FunctionCall, StarknetRpc};
pub use transport::RpcTransport;
