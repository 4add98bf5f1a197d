//! Typed Starknet node calls on top of an [`RpcTransport`].

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use cairoscope_core::SelectorHash;

use crate::error::TransportError;
use crate::request::{JsonRpcRequest, JsonRpcResponse};
use crate::transport::RpcTransport;

/// Block selector accepted by `starknet_*` read methods.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum BlockId {
    Latest,
    Pending,
    #[serde(rename = "block_number")]
    Number(u64),
    #[serde(rename = "block_hash")]
    Hash(String),
}

/// A read-only contract invocation (`starknet_call`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionCall {
    pub contract_address: String,
    pub entry_point_selector: SelectorHash,
    pub calldata: Vec<String>,
}

/// Starknet JSON-RPC client.
pub struct StarknetRpc {
    transport: Arc<dyn RpcTransport>,
    next_id: AtomicU64,
}

impl StarknetRpc {
    pub fn new(transport: Arc<dyn RpcTransport>) -> Self {
        Self {
            transport,
            next_id: AtomicU64::new(1),
        }
    }

    pub fn url(&self) -> &str {
        self.transport.url()
    }

    fn next_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Forward a caller-built request untouched and return the raw envelope,
    /// error object included.
    pub async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        self.transport.send(req).await
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: &str,
        params: Value,
    ) -> Result<T, TransportError> {
        let req = JsonRpcRequest::new(self.next_id(), method, params);
        let resp = self.transport.send(req).await?;
        let result = resp.into_result().map_err(TransportError::Rpc)?;
        Ok(serde_json::from_value(result)?)
    }

    /// `starknet_call`: returns the felts the entry point returned.
    pub async fn call(
        &self,
        call: &FunctionCall,
        block: &BlockId,
    ) -> Result<Vec<String>, TransportError> {
        self.request(
            "starknet_call",
            json!({ "request": call, "block_id": block }),
        )
        .await
    }

    /// `starknet_getClass`: the class definition (its `abi` is a JSON string
    /// for Sierra classes).
    pub async fn get_class(&self, class_hash: &str, block: &BlockId) -> Result<Value, TransportError> {
        self.request(
            "starknet_getClass",
            json!({ "block_id": block, "class_hash": class_hash }),
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::JsonRpcError;
    use async_trait::async_trait;
    use cairoscope_core::starknet_keccak;
    use std::sync::Mutex;

    /// Records requests and answers each with a fixed response.
    struct Scripted {
        seen: Mutex<Vec<JsonRpcRequest>>,
        answer: Result<Value, JsonRpcError>,
    }

    #[async_trait]
    impl RpcTransport for Scripted {
        async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
            let id = req.id.clone();
            self.seen.lock().unwrap().push(req);
            Ok(match &self.answer {
                Ok(v) => JsonRpcResponse::success(id, v.clone()),
                Err(e) => JsonRpcResponse::failure(id, e.clone()),
            })
        }

        fn url(&self) -> &str {
            "scripted"
        }
    }

    #[test]
    fn block_id_wire_format() {
        assert_eq!(serde_json::to_value(BlockId::Latest).unwrap(), json!("latest"));
        assert_eq!(
            serde_json::to_value(BlockId::Number(5)).unwrap(),
            json!({ "block_number": 5 })
        );
    }

    #[tokio::test]
    async fn call_sends_function_call() {
        let transport = Arc::new(Scripted {
            seen: Mutex::new(vec![]),
            answer: Ok(json!(["0x12"])),
        });
        let rpc = StarknetRpc::new(transport.clone());
        let out = rpc
            .call(
                &FunctionCall {
                    contract_address: "0x49d3".into(),
                    entry_point_selector: starknet_keccak("decimals"),
                    calldata: vec![],
                },
                &BlockId::Latest,
            )
            .await
            .unwrap();
        assert_eq!(out, vec!["0x12".to_string()]);

        let seen = transport.seen.lock().unwrap();
        assert_eq!(seen[0].method, "starknet_call");
        assert_eq!(
            seen[0].params["request"]["entry_point_selector"],
            json!("0x4c4fb1ab068f6039d5780c68dd0fa2f8742cceb3426d19667778ca7f3518a9")
        );
        assert_eq!(seen[0].params["block_id"], json!("latest"));
    }

    #[tokio::test]
    async fn node_error_is_rpc_error() {
        let rpc = StarknetRpc::new(Arc::new(Scripted {
            seen: Mutex::new(vec![]),
            answer: Err(JsonRpcError {
                code: 28,
                message: "Class hash not found".into(),
                data: None,
            }),
        }));
        let err = rpc.get_class("0xaa", &BlockId::Latest).await.unwrap_err();
        assert!(err.is_rpc_error());
    }
}
