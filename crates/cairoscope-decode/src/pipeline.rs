//! The public decoding pipeline.
//!
//! `explain` forwards a simulation request, then `decode_response` turns the
//! response into resolved calls:
//!
//! ```text
//! response ─► interpret ─► flatten ─► per call: repository.resolve ─► resolve ─► decorate transfers
//! ```

use serde_json::Value;
use std::sync::Arc;

use cairoscope_core::{flatten, resolve, CallRecord, DecodeError, EventLabel, ResolvedCall};
use cairoscope_registry::{
    ClassSource, ExplorerClassSource, FileAbiStore, InterfaceRepository, RpcClassSource,
};
use cairoscope_rpc::{HttpClientConfig, HttpRpcClient, JsonRpcRequest, JsonRpcResponse, StarknetRpc};

use crate::config::{AbiSourceKind, ConfigError, DecoderConfig};
use crate::simulation::{interpret, Simulated};
use crate::tokens::TokenBook;
use crate::transfer::{RpcDecimals, TransferDecoder, TRANSFER_EVENT};

/// Result of decoding one simulation.
#[derive(Debug, Clone, PartialEq)]
pub enum TraceOutcome {
    /// One entry per call, in pre-order.
    Resolved(Vec<ResolvedCall>),
    /// The simulator's execution error or revert reason, verbatim.
    Failed(String),
}

impl TraceOutcome {
    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    /// The resolved calls, or `DecodeError::SimulationFailed`.
    pub fn into_calls(self) -> Result<Vec<ResolvedCall>, DecodeError> {
        match self {
            Self::Resolved(calls) => Ok(calls),
            Self::Failed(reason) => Err(DecodeError::SimulationFailed { reason }),
        }
    }
}

pub struct TraceDecoder {
    simulator: Arc<StarknetRpc>,
    repository: Arc<InterfaceRepository>,
    transfers: TransferDecoder,
    max_depth: usize,
}

impl TraceDecoder {
    pub fn new(
        simulator: Arc<StarknetRpc>,
        repository: Arc<InterfaceRepository>,
        transfers: TransferDecoder,
    ) -> Self {
        Self {
            simulator,
            repository,
            transfers,
            max_depth: cairoscope_core::DEFAULT_MAX_DEPTH,
        }
    }

    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn repository(&self) -> &Arc<InterfaceRepository> {
        &self.repository
    }

    /// Wire up HTTP collaborators and the on-disk cache from `config`.
    pub fn from_config(config: &DecoderConfig) -> Result<Self, ConfigError> {
        let transport = HttpRpcClient::new(
            config.rpc_url.clone(),
            HttpClientConfig {
                request_timeout: config.request_timeout(),
            },
        )
        .map_err(|e| ConfigError::Client(e.to_string()))?;
        let rpc = Arc::new(StarknetRpc::new(Arc::new(transport)));

        let source: Arc<dyn ClassSource> = match config.abi_source {
            AbiSourceKind::Registry => Arc::new(
                ExplorerClassSource::new(
                    config.registry_url.clone(),
                    config.registry_api_key.clone(),
                    config.request_timeout(),
                )
                .map_err(|e| ConfigError::Client(e.to_string()))?,
            ),
            AbiSourceKind::Rpc => Arc::new(RpcClassSource::new(rpc.clone())),
        };
        let store = Arc::new(FileAbiStore::new(&config.cache_dir));
        let repository = Arc::new(InterfaceRepository::new(store, source));

        let mut tokens = TokenBook::default();
        tokens.extend(&config.tokens);
        let mut transfers =
            TransferDecoder::new(Arc::new(RpcDecimals::new(rpc.clone()))).with_tokens(tokens);
        if !config.cache_decimals {
            transfers = transfers.without_decimals_cache();
        }

        Ok(Self::new(rpc, repository, transfers).with_max_depth(config.max_trace_depth))
    }

    /// Simulate `request` (a complete `starknet_simulateTransactions`
    /// JSON-RPC request, forwarded as is) and decode the result.
    pub async fn explain(&self, request: &Value) -> Result<TraceOutcome, DecodeError> {
        let request: JsonRpcRequest = serde_json::from_value(request.clone())?;
        tracing::debug!(method = %request.method, url = self.simulator.url(), "forwarding simulation request");

        let response = self
            .simulator
            .send(request)
            .await
            .map_err(|e| DecodeError::UpstreamUnavailable {
                service: "simulation service".into(),
                reason: e.to_string(),
            })?;
        self.decode_response(response).await
    }

    /// Decode an already obtained simulation response.
    pub async fn decode_response(
        &self,
        response: JsonRpcResponse,
    ) -> Result<TraceOutcome, DecodeError> {
        let root = match interpret(response)? {
            Simulated::Trace(root) => root,
            Simulated::Failed(reason) => {
                tracing::info!(%reason, "simulation failed");
                return Ok(TraceOutcome::Failed(reason));
            }
        };

        let records = flatten(root, self.max_depth)?;
        tracing::debug!(calls = records.len(), "flattened call tree");

        let calls =
            futures::future::join_all(records.iter().map(|r| self.resolve_record(r))).await;
        Ok(TraceOutcome::Resolved(calls))
    }

    /// Resolve one call. An unavailable ABI degrades to an unresolved call.
    pub async fn resolve_record(&self, record: &CallRecord) -> ResolvedCall {
        let abi = match self.repository.resolve(&record.class_hash).await {
            Ok(abi) => abi,
            Err(e) => {
                tracing::warn!(class_hash = %record.class_hash, error = %e, "ABI unavailable, call left unresolved");
                None
            }
        };

        let mut call = resolve(record, abi.as_deref());
        for (label, event) in call.events.iter_mut().zip(&record.events) {
            if matches!(label, EventLabel::Named(name) if name == TRANSFER_EVENT) {
                *label = self.transfers.decorate(&record.contract_address, event).await;
            }
        }
        call
    }
}
