//! Remote collaborators that supply class documents.
//!
//! - **Explorer**: `GET {base}/classes/{class_hash}` on a Voyager-style
//!   interface registry, optionally authenticated with `x-api-key`
//! - **Node RPC**: `starknet_getClass` on any Starknet node

use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

use cairoscope_core::RegistryError;
use cairoscope_rpc::{BlockId, StarknetRpc};

/// Default interface-registry endpoint.
pub const DEFAULT_EXPLORER_URL: &str = "https://api.voyager.online/beta";

/// Something that can fetch the document describing a class.
#[async_trait]
pub trait ClassSource: Send + Sync {
    /// Fetch the class document for `class_hash`, verbatim.
    ///
    /// Any non-success outcome is `RegistryError::UpstreamUnavailable`.
    async fn fetch_class(&self, class_hash: &str) -> Result<String, RegistryError>;

    /// Short human-readable name used in logs and errors.
    fn name(&self) -> &str;
}

// ─── Explorer ─────────────────────────────────────────────────────────────────

/// Interface-registry HTTP API client.
pub struct ExplorerClassSource {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl ExplorerClassSource {
    pub fn new(
        base_url: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> Result<Self, RegistryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("cairoscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RegistryError::UpstreamUnavailable {
                service: "interface registry".into(),
                reason: format!("failed to build HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key,
        })
    }

    fn unavailable(&self, reason: impl Into<String>) -> RegistryError {
        RegistryError::UpstreamUnavailable {
            service: self.name().to_string(),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl ClassSource for ExplorerClassSource {
    async fn fetch_class(&self, class_hash: &str) -> Result<String, RegistryError> {
        let url = format!("{}/classes/{class_hash}", self.base_url);
        let mut req = self.client.get(&url).header("accept", "application/json");
        if let Some(key) = &self.api_key {
            req = req.header("x-api-key", key);
        }

        let resp = req.send().await.map_err(|e| self.unavailable(e.to_string()))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(self.unavailable(format!("HTTP {} for {url}", status.as_u16())));
        }

        resp.text().await.map_err(|e| self.unavailable(e.to_string()))
    }

    fn name(&self) -> &str {
        "interface registry"
    }
}

// ─── Node RPC ─────────────────────────────────────────────────────────────────

/// Fetches classes with `starknet_getClass`.
pub struct RpcClassSource {
    rpc: Arc<StarknetRpc>,
    block: BlockId,
}

impl RpcClassSource {
    pub fn new(rpc: Arc<StarknetRpc>) -> Self {
        Self {
            rpc,
            block: BlockId::Latest,
        }
    }

    pub fn at_block(mut self, block: BlockId) -> Self {
        self.block = block;
        self
    }
}

#[async_trait]
impl ClassSource for RpcClassSource {
    async fn fetch_class(&self, class_hash: &str) -> Result<String, RegistryError> {
        let class = self
            .rpc
            .get_class(class_hash, &self.block)
            .await
            .map_err(|e| RegistryError::UpstreamUnavailable {
                service: format!("node {}", self.rpc.url()),
                reason: e.to_string(),
            })?;
        Ok(class.to_string())
    }

    fn name(&self) -> &str {
        "node rpc"
    }
}
