//! Decoder configuration, loadable from YAML.
//!
//! ```yaml
//! rpc_url: https://free-rpc.nethermind.io/mainnet-juno/
//! abi_source: registry
//! registry_api_key: ...
//! cache_dir: class_details
//! tokens:
//!   "0x053c91253bc9682c04929ca02ed00b3e423f6710d2ee7e0d5ebb06f3ecf368a8": USDC
//! log:
//!   level: info
//!   components:
//!     cairoscope-registry: debug
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use cairoscope_core::DEFAULT_MAX_DEPTH;
use cairoscope_observability::LogConfig;
use cairoscope_registry::DEFAULT_EXPLORER_URL;

/// Default simulation / node endpoint.
pub const DEFAULT_RPC_URL: &str = "https://free-rpc.nethermind.io/mainnet-juno/";

/// Where interface descriptions missing from the cache are fetched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AbiSourceKind {
    /// The interface-registry HTTP API at `registry_url`.
    #[default]
    Registry,
    /// `starknet_getClass` on `rpc_url`.
    Rpc,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("failed to build client: {0}")]
    Client(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// JSON-RPC endpoint used for simulation and read-only calls.
    pub rpc_url: String,
    pub registry_url: String,
    pub registry_api_key: Option<String>,
    pub abi_source: AbiSourceKind,
    /// On-disk interface cache, one `{class_hash}.json` per class.
    pub cache_dir: PathBuf,
    pub max_trace_depth: usize,
    pub request_timeout_secs: u64,
    /// Remember each token's `decimals()` for the decoder's lifetime.
    pub cache_decimals: bool,
    /// Extra well-known tokens: address → display name.
    pub tokens: BTreeMap<String, String>,
    pub log: LogConfig,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            registry_url: DEFAULT_EXPLORER_URL.to_string(),
            registry_api_key: None,
            abi_source: AbiSourceKind::default(),
            cache_dir: PathBuf::from("class_details"),
            max_trace_depth: DEFAULT_MAX_DEPTH,
            request_timeout_secs: 30,
            cache_decimals: true,
            tokens: BTreeMap::new(),
            log: LogConfig::default(),
        }
    }
}

impl DecoderConfig {
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        Ok(serde_yaml::from_str(yaml)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let yaml = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&yaml)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
