//! The interface repository: memo → store → source.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use cairoscope_core::{Abi, RegistryError};

use crate::source::ClassSource;
use crate::store::{validate_class_hash, AbiStore};

/// Resolves ABIs by class hash, filling the store from the source on a miss.
///
/// Safe to share between tasks. Concurrent resolutions of the same class
/// hash are serialised on a per-hash lock, so one fetch and one store write
/// happen and the other callers are served from the memo.
pub struct InterfaceRepository {
    store: Arc<dyn AbiStore>,
    source: Arc<dyn ClassSource>,
    /// class hash → parsed ABI (`None` when the document has no `abi`)
    parsed: RwLock<HashMap<String, Option<Arc<Abi>>>>,
    gates: Mutex<HashMap<String, Arc<tokio::sync::Mutex<()>>>>,
}

impl InterfaceRepository {
    pub fn new(store: Arc<dyn AbiStore>, source: Arc<dyn ClassSource>) -> Self {
        Self {
            store,
            source,
            parsed: RwLock::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Resolve the ABI of `class_hash`.
    ///
    /// Returns `Ok(None)` when the class document carries no `abi` member.
    /// A failed fetch is returned as `RegistryError::UpstreamUnavailable`
    /// and is not cached, so a later call tries again.
    pub async fn resolve(&self, class_hash: &str) -> Result<Option<Arc<Abi>>, RegistryError> {
        validate_class_hash(class_hash)?;
        if let Some(hit) = self.memo(class_hash) {
            return Ok(hit);
        }

        let gate = self.gate(class_hash);
        let _guard = gate.lock().await;

        // another caller may have resolved it while we waited
        if let Some(hit) = self.memo(class_hash) {
            return Ok(hit);
        }

        let abi = self.load(class_hash).await?;
        self.parsed
            .write()
            .unwrap()
            .insert(class_hash.to_string(), abi.clone());
        Ok(abi)
    }

    fn memo(&self, class_hash: &str) -> Option<Option<Arc<Abi>>> {
        self.parsed.read().unwrap().get(class_hash).cloned()
    }

    fn gate(&self, class_hash: &str) -> Arc<tokio::sync::Mutex<()>> {
        self.gates
            .lock()
            .unwrap()
            .entry(class_hash.to_string())
            .or_default()
            .clone()
    }

    async fn load(&self, class_hash: &str) -> Result<Option<Arc<Abi>>, RegistryError> {
        let body = match self.store.get(class_hash).await? {
            Some(body) => {
                tracing::debug!(class_hash, "class cache hit");
                body
            }
            None => {
                tracing::debug!(class_hash, source = self.source.name(), "class cache miss");
                let body = self.source.fetch_class(class_hash).await?;
                if let Err(e) = self.store.put(class_hash, &body).await {
                    tracing::warn!(class_hash, error = %e, "failed to cache class document");
                }
                body
            }
        };

        let abi = Abi::from_document(&body).map_err(|e| RegistryError::InvalidAbi {
            class_hash: class_hash.to_string(),
            reason: e.to_string(),
        })?;
        if abi.is_none() {
            tracing::debug!(class_hash, "class document has no abi");
        }
        Ok(abi.map(Arc::new))
    }
}
