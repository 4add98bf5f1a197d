//! Key/value storage for class documents.
//!
//! Documents are stored verbatim as returned by the class source, one entry
//! per class hash. Entries are written whole and never updated.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use cairoscope_core::RegistryError;

static TMP_SEQ: AtomicU64 = AtomicU64::new(0);

/// Storage for raw class documents, keyed by class hash.
#[async_trait]
pub trait AbiStore: Send + Sync {
    /// Load the stored document for `class_hash`, if any.
    async fn get(&self, class_hash: &str) -> Result<Option<String>, RegistryError>;

    /// Store (or replace) the document for `class_hash`.
    async fn put(&self, class_hash: &str, body: &str) -> Result<(), RegistryError>;
}

/// Class hashes become file names, so only `0x`-prefixed hex is accepted.
pub fn validate_class_hash(class_hash: &str) -> Result<(), RegistryError> {
    let valid = class_hash
        .strip_prefix("0x")
        .map(|d| !d.is_empty() && d.len() <= 64 && d.chars().all(|c| c.is_ascii_hexdigit()))
        .unwrap_or(false);
    if valid {
        Ok(())
    } else {
        Err(RegistryError::InvalidClassHash {
            class_hash: class_hash.to_string(),
        })
    }
}

// ─── File store ───────────────────────────────────────────────────────────────

/// One `<class_hash>.json` file per class under a cache directory.
///
/// The directory is created on the first write. Writes go to a temporary
/// file that is then renamed over the target, so readers never observe a
/// partial document and concurrent writers settle on one whole file.
#[derive(Debug, Clone)]
pub struct FileAbiStore {
    dir: PathBuf,
}

impl FileAbiStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, class_hash: &str) -> Result<PathBuf, RegistryError> {
        validate_class_hash(class_hash)?;
        Ok(self.dir.join(format!("{class_hash}.json")))
    }
}

#[async_trait]
impl AbiStore for FileAbiStore {
    async fn get(&self, class_hash: &str) -> Result<Option<String>, RegistryError> {
        let path = self.path_for(class_hash)?;
        match tokio::fs::read_to_string(&path).await {
            Ok(body) => Ok(Some(body)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RegistryError::Io(e)),
        }
    }

    async fn put(&self, class_hash: &str, body: &str) -> Result<(), RegistryError> {
        let path = self.path_for(class_hash)?;
        tokio::fs::create_dir_all(&self.dir).await?;

        let seq = TMP_SEQ.fetch_add(1, Ordering::Relaxed);
        let tmp = self
            .dir
            .join(format!(".{class_hash}.{}.{seq}.tmp", std::process::id()));
        tokio::fs::write(&tmp, body).await?;
        tokio::fs::rename(&tmp, &path).await?;
        tracing::debug!(class_hash, path = %path.display(), "cached class document");
        Ok(())
    }
}

// ─── In-memory store ──────────────────────────────────────────────────────────

/// In-memory store for tests and ephemeral runs.
#[derive(Default)]
pub struct MemoryAbiStore {
    data: Mutex<HashMap<String, String>>,
}

impl MemoryAbiStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.data.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AbiStore for MemoryAbiStore {
    async fn get(&self, class_hash: &str) -> Result<Option<String>, RegistryError> {
        Ok(self.data.lock().unwrap().get(class_hash).cloned())
    }

    async fn put(&self, class_hash: &str, body: &str) -> Result<(), RegistryError> {
        self.data
            .lock()
            .unwrap()
            .insert(class_hash.to_string(), body.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn file_store_creates_directory_lazily() {
        let tmp = tempfile::TempDir::new().unwrap();
        let dir = tmp.path().join("class_details");
        let store = FileAbiStore::new(&dir);

        assert!(store.get("0xaa").await.unwrap().is_none());
        assert!(!dir.exists());

        store.put("0xaa", r#"{"abi":[]}"#).await.unwrap();
        assert!(dir.join("0xaa.json").exists());
        assert_eq!(
            store.get("0xaa").await.unwrap().as_deref(),
            Some(r#"{"abi":[]}"#)
        );
    }

    #[tokio::test]
    async fn file_store_replaces_whole_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FileAbiStore::new(tmp.path());
        store.put("0xbb", "first, and longer").await.unwrap();
        store.put("0xbb", "second").await.unwrap();
        assert_eq!(store.get("0xbb").await.unwrap().as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn rejects_path_like_class_hashes() {
        let tmp = tempfile::TempDir::new().unwrap();
        let store = FileAbiStore::new(tmp.path());
        for bad in ["../etc/passwd", "0x", "aa", "0x12/34"] {
            assert!(matches!(
                store.get(bad).await,
                Err(RegistryError::InvalidClassHash { .. })
            ));
        }
    }

    #[tokio::test]
    async fn memory_store_roundtrip() {
        let store = MemoryAbiStore::new();
        assert!(store.is_empty());
        store.put("0x1", "doc").await.unwrap();
        assert_eq!(store.get("0x1").await.unwrap().as_deref(), Some("doc"));
        assert_eq!(store.len(), 1);
    }
}
