//! # cairoscope-registry
//!
//! Resolves a contract class's interface description (ABI) by class hash.
//!
//! ## Layers
//! 1. **Parsed memo**: in-process map of already parsed ABIs
//! 2. **`AbiStore`**: verbatim class documents keyed by class hash
//!    ([`FileAbiStore`] on disk, [`MemoryAbiStore`] for tests)
//! 3. **`ClassSource`**: the remote collaborator that fills the store
//!    ([`ExplorerClassSource`] or [`RpcClassSource`])
//!
//! Class hashes are content addresses, so cached documents never expire.

pub mod repository;
pub mod source;
pub mod store;

pub use repository::InterfaceRepository;
pub use source::{ClassSource, ExplorerClassSource, RpcClassSource, DEFAULT_EXPLORER_URL};
pub use store::{AbiStore, FileAbiStore, MemoryAbiStore};
