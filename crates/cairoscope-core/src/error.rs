//! Error types for the Cairoscope decode pipeline.

use thiserror::Error;

/// Errors that can end the decoding of a whole trace.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The simulator reported an execution error or a revert.
    /// The reason is surfaced verbatim.
    #[error("Simulation failed: {reason}")]
    SimulationFailed { reason: String },

    #[error("{service} unavailable: {reason}")]
    UpstreamUnavailable { service: String, reason: String },

    #[error("Malformed trace: {reason}")]
    MalformedTrace { reason: String },

    #[error("Invalid selector '{value}'")]
    InvalidSelector { value: String },

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
}

impl DecodeError {
    pub fn malformed(reason: impl Into<String>) -> Self {
        Self::MalformedTrace {
            reason: reason.into(),
        }
    }
}

/// Errors from the interface (ABI) repository.
#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("{service} unavailable: {reason}")]
    UpstreamUnavailable { service: String, reason: String },

    #[error("Invalid class hash '{class_hash}'")]
    InvalidClassHash { class_hash: String },

    #[error("Invalid ABI for class {class_hash}: {reason}")]
    InvalidAbi { class_hash: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl RegistryError {
    /// Returns `true` when the failure came from a remote collaborator
    /// rather than from local state.
    pub fn is_upstream(&self) -> bool {
        matches!(self, Self::UpstreamUnavailable { .. })
    }
}
