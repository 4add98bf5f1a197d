//! # cairoscope-decode
//!
//! Turns the raw result of `starknet_simulateTransactions` into named calls
//! and events.
//!
//! ```ignore
//! let decoder = TraceDecoder::from_config(&DecoderConfig::default())?;
//! match decoder.explain(&request).await? {
//!     TraceOutcome::Resolved(calls) => { /* one ResolvedCall per call, pre-order */ }
//!     TraceOutcome::Failed(reason) => { /* execution error or revert reason */ }
//! }
//! ```

pub mod config;
pub mod pipeline;
pub mod simulation;
pub mod tokens;
pub mod transfer;

pub use config::{AbiSourceKind, ConfigError, DecoderConfig};
pub use pipeline::{TraceDecoder, TraceOutcome};
pub use simulation::{interpret, Simulated};
pub use tokens::TokenBook;
pub use transfer::{DecimalsSource, RpcDecimals, TransferDecoder, TransferError, DECIMALS_ENTRY_POINT, TRANSFER_EVENT};
