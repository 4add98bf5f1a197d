//! # cairoscope-core
//!
//! Core types and pure decoding stages shared across the Cairoscope crates.
//!
//! A simulated transaction trace flows through three stages defined here:
//! 1. [`trace::flatten`] turns the nested call tree into ordered [`CallRecord`]s
//! 2. [`resolver::resolve`] recovers function and event names from an [`Abi`]
//! 3. the decode crate decorates `Transfer` events with amounts
//!
//! Nothing in this crate performs I/O.

pub mod abi;
pub mod call;
pub mod error;
pub mod resolver;
pub mod selector;
pub mod trace;

pub use abi::{Abi, AbiEntry};
pub use call::{EventLabel, ResolvedCall, TransferDetails};
pub use error::{DecodeError, RegistryError};
pub use resolver::{event_name, function_name, resolve};
pub use selector::{starknet_keccak, SelectorHash};
pub use trace::{flatten, CallRecord, RawCallNode, RawEvent, DEFAULT_MAX_DEPTH};
