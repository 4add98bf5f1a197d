//! # cairoscope-observability
//!
//! Logging initialisation shared by the Cairoscope binaries.

pub mod tracing_setup;

pub use tracing_setup::{init_tracing, LogConfig};
