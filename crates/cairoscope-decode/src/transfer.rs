//! Decoding of fungible-token `Transfer` events.
//!
//! The event data is read positionally: `data[0]` is the sender, `data[1]`
//! the recipient and `data[2]` the raw amount. The amount is scaled by the
//! token's `decimals()`, read from the emitting contract.
//!
//! Decoration is best effort. Any failure leaves the plain `Transfer` label.

use alloy_primitives::U256;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

use cairoscope_core::{starknet_keccak, DecodeError, EventLabel, RawEvent, TransferDetails};
use cairoscope_rpc::{BlockId, FunctionCall, StarknetRpc};

use crate::tokens::{normalize_address, TokenBook};

/// The only event name that triggers transfer decoding.
pub const TRANSFER_EVENT: &str = "Transfer";

/// Entry point queried for token precision.
pub const DECIMALS_ENTRY_POINT: &str = "decimals";

/// Why a `Transfer` event could not be decorated.
#[derive(Debug, Error)]
pub enum TransferError {
    #[error("transfer event carries {words} data words, expected at least 3")]
    ShortData { words: usize },

    #[error("invalid felt '{value}': {reason}")]
    InvalidFelt { value: String, reason: String },

    #[error("decimals unavailable: {0}")]
    Decimals(#[from] DecodeError),
}

/// Reads a token contract's decimal precision.
#[async_trait]
pub trait DecimalsSource: Send + Sync {
    async fn decimals(&self, contract_address: &str) -> Result<u32, DecodeError>;
}

/// `decimals()` through `starknet_call`.
pub struct RpcDecimals {
    rpc: Arc<StarknetRpc>,
    block: BlockId,
}

impl RpcDecimals {
    pub fn new(rpc: Arc<StarknetRpc>) -> Self {
        Self {
            rpc,
            block: BlockId::Latest,
        }
    }

    fn unavailable(&self, reason: impl Into<String>) -> DecodeError {
        DecodeError::UpstreamUnavailable {
            service: format!("decimals call via {}", self.rpc.url()),
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl DecimalsSource for RpcDecimals {
    async fn decimals(&self, contract_address: &str) -> Result<u32, DecodeError> {
        let call = FunctionCall {
            contract_address: contract_address.to_string(),
            entry_point_selector: starknet_keccak(DECIMALS_ENTRY_POINT),
            calldata: vec![],
        };
        let felts = self
            .rpc
            .call(&call, &self.block)
            .await
            .map_err(|e| self.unavailable(e.to_string()))?;

        let first = felts
            .first()
            .ok_or_else(|| self.unavailable("decimals() returned nothing"))?;
        let value = parse_felt(first).map_err(|e| self.unavailable(e.to_string()))?;
        // ERC-20 decimals is a u8
        u8::try_from(value)
            .map(u32::from)
            .map_err(|_| self.unavailable(format!("decimals() returned {first}")))
    }
}

/// Parse a hex field element.
pub fn parse_felt(value: &str) -> Result<U256, TransferError> {
    let invalid = |reason: String| TransferError::InvalidFelt {
        value: value.to_string(),
        reason,
    };
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    if digits.is_empty() {
        return Err(invalid("no digits".into()));
    }
    U256::from_str_radix(digits, 16).map_err(|e| invalid(e.to_string()))
}

/// `raw / 10^decimals` as a float.
///
/// Lossy for amounts beyond 2^53 base units; the result is for display only.
pub fn normalize_amount(raw: U256, decimals: u32) -> f64 {
    let raw: f64 = raw.to_string().parse().unwrap_or(f64::INFINITY);
    raw / 10f64.powi(decimals as i32)
}

/// Enriches `Transfer` events with sender, recipient and a scaled amount.
pub struct TransferDecoder {
    decimals: Arc<dyn DecimalsSource>,
    tokens: TokenBook,
    /// normalised address → decimals; `None` disables caching
    cache: Option<Mutex<HashMap<String, u32>>>,
}

impl TransferDecoder {
    pub fn new(decimals: Arc<dyn DecimalsSource>) -> Self {
        Self {
            decimals,
            tokens: TokenBook::default(),
            cache: Some(Mutex::new(HashMap::new())),
        }
    }

    pub fn with_tokens(mut self, tokens: TokenBook) -> Self {
        self.tokens = tokens;
        self
    }

    /// Query `decimals()` for every event instead of once per contract.
    pub fn without_decimals_cache(mut self) -> Self {
        self.cache = None;
        self
    }

    /// Label a `Transfer` event emitted by `contract_address`.
    ///
    /// Never fails: on any error the plain `Transfer` name is returned.
    pub async fn decorate(&self, contract_address: &str, event: &RawEvent) -> EventLabel {
        match self.details(contract_address, event).await {
            Ok(details) => EventLabel::Transfer(details),
            Err(e) => {
                tracing::debug!(contract_address, error = %e, "transfer left undecorated");
                EventLabel::Named(TRANSFER_EVENT.to_string())
            }
        }
    }

    async fn details(
        &self,
        contract_address: &str,
        event: &RawEvent,
    ) -> Result<TransferDetails, TransferError> {
        let [sender, recipient, amount, ..] = event.data.as_slice() else {
            return Err(TransferError::ShortData {
                words: event.data.len(),
            });
        };

        let raw = parse_felt(amount)?;
        let decimals = self.decimals_of(contract_address).await?;

        Ok(TransferDetails {
            sender: sender.clone(),
            recipient: recipient.clone(),
            raw_amount: raw.to_string(),
            decimals,
            amount: normalize_amount(raw, decimals),
            token: self.tokens.lookup(contract_address).map(str::to_string),
        })
    }

    async fn decimals_of(&self, contract_address: &str) -> Result<u32, DecodeError> {
        let key = normalize_address(contract_address);
        if let Some(cache) = &self.cache {
            if let Some(&hit) = cache.lock().unwrap().get(&key) {
                return Ok(hit);
            }
        }

        let decimals = self.decimals.decimals(contract_address).await?;
        if let Some(cache) = &self.cache {
            cache.lock().unwrap().insert(key, decimals);
        }
        Ok(decimals)
    }
}
