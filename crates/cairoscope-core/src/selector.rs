//! Starknet selector hashing.
//!
//! A selector is `keccak256(name)` masked to 250 bits so that it fits in a
//! field element:
//!   starknet_keccak("transfer")
//!   → 0x83afd3f4caedc6eebf44246fe54e38c95e3179a5ec9ea81740eca5b482d12e
//!
//! Traces carry selectors as hex felts without padding, so every
//! [`SelectorHash`] is kept in that canonical form and compared as a string.

use serde::{Deserialize, Serialize};
use std::fmt;
use tiny_keccak::{Hasher, Keccak};

use crate::error::DecodeError;

/// A 250-bit selector rendered as `0x`-prefixed lowercase hex with no
/// leading zeros (`0x0` for zero).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SelectorHash(String);

impl SelectorHash {
    /// Parse a hex felt, accepting padded or unpadded and any letter case.
    pub fn from_hex(value: &str) -> Result<Self, DecodeError> {
        let digits = value
            .strip_prefix("0x")
            .or_else(|| value.strip_prefix("0X"))
            .ok_or_else(|| DecodeError::InvalidSelector {
                value: value.to_string(),
            })?;
        if digits.is_empty()
            || digits.len() > 64
            || !digits.chars().all(|c| c.is_ascii_hexdigit())
        {
            return Err(DecodeError::InvalidSelector {
                value: value.to_string(),
            });
        }
        Ok(Self::from_digits(&digits.to_ascii_lowercase()))
    }

    fn from_digits(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        if trimmed.is_empty() {
            Self("0x0".into())
        } else {
            Self(format!("0x{trimmed}"))
        }
    }

    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SelectorHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SelectorHash {
    type Error = DecodeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

impl From<SelectorHash> for String {
    fn from(value: SelectorHash) -> Self {
        value.0
    }
}

/// Compute the Starknet selector of an identifier name.
pub fn starknet_keccak(name: &str) -> SelectorHash {
    let mut hasher = Keccak::v256();
    let mut output = [0u8; 32];
    hasher.update(name.as_bytes());
    hasher.finalize(&mut output);
    // clear the top 6 bits of the big-endian value
    output[0] &= 0x03;
    SelectorHash::from_digits(&hex::encode(output))
}
