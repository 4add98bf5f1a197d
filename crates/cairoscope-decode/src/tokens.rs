//! Well-known token contracts, keyed by address.

use std::collections::HashMap;

/// The canonical ETH token contract on Starknet mainnet.
pub const ETH_TOKEN_ADDRESS: &str =
    "0x049d36570d4e46f48e99674bd3fcc84644ddd6b96f7c741b1562b82f9e004dc7";

/// Lowercase, unpadded form used as the lookup key (`0x0` for zero).
pub fn normalize_address(address: &str) -> String {
    let digits = address
        .strip_prefix("0x")
        .or_else(|| address.strip_prefix("0X"))
        .unwrap_or(address)
        .trim_start_matches('0')
        .to_ascii_lowercase();
    if digits.is_empty() {
        "0x0".to_string()
    } else {
        format!("0x{digits}")
    }
}

/// Address → display name for tokens worth annotating in transfer labels.
#[derive(Debug, Clone)]
pub struct TokenBook {
    names: HashMap<String, String>,
}

impl TokenBook {
    /// A book with no entries.
    pub fn empty() -> Self {
        Self {
            names: HashMap::new(),
        }
    }

    pub fn with_token(mut self, address: &str, name: impl Into<String>) -> Self {
        self.insert(address, name);
        self
    }

    pub fn insert(&mut self, address: &str, name: impl Into<String>) {
        self.names.insert(normalize_address(address), name.into());
    }

    pub fn lookup(&self, address: &str) -> Option<&str> {
        self.names.get(&normalize_address(address)).map(|s| s.as_str())
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for TokenBook {
    fn default() -> Self {
        Self::empty().with_token(ETH_TOKEN_ADDRESS, "ETH")
    }
}

impl<A: AsRef<str>, N: Into<String>> Extend<(A, N)> for TokenBook {
    fn extend<I: IntoIterator<Item = (A, N)>>(&mut self, iter: I) {
        for (address, name) in iter {
            self.insert(address.as_ref(), name);
        }
    }
}
