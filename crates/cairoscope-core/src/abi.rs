//! Contract interface descriptions (Cairo ABIs).
//!
//! Only the parts needed for name recovery are modelled: the member kind and
//! its fully-qualified name. Cairo 1 names are `::`-delimited paths such as
//! `openzeppelin::token::erc20::erc20::ERC20Component::Transfer`; matching
//! always uses the final segment.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Separator between path segments of a fully-qualified member name.
pub const PATH_SEPARATOR: &str = "::";

/// One member of an interface description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AbiEntry {
    Function {
        name: String,
    },
    Event {
        name: String,
    },
    /// A named group of functions (Cairo 1 `interface`).
    Interface {
        name: String,
        #[serde(default)]
        items: Vec<AbiEntry>,
    },
    /// `struct`, `enum`, `impl`, `constructor`, `l1_handler` and anything else.
    #[serde(other)]
    Other,
}

impl AbiEntry {
    /// Fully-qualified name, if this kind of member has one we track.
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Function { name } | Self::Event { name } | Self::Interface { name, .. } => {
                Some(name)
            }
            Self::Other => None,
        }
    }

    /// Last `::` segment of the member name.
    pub fn short_name(&self) -> Option<&str> {
        self.name().map(last_segment)
    }
}

/// Last `::`-delimited segment of a path (the whole string if it has none).
pub fn last_segment(path: &str) -> &str {
    path.rsplit(PATH_SEPARATOR).next().unwrap_or(path)
}

/// An ordered interface description.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Abi {
    entries: Vec<AbiEntry>,
}

impl Abi {
    pub fn new(entries: Vec<AbiEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[AbiEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parse the `abi` value of a class document.
    ///
    /// Sierra classes served by node RPC carry the ABI as a JSON-encoded
    /// string; explorer APIs and legacy classes carry a plain array.
    pub fn from_value(value: &Value) -> Result<Self, serde_json::Error> {
        match value {
            Value::String(encoded) => serde_json::from_str(encoded),
            other => Self::deserialize(other),
        }
    }

    /// Parse a whole class document and return its `abi` member.
    ///
    /// A document without an `abi` member (or with `"abi": null`) yields
    /// `Ok(None)`.
    pub fn from_document(body: &str) -> Result<Option<Self>, serde_json::Error> {
        let doc: Value = serde_json::from_str(body)?;
        match doc.get("abi") {
            None | Some(Value::Null) => Ok(None),
            Some(abi) => Self::from_value(abi).map(Some),
        }
    }
}
