//! Simulation call trees and their flattened form.

use serde::{Deserialize, Serialize};

use crate::error::DecodeError;
use crate::selector::SelectorHash;

/// Default bound on call-tree nesting accepted by [`flatten`].
pub const DEFAULT_MAX_DEPTH: usize = 256;

/// An event as emitted in a simulation trace.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// `keys[0]` is the selector of the event name.
    #[serde(default)]
    pub keys: Vec<String>,
    /// Hex-encoded field elements.
    #[serde(default)]
    pub data: Vec<String>,
}

impl RawEvent {
    /// The event selector (first key), if any.
    pub fn selector_key(&self) -> Option<&str> {
        self.keys.first().map(|s| s.as_str())
    }
}

/// One invocation node of a simulation trace, as produced by the simulator
/// (`execute_invocation` and each of its nested `calls`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCallNode {
    pub contract_address: String,
    pub class_hash: String,
    pub entry_point_selector: String,
    #[serde(default)]
    pub events: Vec<RawEvent>,
    #[serde(default)]
    pub calls: Vec<RawCallNode>,
}

/// A single call of the flattened tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallRecord {
    pub contract_address: String,
    pub class_hash: String,
    pub selector: SelectorHash,
    pub events: Vec<RawEvent>,
    /// Nesting level; the root call is 0.
    pub depth: usize,
}

/// Flatten a call tree in pre-order: a call precedes its nested calls, and
/// each nested call's whole subtree is emitted before its next sibling.
///
/// Uses an explicit stack, so stack usage does not grow with the tree.
/// A node nested deeper than `max_depth` makes the whole trace malformed.
pub fn flatten(root: RawCallNode, max_depth: usize) -> Result<Vec<CallRecord>, DecodeError> {
    let mut records = Vec::new();
    let mut stack = vec![(root, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        if depth > max_depth {
            return Err(DecodeError::malformed(format!(
                "call tree deeper than {max_depth} levels"
            )));
        }

        let RawCallNode {
            contract_address,
            class_hash,
            entry_point_selector,
            events,
            calls,
        } = node;

        let selector = SelectorHash::from_hex(&entry_point_selector).map_err(|_| {
            DecodeError::malformed(format!(
                "invalid entry_point_selector '{entry_point_selector}' in call to {contract_address}"
            ))
        })?;

        records.push(CallRecord {
            contract_address,
            class_hash,
            selector,
            events,
            depth,
        });

        // reversed so the first child is popped first
        stack.extend(calls.into_iter().rev().map(|child| (child, depth + 1)));
    }

    Ok(records)
}
