//! Recovers human-readable names for a call's entry point and its events.
//!
//! Functions are looked up among top-level `function` members and the
//! functions nested one level inside `interface` members. Events are looked
//! up among top-level `event` members only; interface groups are never
//! searched for events.

use crate::abi::{last_segment, Abi, AbiEntry};
use crate::call::{EventLabel, ResolvedCall};
use crate::selector::{starknet_keccak, SelectorHash};
use crate::trace::{CallRecord, RawEvent};

fn hashes_to(name: &str, target: &SelectorHash) -> bool {
    starknet_keccak(last_segment(name)) == *target
}

/// Find the function whose selector is `target`. First match in ABI order wins.
pub fn function_name<'a>(abi: &'a Abi, target: &SelectorHash) -> Option<&'a str> {
    for entry in abi.entries() {
        match entry {
            AbiEntry::Function { name } if hashes_to(name, target) => {
                return Some(last_segment(name));
            }
            AbiEntry::Interface { items, .. } => {
                let nested = items.iter().find_map(|item| match item {
                    AbiEntry::Function { name } if hashes_to(name, target) => {
                        Some(last_segment(name))
                    }
                    _ => None,
                });
                if nested.is_some() {
                    return nested;
                }
            }
            _ => {}
        }
    }
    None
}

/// Find the top-level event whose selector is `target`.
pub fn event_name<'a>(abi: &'a Abi, target: &SelectorHash) -> Option<&'a str> {
    abi.entries().iter().find_map(|entry| match entry {
        AbiEntry::Event { name } if hashes_to(name, target) => Some(last_segment(name)),
        _ => None,
    })
}

fn label_event(abi: &Abi, event: &RawEvent) -> EventLabel {
    let Some(key) = event.selector_key() else {
        return EventLabel::Unresolved;
    };
    let Ok(target) = SelectorHash::from_hex(key) else {
        tracing::debug!(key, "event key is not a felt");
        return EventLabel::Unresolved;
    };
    match event_name(abi, &target) {
        Some(name) => EventLabel::Named(name.to_string()),
        None => EventLabel::Unresolved,
    }
}

/// Resolve one flattened call against its interface description.
///
/// Never fails: a missing ABI leaves the function name absent and every
/// event unresolved, and an unmatched selector is only reported as a
/// diagnostic.
pub fn resolve(record: &CallRecord, abi: Option<&Abi>) -> ResolvedCall {
    let (function, events) = match abi {
        Some(abi) => {
            let function = function_name(abi, &record.selector).map(str::to_string);
            if function.is_none() {
                tracing::warn!(
                    selector = %record.selector,
                    class_hash = %record.class_hash,
                    "no ABI function matches entry point selector"
                );
            }
            let events = record.events.iter().map(|e| label_event(abi, e)).collect();
            (function, events)
        }
        None => (None, vec![EventLabel::Unresolved; record.events.len()]),
    };

    ResolvedCall {
        contract_address: record.contract_address.clone(),
        class_hash: record.class_hash.clone(),
        depth: record.depth,
        function,
        events,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn erc20_abi() -> Abi {
        Abi::from_value(&json!([
            { "type": "function", "name": "constructor_helper" },
            {
                "type": "interface",
                "name": "openzeppelin::token::erc20::interface::IERC20",
                "items": [
                    { "type": "function", "name": "balance_of" },
                    { "type": "function", "name": "transfer" },
                    { "type": "event", "name": "Approval" }
                ]
            },
            { "type": "event", "name": "openzeppelin::token::erc20::erc20::ERC20Component::Transfer" }
        ]))
        .unwrap()
    }

    fn record(selector: &str, keys: &[&str]) -> CallRecord {
        CallRecord {
            contract_address: "0x1".into(),
            class_hash: "0xaa".into(),
            selector: SelectorHash::from_hex(selector).unwrap(),
            events: keys
                .iter()
                .map(|k| RawEvent {
                    keys: vec![k.to_string()],
                    data: vec![],
                })
                .collect(),
            depth: 0,
        }
    }

    #[test]
    fn resolves_interface_function_and_event() {
        let transfer = starknet_keccak("transfer");
        let transfer_event = starknet_keccak("Transfer");
        let resolved = resolve(
            &record(transfer.as_hex(), &[transfer_event.as_hex()]),
            Some(&erc20_abi()),
        );
        assert_eq!(resolved.function.as_deref(), Some("transfer"));
        assert_eq!(resolved.events, vec![EventLabel::Named("Transfer".into())]);
    }

    #[test]
    fn top_level_function_wins_in_order() {
        let abi = Abi::from_value(&json!([
            { "type": "function", "name": "a::transfer" },
            { "type": "interface", "name": "I", "items": [{ "type": "function", "name": "b::transfer" }] }
        ]))
        .unwrap();
        assert_eq!(
            function_name(&abi, &starknet_keccak("transfer")),
            Some("transfer")
        );
    }

    #[test]
    fn events_nested_in_interfaces_are_ignored() {
        let approval = starknet_keccak("Approval");
        assert_eq!(event_name(&erc20_abi(), &approval), None);
    }

    #[test]
    fn interface_function_is_not_an_event() {
        let abi = Abi::from_value(&json!([
            { "type": "interface", "name": "I", "items": [{ "type": "function", "name": "Transfer" }] }
        ]))
        .unwrap();
        assert_eq!(event_name(&abi, &starknet_keccak("Transfer")), None);
        assert_eq!(function_name(&abi, &starknet_keccak("Transfer")), Some("Transfer"));
    }

    #[test]
    fn unmatched_selector_leaves_function_absent() {
        let resolved = resolve(&record("0x1234", &["0x99", "nonsense"]), Some(&erc20_abi()));
        assert_eq!(resolved.function, None);
        assert_eq!(resolved.events, vec![EventLabel::Unresolved, EventLabel::Unresolved]);
    }

    #[test]
    fn event_without_keys_is_unresolved() {
        let mut rec = record("0x1", &[]);
        rec.events.push(RawEvent::default());
        let resolved = resolve(&rec, Some(&erc20_abi()));
        assert_eq!(resolved.events, vec![EventLabel::Unresolved]);
    }

    #[test]
    fn absent_abi_degrades() {
        let transfer = starknet_keccak("transfer");
        let resolved = resolve(&record(transfer.as_hex(), &["0x1", "0x2"]), None);
        assert_eq!(resolved.function, None);
        assert_eq!(resolved.events.len(), 2);
        assert!(resolved.events.iter().all(|e| !e.is_resolved()));
    }

    #[test]
    fn matches_padded_selectors() {
        let padded = format!("0x00{}", &starknet_keccak("balance_of").as_hex()[2..]);
        let resolved = resolve(&record(&padded, &[]), Some(&erc20_abi()));
        assert_eq!(resolved.function.as_deref(), Some("balance_of"));
    }
}
