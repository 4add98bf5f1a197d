//! Decoded call and event descriptions.

use serde::Serialize;
use std::fmt;

/// Number of leading address characters shown in transfer labels.
const ADDRESS_PREFIX_LEN: usize = 10;

/// Amount details recovered from a `Transfer` event.
#[derive(Debug, Clone, PartialEq)]
pub struct TransferDetails {
    pub sender: String,
    pub recipient: String,
    /// Raw on-chain amount, in base-10.
    pub raw_amount: String,
    pub decimals: u32,
    /// `raw_amount / 10^decimals`. Display only: large amounts lose precision.
    pub amount: f64,
    /// Name of a well-known token contract that emitted the event.
    pub token: Option<String>,
}

fn prefix(address: &str) -> &str {
    match address.char_indices().nth(ADDRESS_PREFIX_LEN) {
        Some((idx, _)) => &address[..idx],
        None => address,
    }
}

impl fmt::Display for TransferDetails {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Transfer from {}.., to {}.., amount: {}",
            prefix(&self.sender),
            prefix(&self.recipient),
            self.amount
        )?;
        if let Some(token) = &self.token {
            write!(f, " ({token})")?;
        }
        Ok(())
    }
}

/// The decoded description of one emitted event.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(into = "Option<String>")]
pub enum EventLabel {
    /// Last segment of the matching ABI event name.
    Named(String),
    /// A `Transfer` event enriched with amounts.
    Transfer(TransferDetails),
    /// No ABI event matched the event selector.
    Unresolved,
}

impl EventLabel {
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::Named(name) => Some(name),
            Self::Transfer(_) => Some("Transfer"),
            Self::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        !matches!(self, Self::Unresolved)
    }
}

impl fmt::Display for EventLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => f.write_str(name),
            Self::Transfer(details) => details.fmt(f),
            Self::Unresolved => f.write_str("<unresolved>"),
        }
    }
}

impl From<EventLabel> for Option<String> {
    fn from(label: EventLabel) -> Self {
        label.is_resolved().then(|| label.to_string())
    }
}

/// The decoded form of a [`CallRecord`](crate::trace::CallRecord).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedCall {
    pub contract_address: String,
    pub class_hash: String,
    pub depth: usize,
    /// `None` when no ABI function matches the entry-point selector.
    pub function: Option<String>,
    /// One label per emitted event, in emission order.
    pub events: Vec<EventLabel>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn details(token: Option<&str>) -> TransferDetails {
        TransferDetails {
            sender: "0x0123456789abcdef".into(),
            recipient: "0xfedcba9876543210".into(),
            raw_amount: "1500000000000000000".into(),
            decimals: 18,
            amount: 1.5,
            token: token.map(Into::into),
        }
    }

    #[test]
    fn transfer_label_format() {
        assert_eq!(
            EventLabel::Transfer(details(None)).to_string(),
            "Transfer from 0x01234567.., to 0xfedcba98.., amount: 1.5"
        );
        assert_eq!(
            EventLabel::Transfer(details(Some("ETH"))).to_string(),
            "Transfer from 0x01234567.., to 0xfedcba98.., amount: 1.5 (ETH)"
        );
    }

    #[test]
    fn short_addresses_are_kept_whole() {
        let mut d = details(None);
        d.sender = "0x1".into();
        assert!(d.to_string().starts_with("Transfer from 0x1.., to "));
    }

    #[test]
    fn serializes_labels_as_strings_or_null() {
        let call = ResolvedCall {
            contract_address: "0x1".into(),
            class_hash: "0xaa".into(),
            depth: 0,
            function: None,
            events: vec![EventLabel::Named("Approval".into()), EventLabel::Unresolved],
        };
        let json = serde_json::to_value(&call).unwrap();
        assert_eq!(json["events"], serde_json::json!(["Approval", null]));
        assert_eq!(json["function"], serde_json::Value::Null);
    }
}
