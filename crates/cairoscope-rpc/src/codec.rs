//! JSON decoding without a nesting limit.
//!
//! Every call level of a simulation trace adds an object and a `calls`
//! array, so serde_json's default recursion limit (128) caps traces at
//! about 60 levels. These helpers lift the limit and grow the stack on
//! demand; depth is bounded later by the trace flattener.

use serde::de::{Deserialize, DeserializeOwned};
use serde_json::Value;

/// `serde_json::from_slice` with no recursion limit.
pub fn from_slice_unbounded<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_slice(bytes);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))?;
    de.end()?;
    Ok(value)
}

/// `serde_json::from_value` for deeply nested values, without cloning.
pub fn from_value_unbounded<T: DeserializeOwned>(value: &Value) -> Result<T, serde_json::Error> {
    T::deserialize(serde_stacker::Deserializer::new(value))
}
