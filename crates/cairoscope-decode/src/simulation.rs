//! Interpretation of `starknet_simulateTransactions` responses.

use serde_json::Value;

use cairoscope_core::{DecodeError, RawCallNode};
use cairoscope_rpc::{from_value_unbounded, JsonRpcError, JsonRpcResponse};

/// What a simulation response carries.
#[derive(Debug, Clone, PartialEq)]
pub enum Simulated {
    /// The root invocation of the first simulated transaction.
    Trace(RawCallNode),
    /// Execution error or revert reason, verbatim.
    Failed(String),
}

/// Split a simulation response into a decodable trace or a failure reason.
///
/// Failure comes from either `error.data.execution_error` on the envelope or
/// a `revert_reason` on the root invocation. Anything else that does not
/// match the expected shape is a malformed trace.
pub fn interpret(response: JsonRpcResponse) -> Result<Simulated, DecodeError> {
    let result = match response.into_result() {
        Ok(result) => result,
        Err(error) => return Ok(Simulated::Failed(failure_reason(error))),
    };

    let invocation = result
        .get(0)
        .and_then(|tx| tx.get("transaction_trace"))
        .and_then(|trace| trace.get("execute_invocation"))
        .ok_or_else(|| {
            DecodeError::malformed("response has no result[0].transaction_trace.execute_invocation")
        })?;

    if let Some(reason) = invocation.get("revert_reason").filter(|r| is_set(r)) {
        return Ok(Simulated::Failed(as_reason(reason)));
    }

    from_value_unbounded(invocation)
        .map(Simulated::Trace)
        .map_err(|e| DecodeError::malformed(format!("execute_invocation: {e}")))
}

fn failure_reason(error: JsonRpcError) -> String {
    match error.data.as_ref().and_then(|d| d.get("execution_error")) {
        Some(reason) => as_reason(reason),
        None => error.message,
    }
}

/// `null` and `""` mean the invocation did not revert.
fn is_set(reason: &Value) -> bool {
    match reason {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        _ => true,
    }
}

fn as_reason(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
