//! `cairoscope decode` and `cairoscope flatten`.

use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;

use cairoscope_core::{flatten as flatten_trace, ResolvedCall};
use cairoscope_decode::{interpret, DecoderConfig, Simulated, TraceDecoder, TraceOutcome};
use cairoscope_rpc::{from_slice_unbounded, JsonRpcResponse};

fn read_file<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let body = std::fs::read(path).with_context(|| format!("read '{}'", path.display()))?;
    from_slice_unbounded(&body).with_context(|| format!("parse '{}'", path.display()))
}

fn read_json(path: &Path) -> Result<Value> {
    read_file(path)
}

fn read_response(path: &Path) -> Result<JsonRpcResponse> {
    read_file(path).with_context(|| format!("'{}' is not a JSON-RPC response", path.display()))
}

pub async fn run(
    config: &DecoderConfig,
    request: Option<&Path>,
    response: Option<&Path>,
    as_json: bool,
) -> Result<()> {
    let decoder = TraceDecoder::from_config(config)?;
    let outcome = match (request, response) {
        (Some(path), _) => decoder.explain(&read_json(path)?).await?,
        (None, Some(path)) => decoder.decode_response(read_response(path)?).await?,
        (None, None) => anyhow::bail!("one of --request or --response is required"),
    };

    match outcome {
        TraceOutcome::Resolved(calls) if as_json => {
            println!("{}", serde_json::to_string_pretty(&calls)?);
        }
        TraceOutcome::Resolved(calls) => print_calls(&calls),
        TraceOutcome::Failed(reason) => {
            if as_json {
                println!("{}", serde_json::json!({ "error": reason }));
            } else {
                println!("✗ Simulation failed: {reason}");
            }
            std::process::exit(2);
        }
    }
    Ok(())
}

fn print_calls(calls: &[ResolvedCall]) {
    for call in calls {
        let indent = "  ".repeat(call.depth);
        println!(
            "{indent}{} @ {} (class {})",
            call.function.as_deref().unwrap_or("<unknown>"),
            call.contract_address,
            call.class_hash
        );
        for event in &call.events {
            println!("{indent}  · {event}");
        }
    }
}

pub fn flatten(config: &DecoderConfig, response: &Path) -> Result<()> {
    let root = match interpret(read_response(response)?)? {
        Simulated::Trace(root) => root,
        Simulated::Failed(reason) => {
            println!("✗ Simulation failed: {reason}");
            std::process::exit(2);
        }
    };

    let records = flatten_trace(root, config.max_trace_depth)?;
    println!("{} calls", records.len());
    for record in &records {
        println!(
            "{}{} {} selector={} events={}",
            "  ".repeat(record.depth),
            record.contract_address,
            record.class_hash,
            record.selector,
            record.events.len()
        );
    }
    Ok(())
}
