//! Golden pipeline tests.
//!
//! Each test replays a recorded simulation response from
//! `fixtures/simulations/` through a [`TraceDecoder`] whose collaborators
//! are in-memory fakes, with class documents served from `fixtures/abi/`.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use cairoscope_core::{starknet_keccak, DecodeError, EventLabel, RegistryError};
use cairoscope_decode::{RpcDecimals, TraceDecoder, TraceOutcome, TransferDecoder};
use cairoscope_registry::{AbiStore, ClassSource, InterfaceRepository, MemoryAbiStore};
use cairoscope_rpc::{
    from_slice_unbounded, JsonRpcRequest, JsonRpcResponse, RpcTransport, StarknetRpc, TransportError,
};

const ACCOUNT_CLASS: &str = "0x029927c8af6bccf3f6fda035981e765a7bdbf18a2dc0d630494f8758aa908e2b";
const ERC20_CLASS: &str = "0x05ffbcfeb50d200a0677c48a129a11245a3fc519d1d98d76882d1c9a1b19c6ed";

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// The fixtures live two levels above the crate root.
fn fixture(rel: &str) -> String {
    let mut p = std::path::PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    p.push("../../fixtures");
    p.push(rel);
    std::fs::read_to_string(&p).unwrap_or_else(|e| panic!("fixture {}: {e}", p.display()))
}

fn response(rel: &str) -> JsonRpcResponse {
    serde_json::from_str(&fixture(rel)).unwrap()
}

fn simulate_request() -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": 1,
        "method": "starknet_simulateTransactions",
        "params": {
            "block_id": "latest",
            "transactions": [{ "type": "INVOKE", "version": "0x1", "sender_address": "0x581fc1f" }],
            "simulation_flags": ["SKIP_VALIDATE"]
        }
    })
}

/// Answers `starknet_simulateTransactions` with a canned response and
/// `starknet_call` with a fixed result; records every method seen.
struct ScriptedNode {
    simulation: Option<JsonRpcResponse>,
    call_result: Value,
    methods: Mutex<Vec<String>>,
}

impl ScriptedNode {
    fn new(simulation: Option<JsonRpcResponse>) -> Arc<Self> {
        Arc::new(Self {
            simulation,
            call_result: json!(["0x12"]),
            methods: Mutex::new(vec![]),
        })
    }

    fn count(&self, method: &str) -> usize {
        self.methods.lock().unwrap().iter().filter(|m| *m == method).count()
    }
}

#[async_trait]
impl RpcTransport for ScriptedNode {
    async fn send(&self, req: JsonRpcRequest) -> Result<JsonRpcResponse, TransportError> {
        self.methods.lock().unwrap().push(req.method.clone());
        match req.method.as_str() {
            "starknet_simulateTransactions" => self
                .simulation
                .clone()
                .ok_or_else(|| TransportError::Http("HTTP 502: bad gateway".into())),
            "starknet_call" => Ok(JsonRpcResponse::success(req.id, self.call_result.clone())),
            other => Err(TransportError::Other(format!("unexpected method {other}"))),
        }
    }

    fn url(&self) -> &str {
        "scripted://node"
    }
}

/// Serves class documents from a map and counts fetches per class.
#[derive(Default)]
struct FixtureSource {
    documents: HashMap<String, String>,
    fetches: Mutex<HashMap<String, usize>>,
    total: AtomicUsize,
}

impl FixtureSource {
    fn with(mut self, class_hash: &str, body: String) -> Self {
        self.documents.insert(class_hash.to_string(), body);
        self
    }

    fn fetches_of(&self, class_hash: &str) -> usize {
        self.fetches.lock().unwrap().get(class_hash).copied().unwrap_or(0)
    }
}

#[async_trait]
impl ClassSource for FixtureSource {
    async fn fetch_class(&self, class_hash: &str) -> Result<String, RegistryError> {
        self.total.fetch_add(1, Ordering::SeqCst);
        *self
            .fetches
            .lock()
            .unwrap()
            .entry(class_hash.to_string())
            .or_default() += 1;
        // let concurrent lookups of the same class pile up
        tokio::task::yield_now().await;
        self.documents
            .get(class_hash)
            .cloned()
            .ok_or_else(|| RegistryError::UpstreamUnavailable {
                service: "fixtures".into(),
                reason: format!("HTTP 404 for {class_hash}"),
            })
    }

    fn name(&self) -> &str {
        "fixtures"
    }
}

fn fixture_source() -> FixtureSource {
    FixtureSource::default()
        .with(ACCOUNT_CLASS, fixture("abi/account.json"))
        .with(ERC20_CLASS, fixture("abi/erc20.json"))
}

fn decoder(
    node: Arc<ScriptedNode>,
    store: Arc<dyn AbiStore>,
    source: Arc<dyn ClassSource>,
) -> TraceDecoder {
    let rpc = Arc::new(StarknetRpc::new(node));
    let repository = Arc::new(InterfaceRepository::new(store, source));
    let transfers = TransferDecoder::new(Arc::new(RpcDecimals::new(rpc.clone())));
    TraceDecoder::new(rpc, repository, transfers)
}

/// A simulation response whose root has `levels` single-child generations.
fn nested_response(levels: usize) -> JsonRpcResponse {
    let open = r#"{"contract_address":"0x1","class_hash":"0xaa","entry_point_selector":"0x1","calls":["#;
    let leaf = r#"{"contract_address":"0x1","class_hash":"0xaa","entry_point_selector":"0x1"}"#;
    let body = format!(
        r#"{{"jsonrpc":"2.0","id":1,"result":[{{"transaction_trace":{{"execute_invocation":{}{}{}}}}}]}}"#,
        open.repeat(levels),
        leaf,
        "]}".repeat(levels)
    );
    from_slice_unbounded(body.as_bytes()).unwrap()
}

fn labels(events: &[EventLabel]) -> Vec<Option<String>> {
    events.iter().cloned().map(Into::into).collect()
}

// ─── Golden traces ────────────────────────────────────────────────────────────

#[tokio::test]
async fn erc20_transfer_golden() {
    let node = ScriptedNode::new(Some(response("simulations/erc20_transfer.json")));
    let store = Arc::new(MemoryAbiStore::new());
    let source = Arc::new(fixture_source());
    let decoder = decoder(node.clone(), store.clone(), source.clone());

    let calls = decoder
        .explain(&simulate_request())
        .await
        .unwrap()
        .into_calls()
        .unwrap();

    assert_eq!(calls.len(), 3);
    let depths: Vec<_> = calls.iter().map(|c| c.depth).collect();
    assert_eq!(depths, [0, 1, 1]);

    // account entry point, found inside a string-encoded interface
    assert_eq!(calls[0].class_hash, ACCOUNT_CLASS);
    assert_eq!(calls[0].function.as_deref(), Some("__execute__"));
    assert_eq!(labels(&calls[0].events), [None]);

    assert_eq!(calls[1].function.as_deref(), Some("approve"));
    assert_eq!(labels(&calls[1].events), [Some("Approval".to_string())]);

    // zero-padded selector in the trace
    assert_eq!(calls[2].function.as_deref(), Some("transfer"));
    assert_eq!(
        labels(&calls[2].events),
        [Some(
            "Transfer from 0x0581fc1f.., to 0x0781fc1f.., amount: 0.01 (ETH)".to_string()
        )]
    );
    let EventLabel::Transfer(details) = &calls[2].events[0] else {
        panic!("transfer not decorated: {:?}", calls[2].events[0]);
    };
    assert_eq!(details.raw_amount, "10000000000000000");
    assert_eq!(details.decimals, 18);

    // sibling calls on the same class share one fetch and one cache write
    assert_eq!(source.fetches_of(ERC20_CLASS), 1);
    assert_eq!(source.fetches_of(ACCOUNT_CLASS), 1);
    assert_eq!(store.len(), 2);
    assert_eq!(node.count("starknet_simulateTransactions"), 1);
    assert_eq!(node.count("starknet_call"), 1);
}

#[tokio::test]
async fn resolved_calls_serialize_for_callers() {
    let node = ScriptedNode::new(None);
    let decoder = decoder(node, Arc::new(MemoryAbiStore::new()), Arc::new(fixture_source()));

    let outcome = decoder
        .decode_response(response("simulations/erc20_transfer.json"))
        .await
        .unwrap();
    let TraceOutcome::Resolved(calls) = outcome else {
        panic!("expected resolved calls");
    };
    let json = serde_json::to_value(&calls).unwrap();
    assert_eq!(json[0]["function"], "__execute__");
    assert_eq!(json[0]["events"], json!([null]));
    assert_eq!(json[1]["events"], json!(["Approval"]));
    assert_eq!(json[2]["depth"], 1);
}

#[tokio::test]
async fn cached_documents_skip_the_source() {
    let store = Arc::new(MemoryAbiStore::new());
    store.put(ACCOUNT_CLASS, &fixture("abi/account.json")).await.unwrap();
    store.put(ERC20_CLASS, &fixture("abi/erc20.json")).await.unwrap();
    let source = Arc::new(FixtureSource::default());
    let decoder = decoder(ScriptedNode::new(None), store, source.clone());

    let calls = decoder
        .decode_response(response("simulations/erc20_transfer.json"))
        .await
        .unwrap()
        .into_calls()
        .unwrap();

    assert_eq!(calls[2].function.as_deref(), Some("transfer"));
    assert_eq!(source.total.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn single_transfer_call() {
    let doc = json!({
        "abi": [
            { "type": "function", "name": "transfer" },
            { "type": "event", "name": "Transfer" }
        ]
    });
    let sim = json!({
        "jsonrpc": "2.0",
        "id": 7,
        "result": [{
            "transaction_trace": {
                "type": "INVOKE",
                "execute_invocation": {
                    "contract_address": "0x1",
                    "class_hash": "0xAA",
                    "entry_point_selector": starknet_keccak("transfer").as_hex(),
                    "events": [{
                        "keys": [starknet_keccak("Transfer").as_hex()],
                        "data": ["0x123456789abc", "0xabcdef012345", "0x3e8", "0x0"]
                    }],
                    "calls": []
                }
            }
        }]
    });
    let source = Arc::new(FixtureSource::default().with("0xAA", doc.to_string()));
    let decoder = decoder(
        ScriptedNode::new(Some(serde_json::from_value(sim).unwrap())),
        Arc::new(MemoryAbiStore::new()),
        source,
    );

    let calls = decoder
        .explain(&simulate_request())
        .await
        .unwrap()
        .into_calls()
        .unwrap();

    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0].function.as_deref(), Some("transfer"));
    let label = calls[0].events[0].to_string();
    assert!(label.starts_with("Transfer from "), "{label}");
}

// ─── Failures ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn execution_error_is_returned_verbatim() {
    let node = ScriptedNode::new(Some(response("simulations/execution_error.json")));
    let source = Arc::new(fixture_source());
    let decoder = decoder(node.clone(), Arc::new(MemoryAbiStore::new()), source.clone());

    let outcome = decoder.explain(&simulate_request()).await.unwrap();

    assert_eq!(outcome, TraceOutcome::Failed("insufficient balance".into()));
    assert_eq!(source.total.load(Ordering::SeqCst), 0);
    assert_eq!(node.count("starknet_call"), 0);

    let err = outcome.into_calls().unwrap_err();
    assert_eq!(err.to_string(), "Simulation failed: insufficient balance");
}

#[tokio::test]
async fn revert_reason_is_returned_verbatim() {
    let decoder = decoder(
        ScriptedNode::new(None),
        Arc::new(MemoryAbiStore::new()),
        Arc::new(fixture_source()),
    );

    let outcome = decoder
        .decode_response(response("simulations/reverted.json"))
        .await
        .unwrap();

    assert_eq!(
        outcome,
        TraceOutcome::Failed("Error in the called contract (0x0581fc1f):\nu256_sub Overflow".into())
    );
}

#[tokio::test]
async fn unreachable_registry_degrades_to_unresolved() {
    let source = Arc::new(FixtureSource::default());
    let decoder = decoder(ScriptedNode::new(None), Arc::new(MemoryAbiStore::new()), source.clone());

    let calls = decoder
        .decode_response(response("simulations/erc20_transfer.json"))
        .await
        .unwrap()
        .into_calls()
        .unwrap();

    assert_eq!(calls.len(), 3);
    for call in &calls {
        assert_eq!(call.function, None);
        assert!(call.events.iter().all(|e| !e.is_resolved()));
    }
    // failures are not memoised, so the second sibling asks again
    assert_eq!(source.fetches_of(ERC20_CLASS), 2);
}

#[tokio::test]
async fn too_deep_trace_is_malformed() {
    let decoder = decoder(
        ScriptedNode::new(None),
        Arc::new(MemoryAbiStore::new()),
        Arc::new(fixture_source()),
    )
    .with_max_depth(0);

    let err = decoder
        .decode_response(response("simulations/erc20_transfer.json"))
        .await
        .unwrap_err();
    assert!(matches!(err, DecodeError::MalformedTrace { .. }), "{err}");
}

#[tokio::test]
async fn nested_trace_within_limit_decodes() {
    let decoder = decoder(
        ScriptedNode::new(None),
        Arc::new(MemoryAbiStore::new()),
        Arc::new(FixtureSource::default()),
    );

    let calls = decoder
        .decode_response(nested_response(80))
        .await
        .unwrap()
        .into_calls()
        .unwrap();

    assert_eq!(calls.len(), 81);
    assert!(calls.iter().enumerate().all(|(i, c)| c.depth == i));
}

#[tokio::test]
async fn nested_trace_beyond_limit_is_malformed() {
    let decoder = decoder(
        ScriptedNode::new(None),
        Arc::new(MemoryAbiStore::new()),
        Arc::new(FixtureSource::default()),
    );

    let err = decoder
        .decode_response(nested_response(300))
        .await
        .unwrap_err();
    assert!(matches!(err, DecodeError::MalformedTrace { .. }), "{err}");
}

#[tokio::test]
async fn unreachable_simulator_is_upstream_error() {
    let decoder = decoder(
        ScriptedNode::new(None),
        Arc::new(MemoryAbiStore::new()),
        Arc::new(fixture_source()),
    );

    let err = decoder.explain(&simulate_request()).await.unwrap_err();
    assert!(
        matches!(err, DecodeError::UpstreamUnavailable { ref service, .. } if service == "simulation service"),
        "{err}"
    );
}
