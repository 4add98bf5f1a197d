//! Cairoscope CLI: decode Starknet transaction simulations.
//!
//! # Commands
//! ```text
//! cairoscope decode   --request <sim-request.json> [--json]
//! cairoscope decode   --response <sim-response.json> [--json]
//! cairoscope flatten  --response <sim-response.json>
//! cairoscope selector <name>...
//! cairoscope abi      --class-hash <hash> [--json]
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use cairoscope_core::{starknet_keccak, AbiEntry};
use cairoscope_decode::{AbiSourceKind, DecoderConfig, TraceDecoder};
use cairoscope_observability::init_tracing;

mod cmd_decode;

#[derive(Parser)]
#[command(
    name = "cairoscope",
    about = "Starknet simulation trace decoder",
    long_about = "
Cairoscope: name the calls and events of a simulated Starknet transaction.

ENVIRONMENT VARIABLES:
  CAIROSCOPE_RPC_URL        Simulation / node JSON-RPC endpoint
  CAIROSCOPE_REGISTRY_URL   Interface registry base URL
  CAIROSCOPE_API_KEY        Interface registry API key
  CAIROSCOPE_CACHE_DIR      Directory of cached class documents
",
    version
)]
struct Cli {
    #[command(flatten)]
    overrides: Overrides,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Settings layered over the config file.
#[derive(Args)]
struct Overrides {
    /// YAML decoder config
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[arg(long, env = "CAIROSCOPE_RPC_URL", global = true)]
    rpc_url: Option<String>,

    #[arg(long, env = "CAIROSCOPE_REGISTRY_URL", global = true)]
    registry_url: Option<String>,

    #[arg(long, env = "CAIROSCOPE_API_KEY", global = true, hide_env_values = true)]
    api_key: Option<String>,

    #[arg(long, env = "CAIROSCOPE_CACHE_DIR", global = true)]
    cache_dir: Option<PathBuf>,

    /// Fetch missing ABIs with starknet_getClass instead of the registry
    #[arg(long, global = true)]
    abi_from_rpc: bool,
}

impl Overrides {
    fn load(&self) -> Result<DecoderConfig> {
        let mut config = match &self.config {
            Some(path) => DecoderConfig::load(path)?,
            None => DecoderConfig::default(),
        };
        if let Some(url) = &self.rpc_url {
            config.rpc_url = url.clone();
        }
        if let Some(url) = &self.registry_url {
            config.registry_url = url.clone();
        }
        if let Some(key) = &self.api_key {
            config.registry_api_key = Some(key.clone());
        }
        if let Some(dir) = &self.cache_dir {
            config.cache_dir = dir.clone();
        }
        if self.abi_from_rpc {
            config.abi_source = AbiSourceKind::Rpc;
        }
        Ok(config)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Decode a simulation, either by running it or from a saved response
    Decode {
        /// starknet_simulateTransactions request to forward
        #[arg(long, conflicts_with = "response", required_unless_present = "response")]
        request: Option<PathBuf>,
        /// Saved simulation response to decode offline
        #[arg(long)]
        response: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the flattened call tree of a saved simulation response
    Flatten {
        #[arg(long)]
        response: PathBuf,
    },

    /// Print the selector of each name
    Selector {
        #[arg(required = true)]
        names: Vec<String>,
    },

    /// Resolve a class's ABI through the cache and list its members
    Abi {
        #[arg(long)]
        class_hash: String,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = cli.overrides.load()?;
    if cli.verbose {
        config.log.level = "debug".into();
    }
    init_tracing(&config.log);
    tracing::debug!(
        rpc_url = %config.rpc_url,
        abi_source = ?config.abi_source,
        cache_dir = %config.cache_dir.display(),
        "configuration loaded"
    );

    match cli.command {
        Commands::Decode {
            request,
            response,
            json,
        } => cmd_decode::run(&config, request.as_deref(), response.as_deref(), json).await,

        Commands::Flatten { response } => cmd_decode::flatten(&config, &response),

        Commands::Selector { names } => {
            for name in &names {
                println!("{}  {}", starknet_keccak(name), name);
            }
            Ok(())
        }

        Commands::Abi { class_hash, json } => cmd_abi(&config, &class_hash, json).await,
    }
}

async fn cmd_abi(config: &DecoderConfig, class_hash: &str, as_json: bool) -> Result<()> {
    let decoder = TraceDecoder::from_config(config)?;
    let abi = decoder
        .repository()
        .resolve(class_hash)
        .await
        .with_context(|| format!("resolve ABI of {class_hash}"))?;

    let Some(abi) = abi else {
        println!("class {class_hash} has no ABI");
        return Ok(());
    };

    let mut members = Vec::new();
    for entry in abi.entries() {
        match entry {
            AbiEntry::Function { name } => members.push(("function", name.as_str())),
            AbiEntry::Event { name } => members.push(("event", name.as_str())),
            AbiEntry::Interface { items, .. } => {
                for item in items {
                    if let AbiEntry::Function { name } = item {
                        members.push(("function", name.as_str()));
                    }
                }
            }
            AbiEntry::Other => {}
        }
    }

    if as_json {
        let out: Vec<_> = members
            .iter()
            .map(|(kind, name)| {
                serde_json::json!({
                    "kind": kind,
                    "name": name,
                    "selector": starknet_keccak(cairoscope_core::abi::last_segment(name)).as_hex(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&out)?);
    } else {
        println!("Class:   {class_hash}");
        println!("Members: {}", members.len());
        for (kind, name) in &members {
            let selector = starknet_keccak(cairoscope_core::abi::last_segment(name));
            println!("  {kind:<8} {name}  {selector}");
        }
    }
    Ok(())
}
