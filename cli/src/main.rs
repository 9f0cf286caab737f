//! swaprpc CLI: send JSON-RPC calls from the terminal.
//!
//! Usage:
//! ```bash
//! # Call a method and print the result
//! swaprpc call --url https://cloudflare-eth.com --method eth_blockNumber
//!
//! # With params, a route suffix and an Authorization header
//! swaprpc call --url http://localhost:8545/ --route /rpc --method eth_getBalance \
//!     --params '["0x0000000000000000000000000000000000000000", "latest"]' \
//!     --auth "Bearer TOKEN"
//! ```
//!
//! Set `RUST_LOG=swaprpc_core=debug` to watch handle rotation and error mapping.

use std::env;
use std::process;
use std::time::{Duration, Instant};

use anyhow::{anyhow, bail, Context};
use serde_json::Value;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use swaprpc_core::{RpcClientConfig, RpcClientError};

#[tokio::main]
async fn main() {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        print_usage();
        process::exit(1);
    }

    let result = match args[1].as_str() {
        "call" => cmd_call(&args[2..]).await,
        "version" | "--version" | "-V" => {
            println!("swaprpc {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
        "help" | "--help" | "-h" => {
            print_usage();
            Ok(())
        }
        other => {
            eprintln!("Unknown command: {other}");
            print_usage();
            process::exit(1);
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn print_usage() {
    println!("swaprpc {}", env!("CARGO_PKG_VERSION"));
    println!("Send JSON-RPC calls over HTTP\n");
    println!("USAGE:");
    println!("    swaprpc <COMMAND>\n");
    println!("COMMANDS:");
    println!("    call       Send a JSON-RPC call and print the result");
    println!("    version    Print version");
    println!("    help       Print this help\n");
    println!("CALL FLAGS:");
    println!("    --url <URL>         Base address of the endpoint  [required]");
    println!("    --method <METHOD>   JSON-RPC method name           [required]");
    println!("    --params <JSON>     JSON array of params           [default: []]");
    println!("    --route <ROUTE>     Route resolved against the base address");
    println!("    --auth <VALUE>      Authorization header value");
    println!("    --timeout <SECS>    Request timeout in seconds");
}

async fn cmd_call(args: &[String]) -> anyhow::Result<()> {
    let url = parse_flag(args, "--url").context("--url is required")?;
    let method = parse_flag(args, "--method").context("--method is required")?;
    let route = parse_flag(args, "--route");
    let params = match parse_flag(args, "--params") {
        Some(raw) => parse_params(&raw)?,
        None => vec![],
    };

    let config = RpcClientConfig {
        authorization: parse_flag(args, "--auth"),
        request_timeout: parse_flag(args, "--timeout")
            .map(|s| s.parse::<u64>().map(Duration::from_secs))
            .transpose()
            .context("--timeout must be a whole number of seconds")?,
        ..Default::default()
    };
    let client = swaprpc_http::with_config(&url, config)?;

    let start = Instant::now();
    let result: Value = match client.call(&method, route.as_deref(), params).await {
        Ok(v) => v,
        Err(RpcClientError::Rpc(err)) => {
            let data = err.data.map(|d| format!(" ({d})")).unwrap_or_default();
            bail!("node returned error {}: {}{data}", err.code, err.message);
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(
        method = %method,
        latency_ms = start.elapsed().as_millis() as u64,
        "call completed"
    );

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn parse_params(raw: &str) -> anyhow::Result<Vec<Value>> {
    match serde_json::from_str::<Value>(raw).context("--params is not valid JSON")? {
        Value::Array(items) => Ok(items),
        other => Err(anyhow!("--params must be a JSON array, got {other}")),
    }
}

fn parse_flag(args: &[String], flag: &str) -> Option<String> {
    let pos = args.iter().position(|a| a == flag)?;
    args.get(pos + 1).cloned()
}
