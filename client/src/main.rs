use anyhow::Context;
use basecamp::peers::client::{HttpPeer, PeerClient, cluster_client};
use basecamp::rpc::protocol::{ComputeRequest, MAX_PAYLOAD_BYTES, Target};
use basecamp::topology::loader::load_topology;
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Sends one synthetic compute request to the topology's leader.
#[derive(Debug, Parser)]
#[command(name = "basecamp-client", version)]
struct Args {
    /// Path to the JSON topology file.
    #[arg(long, env = "TOPOLOGY_FILE")]
    topology: PathBuf,

    /// Which team subtree must contribute: GREEN, PINK or BOTH.
    #[arg(long, default_value = "BOTH")]
    target: Target,

    /// Size of the synthetic payload in bytes.
    #[arg(long, default_value_t = 1024)]
    payload_size: usize,

    /// Request identifier. A random UUID when omitted.
    #[arg(long)]
    request_id: Option<String>,

    /// How long to wait for the whole tree to answer, in seconds.
    #[arg(long, default_value_t = 10)]
    timeout_secs: u64,
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if args.payload_size > MAX_PAYLOAD_BYTES {
        tracing::error!(
            "--payload-size {} exceeds the {} byte limit",
            args.payload_size,
            MAX_PAYLOAD_BYTES
        );
        return ExitCode::from(2);
    }

    let leader = match find_leader(&args) {
        Ok(peer) => peer,
        Err(e) => {
            tracing::error!("{:#}", e);
            return ExitCode::from(2);
        }
    };

    let request = ComputeRequest {
        request_id: args
            .request_id
            .clone()
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
        target: args.target,
        payload: vec![0x01; args.payload_size],
    };

    tracing::info!(
        "Sending request {} (target {:?}, {} bytes)",
        request.request_id,
        request.target,
        request.payload.len()
    );

    match leader
        .call(&request, Duration::from_secs(args.timeout_secs))
        .await
    {
        Ok(result) => {
            println!(
                "OK compute_ms={} data_size={}",
                result.compute_ms,
                result.data.len()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("RPC failed: code={:?} msg=\"{}\"", e.code(), e.message());
            ExitCode::FAILURE
        }
    }
}

fn find_leader(args: &Args) -> anyhow::Result<HttpPeer> {
    let topology = load_topology(&args.topology).context("loading topology")?;
    let leader = topology
        .leader()
        .context("no leader in topology")?;

    tracing::info!("Leader is {} at {}", leader.name, leader.addr());

    Ok(HttpPeer::new(cluster_client()?, leader))
}
