use anyhow::Context;
use basecamp::dispatch::handler::Handler;
use basecamp::peers::connector::connect;
use basecamp::rpc::handlers::router;
use basecamp::topology::loader::load_topology;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// One node of the routing tree.
#[derive(Debug, Parser)]
#[command(name = "basecamp", version)]
struct Args {
    /// Name of this node in the topology.
    #[arg(long)]
    node: String,

    /// Path to the JSON topology file.
    #[arg(long, env = "TOPOLOGY_FILE")]
    topology: PathBuf,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    // 1. Topology:
    let topology = load_topology(&args.topology)
        .with_context(|| format!("loading topology for node {}", args.node))?;

    // 2. Peers (advisory reachability probing):
    let ctx = connect(&topology, &args.node)
        .await
        .with_context(|| format!("resolving node {}", args.node))?;

    let neighbors: Vec<String> = ctx
        .neighbors()
        .values()
        .map(|node| format!("{}({})", node.name, node.addr()))
        .collect();
    tracing::info!("Neighbors for {}: {}", ctx.me().name, neighbors.join(" "));

    let listen_addr = ctx.me().addr();
    let handler = Arc::new(Handler::new(ctx));
    tracing::info!(
        "Starting node {} as {:?}",
        handler.node_name(),
        handler.context().role()
    );

    // 3. HTTP server:
    let listener = tokio::net::TcpListener::bind(&listen_addr)
        .await
        .with_context(|| format!("binding {}", listen_addr))?;

    tracing::info!("Node listening on {}", listen_addr);
    tracing::info!("Press Ctrl+C to shutdown");

    axum::serve(listener, router(handler))
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl+C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await?;

    tracing::info!("Node stopped");
    Ok(())
}
