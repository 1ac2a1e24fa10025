//! Binary entry point for the Chainview RPC proxy.

use anyhow::Context;
use chainview_proxy::{ProxyConfig, ProxyState};
use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "chainview-proxy", about = "Allow-list JSON-RPC forward proxy")]
struct Args {
    /// Address to listen on, overriding the config file
    #[arg(long)]
    listen: Option<SocketAddr>,

    /// Config file path, defaults to chainview_proxy.json
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Extra endpoints to allow beyond the built-in registry
    #[arg(long = "allow", value_name = "URL")]
    extra_allowed: Vec<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();
    let config = match &args.config {
        Some(path) => ProxyConfig::load_from(path),
        None => ProxyConfig::load(),
    };
    let listen = args.listen.unwrap_or(config.listen);

    let mut allowed = chainview_registry::allowed_rpc_endpoints();
    allowed.extend(config.extra_allowed);
    allowed.extend(args.extra_allowed);
    let state = Arc::new(ProxyState::with_allowed_and_timeout(
        allowed,
        Duration::from_secs(config.upstream_timeout_secs),
    ));

    let listener = tokio::net::TcpListener::bind(listen)
        .await
        .with_context(|| format!("failed to bind {listen}"))?;
    tracing::info!(listen = %listen, "proxy listening");

    chainview_proxy::serve(listener, state)
        .await
        .context("proxy server exited with an error")?;
    Ok(())
}
