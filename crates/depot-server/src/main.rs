use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use depot_server::{BackendKind, DepotServer, ServerConfig};

#[derive(Debug, Parser)]
#[command(name = "depot-server", version, about = "Serve a Depot message store over HTTP")]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to listen on, overrides the config file
    #[arg(short, long)]
    bind: Option<SocketAddr>,

    /// Data directory for the SQLite backend
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Keep everything in memory
    #[arg(long)]
    memory: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => ServerConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => ServerConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(dir) = args.data_dir {
        config.depot.data_dir = dir;
    }
    if args.memory {
        config.backend = BackendKind::Memory;
    }

    let server = DepotServer::new(config).context("opening storage")?;
    server.serve().await?;
    Ok(())
}
