//! Dashbus daemon - WebSocket event relay server

use anyhow::{Context, Result};
use clap::Parser;
use dashbus::config::{DEFAULT_BIND, DEFAULT_OUTBOUND_BUFFER};
use dashbus::{Namespace, RelayConfig, RelayServer};
use std::net::SocketAddr;
use tokio::signal;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "dashbusd")]
#[command(about = "Dashbus WebSocket event relay daemon")]
#[command(version)]
struct Args {
    /// Address to bind to
    #[arg(short, long, default_value = DEFAULT_BIND, env = "DASHBUS_BIND")]
    bind: SocketAddr,

    /// Token signing secret
    #[arg(long, env = "DASHBUS_SECRET", hide_env_values = true)]
    secret: String,

    /// Namespace every connection joins
    #[arg(long, default_value = "/", env = "DASHBUS_NAMESPACE")]
    namespace: Namespace,

    /// Per-connection outbound queue length
    #[arg(long, default_value_t = DEFAULT_OUTBOUND_BUFFER, env = "DASHBUS_OUTBOUND_BUFFER")]
    outbound_buffer: usize,

    /// Log level
    #[arg(long, env = "RUST_LOG", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args = Args::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level)))
        .with(tracing_subscriber::fmt::layer())
        .init();

    run_server(args).await
}

async fn run_server(args: Args) -> Result<()> {
    let config = RelayConfig::new(args.bind, args.secret)
        .namespace(args.namespace)
        .outbound_buffer(args.outbound_buffer);

    let server = RelayServer::new(config).context("Invalid configuration")?;

    info!(addr = %args.bind, "Dashbus daemon starting");

    // Run server with graceful shutdown on signals
    tokio::select! {
        result = server.run() => {
            result?;
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received, stopping server");
        }
    }

    info!("Dashbus daemon stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
