//! Dashbus CLI entry point

mod cli;

use crate::cli::{Cli, Commands};
use anyhow::{Context, Result};
use clap::Parser;
use dashbus::{Namespace, RelayConfig, RelayServer, TokenIssuer, TokenVerifier};
use std::net::SocketAddr;
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let secret = cli
        .secret
        .context("DASHBUS_SECRET or --secret is required")?;

    match cli.command {
        Commands::Serve {
            bind,
            namespace,
            outbound_buffer,
        } => serve(bind, namespace, outbound_buffer, secret).await,
        Commands::Token { username, ttl_secs } => token(&username, ttl_secs, &secret),
        Commands::Verify { token } => verify(&token, &secret),
    }
}

async fn serve(
    bind: SocketAddr,
    namespace: Namespace,
    outbound_buffer: usize,
    secret: String,
) -> Result<()> {
    let config = RelayConfig::new(bind, secret)
        .namespace(namespace)
        .outbound_buffer(outbound_buffer);

    let server = RelayServer::new(config).context("Invalid configuration")?;

    info!("Starting Dashbus relay...");
    server.run().await
}

fn token(username: &str, ttl_secs: Option<u64>, secret: &str) -> Result<()> {
    let token = TokenIssuer::new(secret.as_bytes())
        .issue(username, ttl_secs.map(Duration::from_secs))
        .context("Failed to issue token")?;

    println!("{}", token);
    println!();
    println!("Username: {}", username);
    match ttl_secs {
        Some(ttl) => println!("Expires in: {}s", ttl),
        None => println!("Expires: never"),
    }

    Ok(())
}

fn verify(token: &str, secret: &str) -> Result<()> {
    let identity = TokenVerifier::new(secret.as_bytes())
        .check(token)
        .context("Token rejected")?;

    println!("Valid token for: {}", identity);
    Ok(())
}
