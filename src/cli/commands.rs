//! CLI command definitions

use clap::{Parser, Subcommand};
use dashbus::config::{DEFAULT_BIND, DEFAULT_OUTBOUND_BUFFER};
use dashbus::Namespace;
use std::net::SocketAddr;

#[derive(Parser)]
#[command(name = "dashbus")]
#[command(about = "Authenticated WebSocket event relay", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Token signing secret
    #[arg(long, env = "DASHBUS_SECRET", global = true, hide_env_values = true)]
    pub secret: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the relay server
    Serve {
        /// Address to bind to
        #[arg(short, long, default_value = DEFAULT_BIND, env = "DASHBUS_BIND")]
        bind: SocketAddr,

        /// Namespace every connection joins
        #[arg(long, default_value = "/", env = "DASHBUS_NAMESPACE")]
        namespace: Namespace,

        /// Per-connection outbound queue length
        #[arg(long, default_value_t = DEFAULT_OUTBOUND_BUFFER, env = "DASHBUS_OUTBOUND_BUFFER")]
        outbound_buffer: usize,
    },

    /// Mint a bearer token for a user
    ///
    /// Examples:
    ///   dashbus token -u alice
    ///   dashbus token -u alice --ttl-secs 3600
    Token {
        /// Username carried in the token's `username` claim
        #[arg(short, long)]
        username: String,

        /// Lifetime in seconds (no expiry if omitted)
        #[arg(long)]
        ttl_secs: Option<u64>,
    },

    /// Check a bearer token and print the identity it carries
    Verify {
        /// Token, with or without the "Bearer " prefix
        token: String,
    },
}
