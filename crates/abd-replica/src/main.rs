//! Replica server binary entry point.

use std::net::SocketAddr;

use anyhow::{Context, Result};
use clap::Parser;

use abd_replica::Server;

/// ABD replica server.
#[derive(Parser)]
#[command(name = "abd-replica")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to bind to, e.g. 127.0.0.1:9001.
    #[arg(short, long, default_value = "127.0.0.1:9001")]
    address: SocketAddr,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let mut server = Server::bind(cli.address)
        .with_context(|| format!("failed to bind replica on {}", cli.address))?;

    server.run().context("replica server loop failed")?;
    Ok(())
}
