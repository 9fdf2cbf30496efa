//! Workload driver binary: replays a command file against an ABD
//! session and records per-operation latency to a CSV log (spec.md §6's
//! "workload surface", an external collaborator of the core).

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use abd_client::Session;
use abd_config::ReplicaListLoader;
use abd_driver::csvlog::LatencyLog;
use abd_driver::workload::{load_workload, Command};

/// ABD workload driver.
#[derive(Parser)]
#[command(name = "abd-driver")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the workload command file.
    workload: PathBuf,

    /// Path to the line-oriented replica address list.
    #[arg(short, long, default_value = "servers.conf")]
    servers: PathBuf,

    /// Use the blocking (per-key quorum-locked) client protocol instead
    /// of the default non-blocking one.
    #[arg(long)]
    blocking: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    let replicas = ReplicaListLoader::new()
        .with_path(&cli.servers)
        .load()
        .with_context(|| format!("failed to load replica list from {}", cli.servers.display()))?;
    let commands = load_workload(&cli.workload)
        .with_context(|| format!("failed to load workload from {}", cli.workload.display()))?;

    let session = Session::new(replicas);
    let mut log = LatencyLog::create(&cli.workload)
        .context("failed to create latency log")?;

    for command in commands {
        match command {
            Command::Put { key, value } => {
                let start = Instant::now();
                let result = if cli.blocking {
                    abd_client::blocking::put_blocking(&session, &key, &value).await
                } else {
                    session.put(&key, &value).await
                };
                let success = result.is_ok();
                if let Err(e) = &result {
                    tracing::warn!(key, error = %e, "PUT failed");
                }
                log.record("PUT", &key, &value, start.elapsed(), success)?;
            }
            Command::Get { key } => {
                let start = Instant::now();
                let result = if cli.blocking {
                    abd_client::blocking::get_blocking(&session, &key).await
                } else {
                    session.get(&key).await
                };
                let success = result.is_ok();
                let value = result.unwrap_or_default();
                if !success {
                    tracing::warn!(key, "GET failed");
                }
                log.record("GET", &key, &value, start.elapsed(), success)?;
            }
        }
    }

    Ok(())
}
