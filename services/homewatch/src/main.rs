//! Homewatch CLI
//!
//! Command-line interface for the homework status watcher.

use std::time::Duration;

use clap::Parser;
use homewatch::{config, Config};
use tracing::Level;

#[derive(Parser)]
#[command(name = "homewatch")]
#[command(about = "Homework review status watcher")]
#[command(version)]
struct Args {
    /// Poll interval in seconds (overrides the default of 600)
    #[arg(long)]
    interval: Option<u64>,

    /// Log level
    #[arg(short, long, default_value = "info")]
    log_level: Level,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .init();

    if dotenvy::dotenv().is_ok() {
        tracing::debug!("Loaded environment from .env");
    }

    let missing = config::missing_vars();
    if !missing.is_empty() {
        for name in &missing {
            tracing::error!("Missing required environment variable {}", name);
        }
        std::process::exit(1);
    }

    let mut config = Config::from_env()?;
    if let Some(interval) = args.interval {
        config.poll_interval = Duration::from_secs(interval);
    }

    tracing::info!("Starting homewatch service");
    tracing::debug!(
        "Endpoint: {}, poll interval: {:?}",
        config.endpoint,
        config.poll_interval
    );

    homewatch::run(config).await?;

    Ok(())
}
