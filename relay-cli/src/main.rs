//! Relay CLI
//!
//! Command-line interface for submitting SEO analyses through the relay
//! proxy and collecting their reports.

mod api;
mod artifact;
mod commands;
mod config;

use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use commands::{Commands, handle_command};
use config::Config;

#[derive(Parser)]
#[command(name = "relay")]
#[command(about = "SEO feedback relay CLI", long_about = None)]
struct Cli {
    /// Relay proxy URL
    #[arg(long, env = "RELAY_PROXY_URL", default_value = "http://localhost:3001")]
    proxy_url: String,

    /// Seconds between status polls while waiting
    #[arg(long, default_value_t = 5)]
    poll_interval: u64,

    /// Seconds to wait for a job before giving up
    #[arg(long, default_value_t = 600)]
    wait_timeout: u64,

    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.poll_interval == 0 {
        anyhow::bail!("--poll-interval must be greater than 0");
    }

    let config = Config {
        proxy_url: cli.proxy_url,
        poll_interval: Duration::from_secs(cli.poll_interval),
        wait_timeout: Duration::from_secs(cli.wait_timeout),
    };

    handle_command(cli.command, &config).await
}
