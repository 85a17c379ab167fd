//! Commands module
//!
//! Defines all CLI commands and their handlers.

mod feedback;

use std::path::PathBuf;

use anyhow::Result;
use clap::Subcommand;

use crate::config::Config;

/// Top-level CLI commands
#[derive(Subcommand)]
pub enum Commands {
    /// Submit a site for SEO analysis
    Submit {
        /// Site to analyse
        url: String,

        /// Address the report should also be emailed to
        #[arg(short, long)]
        email: Option<String>,

        /// Poll until the job finishes and save its report
        #[arg(short, long)]
        wait: bool,

        /// Directory to save the report in
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Show the status of a job
    Status {
        /// Job / execution id returned at submission
        job_id: String,

        /// Poll until the job finishes and save its report
        #[arg(short, long)]
        wait: bool,

        /// Directory to save the report in
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
    /// Check that the proxy is reachable
    Health,
}

/// Handle a CLI command
///
/// # Arguments
/// * `command` - The command to execute
/// * `config` - The CLI configuration
pub async fn handle_command(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Submit {
            url,
            email,
            wait,
            output,
        } => feedback::submit(config, &url, email, wait, &output).await,
        Commands::Status {
            job_id,
            wait,
            output,
        } => feedback::status(config, &job_id, wait, &output).await,
        Commands::Health => feedback::health(config).await,
    }
}
