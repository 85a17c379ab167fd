//! Feedback command handlers
//!
//! Submitting analyses, following their progress, and saving reports.

use std::path::Path;

use anyhow::{Context, Result};
use colored::*;
use relay_core::ExecutionCacheEntry;
use relay_core::domain::status;
use relay_core::dto::job::SubmissionCompleted;
use serde_json::json;
use tokio::time::{Instant, sleep};

use crate::api::{ApiClient, Submission};
use crate::artifact::{JSON_FILE_NAME, PDF_FILE_NAME, Report};
use crate::config::Config;

/// Submit a site and optionally wait for its report
pub async fn submit(
    config: &Config,
    url: &str,
    email: Option<String>,
    wait: bool,
    output: &Path,
) -> Result<()> {
    let client = ApiClient::new(&config.proxy_url);

    let mut body = json!({ "url": url });
    if let Some(email) = email {
        body["email"] = json!(email);
    }

    println!("{} {}", "Submitting".bold(), url.cyan());

    match client.submit(&body).await? {
        Submission::Accepted(accepted) => {
            let Some(job_id) = accepted.job_id else {
                println!("{}", "✓ Accepted, but no job id was returned to poll.".yellow());
                if let Some(message) = accepted.message {
                    println!("  {}", message.dimmed());
                }
                return Ok(());
            };

            println!("{} Job {}", "✓".green(), job_id.cyan());
            println!("  Status:  {}", colorize_status(&accepted.status));
            if let Some(message) = &accepted.message {
                println!("  Message: {}", message.dimmed());
            }

            if wait {
                println!();
                let entry = wait_for(&client, config, &job_id).await?;
                finish(&entry, output)?;
            } else {
                println!();
                println!(
                    "{}",
                    format!("Check progress with: relay status {}", job_id).dimmed()
                );
            }
        }
        Submission::Completed(completed) => {
            print_completed(&completed);
            save_report(&Report::from_completed(&completed)?, output)?;
        }
        Submission::File {
            content_type,
            bytes,
        } => {
            let name = if content_type.contains("pdf") {
                PDF_FILE_NAME
            } else if content_type.contains("json") {
                JSON_FILE_NAME
            } else {
                "seo-feedback.out"
            };
            let path = output.join(name);
            std::fs::write(&path, &bytes)
                .with_context(|| format!("Failed to write {}", path.display()))?;

            println!(
                "{} Saved {} ({}, {} bytes)",
                "✓".green(),
                path.display().to_string().cyan(),
                content_type,
                bytes.len()
            );
        }
    }

    Ok(())
}

/// Show the status of a job, optionally waiting for it to finish
pub async fn status(config: &Config, job_id: &str, wait: bool, output: &Path) -> Result<()> {
    let client = ApiClient::new(&config.proxy_url);

    if wait {
        let entry = wait_for(&client, config, job_id).await?;
        return finish(&entry, output);
    }

    let entry = client.get_status(job_id).await?;
    print_entry(&entry);

    Ok(())
}

/// Check proxy health
pub async fn health(config: &Config) -> Result<()> {
    let client = ApiClient::new(&config.proxy_url);
    let body = client.health().await?;

    println!("{} {} ({})", "✓".green(), config.proxy_url.cyan(), body.trim());

    Ok(())
}

/// Poll the status endpoint until the job leaves the in-flight set
async fn wait_for(client: &ApiClient, config: &Config, job_id: &str) -> Result<ExecutionCacheEntry> {
    let deadline = Instant::now() + config.wait_timeout;
    let mut last_status = String::new();

    println!(
        "{}",
        format!(
            "Waiting for job {} (polling every {:?})...",
            job_id, config.poll_interval
        )
        .dimmed()
    );

    loop {
        let entry = client.get_status(job_id).await?;

        if entry.status != last_status {
            println!("  {} {}", "▸".cyan(), colorize_status(&entry.status));
            last_status = entry.status.clone();
        }

        if status::is_terminal(&entry.status) {
            return Ok(entry);
        }

        if Instant::now() + config.poll_interval > deadline {
            anyhow::bail!(
                "Job {} still {} after {:?}; check again with `relay status {}`",
                job_id,
                entry.status,
                config.wait_timeout,
                job_id
            );
        }

        sleep(config.poll_interval).await;
    }
}

/// Report the outcome of a finished job
fn finish(entry: &ExecutionCacheEntry, output: &Path) -> Result<()> {
    println!();
    print_entry(entry);

    if status::is_error(&entry.status) {
        anyhow::bail!(
            "Job {} failed: {}",
            entry.execution_id,
            entry.message.as_deref().unwrap_or("no details")
        );
    }

    save_report(&Report::from_entry(entry)?, output)
}

fn save_report(report: &Report, output: &Path) -> Result<()> {
    if let Report::Link(url) = report {
        println!("\n{} {}", "Report:".bold(), url.cyan());
        return Ok(());
    }

    if let Some(path) = report.save(output)? {
        println!(
            "\n{} Saved {}",
            "✓".green(),
            path.display().to_string().cyan()
        );
    }

    Ok(())
}

/// Print a synchronous result
fn print_completed(completed: &SubmissionCompleted) {
    println!("{}", "Result:".bold());
    if let Some(job_id) = &completed.job_id {
        println!("  Job:     {}", job_id.cyan());
    }
    println!(
        "  Status:  {}",
        colorize_status(completed.status.as_deref().unwrap_or(status::COMPLETED))
    );
    if let Some(message) = &completed.message {
        println!("  Message: {}", message);
    }
}

/// Print a status entry
fn print_entry(entry: &ExecutionCacheEntry) {
    println!("{}", "Job Status:".bold());
    println!("  ID:      {}", entry.execution_id.cyan());
    println!("  Status:  {}", colorize_status(&entry.status));
    if let Some(message) = &entry.message {
        println!("  Message: {}", message);
    }
    if let Some(cached_at) = chrono::DateTime::from_timestamp_millis(entry.cached_at) {
        println!(
            "  Updated: {}",
            cached_at.format("%Y-%m-%d %H:%M:%S").to_string().dimmed()
        );
    }

    if status::is_terminal(&entry.status) && !entry.result.is_null() {
        println!("\n{}", "Result:".bold());
        match serde_json::to_string_pretty(&entry.result) {
            Ok(pretty) => println!("{}", pretty),
            Err(_) => println!("{:?}", entry.result),
        }
    }
}

/// Colorize job status for display
fn colorize_status(value: &str) -> ColoredString {
    if status::is_in_flight(value) {
        value.yellow()
    } else if status::is_error(value) {
        value.red()
    } else if value == status::COMPLETED {
        value.green()
    } else {
        value.normal()
    }
}
