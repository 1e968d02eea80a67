//! capi-hist - host capacity histogram
//!
//! Reads the cluster state from the cluster API (or a saved snapshot) and
//! renders how per-host RAM and CPU capacity are distributed, or lists the
//! compact state of one or all hosts.

mod commands;
mod output;

use anyhow::{Context, Result};
use capi_lib::client::{base_url_for_host, DEFAULT_CAPI_HOST};
use capi_lib::histogram::CapacityView;
use capi_lib::{host_summaries, CapiClient, CapiError, StateDocument, StateSource};
use clap::Parser;
use commands::{histogram, hosts};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Host capacity histogram for the cluster API
#[derive(Parser)]
#[command(name = "capi-hist")]
#[command(author, version, about = "Per-host RAM/CPU capacity histograms and host state from the cluster API", long_about = None)]
pub struct Cli {
    /// Write the histogram report to this file instead of stdout
    #[arg(long, short = 'f', value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Cluster API host (can also be set via CAPI_HOST env var)
    #[arg(long, short = 'c', env = "CAPI_HOST", default_value = DEFAULT_CAPI_HOST)]
    pub capi: String,

    /// Cluster state JSON file, for offline stats
    #[arg(long = "state", value_name = "FILE")]
    pub state_file: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table")]
    pub format: output::OutputFormat,

    /// Report capacity left after subtracting placed workloads
    #[arg(long)]
    pub free: bool,

    /// Show health, free resources and workloads of this host
    #[arg(long, value_name = "NAME", conflicts_with = "hosts")]
    pub host: Option<String>,

    /// List health and free resources of every host
    #[arg(long)]
    pub hosts: bool,

    /// Cluster API request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    fn source(&self) -> Result<StateSource> {
        Ok(match &self.state_file {
            Some(path) => StateSource::File(path.clone()),
            None => StateSource::Live(
                CapiClient::new(
                    &base_url_for_host(&self.capi),
                    Some(Duration::from_secs(self.timeout)),
                )
                .context("Failed to create cluster API client")?,
            ),
        })
    }

    fn view(&self) -> CapacityView {
        if self.free {
            CapacityView::Free
        } else {
            CapacityView::Total
        }
    }
}

/// Message printed before exiting on a load failure
fn load_failure_message(source: &StateSource, err: &CapiError) -> String {
    match (source, err) {
        (StateSource::File(path), CapiError::Io(e)) => {
            format!("Failed to read file {}, error: {}", path.display(), e)
        }
        (_, CapiError::Parse(e)) => format!("Failed to load data, {}", e),
        (_, other) => format!("Failed to get cluster state from {}: {}", source.describe(), other),
    }
}

async fn load(source: &StateSource) -> StateDocument {
    match source.load().await {
        Ok(document) => document,
        Err(e) => {
            output::print_error(&load_failure_message(source, &e));
            std::process::exit(1);
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new("debug"))
            .with_writer(std::io::stderr)
            .init();
    }

    let source = cli.source()?;
    let document = load(&source).await;
    if document.host_count() == 0 {
        output::print_warning("Cluster state has no hosts");
    }

    if cli.file.is_some() {
        colored::control::set_override(false);
    }

    let (rendered, what) = if cli.host.is_some() || cli.hosts {
        let summaries = host_summaries(&document.state, cli.host.as_deref());
        if let (Some(name), true) = (&cli.host, summaries.is_empty()) {
            output::print_error(&format!("Host {} not found in cluster state", name));
            std::process::exit(1);
        }
        (
            hosts::render(&summaries, cli.format, cli.host.is_some())?,
            format!("State of {} hosts", summaries.len()),
        )
    } else {
        let report = histogram::build_report(&document.state, cli.view());
        (
            histogram::render(&report, cli.format)?,
            format!("Histogram of {} hosts", report.hosts),
        )
    };

    match &cli.file {
        Some(path) => {
            std::fs::write(path, rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            output::print_success(&format!("{} written to {}", what, path.display()));
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
