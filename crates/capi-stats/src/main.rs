//! capi-stats - cluster API allocation poller
//!
//! Fetches the cluster state once, aggregates workload allocations per
//! cluster and scheduler, and sends the result to a plaintext metrics
//! collector. Meant to be run once a minute from cron.

use anyhow::{Context, Result};
use capi_lib::{
    CapiClient, PlaintextSink, PollConfig, Poller, RunLogger, SnapshotWriter, StateSource,
};
use std::sync::Arc;
use std::time::Instant;
use tracing::error;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

mod config;

const STATS_VERSION: &str = env!("CARGO_PKG_VERSION");

fn init_logging(debug: bool) {
    let default_level = if debug { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(std::io::stdout),
        )
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let config = config::StatsConfig::load()?;
    init_logging(config.debug);

    let logger = RunLogger::new("capi-stats");
    logger.log_start(STATS_VERSION);
    let started = Instant::now();

    let source = match &config.state_file {
        Some(path) => StateSource::File(path.clone()),
        None => StateSource::Live(
            CapiClient::new(&config.capi_url, config.fetch_timeout())
                .context("Failed to create cluster API client")?,
        ),
    };

    let sink = PlaintextSink::new(config.sink_host.clone(), config.sink_port)
        .with_connect_timeout(config.sink_timeout());

    let mut poller = Poller::new(
        source,
        Arc::new(sink),
        PollConfig {
            prefix: config.metric_prefix.clone(),
        },
    )
    .with_logger(logger.clone());

    if config.dump_snapshots {
        poller = poller.with_snapshots(SnapshotWriter::new(&config.snapshot_dir));
    }

    if let Err(e) = poller.run_once().await {
        error!(error = %e, "run failed");
        return Err(e).context("Failed to load cluster state");
    }

    logger.log_done(started.elapsed());
    Ok(())
}
