//! Poller configuration

use anyhow::{Context, Result};
use capi_lib::{client, formatter, sink, snapshot};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Poller configuration, read from `CAPI_STATS_*` environment variables
#[derive(Debug, Clone, Deserialize)]
pub struct StatsConfig {
    /// Cluster API base URL
    #[serde(default = "default_capi_url")]
    pub capi_url: String,

    /// Read state from this file instead of the cluster API
    #[serde(default)]
    pub state_file: Option<PathBuf>,

    /// Metrics collector host
    #[serde(default = "default_sink_host")]
    pub sink_host: String,

    /// Metrics collector port
    #[serde(default = "default_sink_port")]
    pub sink_port: u16,

    /// Metric path prefix
    #[serde(default = "default_metric_prefix")]
    pub metric_prefix: String,

    /// Directory receiving debug snapshots
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,

    /// Dump raw state and result snapshots
    #[serde(default = "default_dump_snapshots")]
    pub dump_snapshots: bool,

    /// Enable debug logging
    #[serde(default)]
    pub debug: bool,

    /// Cluster API request timeout in seconds, 0 disables it
    #[serde(default = "default_fetch_timeout")]
    pub fetch_timeout_secs: u64,

    /// Collector connect timeout in seconds
    #[serde(default = "default_sink_timeout")]
    pub sink_timeout_secs: u64,
}

fn default_capi_url() -> String {
    client::base_url_for_host(client::DEFAULT_CAPI_HOST)
}

fn default_sink_host() -> String {
    sink::DEFAULT_SINK_HOST.to_string()
}

fn default_sink_port() -> u16 {
    sink::DEFAULT_SINK_PORT
}

fn default_metric_prefix() -> String {
    formatter::DEFAULT_PREFIX.to_string()
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from(snapshot::DEFAULT_SNAPSHOT_DIR)
}

fn default_dump_snapshots() -> bool {
    true
}

fn default_fetch_timeout() -> u64 {
    30
}

fn default_sink_timeout() -> u64 {
    5
}

impl StatsConfig {
    /// Load configuration from the environment
    pub fn load() -> Result<Self> {
        Self::from_source(config::Environment::with_prefix("CAPI_STATS").try_parsing(true))
    }

    fn from_source<S>(source: S) -> Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .add_source(source)
            .build()
            .context("Failed to read configuration")?;

        config
            .try_deserialize()
            .context("Invalid CAPI_STATS configuration")
    }

    pub fn fetch_timeout(&self) -> Option<Duration> {
        (self.fetch_timeout_secs > 0).then(|| Duration::from_secs(self.fetch_timeout_secs))
    }

    pub fn sink_timeout(&self) -> Duration {
        Duration::from_secs(self.sink_timeout_secs)
    }
}
