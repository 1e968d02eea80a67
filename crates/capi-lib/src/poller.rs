//! One polling run: load state, aggregate, emit, dump
//!
//! Only loading the state can fail the run. Sink and snapshot problems are
//! recorded in the report and logged.

use crate::aggregator::{aggregate, Aggregation};
use crate::error::Result;
use crate::formatter::{format_metrics_with_prefix, DEFAULT_PREFIX};
use crate::observability::RunLogger;
use crate::sink::{DeliveryOutcome, MetricSink};
use crate::snapshot::{SnapshotOutcome, SnapshotWriter, CLUSTER_STATE_STEM, RESULT_STEM};
use crate::state::StateSource;
use std::sync::Arc;

/// Configuration for a polling run
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Metric path prefix
    pub prefix: String,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            prefix: DEFAULT_PREFIX.to_string(),
        }
    }
}

/// Everything a run produced
#[derive(Debug)]
pub struct RunReport {
    pub aggregation: Aggregation,
    pub lines: Vec<String>,
    pub timestamp: i64,
    pub delivery: DeliveryOutcome,
    pub snapshots: Vec<SnapshotOutcome>,
}

/// Runs the fetch → aggregate → emit pipeline once
pub struct Poller {
    source: StateSource,
    sink: Arc<dyn MetricSink>,
    snapshots: Option<SnapshotWriter>,
    config: PollConfig,
    logger: RunLogger,
}

impl Poller {
    pub fn new(source: StateSource, sink: Arc<dyn MetricSink>, config: PollConfig) -> Self {
        Self {
            source,
            sink,
            snapshots: None,
            config,
            logger: RunLogger::new("capi-stats"),
        }
    }

    /// Dump the raw state and the result into `writer`'s directory
    pub fn with_snapshots(mut self, writer: SnapshotWriter) -> Self {
        self.snapshots = Some(writer);
        self
    }

    pub fn with_logger(mut self, logger: RunLogger) -> Self {
        self.logger = logger;
        self
    }

    /// Execute one run
    pub async fn run_once(&self) -> Result<RunReport> {
        let document = self.source.load().await?;
        self.logger
            .log_state_loaded(&self.source.describe(), document.host_count());

        let mut snapshots = Vec::new();
        if let Some(writer) = &self.snapshots {
            let outcome = writer.persist(CLUSTER_STATE_STEM, &document.raw);
            self.logger.log_snapshot(&outcome);
            snapshots.push(outcome);
        }

        let aggregation = aggregate(&document.state);
        self.logger.log_aggregated(&aggregation);

        let timestamp = chrono::Utc::now().timestamp();
        let lines = format_metrics_with_prefix(&aggregation, &self.config.prefix, timestamp);
        self.logger.log_lines(&lines);

        let delivery = self.sink.deliver(&lines).await;
        self.logger.log_delivery(&self.sink.address(), &delivery);

        if let Some(writer) = &self.snapshots {
            let outcome = writer.persist(RESULT_STEM, &aggregation.jobs);
            self.logger.log_snapshot(&outcome);
            snapshots.push(outcome);
        }

        Ok(RunReport {
            aggregation,
            lines,
            timestamp,
            delivery,
            snapshots,
        })
    }
}
