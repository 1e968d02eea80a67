//! Log records for each phase of a run
//!
//! Keeps event names and fields consistent from run to run so cron logs
//! can be grepped.

use crate::aggregator::Aggregation;
use crate::sink::DeliveryOutcome;
use crate::snapshot::SnapshotOutcome;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Logger for one run of a tool
#[derive(Clone)]
pub struct RunLogger {
    tool: String,
}

impl RunLogger {
    pub fn new(tool: impl Into<String>) -> Self {
        Self { tool: tool.into() }
    }

    /// Log run start
    pub fn log_start(&self, version: &str) {
        info!(tool = %self.tool, version = %version, "start");
    }

    /// Log a successfully loaded state document
    pub fn log_state_loaded(&self, source: &str, hosts: usize) {
        info!(tool = %self.tool, source = %source, hosts = hosts, "loaded cluster state json");
    }

    /// Log the aggregation summary
    pub fn log_aggregated(&self, aggregation: &Aggregation) {
        info!(
            tool = %self.tool,
            clusters = aggregation.hosts.len(),
            buckets = aggregation.bucket_count(),
            hosts = aggregation.host_total(),
            jobs = aggregation.job_total(),
            "parsed to result"
        );
    }

    /// Dump every metric line at debug level
    pub fn log_lines(&self, lines: &[String]) {
        debug!(tool = %self.tool, count = lines.len(), "metric lines:\n{}", lines.join("\n"));
    }

    /// Log what happened to a metric batch
    pub fn log_delivery(&self, addr: &str, outcome: &DeliveryOutcome) {
        match outcome {
            DeliveryOutcome::Delivered { lines, bytes } => {
                info!(tool = %self.tool, addr = %addr, lines = *lines, bytes = *bytes, "sent result");
            }
            DeliveryOutcome::Failed(reason) => {
                debug!(tool = %self.tool, addr = %addr, reason = %reason, "metric sink unreachable, result dropped");
            }
        }
    }

    /// Log a snapshot result
    pub fn log_snapshot(&self, outcome: &SnapshotOutcome) {
        match outcome {
            SnapshotOutcome::Written(path) => {
                debug!(tool = %self.tool, path = %path.display(), "snapshot saved");
            }
            SnapshotOutcome::Failed { path, error } => {
                warn!(tool = %self.tool, path = %path.display(), error = %error, "failed to write snapshot");
            }
        }
    }

    /// Log run completion
    pub fn log_done(&self, elapsed: Duration) {
        info!(tool = %self.tool, elapsed_ms = elapsed.as_millis() as u64, "done");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_run_logger_creation() {
        let logger = RunLogger::new("capi-stats");
        assert_eq!(logger.tool, "capi-stats");
    }

    #[test]
    fn test_logging_without_subscriber_is_noop() {
        let logger = RunLogger::new("test");
        logger.log_start("0.0.0");
        logger.log_aggregated(&Aggregation::default());
        logger.log_lines(&["a 1 1".to_string()]);
        logger.log_delivery("localhost:2024", &DeliveryOutcome::Failed("refused".into()));
        logger.log_snapshot(&SnapshotOutcome::Failed {
            path: PathBuf::from("/x"),
            error: "denied".into(),
        });
        logger.log_done(Duration::from_millis(3));
    }
}
