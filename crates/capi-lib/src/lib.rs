//! Cluster API statistics library
//!
//! This crate provides the core functionality for:
//! - Loading cluster state from the cluster API or a saved snapshot
//! - Classifying hosts into clusters by hostname
//! - Aggregating workload allocations per cluster and scheduler
//! - Formatting and delivering plaintext metrics
//! - Debug snapshots, per-host capacity histograms and host inventories

pub mod aggregator;
pub mod classifier;
pub mod client;
pub mod error;
pub mod formatter;
pub mod histogram;
pub mod inventory;
pub mod models;
pub mod observability;
pub mod poller;
pub mod sink;
pub mod snapshot;
pub mod state;
mod workload;

/// Fallback label for any identity the state document does not provide
pub const UNKNOWN: &str = "unknown";

pub use aggregator::{aggregate, AggregateTable, Aggregation, HostCountTable, SchedulerTotals};
pub use classifier::{classify, Cluster};
pub use client::CapiClient;
pub use error::{CapiError, Result};
pub use formatter::{format_metrics, format_metrics_with_prefix};
pub use inventory::{host_summaries, HostSummary, WorkloadSummary};
pub use models::*;
pub use observability::RunLogger;
pub use poller::{PollConfig, Poller, RunReport};
pub use sink::{DeliveryOutcome, MetricSink, PlaintextSink};
pub use snapshot::{SnapshotOutcome, SnapshotWriter};
pub use state::{StateDocument, StateSource};
