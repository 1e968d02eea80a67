//! Compact per-host view of the cluster state
//!
//! One entry per host: health, what is left after the placed workloads are
//! deducted, and the workloads themselves.

use crate::histogram::{CapacityView, HostCapacity};
use crate::models::{ClusterState, HostRecord, WorkloadRecord};
use serde::Serialize;

/// A workload placed on a host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadSummary {
    pub scheduler: String,
    pub cpu_percent: f64,
    pub ram_bytes: f64,
    pub disk_bytes: u64,
}

impl From<&WorkloadRecord> for WorkloadSummary {
    fn from(wl: &WorkloadRecord) -> Self {
        Self {
            scheduler: wl.scheduler().to_string(),
            cpu_percent: wl.cpu_alloc(),
            ram_bytes: wl.mem_alloc(),
            disk_bytes: wl.disk_alloc(),
        }
    }
}

/// One host with its remaining capacity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostSummary {
    pub health: String,
    /// Capacity left after deducting every workload
    #[serde(flatten)]
    pub free: HostCapacity,
    pub workloads: Vec<WorkloadSummary>,
}

impl HostSummary {
    fn from_host(hostname: &str, host: &HostRecord) -> Self {
        Self {
            health: host.health_state().to_string(),
            free: HostCapacity::from_host(hostname, host, CapacityView::Free),
            workloads: host.entities.iter().map(WorkloadSummary::from).collect(),
        }
    }

    pub fn hostname(&self) -> &str {
        &self.free.hostname
    }
}

/// Summaries of every host, or of `host` alone, sorted by hostname
pub fn host_summaries(state: &ClusterState, host: Option<&str>) -> Vec<HostSummary> {
    let mut hosts: Vec<HostSummary> = state
        .hosts
        .iter()
        .filter(|(name, _)| host.map_or(true, |h| h == name.as_str()))
        .map(|(name, record)| HostSummary::from_host(name, record))
        .collect();
    hosts.sort_by(|a, b| a.hostname().cmp(b.hostname()));
    hosts
}
