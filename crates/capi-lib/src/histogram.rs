//! Per-host capacity histograms
//!
//! Reads host-level RAM and CPU capacity from the state document and bins
//! it into fixed-width buckets. With [`CapacityView::Free`] the requirements
//! of the workloads already placed on a host are subtracted first.

use crate::classifier::{classify, Cluster};
use crate::models::{ClusterState, HostRecord, ResourceKind};
use serde::Serialize;

const GIB: u64 = 1024 * 1024 * 1024;

/// RAM bin width in GiB
pub const RAM_BIN_WIDTH_GB: f64 = 10.0;

/// Upper edge of the RAM range in GiB
pub const RAM_RANGE_GB: f64 = 300.0;

/// CPU bin width in percent
pub const CPU_BIN_WIDTH_PERCENT: f64 = 200.0;

/// Most CPU bins drawn; hosts beyond the last one land in `overflow`
pub const MAX_CPU_BINS: usize = 512;

/// Which capacity figure to report per host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapacityView {
    /// Capacity as advertised by the host
    #[default]
    Total,
    /// Capacity left after subtracting placed workloads
    Free,
}

/// Capacity of one host
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostCapacity {
    pub hostname: String,
    pub cluster: Cluster,
    pub ram_bytes: u64,
    pub cpu_percent: f64,
    pub disk_bytes: u64,
}

impl HostCapacity {
    /// RAM in whole GiB, rounded down
    pub fn ram_gb(&self) -> u64 {
        self.ram_bytes / GIB
    }

    pub(crate) fn from_host(hostname: &str, host: &HostRecord, view: CapacityView) -> Self {
        let resources = host.computing_resources.as_ref();
        let mut ram_bytes = resources
            .and_then(|r| r.quantity_u64(ResourceKind::Ram))
            .unwrap_or(0);
        let mut cpu_percent = resources
            .and_then(|r| r.quantity_f64(ResourceKind::CpuPower))
            .unwrap_or(0.0)
            .max(0.0);
        let mut disk_bytes = resources
            .and_then(|r| r.quantity_u64(ResourceKind::HddSpace))
            .unwrap_or(0);

        if view == CapacityView::Free {
            for wl in &host.entities {
                ram_bytes = ram_bytes.saturating_sub(wl.mem_alloc().max(0.0) as u64);
                cpu_percent = (cpu_percent - wl.cpu_alloc()).max(0.0);
                disk_bytes = disk_bytes.saturating_sub(wl.disk_alloc());
            }
        }

        Self {
            hostname: hostname.to_string(),
            cluster: classify(hostname),
            ram_bytes,
            cpu_percent,
            disk_bytes,
        }
    }
}

/// Capacity of every host in the state document, sorted by hostname
pub fn host_capacities(state: &ClusterState, view: CapacityView) -> Vec<HostCapacity> {
    let mut hosts: Vec<HostCapacity> = state
        .hosts
        .iter()
        .map(|(name, host)| HostCapacity::from_host(name, host, view))
        .collect();
    hosts.sort_by(|a, b| a.hostname.cmp(&b.hostname));
    hosts
}

/// Half-open bin `[lo, hi)`
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Bin {
    pub lo: f64,
    pub hi: f64,
    pub count: u64,
}

/// A titled set of bins
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Histogram {
    pub title: String,
    pub unit: String,
    pub bins: Vec<Bin>,
    /// Values at or above the last bin's upper edge
    pub overflow: u64,
}

impl Histogram {
    /// Bin `values` into `bin_count` bins of `width` starting at zero
    pub fn build(
        title: impl Into<String>,
        unit: impl Into<String>,
        values: impl IntoIterator<Item = f64>,
        width: f64,
        bin_count: usize,
    ) -> Self {
        let mut bins: Vec<Bin> = (0..bin_count)
            .map(|i| Bin {
                lo: i as f64 * width,
                hi: (i + 1) as f64 * width,
                count: 0,
            })
            .collect();
        let mut overflow = 0;

        for v in values {
            let idx = (v.max(0.0) / width).floor() as usize;
            match bins.get_mut(idx) {
                Some(bin) => bin.count += 1,
                None => overflow += 1,
            }
        }

        Self {
            title: title.into(),
            unit: unit.into(),
            bins,
            overflow,
        }
    }

    /// Number of binned values, overflow included
    pub fn total(&self) -> u64 {
        self.bins.iter().map(|b| b.count).sum::<u64>() + self.overflow
    }

    /// Largest single bin count
    pub fn peak(&self) -> u64 {
        self.bins.iter().map(|b| b.count).max().unwrap_or(0)
    }
}

/// RAM histogram in GiB over `[0, 300)` with 10 GiB bins
pub fn ram_histogram(hosts: &[HostCapacity]) -> Histogram {
    let bin_count = (RAM_RANGE_GB / RAM_BIN_WIDTH_GB) as usize;
    Histogram::build(
        "Ram GB by host",
        "Ram GB",
        hosts.iter().map(|h| h.ram_gb() as f64),
        RAM_BIN_WIDTH_GB,
        bin_count,
    )
}

/// CPU histogram in percent with 200% bins covering the largest host,
/// at most [`MAX_CPU_BINS`] of them
pub fn cpu_histogram(hosts: &[HostCapacity]) -> Histogram {
    let max_cpu = hosts
        .iter()
        .map(|h| h.cpu_percent)
        .filter(|c| c.is_finite())
        .fold(0.0_f64, f64::max);
    let last_bin = (max_cpu / CPU_BIN_WIDTH_PERCENT)
        .floor()
        .min((MAX_CPU_BINS - 1) as f64);
    let bin_count = last_bin as usize + 1;
    Histogram::build(
        "CPU % by host",
        "CPU %",
        hosts.iter().map(|h| h.cpu_percent),
        CPU_BIN_WIDTH_PERCENT,
        bin_count,
    )
}
