//! Workload field extraction
//!
//! Each accessor walks an optional chain and falls back to a typed default
//! at the first missing step, so callers never see an error.

use crate::models::{ResourceBlock, ResourceKind, WorkloadRecord};

impl WorkloadRecord {
    /// Scheduler that placed the workload, `unknown` if not reported
    pub fn scheduler(&self) -> &str {
        self.scheduler_id
            .as_ref()
            .and_then(|id| id.name.as_deref())
            .unwrap_or(crate::UNKNOWN)
    }

    /// Requested CPU power in percent of a core
    pub fn cpu_alloc(&self) -> f64 {
        self.requirements()
            .and_then(|r| r.quantity_f64(ResourceKind::CpuPower))
            .unwrap_or(0.0)
    }

    /// Requested RAM in bytes
    pub fn mem_alloc(&self) -> f64 {
        self.requirements()
            .and_then(|r| r.quantity_f64(ResourceKind::Ram))
            .unwrap_or(0.0)
    }

    /// Requested disk space in bytes
    pub fn disk_alloc(&self) -> u64 {
        self.requirements()
            .and_then(|r| r.quantity_u64(ResourceKind::HddSpace))
            .unwrap_or(0)
    }

    fn requirements(&self) -> Option<&ResourceBlock> {
        self.computing_requirements.as_ref()
    }
}
