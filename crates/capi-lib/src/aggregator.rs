//! Single-pass aggregation of cluster state
//!
//! Produces per-(cluster, scheduler) allocation totals and per-(cluster,
//! health state) host counts. Every bucket update is a commutative sum, so
//! host and workload iteration order never changes the result.

use crate::classifier::{classify, Cluster};
use crate::models::{ClusterState, HostRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// Allocation counters of one (cluster, scheduler) bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct SchedulerTotals {
    pub number_of_jobs: u64,
    pub cpu_alloc: f64,
    pub mem_alloc: f64,
    pub disk_alloc: u64,
}

impl SchedulerTotals {
    fn add(&mut self, cpu: f64, mem: f64, disk: u64) {
        self.number_of_jobs += 1;
        self.cpu_alloc += cpu;
        self.mem_alloc += mem;
        self.disk_alloc = self.disk_alloc.saturating_add(disk);
    }
}

/// cluster → scheduler → totals
pub type AggregateTable = BTreeMap<Cluster, BTreeMap<String, SchedulerTotals>>;

/// cluster → health state → host count
pub type HostCountTable = BTreeMap<Cluster, BTreeMap<String, u64>>;

/// Result of aggregating one cluster state snapshot
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Aggregation {
    pub jobs: AggregateTable,
    pub hosts: HostCountTable,
}

impl Aggregation {
    /// Fold one host and all of its workloads into the tables
    pub fn add_host(&mut self, hostname: &str, host: &HostRecord) {
        let cluster = classify(hostname);

        *self
            .hosts
            .entry(cluster)
            .or_default()
            .entry(host.health_state().to_string())
            .or_insert(0) += 1;

        for wl in &host.entities {
            self.jobs
                .entry(cluster)
                .or_default()
                .entry(wl.scheduler().to_string())
                .or_default()
                .add(wl.cpu_alloc(), wl.mem_alloc(), wl.disk_alloc());
        }
    }

    /// Number of hosts counted across all clusters
    pub fn host_total(&self) -> u64 {
        self.hosts.values().flat_map(|states| states.values()).sum()
    }

    /// Number of workloads counted across all buckets
    pub fn job_total(&self) -> u64 {
        self.jobs
            .values()
            .flat_map(|scheds| scheds.values())
            .map(|t| t.number_of_jobs)
            .sum()
    }

    /// Number of (cluster, scheduler) buckets
    pub fn bucket_count(&self) -> usize {
        self.jobs.values().map(BTreeMap::len).sum()
    }
}

/// Aggregate a full cluster state in one pass
pub fn aggregate(state: &ClusterState) -> Aggregation {
    let mut aggregation = Aggregation::default();
    for (hostname, host) in &state.hosts {
        aggregation.add_host(hostname, host);
    }
    aggregation
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    fn state(v: Value) -> ClusterState {
        serde_json::from_value(v).unwrap()
    }

    fn wl(scheduler: &str, cpu: f64, ram: u64, disk: u64) -> Value {
        json!({
            "schedulerId": { "name": scheduler },
            "computingRequirements": { "resources": {
                "ru.yandex.schedulers.cluster.api.computing.CPUPower": { "powerPercents": cpu },
                "ru.yandex.schedulers.cluster.api.computing.RAM": { "capacity": ram },
                "ru.yandex.schedulers.cluster.api.computing.HDDSpace": { "capacity": disk }
            } }
        })
    }

    #[test]
    fn test_two_host_scenario() {
        let doc = state(json!({
            "hosts": {
                "foo.vm.search.yandex.net": {
                    "hostHealth": { "state": "READY" },
                    "entities": [wl("sched1", 50.0, 1073741824, 100)]
                },
                "unknownhost": {}
            }
        }));

        let agg = aggregate(&doc);

        let expected_jobs = json!({
            "rtc": { "sched1": {
                "number_of_jobs": 1,
                "cpu_alloc": 50.0,
                "mem_alloc": 1073741824.0,
                "disk_alloc": 100
            } }
        });
        let expected_hosts = json!({
            "rtc": { "READY": 1 },
            "unknown": { "unknown": 1 }
        });
        assert_eq!(serde_json::to_value(&agg.jobs).unwrap(), expected_jobs);
        assert_eq!(serde_json::to_value(&agg.hosts).unwrap(), expected_hosts);
        assert_eq!(agg.host_total(), 2);
        assert_eq!(agg.job_total(), 1);
    }

    #[test]
    fn test_workload_without_requirements_counts_as_job_only() {
        let doc = state(json!({
            "hosts": {
                "pool-1.qloud.yandex.net": {
                    "hostHealth": { "state": "READY" },
                    "entities": [
                        wl("sched1", 10.0, 1024, 5),
                        { "schedulerId": { "name": "sched1" } }
                    ]
                }
            }
        }));

        let agg = aggregate(&doc);
        let totals = agg.jobs[&Cluster::Qloud]["sched1"];
        assert_eq!(
            totals,
            SchedulerTotals {
                number_of_jobs: 2,
                cpu_alloc: 10.0,
                mem_alloc: 1024.0,
                disk_alloc: 5,
            }
        );
    }

    #[test]
    fn test_cluster_without_workloads_has_no_job_buckets() {
        let doc = state(json!({
            "hosts": {
                "zergling-1": { "hostHealth": { "state": "BROKEN" }, "entities": [] }
            }
        }));
        let agg = aggregate(&doc);
        assert!(agg.jobs.is_empty());
        assert_eq!(agg.hosts[&Cluster::Zerling]["BROKEN"], 1);
    }

    #[test]
    fn test_order_independence() {
        let hosts = vec![
            (
                "a.vm.search.yandex.net",
                "READY",
                vec![wl("s1", 1.5, 10, 1), wl("s2", 2.0, 20, 2), wl("s1", 3.25, 30, 3)],
            ),
            (
                "b.vm.search.yandex.net",
                "DEAD",
                vec![wl("s1", 4.0, 40, 4)],
            ),
            ("s1-x.qloud.yandex.net", "READY", vec![wl("s3", 0.5, 5, 0)]),
            ("elsewhere", "READY", vec![json!({})]),
        ];

        // Build the same set of hosts as individual records, then fold them
        // in forward and reverse order with reversed workload lists.
        let records: Vec<(String, HostRecord)> = hosts
            .iter()
            .map(|(name, health, wls)| {
                let rec: HostRecord = serde_json::from_value(json!({
                    "hostHealth": { "state": health },
                    "entities": wls
                }))
                .unwrap();
                (name.to_string(), rec)
            })
            .collect();

        let mut forward = Aggregation::default();
        for (name, rec) in &records {
            forward.add_host(name, rec);
        }

        let mut backward = Aggregation::default();
        for (name, rec) in records.iter().rev() {
            let mut rec = rec.clone();
            rec.entities.reverse();
            backward.add_host(name, &rec);
        }

        assert_eq!(forward, backward);

        let map_state = ClusterState {
            hosts: records.into_iter().collect(),
        };
        assert_eq!(aggregate(&map_state), forward);
        assert_eq!(forward.bucket_count(), 4);
        assert_eq!(forward.jobs[&Cluster::Rtc]["s1"].number_of_jobs, 3);
        assert_eq!(forward.jobs[&Cluster::Unknown]["unknown"].number_of_jobs, 1);
    }

    #[test]
    fn test_empty_state() {
        let agg = aggregate(&ClusterState::default());
        assert!(agg.jobs.is_empty());
        assert!(agg.hosts.is_empty());
    }
}
