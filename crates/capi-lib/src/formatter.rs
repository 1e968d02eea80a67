//! Plaintext metric line formatting
//!
//! Lines have the form `<dotted.path> <value> <unix timestamp>`. All lines of
//! a batch share one timestamp captured by the caller.

use crate::aggregator::{Aggregation, SchedulerTotals};
use std::fmt::Display;

/// Default metric path prefix
pub const DEFAULT_PREFIX: &str = "one_min.capi";

/// Render a float so that it always carries a fractional part (`50.0`)
fn float_value(v: f64) -> String {
    format!("{:?}", v)
}

fn line(path: &str, value: impl Display, timestamp: i64) -> String {
    format!("{} {} {}", path, value, timestamp)
}

fn totals_lines(base: &str, totals: &SchedulerTotals, timestamp: i64, out: &mut Vec<String>) {
    out.push(line(
        &format!("{}.number_of_jobs", base),
        totals.number_of_jobs,
        timestamp,
    ));
    out.push(line(
        &format!("{}.cpu_alloc", base),
        float_value(totals.cpu_alloc),
        timestamp,
    ));
    out.push(line(
        &format!("{}.mem_alloc", base),
        float_value(totals.mem_alloc),
        timestamp,
    ));
    out.push(line(
        &format!("{}.disk_alloc", base),
        totals.disk_alloc,
        timestamp,
    ));
}

/// Flatten aggregation tables into metric lines under `prefix`
pub fn format_metrics_with_prefix(
    aggregation: &Aggregation,
    prefix: &str,
    timestamp: i64,
) -> Vec<String> {
    let mut lines = Vec::with_capacity(aggregation.bucket_count() * 4 + aggregation.hosts.len());

    for (cluster, schedulers) in &aggregation.jobs {
        for (scheduler, totals) in schedulers {
            let base = format!("{}.{}.{}", prefix, cluster, scheduler);
            totals_lines(&base, totals, timestamp, &mut lines);
        }
    }

    for (cluster, states) in &aggregation.hosts {
        for (state, count) in states {
            lines.push(line(
                &format!("{}.{}.hosts.{}", prefix, cluster, state),
                count,
                timestamp,
            ));
        }
    }

    lines
}

/// Flatten aggregation tables into metric lines under `one_min.capi`
pub fn format_metrics(aggregation: &Aggregation, timestamp: i64) -> Vec<String> {
    format_metrics_with_prefix(aggregation, DEFAULT_PREFIX, timestamp)
}
