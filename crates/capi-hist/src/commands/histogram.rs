//! Host capacity histogram report

use anyhow::Result;
use capi_lib::histogram::{cpu_histogram, host_capacities, ram_histogram, CapacityView, Histogram};
use capi_lib::{ClusterState, Cluster};
use colored::Colorize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write;
use tabled::Tabled;

use crate::output::{bar, format_bytes, format_cpu, OutputFormat};

/// Capacity totals of one cluster
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClusterSummary {
    pub cluster: Cluster,
    pub hosts: usize,
    pub ram_bytes: u64,
    pub cpu_percent: f64,
}

/// Everything the tool prints
#[derive(Debug, Clone, Serialize)]
pub struct HistogramReport {
    pub view: &'static str,
    pub hosts: usize,
    pub clusters: Vec<ClusterSummary>,
    pub ram: Histogram,
    pub cpu: Histogram,
}

/// Row for a histogram table
#[derive(Tabled)]
struct BinRow {
    #[tabled(rename = "Range")]
    range: String,
    #[tabled(rename = "Hosts")]
    hosts: u64,
    #[tabled(rename = "")]
    bar: String,
}

/// Row for the per-cluster table
#[derive(Tabled)]
struct ClusterRow {
    #[tabled(rename = "Cluster")]
    cluster: String,
    #[tabled(rename = "Hosts")]
    hosts: usize,
    #[tabled(rename = "RAM")]
    ram: String,
    #[tabled(rename = "CPU")]
    cpu: String,
}

/// Build the report for a cluster state
pub fn build_report(state: &ClusterState, view: CapacityView) -> HistogramReport {
    let hosts = host_capacities(state, view);

    let mut by_cluster: BTreeMap<Cluster, ClusterSummary> = BTreeMap::new();
    for host in &hosts {
        let summary = by_cluster.entry(host.cluster).or_insert(ClusterSummary {
            cluster: host.cluster,
            hosts: 0,
            ram_bytes: 0,
            cpu_percent: 0.0,
        });
        summary.hosts += 1;
        summary.ram_bytes = summary.ram_bytes.saturating_add(host.ram_bytes);
        summary.cpu_percent += host.cpu_percent;
    }

    if let Some(unknown) = by_cluster.get(&Cluster::Unknown) {
        tracing::debug!(hosts = unknown.hosts, "Hosts not matching any cluster pattern");
    }

    HistogramReport {
        view: match view {
            CapacityView::Total => "total",
            CapacityView::Free => "free",
        },
        hosts: hosts.len(),
        clusters: by_cluster.into_values().collect(),
        ram: ram_histogram(&hosts),
        cpu: cpu_histogram(&hosts),
    }
}

fn render_histogram(out: &mut String, hist: &Histogram) -> std::fmt::Result {
    writeln!(out, "{}", hist.title.bold())?;
    writeln!(out, "{}", "-".repeat(60))?;

    let peak = hist.peak().max(hist.overflow);
    let mut rows: Vec<BinRow> = hist
        .bins
        .iter()
        .map(|b| BinRow {
            range: format!("{:>6} - {:<6}", b.lo, b.hi),
            hosts: b.count,
            bar: bar(b.count, peak),
        })
        .collect();

    if hist.overflow > 0 {
        let edge = hist.bins.last().map(|b| b.hi).unwrap_or(0.0);
        rows.push(BinRow {
            range: format!(">= {}", edge),
            hosts: hist.overflow,
            bar: bar(hist.overflow, peak),
        });
    }

    let table = tabled::Table::new(rows)
        .with(tabled::settings::Style::rounded())
        .to_string();
    writeln!(out, "{}", table)?;
    writeln!(out, "{}: {}, hosts: {}", "Unit".dimmed(), hist.unit, hist.total())?;
    writeln!(out)
}

/// Render the report in the requested format
pub fn render(report: &HistogramReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Table => {
            let mut out = String::new();
            writeln!(out, "{}", "Host Capacity".bold())?;
            writeln!(out, "{}", "=".repeat(60))?;
            writeln!(out, "View:   {}", report.view.cyan())?;
            writeln!(out, "Hosts:  {}", report.hosts)?;
            writeln!(out)?;

            if !report.clusters.is_empty() {
                let rows: Vec<ClusterRow> = report
                    .clusters
                    .iter()
                    .map(|c| ClusterRow {
                        cluster: c.cluster.to_string(),
                        hosts: c.hosts,
                        ram: format_bytes(c.ram_bytes),
                        cpu: format_cpu(c.cpu_percent),
                    })
                    .collect();
                let table = tabled::Table::new(rows)
                    .with(tabled::settings::Style::rounded())
                    .to_string();
                writeln!(out, "{}", table)?;
                writeln!(out)?;
            }

            render_histogram(&mut out, &report.ram)?;
            render_histogram(&mut out, &report.cpu)?;
            Ok(out)
        }
    }
}
