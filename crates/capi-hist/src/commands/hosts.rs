//! Compact host state listing

use anyhow::Result;
use capi_lib::HostSummary;
use colored::Colorize;
use std::fmt::Write;
use tabled::Tabled;

use crate::output::{format_bytes, format_cpu, OutputFormat};

/// Row for the host table
#[derive(Tabled)]
struct HostRow {
    #[tabled(rename = "Host")]
    host: String,
    #[tabled(rename = "Cluster")]
    cluster: String,
    #[tabled(rename = "Health")]
    health: String,
    #[tabled(rename = "Free RAM")]
    ram: String,
    #[tabled(rename = "Free CPU")]
    cpu: String,
    #[tabled(rename = "Free Disk")]
    disk: String,
    #[tabled(rename = "Workloads")]
    workloads: usize,
}

/// Row for a host's workload table
#[derive(Tabled)]
struct WorkloadRow {
    #[tabled(rename = "Scheduler")]
    scheduler: String,
    #[tabled(rename = "CPU")]
    cpu: String,
    #[tabled(rename = "RAM")]
    ram: String,
    #[tabled(rename = "Disk")]
    disk: String,
}

fn health_colored(health: &str) -> String {
    match health {
        "READY" => health.green().to_string(),
        capi_lib::UNKNOWN => health.dimmed().to_string(),
        _ => health.yellow().to_string(),
    }
}

fn host_row(host: &HostSummary) -> HostRow {
    HostRow {
        host: host.hostname().to_string(),
        cluster: host.free.cluster.to_string(),
        health: health_colored(&host.health),
        ram: format_bytes(host.free.ram_bytes),
        cpu: format_cpu(host.free.cpu_percent),
        disk: format_bytes(host.free.disk_bytes),
        workloads: host.workloads.len(),
    }
}

/// Render host summaries; `detail` adds each host's workload table
pub fn render(hosts: &[HostSummary], format: OutputFormat, detail: bool) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(hosts)?),
        OutputFormat::Table => {
            let mut out = String::new();
            writeln!(out, "{}", "Host State".bold())?;
            writeln!(out, "{}", "=".repeat(60))?;
            writeln!(out, "Hosts:  {}", hosts.len())?;
            writeln!(out)?;

            let rows: Vec<HostRow> = hosts.iter().map(host_row).collect();
            let table = tabled::Table::new(rows)
                .with(tabled::settings::Style::rounded())
                .to_string();
            writeln!(out, "{}", table)?;

            if detail {
                for host in hosts.iter().filter(|h| !h.workloads.is_empty()) {
                    writeln!(out)?;
                    writeln!(out, "{}", format!("Workloads on {}", host.hostname()).bold())?;
                    let rows: Vec<WorkloadRow> = host
                        .workloads
                        .iter()
                        .map(|w| WorkloadRow {
                            scheduler: w.scheduler.clone(),
                            cpu: format_cpu(w.cpu_percent),
                            ram: format_bytes(w.ram_bytes.max(0.0) as u64),
                            disk: format_bytes(w.disk_bytes),
                        })
                        .collect();
                    let table = tabled::Table::new(rows)
                        .with(tabled::settings::Style::rounded())
                        .to_string();
                    writeln!(out, "{}", table)?;
                }
            }
            Ok(out)
        }
    }
}
