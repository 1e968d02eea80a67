//! Output formatting utilities

use clap::ValueEnum;
use colored::Colorize;

/// Output format for the report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Table format (default)
    #[default]
    Table,
    /// JSON format
    Json,
}

/// Widest bar drawn for the fullest bin
pub const BAR_WIDTH: usize = 40;

/// Print an error message.
///
/// Goes to stdout so it lands next to the report when the tool runs from cron.
pub fn print_error(message: &str) {
    println!("{} {}", "✗".red().bold(), message);
}

/// Print a success message
pub fn print_success(message: &str) {
    println!("{} {}", "✓".green().bold(), message);
}

/// Print a warning message
pub fn print_warning(message: &str) {
    println!("{} {}", "⚠".yellow().bold(), message);
}

/// Format bytes as human-readable string
pub fn format_bytes(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;
    const TB: u64 = GB * 1024;

    if bytes >= TB {
        format!("{:.2}Ti", bytes as f64 / TB as f64)
    } else if bytes >= GB {
        format!("{:.2}Gi", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.2}Mi", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.2}Ki", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

/// Format CPU percent, e.g. 3200% as "32.0 cores"
pub fn format_cpu(percent: f64) -> String {
    format!("{:.1} cores", percent / 100.0)
}

/// Bar proportional to `count / peak`; any non-zero count gets at least one cell
pub fn bar(count: u64, peak: u64) -> String {
    if count == 0 || peak == 0 {
        return String::new();
    }
    let cells = ((count as f64 / peak as f64) * BAR_WIDTH as f64).round() as usize;
    "█".repeat(cells.clamp(1, BAR_WIDTH))
}
