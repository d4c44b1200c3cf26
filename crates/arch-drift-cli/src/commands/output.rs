//! Shared output formatting for drift reports.

use anyhow::Result;
use arch_drift_core::{Report, Severity};

use crate::OutputFormat;

/// Print a drift report in the specified format.
pub fn print(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(report),
        OutputFormat::Json => return print_json(report),
        OutputFormat::Compact => print_compact(report),
    }
    Ok(())
}

fn print_text(report: &Report) {
    let (high, medium) = report.count_by_severity();

    for violation in &report.violations {
        let severity_indicator = match violation.severity {
            Severity::High => "\x1b[31mhigh\x1b[0m",
            Severity::Medium => "\x1b[33mmedium\x1b[0m",
        };

        println!(
            "{} ({}) at {}",
            violation.rule_code, violation.edge_type, violation.node_path
        );
        println!("  {}: {}", severity_indicator, violation.details);
        println!("  = help: {}", violation.suggestion);
        println!();
    }

    for diagnostic in &report.diagnostics {
        println!(
            "\x1b[2mskipped {} ({}): {}\x1b[0m",
            diagnostic.path, diagnostic.stage, diagnostic.message
        );
    }

    let summary_color = if high > 0 {
        "\x1b[31m"
    } else if medium > 0 {
        "\x1b[33m"
    } else {
        "\x1b[32m"
    };

    let counts = report.metrics.counts;
    println!(
        "{}Found {} high, {} medium violation(s) across {} file(s), {} edge(s); drift score {:.3}\x1b[0m",
        summary_color, high, medium, counts.nodes, counts.edges, report.metrics.drift_score
    );
}

fn print_json(report: &Report) -> Result<()> {
    println!("{}", report.to_json_pretty()?);
    Ok(())
}

fn print_compact(report: &Report) {
    for violation in &report.violations {
        println!("{violation}");
    }
}
