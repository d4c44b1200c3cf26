//! Check command implementation.

use anyhow::{Context, Result};
use arch_drift_core::{DriftAnalyzer, Report, Severity};
use std::path::Path;

use crate::rules_resolver::RulesSource;
use crate::OutputFormat;

/// Runs the check command.
pub fn run(
    path: &Path,
    source: &RulesSource,
    format: OutputFormat,
    max_drift: Option<f64>,
) -> Result<()> {
    let rules = source.load()?;

    let analyzer = DriftAnalyzer::builder()
        .root(path)
        .rules(rules)
        .build()
        .context("Failed to build analyzer")?;

    tracing::info!(
        "Analyzing {:?} with {} extractor(s)",
        path,
        analyzer.extractor_count()
    );

    let report = analyzer.analyze();

    super::output::print(&report, format)?;

    if let Some(reason) = failure_reason(&report, max_drift) {
        tracing::error!("{reason}");
        std::process::exit(1);
    }

    Ok(())
}

/// Returns why the run should fail, if it should.
fn failure_reason(report: &Report, max_drift: Option<f64>) -> Option<String> {
    if report.has_violations_at(Severity::High) {
        let (high, _) = report.count_by_severity();
        return Some(format!("{high} high severity violation(s)"));
    }
    let limit = max_drift?;
    let score = report.metrics.drift_score;
    (score > limit).then(|| format!("drift score {score} exceeds --max-drift {limit}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use arch_drift_core::{Edge, EdgeTarget, Evidence, RuleCode, Violation};

    fn report_with(violations: Vec<Violation>, edges: usize) -> Report {
        let edges = (0..edges)
            .map(|i| Edge::import("a.ts", EdgeTarget::External(format!("m{i}")), 1))
            .collect();
        Report::build(Vec::new(), edges, violations, Vec::new())
    }

    #[test]
    fn clean_report_passes() {
        assert!(failure_reason(&report_with(Vec::new(), 3), Some(0.0)).is_none());
    }

    #[test]
    fn high_violation_fails_without_threshold() {
        let v = Violation::new(RuleCode::ForbiddenDep, "a.ts", "x", Evidence::Import);
        let reason = failure_reason(&report_with(vec![v], 1), None).unwrap();
        assert!(reason.contains("1 high"));
    }

    #[test]
    fn medium_violation_fails_only_over_threshold() {
        let v = || Violation::new(RuleCode::DisallowedApi, "a.rb", "x", Evidence::ApiUsage);
        // score 0.25
        assert!(failure_reason(&report_with(vec![v()], 4), None).is_none());
        assert!(failure_reason(&report_with(vec![v()], 4), Some(0.5)).is_none());
        assert!(failure_reason(&report_with(vec![v()], 4), Some(0.25)).is_none());
        assert!(failure_reason(&report_with(vec![v()], 4), Some(0.2)).is_some());
    }
}
