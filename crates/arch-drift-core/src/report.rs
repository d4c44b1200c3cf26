//! Report assembly and the drift score.

use serde::{Deserialize, Serialize};

use crate::types::{Edge, FileDiagnostic, Node, Severity, Violation};

/// Size counts of one analysis run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    /// Number of nodes.
    pub nodes: usize,
    /// Number of edges.
    pub edges: usize,
    /// Number of violations.
    pub violations: usize,
}

/// Derived metrics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
    /// `violations / max(edges, 1)`, rounded to three decimals.
    pub drift_score: f64,
    /// Size counts.
    pub counts: Counts,
}

/// Result of one drift analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Classified source files.
    pub nodes: Vec<Node>,
    /// Detected references.
    pub edges: Vec<Edge>,
    /// Policy findings.
    pub violations: Vec<Violation>,
    /// Drift score and counts.
    pub metrics: Metrics,
    /// Files skipped along the way.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<FileDiagnostic>,
}

/// Edge-normalized drift score: `violations / max(edges, 1)`, three decimals.
///
/// Not clamped: content-only violations can push it above 1.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn drift_score(violations: usize, edges: usize) -> f64 {
    let ratio = violations as f64 / edges.max(1) as f64;
    (ratio * 1000.0).round() / 1000.0
}

impl Report {
    /// Assembles a report and derives its metrics.
    #[must_use]
    pub fn build(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        violations: Vec<Violation>,
        diagnostics: Vec<FileDiagnostic>,
    ) -> Self {
        let counts = Counts {
            nodes: nodes.len(),
            edges: edges.len(),
            violations: violations.len(),
        };
        Self {
            metrics: Metrics {
                drift_score: drift_score(counts.violations, counts.edges),
                counts,
            },
            nodes,
            edges,
            violations,
            diagnostics,
        }
    }

    /// Checks if any violation meets or exceeds `severity`.
    #[must_use]
    pub fn has_violations_at(&self, severity: Severity) -> bool {
        self.violations.iter().any(|v| v.severity >= severity)
    }

    /// Counts violations as `(high, medium)`.
    #[must_use]
    pub fn count_by_severity(&self) -> (usize, usize) {
        let high = self
            .violations
            .iter()
            .filter(|v| v.severity == Severity::High)
            .count();
        (high, self.violations.len() - high)
    }

    /// Serializes the report as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns error if serialization fails.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
