//! Rule checker.
//!
//! Evaluates the three rule classes against the node/edge sets, in a fixed
//! order: forbidden dependencies, must-route-via, disallowed APIs.

use rayon::prelude::*;
use std::collections::{HashMap, HashSet};
use std::path::Path;

use crate::policy::Policy;
use crate::types::{Edge, Evidence, FileDiagnostic, Node, RuleCode, Stage, Violation};
use crate::utils::source::read_source;

/// Violations found by the checker, plus files it had to skip.
#[derive(Debug, Default)]
pub struct CheckOutcome {
    /// Findings in rule-class order, then input order.
    pub violations: Vec<Violation>,
    /// Files unreadable during the disallowed-API pass.
    pub diagnostics: Vec<FileDiagnostic>,
}

/// Evaluates a compiled [`Policy`] against an analyzed graph.
pub struct RuleChecker<'a> {
    policy: &'a Policy,
}

impl<'a> RuleChecker<'a> {
    /// Create a checker for `policy`.
    #[must_use]
    pub fn new(policy: &'a Policy) -> Self {
        Self { policy }
    }

    /// Check the graph. `root` is used to read file contents.
    #[must_use]
    pub fn check(&self, root: &Path, nodes: &[Node], edges: &[Edge]) -> CheckOutcome {
        let layers = LayerMap::new(nodes);
        let mut outcome = CheckOutcome::default();

        outcome.violations.extend(self.check_forbidden(&layers, edges));
        outcome.violations.extend(self.check_routes(&layers, edges));

        let (violations, diagnostics) = self.check_disallowed_apis(root, nodes);
        outcome.violations.extend(violations);
        outcome.diagnostics = diagnostics;

        outcome
    }

    fn check_forbidden(&self, layers: &LayerMap<'_>, edges: &[Edge]) -> Vec<Violation> {
        let mut violations = Vec::new();

        for rule in self.policy.forbidden() {
            for edge in edges {
                if !layers.connects(edge, &rule.from, &rule.to) {
                    continue;
                }
                violations.push(Violation::new(
                    RuleCode::ForbiddenDep,
                    edge.from_path.clone(),
                    format!(
                        "Direct dependency from {} to {}: {} → {}",
                        rule.from, rule.to, edge.from_path, edge.to_path
                    ),
                    edge.edge_type.into(),
                ));
            }
        }

        violations
    }

    fn check_routes(&self, layers: &LayerMap<'_>, edges: &[Edge]) -> Vec<Violation> {
        let mut violations = Vec::new();

        for rule in self.policy.routes() {
            for edge in edges {
                if !layers.connects(edge, &rule.from, &rule.to) {
                    continue;
                }
                violations.push(
                    Violation::new(
                        RuleCode::BypassLayer,
                        edge.from_path.clone(),
                        format!(
                            "Direct {} → {} edge (should go via {})",
                            rule.from, rule.to, rule.via
                        ),
                        edge.edge_type.into(),
                    )
                    .with_suggestion(RuleCode::BypassLayer.suggestion(Some(&rule.via))),
                );
            }
        }

        violations
    }

    fn check_disallowed_apis(
        &self,
        root: &Path,
        nodes: &[Node],
    ) -> (Vec<Violation>, Vec<FileDiagnostic>) {
        let rules = self.policy.disallowed_apis();
        if rules.is_empty() {
            return (Vec::new(), Vec::new());
        }

        // Read every file some rule applies to exactly once.
        let wanted: HashSet<&str> = rules.iter().map(|r| r.layer.as_str()).collect();
        let reads: Vec<(&str, Result<String, FileDiagnostic>)> = nodes
            .par_iter()
            .filter(|n| wanted.contains(n.layer.as_str()))
            .map(|n| (n.path.as_str(), read_source(root, &n.path, Stage::Check)))
            .collect();

        let mut contents: HashMap<&str, String> = HashMap::new();
        let mut diagnostics = Vec::new();
        for (path, read) in reads {
            match read {
                Ok(text) => {
                    contents.insert(path, text);
                }
                Err(diagnostic) => diagnostics.push(diagnostic),
            }
        }

        let mut violations = Vec::new();
        for rule in rules {
            for node in nodes.iter().filter(|n| n.layer == rule.layer) {
                let Some(content) = contents.get(node.path.as_str()) else {
                    continue;
                };
                if let Some(pattern) = rule.patterns.iter().find(|p| p.is_match(content)) {
                    violations.push(Violation::new(
                        RuleCode::DisallowedApi,
                        node.path.clone(),
                        format!("Pattern `{}` matched in {}", pattern.as_str(), node.path),
                        Evidence::ApiUsage,
                    ));
                }
            }
        }

        (violations, diagnostics)
    }
}

/// Node path → layer lookup. Sentinels and unresolved targets are absent.
struct LayerMap<'a>(HashMap<&'a str, &'a str>);

impl<'a> LayerMap<'a> {
    fn new(nodes: &'a [Node]) -> Self {
        Self(
            nodes
                .iter()
                .map(|n| (n.path.as_str(), n.layer.as_str()))
                .collect(),
        )
    }

    fn layer_of(&self, path: &str) -> Option<&'a str> {
        self.0.get(path).copied()
    }

    /// Whether `edge` runs from a node in `from` to a node in `to`.
    fn connects(&self, edge: &Edge, from: &str, to: &str) -> bool {
        let to_layer = edge.to_path.as_path().and_then(|p| self.layer_of(p));
        self.layer_of(&edge.from_path) == Some(from) && to_layer == Some(to)
    }
}
