//! Drift analyzer: orchestrates collection, extraction, checking, and reporting.

use rayon::prelude::*;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

use crate::checker::RuleChecker;
use crate::collector::collect_nodes;
use crate::extractor::{default_extractors, EdgeExtractor, ExtractContext, ExtractorBox};
use crate::layer::LayerResolver;
use crate::policy::Policy;
use crate::report::Report;
use crate::rules::{RuleSet, RulesError};
use crate::types::{Edge, FileDiagnostic, Node, Stage};
use crate::utils::source::read_source;

/// Errors that prevent an analysis from starting.
#[derive(Debug, Error)]
pub enum AnalyzerError {
    /// The root directory does not exist or is not a directory.
    #[error("root is not a directory: {0}")]
    RootNotFound(PathBuf),

    /// IO error resolving the root.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The rule set failed validation.
    #[error("invalid rules: {0}")]
    Rules(#[from] RulesError),
}

/// Builder for configuring a [`DriftAnalyzer`].
#[derive(Default)]
pub struct DriftAnalyzerBuilder {
    root: Option<PathBuf>,
    rules: RuleSet,
    extractors: Vec<ExtractorBox>,
}

impl DriftAnalyzerBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the repository root to analyze.
    #[must_use]
    pub fn root(mut self, path: impl Into<PathBuf>) -> Self {
        self.root = Some(path.into());
        self
    }

    /// Sets the rule set.
    #[must_use]
    pub fn rules(mut self, rules: RuleSet) -> Self {
        self.rules = rules;
        self
    }

    /// Registers an extractor.
    #[must_use]
    pub fn extractor<E: EdgeExtractor + 'static>(mut self, extractor: E) -> Self {
        self.extractors.push(Box::new(extractor));
        self
    }

    /// Registers a boxed extractor.
    #[must_use]
    pub fn extractor_box(mut self, extractor: ExtractorBox) -> Self {
        self.extractors.push(extractor);
        self
    }

    /// Builds the analyzer. Uses [`default_extractors`] if none were registered.
    ///
    /// # Errors
    ///
    /// Returns an error if the root is not a directory or the rules are invalid.
    pub fn build(self) -> Result<DriftAnalyzer, AnalyzerError> {
        let root = self.root.unwrap_or_else(|| PathBuf::from("."));
        let root = if root.is_absolute() {
            root
        } else {
            std::env::current_dir()?.join(&root)
        };
        if !root.is_dir() {
            return Err(AnalyzerError::RootNotFound(root));
        }

        let policy = self.rules.compile()?;

        let extractors = if self.extractors.is_empty() {
            default_extractors()
        } else {
            self.extractors
        };

        Ok(DriftAnalyzer {
            root,
            policy,
            extractors,
        })
    }
}

/// Runs one drift analysis over a materialized repository.
///
/// Use [`DriftAnalyzer::builder()`] to construct an instance.
pub struct DriftAnalyzer {
    root: PathBuf,
    policy: Policy,
    extractors: Vec<ExtractorBox>,
}

impl DriftAnalyzer {
    /// Creates a new builder for configuring an analyzer.
    #[must_use]
    pub fn builder() -> DriftAnalyzerBuilder {
        DriftAnalyzerBuilder::new()
    }

    /// Returns the root directory being analyzed.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Returns the compiled policy.
    #[must_use]
    pub fn policy(&self) -> &Policy {
        &self.policy
    }

    /// Returns the number of registered extractors.
    #[must_use]
    pub fn extractor_count(&self) -> usize {
        self.extractors.len()
    }

    /// Analyzes the tree and returns the report.
    ///
    /// Per-file failures never abort the run; they are reported as
    /// [`FileDiagnostic`]s on the returned [`Report`].
    #[must_use]
    pub fn analyze(&self) -> Report {
        info!("Starting drift analysis at {}", self.root.display());

        let resolver = LayerResolver::new(&self.policy);
        let collection = collect_nodes(&self.root, &resolver, &self.extractors);
        let mut diagnostics = collection.diagnostics;
        let nodes = collection.nodes;

        let (edges, extract_diagnostics) = self.extract_edges(&nodes);
        diagnostics.extend(extract_diagnostics);
        info!("Extracted {} edges from {} files", edges.len(), nodes.len());

        let outcome = RuleChecker::new(&self.policy).check(&self.root, &nodes, &edges);
        diagnostics.extend(outcome.diagnostics);

        let report = Report::build(nodes, edges, outcome.violations, diagnostics);
        info!(
            "Found {} violation(s), drift score {}",
            report.metrics.counts.violations,
            report.metrics.drift_score
        );
        report
    }

    /// Runs every extractor over the nodes it claims, files in parallel.
    ///
    /// Output order is registry order, then node order.
    fn extract_edges(&self, nodes: &[Node]) -> (Vec<Edge>, Vec<FileDiagnostic>) {
        let ctx = ExtractContext::new(&self.root);
        let mut edges = Vec::new();
        let mut diagnostics = Vec::new();

        for extractor in &self.extractors {
            let results: Vec<Result<Vec<Edge>, FileDiagnostic>> = nodes
                .par_iter()
                .filter(|n| n.lang == extractor.language_id())
                .map(|node| {
                    let source = read_source(&self.root, &node.path, Stage::Extract)?;
                    let found = extractor.extract(&ctx, node, &source);
                    debug!("{}: {} edge(s)", node.path, found.len());
                    Ok(found)
                })
                .collect();

            for result in results {
                match result {
                    Ok(found) => edges.extend(found),
                    Err(diagnostic) => diagnostics.push(diagnostic),
                }
            }
        }

        (edges, diagnostics)
    }
}

/// Analyzes `root` against `rules` with the default extractors.
///
/// # Errors
///
/// Returns an error if the root is not a directory or the rules are invalid.
pub fn analyze_repo(root: impl Into<PathBuf>, rules: &RuleSet) -> Result<Report, AnalyzerError> {
    let analyzer = DriftAnalyzer::builder()
        .root(root)
        .rules(rules.clone())
        .build()?;
    Ok(analyzer.analyze())
}
