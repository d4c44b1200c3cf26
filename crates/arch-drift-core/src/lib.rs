//! # arch-drift-core
//!
//! Architecture drift detection engine.
//!
//! Builds a lightweight dependency graph of a polyglot source tree and
//! checks it against a declarative layered-architecture policy:
//!
//! - [`collect_nodes`] walks the tree and assigns files to layers
//! - [`EdgeExtractor`] implementations find imports and database access
//! - [`RuleChecker`] evaluates forbidden dependencies, bypassed layers,
//!   and disallowed APIs
//! - [`Report`] aggregates everything with a drift score
//!
//! ## Example
//!
//! ```no_run
//! use arch_drift_core::{DriftAnalyzer, RuleSet};
//!
//! let rules = RuleSet::from_file("arch-drift.toml".as_ref())?;
//! let report = DriftAnalyzer::builder()
//!     .root("./my-app")
//!     .rules(rules)
//!     .build()?
//!     .analyze();
//!
//! println!("drift score: {}", report.metrics.drift_score);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod checker;
mod collector;
mod extractor;
mod layer;
mod policy;
mod report;
mod rules;
mod types;

/// Built-in heuristic extractors.
pub mod extractors;
/// Utility functions for extractor implementations.
pub mod utils;

pub use analyzer::{analyze_repo, AnalyzerError, DriftAnalyzer, DriftAnalyzerBuilder};
pub use checker::{CheckOutcome, RuleChecker};
pub use collector::{collect_nodes, Collection};
pub use extractor::{default_extractors, EdgeExtractor, ExtractContext, ExtractorBox};
pub use extractors::{RubyDbAccess, TypeScriptImports};
pub use layer::LayerResolver;
pub use policy::{ApiPattern, ApiRule, GlobPattern, Layer, LayerPair, Policy, RouteRule};
pub use report::{drift_score, Counts, Metrics, Report};
pub use rules::{DisallowedApi, ForbiddenDependency, LayerDef, MustRouteVia, RuleSet, RulesError};
pub use types::{
    Edge, EdgeTarget, EdgeType, Evidence, FileDiagnostic, Node, RuleCode, Severity, Stage,
    Violation, UNKNOWN_LAYER,
};
