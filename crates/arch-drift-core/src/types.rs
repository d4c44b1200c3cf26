//! Core types for the drift graph, violations, and reports.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Layer name assigned to files that match no declared layer.
pub const UNKNOWN_LAYER: &str = "unknown";

/// Severity level for drift violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Layering smell that should be reviewed.
    Medium,
    /// Dependency the policy explicitly forbids.
    High,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// The rule class that produced a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuleCode {
    /// An edge between two layers the policy forbids.
    ForbiddenDep,
    /// A direct edge that should have gone through an intermediate layer.
    BypassLayer,
    /// File content in a layer matches a disallowed API pattern.
    DisallowedApi,
}

impl RuleCode {
    /// All rule codes, in evaluation order.
    pub const ALL: [Self; 3] = [Self::ForbiddenDep, Self::BypassLayer, Self::DisallowedApi];

    /// Wire name of the code (e.g., `"FORBIDDEN_DEP"`).
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::ForbiddenDep => "FORBIDDEN_DEP",
            Self::BypassLayer => "BYPASS_LAYER",
            Self::DisallowedApi => "DISALLOWED_API",
        }
    }

    /// Severity every violation of this code carries.
    #[must_use]
    pub fn severity(self) -> Severity {
        match self {
            Self::ForbiddenDep => Severity::High,
            Self::BypassLayer | Self::DisallowedApi => Severity::Medium,
        }
    }

    /// One-line description for `list-rules`.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::ForbiddenDep => "Edge from one layer to a layer it must never depend on",
            Self::BypassLayer => "Direct edge between layers that must be mediated by a third",
            Self::DisallowedApi => "File content in a layer matches a disallowed API pattern",
        }
    }

    /// Fixed remediation hint. `via` is only used by [`RuleCode::BypassLayer`].
    #[must_use]
    pub fn suggestion(self, via: Option<&str>) -> String {
        match self {
            Self::ForbiddenDep => "Route via allowed layer (see must_route_via rules).".to_string(),
            Self::BypassLayer => format!("Introduce {} boundary layer.", via.unwrap_or("a")),
            Self::DisallowedApi => {
                "Move database access to appropriate service/repository layer.".to_string()
            }
        }
    }
}

impl fmt::Display for RuleCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A classified source file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Root-relative path with `/` separators.
    pub path: String,
    /// Dotted module identifier derived from the path.
    pub module_name: String,
    /// Matched layer name, or [`UNKNOWN_LAYER`].
    pub layer: String,
    /// Language id of the extractor that discovered the file.
    pub lang: String,
}

/// How an edge was detected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeType {
    /// Line-anchored import statement.
    Import,
    /// Whole-file database access heuristic.
    DbCall,
}

impl fmt::Display for EdgeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::DbCall => write!(f, "db_call"),
        }
    }
}

/// Wire prefix for external module targets.
const EXTERNAL_PREFIX: &str = "EXTERNAL:";
/// Wire value for the database sentinel.
const DATABASE: &str = "DATABASE";

/// Destination of an edge.
///
/// Serialized as a plain string: a path, `EXTERNAL:<spec>`, or `DATABASE`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum EdgeTarget {
    /// A root-relative path (a node, or an unresolved relative import).
    Path(String),
    /// A module specifier that does not resolve to a file.
    External(String),
    /// Infrastructure access, not a module reference.
    Database,
}

impl EdgeTarget {
    /// Returns the path if this target can name a node.
    #[must_use]
    pub fn as_path(&self) -> Option<&str> {
        match self {
            Self::Path(p) => Some(p),
            Self::External(_) | Self::Database => None,
        }
    }
}

impl fmt::Display for EdgeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path(p) => f.write_str(p),
            Self::External(spec) => write!(f, "{EXTERNAL_PREFIX}{spec}"),
            Self::Database => f.write_str(DATABASE),
        }
    }
}

impl From<EdgeTarget> for String {
    fn from(target: EdgeTarget) -> Self {
        target.to_string()
    }
}

impl From<String> for EdgeTarget {
    fn from(raw: String) -> Self {
        if raw == DATABASE {
            Self::Database
        } else if let Some(spec) = raw.strip_prefix(EXTERNAL_PREFIX) {
            Self::External(spec.to_string())
        } else {
            Self::Path(raw)
        }
    }
}

/// A directed, typed reference detected in a file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Path of the node the reference was found in.
    pub from_path: String,
    /// Where the reference points.
    pub to_path: EdgeTarget,
    /// Detection method.
    pub edge_type: EdgeType,
    /// 1-based source line for line-anchored edges.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_number: Option<usize>,
}

impl Edge {
    /// Creates an import edge anchored at `line`.
    #[must_use]
    pub fn import(from_path: impl Into<String>, to_path: EdgeTarget, line: usize) -> Self {
        Self {
            from_path: from_path.into(),
            to_path,
            edge_type: EdgeType::Import,
            line_number: Some(line),
        }
    }

    /// Creates a whole-file database access edge.
    #[must_use]
    pub fn db_call(from_path: impl Into<String>) -> Self {
        Self {
            from_path: from_path.into(),
            to_path: EdgeTarget::Database,
            edge_type: EdgeType::DbCall,
            line_number: None,
        }
    }
}

/// What triggered a violation: an edge kind, or file content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Evidence {
    /// An `import` edge.
    Import,
    /// A `db_call` edge.
    DbCall,
    /// A content pattern match.
    ApiUsage,
}

impl From<EdgeType> for Evidence {
    fn from(edge_type: EdgeType) -> Self {
        match edge_type {
            EdgeType::Import => Self::Import,
            EdgeType::DbCall => Self::DbCall,
        }
    }
}

impl fmt::Display for Evidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::DbCall => write!(f, "db_call"),
            Self::ApiUsage => write!(f, "api_usage"),
        }
    }
}

/// A single policy finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Rule class.
    pub rule_code: RuleCode,
    /// Severity, fixed per rule class.
    pub severity: Severity,
    /// File responsible for the finding.
    pub node_path: String,
    /// Human-readable description.
    pub details: String,
    /// Remediation hint.
    pub suggestion: String,
    /// Edge kind or content match that triggered the finding.
    pub edge_type: Evidence,
}

impl Violation {
    /// Creates a violation with the code's severity and default suggestion.
    #[must_use]
    pub fn new(
        rule_code: RuleCode,
        node_path: impl Into<String>,
        details: impl Into<String>,
        edge_type: Evidence,
    ) -> Self {
        Self {
            rule_code,
            severity: rule_code.severity(),
            node_path: node_path.into(),
            details: details.into(),
            suggestion: rule_code.suggestion(None),
            edge_type,
        }
    }

    /// Replaces the suggestion.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} [{}] {}",
            self.node_path, self.severity, self.rule_code, self.details
        )
    }
}

/// Pipeline stage a per-file diagnostic came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    /// File discovery.
    Collect,
    /// Edge extraction.
    Extract,
    /// Rule checking.
    Check,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Collect => write!(f, "collect"),
            Self::Extract => write!(f, "extract"),
            Self::Check => write!(f, "check"),
        }
    }
}

/// A recoverable per-file problem, returned alongside the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDiagnostic {
    /// Path the problem concerns (root-relative when known).
    pub path: String,
    /// Stage that skipped the file.
    pub stage: Stage,
    /// Error message.
    pub message: String,
}

impl FileDiagnostic {
    /// Creates a diagnostic and logs it at `warn` level.
    #[must_use]
    pub fn warn(path: impl Into<String>, stage: Stage, message: impl Into<String>) -> Self {
        let diagnostic = Self {
            path: path.into(),
            stage,
            message: message.into(),
        };
        tracing::warn!(
            "Skipping {} during {}: {}",
            diagnostic.path,
            diagnostic.stage,
            diagnostic.message
        );
        diagnostic
    }
}
