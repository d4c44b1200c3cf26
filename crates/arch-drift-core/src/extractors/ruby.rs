//! Ruby database-access extractor (whole-file heuristic).

use regex::Regex;
use std::sync::LazyLock;

use crate::extractor::{EdgeExtractor, ExtractContext};
use crate::types::{Edge, Node};

/// A category of object-relational calls.
struct DbCategory {
    name: &'static str,
    pattern: Regex,
}

/// Query/lookup-style and mutate-style ActiveRecord calls.
static DB_CATEGORIES: LazyLock<Vec<DbCategory>> = LazyLock::new(|| {
    [
        ("query", r"\.where\(|\.find\(|ActiveRecord::Base"),
        ("mutate", r"\.create\(|\.update\(|\.destroy\("),
    ]
    .into_iter()
    .map(|(name, p)| DbCategory {
        name,
        pattern: Regex::new(p).unwrap_or_else(|e| panic!("invalid db pattern {p}: {e}")),
    })
    .collect()
});

/// Emits one `db_call` edge to `DATABASE` per matching category in a `.rb` file.
pub struct RubyDbAccess;

impl RubyDbAccess {
    /// Creates a new Ruby database-access extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Default for RubyDbAccess {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeExtractor for RubyDbAccess {
    fn language_id(&self) -> &'static str {
        "ruby"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".rb"]
    }

    fn extract(&self, _ctx: &ExtractContext<'_>, node: &Node, source: &str) -> Vec<Edge> {
        DB_CATEGORIES
            .iter()
            .filter(|category| category.pattern.is_match(source))
            .map(|category| {
                tracing::debug!("{}: {} database access", node.path, category.name);
                Edge::db_call(node.path.clone())
            })
            .collect()
    }
}
