//! Language-agnostic edge extraction trait.
//!
//! `EdgeExtractor` is the extension point for adding new languages.
//! Implement it to teach arch-drift how to find references in another
//! file family; the collector and rule checker need no changes.

use std::path::Path;

use crate::extractors::{RubyDbAccess, TypeScriptImports};
use crate::types::{Edge, Node};

/// Read-only view of the analyzed tree handed to extractors.
#[derive(Debug, Clone, Copy)]
pub struct ExtractContext<'a> {
    root: &'a Path,
}

impl<'a> ExtractContext<'a> {
    /// Creates a context rooted at `root`.
    #[must_use]
    pub fn new(root: &'a Path) -> Self {
        Self { root }
    }

    /// Repository root.
    #[must_use]
    pub fn root(&self) -> &'a Path {
        self.root
    }

    /// Whether a root-relative, `/`-separated path names a regular file.
    #[must_use]
    pub fn is_file(&self, relative: &str) -> bool {
        self.root.join(relative).is_file()
    }
}

/// Produces edges for one language family.
///
/// The engine reads each file once (lossy UTF-8) and passes the text in,
/// so implementations only see files whose extension they claim.
pub trait EdgeExtractor: Send + Sync {
    /// Language identifier (e.g., `"typescript"`), recorded as `Node::lang`.
    fn language_id(&self) -> &'static str;

    /// File extensions this extractor claims (e.g., `&[".ts", ".tsx"]`).
    fn extensions(&self) -> &'static [&'static str];

    /// Extract edges from one file's content.
    fn extract(&self, ctx: &ExtractContext<'_>, node: &Node, source: &str) -> Vec<Edge>;

    /// Returns the claimed extension `file_name` ends with, if any.
    fn claimed_extension(&self, file_name: &str) -> Option<&'static str> {
        self.extensions()
            .iter()
            .copied()
            .find(|ext| file_name.len() > ext.len() && file_name.ends_with(ext))
    }
}

/// Boxed extractor for dynamic registration.
pub type ExtractorBox = Box<dyn EdgeExtractor>;

/// The built-in extractor registry: TypeScript imports, then Ruby database access.
#[must_use]
pub fn default_extractors() -> Vec<ExtractorBox> {
    vec![
        Box::new(TypeScriptImports::new()),
        Box::new(RubyDbAccess::new()),
    ]
}
