//! Validated policy model.
//!
//! Built from a [`RuleSet`](crate::rules::RuleSet) by
//! [`RuleSet::compile`](crate::rules::RuleSet::compile). Globs and regexes
//! are compiled once here and reused for every match call.

use glob::MatchOptions;
use regex::Regex;

/// Match options for layer globs: `*` and `?` never cross `/`.
const GLOB_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: true,
    require_literal_leading_dot: false,
};

/// A compiled shell-glob over `/`-normalized relative paths.
///
/// A `**` glued to other characters (`app/**.rb`, `lib/v**`) matches across
/// directories. It compiles to several component-form globs; a path matches
/// if any of them does.
#[derive(Debug, Clone)]
pub struct GlobPattern {
    raw: String,
    compiled: Vec<glob::Pattern>,
}

impl GlobPattern {
    /// Compiles a pattern, normalizing `\` to `/` first.
    ///
    /// # Errors
    ///
    /// Returns the glob crate's message if the syntax is invalid.
    pub fn new(pattern: &str) -> Result<Self, String> {
        let raw = pattern.replace('\\', "/");
        if raw.is_empty() {
            return Err("pattern is empty".to_string());
        }
        let mut forms = expand_glued_globstars(&raw);
        forms.dedup();
        let compiled = forms
            .iter()
            .map(|form| glob::Pattern::new(form).map_err(|e| e.to_string()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { raw, compiled })
    }

    /// Tests a `/`-separated relative path against this pattern.
    #[must_use]
    pub fn matches(&self, path: &str) -> bool {
        if self
            .compiled
            .iter()
            .any(|p| p.matches_with(path, GLOB_OPTIONS))
        {
            return true;
        }
        // `dir/**` covers everything below `dir/`, at any depth.
        if let Some(prefix) = self.raw.strip_suffix("/**") {
            let prefix = prefix.trim_end_matches('/');
            if !prefix.contains(['*', '?', '[']) {
                return path.len() > prefix.len()
                    && path.starts_with(prefix)
                    && path.as_bytes()[prefix.len()] == b'/';
            }
        }
        false
    }

    /// Returns the normalized pattern text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Rewrites each `**` that shares a component with other characters into
/// the two forms the glob crate accepts: `pre*post` for the same directory
/// and `pre*/**/*post` for any depth below it.
fn expand_glued_globstars(pattern: &str) -> Vec<String> {
    let components: Vec<&str> = pattern.split('/').collect();
    let glued = components
        .iter()
        .position(|c| *c != "**" && c.contains("**"));
    let Some(index) = glued else {
        return vec![pattern.to_string()];
    };
    let Some((pre, post)) = components[index].split_once("**") else {
        return vec![pattern.to_string()];
    };

    let with_component = |replacement: String| {
        let mut parts: Vec<String> = components.iter().map(|c| (*c).to_string()).collect();
        parts[index] = replacement;
        parts.join("/")
    };
    let mut forms = expand_glued_globstars(&with_component(format!("{pre}*{post}")));
    forms.extend(expand_glued_globstars(&with_component(format!(
        "{pre}*/**/*{post}"
    ))));
    forms
}

/// A named layer with its ordered patterns.
#[derive(Debug, Clone)]
pub struct Layer {
    /// Layer name.
    pub name: String,
    /// Patterns, tested in order.
    pub patterns: Vec<GlobPattern>,
}

/// A `{from, to}` pair that must never be connected by an edge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerPair {
    /// Source layer.
    pub from: String,
    /// Destination layer.
    pub to: String,
}

/// A `{from, to}` pair that must be mediated by `via`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    /// Source layer.
    pub from: String,
    /// Destination layer.
    pub to: String,
    /// Layer the dependency should go through.
    pub via: String,
}

/// A content pattern searched anywhere in a file.
#[derive(Debug, Clone)]
pub struct ApiPattern {
    raw: String,
    compiled: Regex,
}

impl ApiPattern {
    /// Compiles a regular expression.
    ///
    /// # Errors
    ///
    /// Returns the regex crate's message if the syntax is invalid.
    pub fn new(pattern: &str) -> Result<Self, String> {
        let compiled = Regex::new(pattern).map_err(|e| e.to_string())?;
        Ok(Self {
            raw: pattern.to_string(),
            compiled,
        })
    }

    /// Whether the pattern occurs anywhere in `content`.
    #[must_use]
    pub fn is_match(&self, content: &str) -> bool {
        self.compiled.is_match(content)
    }

    /// Returns the pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.raw
    }
}

/// Content patterns disallowed in one layer.
#[derive(Debug, Clone)]
pub struct ApiRule {
    /// Layer the rule applies to.
    pub layer: String,
    /// Patterns, tested in order; the first match wins.
    pub patterns: Vec<ApiPattern>,
}

/// The validated, compiled rule set consumed by the engine.
#[derive(Debug, Clone, Default)]
pub struct Policy {
    pub(crate) layers: Vec<Layer>,
    pub(crate) forbidden: Vec<LayerPair>,
    pub(crate) routes: Vec<RouteRule>,
    pub(crate) disallowed_apis: Vec<ApiRule>,
}

impl Policy {
    /// Layers in declaration order.
    #[must_use]
    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    /// Forbidden layer pairs.
    #[must_use]
    pub fn forbidden(&self) -> &[LayerPair] {
        &self.forbidden
    }

    /// Must-route-via rules.
    #[must_use]
    pub fn routes(&self) -> &[RouteRule] {
        &self.routes
    }

    /// Disallowed API rules.
    #[must_use]
    pub fn disallowed_apis(&self) -> &[ApiRule] {
        &self.disallowed_apis
    }

    /// Whether any rule class has entries.
    #[must_use]
    pub fn has_rules(&self) -> bool {
        !(self.forbidden.is_empty() && self.routes.is_empty() && self.disallowed_apis.is_empty())
    }
}
