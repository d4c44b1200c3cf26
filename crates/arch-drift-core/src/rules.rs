//! Rule set input: the externally supplied drift policy.
//!
//! A [`RuleSet`] is a plain serde DTO with four top-level sections, each
//! defaulting to empty when absent. [`RuleSet::compile`] validates it and
//! produces the [`Policy`] the engine runs against.
//!
//! ```toml
//! [[layers]]
//! name = "controllers"
//! patterns = ["app/controllers/**"]
//!
//! [[forbidden_dependencies]]
//! from = "controllers"
//! to = "repositories"
//!
//! [[must_route_via]]
//! from = "controllers"
//! to = "repositories"
//! via = "services"
//!
//! [[disallowed_apis]]
//! layer = "controllers"
//! patterns = ['\.where\(', '\.create\(']
//! ```

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

use crate::policy::{ApiPattern, ApiRule, GlobPattern, Layer, LayerPair, Policy, RouteRule};
use crate::types::UNKNOWN_LAYER;

/// Architecture policy as supplied by the caller.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleSet {
    /// Ordered layer definitions; the first matching layer wins.
    #[serde(default)]
    pub layers: Vec<LayerDef>,

    /// Layer pairs that must never be connected.
    #[serde(default)]
    pub forbidden_dependencies: Vec<ForbiddenDependency>,

    /// Layer pairs that must be mediated by a third layer.
    #[serde(default)]
    pub must_route_via: Vec<MustRouteVia>,

    /// Content patterns disallowed per layer.
    #[serde(default)]
    pub disallowed_apis: Vec<DisallowedApi>,
}

/// A named architecture layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerDef {
    /// Layer name (e.g., `"controllers"`).
    pub name: String,
    /// Shell-glob patterns over `/`-separated relative paths.
    pub patterns: Vec<String>,
}

/// A forbidden `from -> to` layer dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForbiddenDependency {
    /// Source layer.
    pub from: String,
    /// Destination layer.
    pub to: String,
}

/// A `from -> to` dependency that must go through `via`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MustRouteVia {
    /// Source layer.
    pub from: String,
    /// Destination layer.
    pub to: String,
    /// Intermediate layer.
    pub via: String,
}

/// Regex content patterns that files in `layer` must not contain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisallowedApi {
    /// Layer the rule applies to.
    pub layer: String,
    /// Regular expressions searched anywhere in the file.
    pub patterns: Vec<String>,
}

/// Errors when loading or validating a rule set.
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum RulesError {
    /// Failed to read the rules file.
    #[error("failed to read {path}: {source}")]
    #[diagnostic(code(arch_drift::rules::io))]
    Io {
        /// Path that failed.
        path: PathBuf,
        /// IO error.
        source: std::io::Error,
    },

    /// The rules text is not valid TOML/JSON for this shape.
    #[error("invalid rules: {message}")]
    #[diagnostic(
        code(arch_drift::rules::parse),
        help("expected top-level `layers`, `forbidden_dependencies`, `must_route_via`, `disallowed_apis`")
    )]
    Parse {
        /// Parse error detail.
        message: String,
    },

    /// A rule entry is structurally invalid.
    #[error("{context}: {message}")]
    #[diagnostic(code(arch_drift::rules::validation))]
    Validation {
        /// Where the problem is (e.g., `"layers[1].patterns[0]"`).
        context: String,
        /// What is wrong.
        message: String,
    },

}

impl RuleSet {
    /// Load from a file; `.json` files are parsed as JSON, anything else as TOML.
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file(path: &Path) -> Result<Self, RulesError> {
        let content = std::fs::read_to_string(path).map_err(|e| RulesError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let is_json = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
        if is_json {
            Self::parse_json(&content)
        } else {
            Self::parse_toml(&content)
        }
    }

    /// Parse from a TOML string.
    ///
    /// # Errors
    ///
    /// Returns error if TOML is invalid or an entry is missing a field.
    pub fn parse_toml(content: &str) -> Result<Self, RulesError> {
        toml::from_str(content).map_err(|e| RulesError::Parse {
            message: e.to_string(),
        })
    }

    /// Parse from a JSON string.
    ///
    /// # Errors
    ///
    /// Returns error if JSON is invalid or an entry is missing a field.
    pub fn parse_json(content: &str) -> Result<Self, RulesError> {
        serde_json::from_str(content).map_err(|e| RulesError::Parse {
            message: e.to_string(),
        })
    }

    /// Validate and compile into a [`Policy`].
    ///
    /// # Errors
    ///
    /// Returns error describing the first problem found. Rules that name an
    /// undeclared layer, and repeated layer names, only log a warning.
    pub fn compile(&self) -> Result<Policy, RulesError> {
        let layers = self
            .layers
            .iter()
            .enumerate()
            .map(|(i, l)| compile_layer(l, i))
            .collect::<Result<Vec<_>, _>>()?;

        let mut names: HashSet<&str> = HashSet::new();
        for (i, layer) in layers.iter().enumerate() {
            if !names.insert(layer.name.as_str()) {
                tracing::warn!(
                    "layers[{i}].name: duplicate layer '{}'; the earlier definition matches first",
                    layer.name
                );
            }
        }
        let known = |context: String, layer: &str| -> String {
            if layer != UNKNOWN_LAYER && !names.contains(layer) {
                tracing::warn!("{context}: layer '{layer}' is not declared; the rule can never match");
            }
            layer.to_string()
        };

        let forbidden: Vec<LayerPair> = self
            .forbidden_dependencies
            .iter()
            .enumerate()
            .map(|(i, d)| {
                let ctx = format!("forbidden_dependencies[{i}]");
                LayerPair {
                    from: known(format!("{ctx}.from"), &d.from),
                    to: known(format!("{ctx}.to"), &d.to),
                }
            })
            .collect();

        let routes: Vec<RouteRule> = self
            .must_route_via
            .iter()
            .enumerate()
            .map(|(i, r)| {
                let ctx = format!("must_route_via[{i}]");
                RouteRule {
                    from: known(format!("{ctx}.from"), &r.from),
                    to: known(format!("{ctx}.to"), &r.to),
                    via: known(format!("{ctx}.via"), &r.via),
                }
            })
            .collect();

        let disallowed_apis = self
            .disallowed_apis
            .iter()
            .enumerate()
            .map(|(i, a)| {
                let ctx = format!("disallowed_apis[{i}]");
                let layer = known(format!("{ctx}.layer"), &a.layer);
                let patterns = a
                    .patterns
                    .iter()
                    .enumerate()
                    .map(|(j, p)| {
                        ApiPattern::new(p).map_err(|message| RulesError::Validation {
                            context: format!("{ctx}.patterns[{j}]"),
                            message,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ApiRule { layer, patterns })
            })
            .collect::<Result<Vec<_>, RulesError>>()?;

        Ok(Policy {
            layers,
            forbidden,
            routes,
            disallowed_apis,
        })
    }
}

fn compile_layer(def: &LayerDef, index: usize) -> Result<Layer, RulesError> {
    let ctx = format!("layers[{index}]");
    if def.name.trim().is_empty() {
        return Err(RulesError::Validation {
            context: format!("{ctx}.name"),
            message: "layer name is empty".to_string(),
        });
    }
    if def.name == UNKNOWN_LAYER {
        return Err(RulesError::Validation {
            context: format!("{ctx}.name"),
            message: format!("'{UNKNOWN_LAYER}' is reserved for unclassified files"),
        });
    }
    let patterns = def
        .patterns
        .iter()
        .enumerate()
        .map(|(j, p)| {
            GlobPattern::new(p).map_err(|message| RulesError::Validation {
                context: format!("{ctx}.patterns[{j}]"),
                message,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Layer {
        name: def.name.clone(),
        patterns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FULL: &str = r#"
[[layers]]
name = "controllers"
patterns = ["app/controllers/**"]

[[layers]]
name = "services"
patterns = ["app/services/**"]

[[layers]]
name = "repositories"
patterns = ["app/repositories/**"]

[[forbidden_dependencies]]
from = "controllers"
to = "repositories"

[[must_route_via]]
from = "controllers"
to = "repositories"
via = "services"

[[disallowed_apis]]
layer = "controllers"
patterns = ['\.where\(', '\.create\(']
"#;

    #[test]
    fn parse_full_toml() {
        let rules = RuleSet::parse_toml(FULL).expect("parse failed");
        assert_eq!(rules.layers.len(), 3);
        assert_eq!(rules.must_route_via[0].via, "services");
        let policy = rules.compile().expect("compile failed");
        assert_eq!(policy.layers().len(), 3);
        assert_eq!(policy.disallowed_apis()[0].patterns.len(), 2);
        assert!(policy.has_rules());
    }

    #[test]
    fn absent_sections_default_to_empty() {
        let rules = RuleSet::parse_json("{}").unwrap();
        assert_eq!(rules, RuleSet::default());
        let policy = rules.compile().unwrap();
        assert!(policy.layers().is_empty());
        assert!(!policy.has_rules());
    }

    #[test]
    fn parse_json_with_extra_fields() {
        let json = r#"{
            "layers": [{"name": "ui", "patterns": ["frontend/**"]}],
            "forbidden_dependencies": [],
            "mode": "full"
        }"#;
        let rules = RuleSet::parse_json(json).unwrap();
        assert_eq!(rules.layers[0].name, "ui");
    }

    #[test]
    fn missing_field_is_parse_error() {
        let err = RuleSet::parse_toml("[[forbidden_dependencies]]\nfrom = \"a\"\n").unwrap_err();
        assert!(matches!(err, RulesError::Parse { .. }));
        assert!(err.to_string().contains("to"));
    }

    #[test]
    fn undeclared_layer_reference_compiles_as_written() {
        let rules = RuleSet::parse_toml(
            r#"
[[layers]]
name = "controllers"
patterns = ["app/controllers/**"]

[[must_route_via]]
from = "controllers"
to = "repositories"
via = "services"
"#,
        )
        .unwrap();
        let policy = rules.compile().unwrap();
        assert_eq!(
            policy.routes(),
            [RouteRule {
                from: "controllers".into(),
                to: "repositories".into(),
                via: "services".into(),
            }]
        );
    }

    #[test]
    fn unknown_sentinel_may_be_referenced() {
        let rules = RuleSet {
            forbidden_dependencies: vec![ForbiddenDependency {
                from: "unknown".into(),
                to: "unknown".into(),
            }],
            ..RuleSet::default()
        };
        assert!(rules.compile().is_ok());
    }

    #[test]
    fn duplicate_layer_names_keep_declaration_order() {
        let dup = RuleSet {
            layers: vec![
                LayerDef {
                    name: "a".into(),
                    patterns: vec!["src/**".into()],
                },
                LayerDef {
                    name: "a".into(),
                    patterns: vec!["lib/**".into()],
                },
            ],
            ..RuleSet::default()
        };
        let policy = dup.compile().unwrap();
        assert_eq!(policy.layers().len(), 2);
        assert!(policy.layers()[0].patterns[0].matches("src/x.ts"));
    }

    #[test]
    fn reserved_layer_name_is_rejected() {
        let reserved = RuleSet {
            layers: vec![LayerDef {
                name: "unknown".into(),
                patterns: vec![],
            }],
            ..RuleSet::default()
        };
        assert!(reserved
            .compile()
            .unwrap_err()
            .to_string()
            .starts_with("layers[0].name"));
    }

    #[test]
    fn bad_patterns_report_location() {
        let bad_glob = RuleSet {
            layers: vec![LayerDef {
                name: "a".into(),
                patterns: vec!["src/**".into(), "src/[a-".into()],
            }],
            ..RuleSet::default()
        };
        assert!(bad_glob
            .compile()
            .unwrap_err()
            .to_string()
            .starts_with("layers[0].patterns[1]"));

        let bad_regex = RuleSet {
            layers: vec![LayerDef {
                name: "a".into(),
                patterns: vec![],
            }],
            disallowed_apis: vec![DisallowedApi {
                layer: "a".into(),
                patterns: vec!["(".into()],
            }],
            ..RuleSet::default()
        };
        assert!(bad_regex
            .compile()
            .unwrap_err()
            .to_string()
            .starts_with("disallowed_apis[0].patterns[0]"));
    }

    #[test]
    fn from_file_picks_format_by_extension() {
        let dir = tempfile::tempdir().unwrap();
        let toml_path = dir.path().join("rules.toml");
        std::fs::write(&toml_path, FULL).unwrap();
        assert_eq!(RuleSet::from_file(&toml_path).unwrap().layers.len(), 3);

        let json_path = dir.path().join("rules.json");
        std::fs::write(&json_path, r#"{"layers": []}"#).unwrap();
        assert!(RuleSet::from_file(&json_path).unwrap().layers.is_empty());

        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            RuleSet::from_file(&missing),
            Err(RulesError::Io { .. })
        ));
    }
}
