//! Layer resolution: maps relative file paths to architecture layers.

use crate::policy::Policy;
use crate::types::UNKNOWN_LAYER;
use crate::utils::paths::normalize_separators;

/// Resolves relative file paths to layer names.
///
/// Resolution is first-match over the declared layer order: narrow layers
/// declared before broad ones take priority.
pub struct LayerResolver<'a> {
    policy: &'a Policy,
}

impl<'a> LayerResolver<'a> {
    /// Build a resolver over a compiled policy.
    #[must_use]
    pub fn new(policy: &'a Policy) -> Self {
        Self { policy }
    }

    /// Which layer does this path belong to? Returns [`UNKNOWN_LAYER`] if none.
    #[must_use]
    pub fn resolve(&self, path: &str) -> &'a str {
        let normalized = normalize_separators(path);
        for layer in self.policy.layers() {
            if layer.patterns.iter().any(|p| p.matches(&normalized)) {
                return &layer.name;
            }
        }
        UNKNOWN_LAYER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::{LayerDef, RuleSet};
    use proptest::prelude::*;

    fn policy(layers: &[(&str, &[&str])]) -> Policy {
        RuleSet {
            layers: layers
                .iter()
                .map(|(name, patterns)| LayerDef {
                    name: (*name).into(),
                    patterns: patterns.iter().map(|p| (*p).into()).collect(),
                })
                .collect(),
            ..RuleSet::default()
        }
        .compile()
        .unwrap()
    }

    #[test]
    fn first_declared_layer_wins() {
        let p = policy(&[
            ("admin-controllers", &["app/controllers/admin/**"]),
            ("controllers", &["app/controllers/**"]),
        ]);
        let r = LayerResolver::new(&p);
        assert_eq!(
            r.resolve("app/controllers/admin/users_controller.rb"),
            "admin-controllers"
        );
        assert_eq!(r.resolve("app/controllers/users_controller.rb"), "controllers");
    }

    #[test]
    fn broad_layer_first_shadows_narrow_one() {
        let p = policy(&[
            ("controllers", &["app/controllers/**"]),
            ("admin-controllers", &["app/controllers/admin/**"]),
        ]);
        let r = LayerResolver::new(&p);
        assert_eq!(r.resolve("app/controllers/admin/x.rb"), "controllers");
    }

    #[test]
    fn later_pattern_of_same_layer_matches() {
        let p = policy(&[("ui", &["frontend/components/**", "frontend/pages/**"])]);
        let r = LayerResolver::new(&p);
        assert_eq!(r.resolve("frontend/pages/index.tsx"), "ui");
    }

    #[test]
    fn glued_globstar_classifies_nested_files() {
        let p = policy(&[("controllers", &["app/controllers/**.rb"])]);
        let r = LayerResolver::new(&p);
        assert_eq!(r.resolve("app/controllers/admin/a.rb"), "controllers");
        assert_eq!(r.resolve("app/controllers/a.rb"), "controllers");
        assert_eq!(r.resolve("app/controllers/admin/a.ts"), UNKNOWN_LAYER);
    }

    #[test]
    fn unmatched_path_is_unknown() {
        let p = policy(&[("services", &["app/services/**"])]);
        let r = LayerResolver::new(&p);
        assert_eq!(r.resolve("lib/tasks/seed.rb"), UNKNOWN_LAYER);
    }

    #[test]
    fn backslash_paths_are_normalized() {
        let p = policy(&[("models", &["app/models/*.rb"])]);
        let r = LayerResolver::new(&p);
        assert_eq!(r.resolve(r"app\models\user.rb"), "models");
    }

    proptest! {
        #[test]
        fn empty_layers_always_unknown(path in "[a-z]{1,6}(/[a-z_]{1,8}){0,4}\\.(rb|ts|tsx)") {
            let p = policy(&[]);
            prop_assert_eq!(LayerResolver::new(&p).resolve(&path), UNKNOWN_LAYER);
        }

        #[test]
        fn overlapping_layers_pick_first(path in "[a-z]{1,6}(/[a-z_]{1,8}){0,4}\\.(rb|ts|tsx)") {
            let p = policy(&[("first", &["**/*"]), ("second", &["**/*"])]);
            prop_assert_eq!(LayerResolver::new(&p).resolve(&path), "first");
        }
    }
}
