//! TypeScript import extractor (line-oriented heuristic).

use regex::Regex;
use std::sync::LazyLock;

use crate::extractor::{EdgeExtractor, ExtractContext};
use crate::types::{Edge, EdgeTarget, Node};
use crate::utils::paths::{normalize_path, parent_dir};

/// Import statement shapes, tried in order. Group 1 is the specifier.
static IMPORT_PATTERNS: LazyLock<[Regex; 2]> = LazyLock::new(|| {
    [
        // import X from './x', import { a, b } from "y", import type T from 'z'
        r#"^\s*import\s+.*?\bfrom\s*['"]([^'"]+)['"]"#,
        // import './side-effect'
        r#"^\s*import\s*['"]([^'"]+)['"]"#,
    ]
    .map(|p| Regex::new(p).unwrap_or_else(|e| panic!("invalid import pattern {p}: {e}")))
});

/// Suffixes probed on disk for a relative specifier, in order.
const RESOLUTION_SUFFIXES: &[&str] = &["", ".ts", ".tsx", ".d.ts", "/index.ts", "/index.tsx"];

/// How a module specifier is treated.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Specifier<'a> {
    /// `./x`, `../x`: resolved against the importing file.
    Relative(&'a str),
    /// `/abs/path`: outside the analyzable graph.
    Absolute(&'a str),
    /// Package name or alias.
    Bare(&'a str),
}

impl<'a> Specifier<'a> {
    fn classify(specifier: &'a str) -> Self {
        if specifier.starts_with('.') {
            Self::Relative(specifier)
        } else if specifier.starts_with('/') {
            Self::Absolute(specifier)
        } else {
            Self::Bare(specifier)
        }
    }
}

/// Emits an `import` edge per import line in `.ts`/`.tsx` files.
pub struct TypeScriptImports;

impl TypeScriptImports {
    /// Creates a new TypeScript import extractor.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Returns the module specifier of an import line, if it is one.
    fn specifier(line: &str) -> Option<&str> {
        IMPORT_PATTERNS
            .iter()
            .find_map(|re| re.captures(line))
            .and_then(|caps| caps.get(1))
            .map(|m| m.as_str())
    }

    /// Resolves a relative specifier against the importing file's directory.
    ///
    /// Returns the first on-disk candidate, or the normalized unresolved path.
    fn resolve_relative(ctx: &ExtractContext<'_>, from_path: &str, specifier: &str) -> String {
        let dir = parent_dir(from_path);
        let joined = if dir.is_empty() {
            specifier.to_string()
        } else {
            format!("{dir}/{specifier}")
        };
        let target = normalize_path(&joined);

        if target.ends_with(".ts") || target.ends_with(".tsx") {
            return target;
        }

        RESOLUTION_SUFFIXES
            .iter()
            .map(|suffix| normalize_path(&format!("{target}{suffix}")))
            .find(|candidate| ctx.is_file(candidate))
            .unwrap_or(target)
    }
}

impl Default for TypeScriptImports {
    fn default() -> Self {
        Self::new()
    }
}

impl EdgeExtractor for TypeScriptImports {
    fn language_id(&self) -> &'static str {
        "typescript"
    }

    fn extensions(&self) -> &'static [&'static str] {
        &[".ts", ".tsx"]
    }

    fn extract(&self, ctx: &ExtractContext<'_>, node: &Node, source: &str) -> Vec<Edge> {
        let mut edges = Vec::new();

        for (index, line) in source.lines().enumerate() {
            let Some(specifier) = Self::specifier(line) else {
                continue;
            };
            let line_number = index + 1;

            let target = match Specifier::classify(specifier) {
                Specifier::Relative(specifier) => {
                    EdgeTarget::Path(Self::resolve_relative(ctx, &node.path, specifier))
                }
                Specifier::Absolute(specifier) => {
                    tracing::debug!(
                        "{}:{}: absolute import '{}' not analyzed",
                        node.path,
                        line_number,
                        specifier
                    );
                    continue;
                }
                Specifier::Bare(specifier) => EdgeTarget::External(specifier.to_string()),
            };

            edges.push(Edge::import(node.path.clone(), target, line_number));
        }

        edges
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EdgeType;
    use std::fs;
    use tempfile::TempDir;

    fn node(path: &str) -> Node {
        Node {
            path: path.into(),
            module_name: String::new(),
            layer: "unknown".into(),
            lang: "typescript".into(),
        }
    }

    fn extract_in(root: &TempDir, path: &str, source: &str) -> Vec<Edge> {
        TypeScriptImports::new().extract(&ExtractContext::new(root.path()), &node(path), source)
    }

    fn touch(root: &TempDir, rel: &str) {
        let p = root.path().join(rel);
        fs::create_dir_all(p.parent().unwrap()).unwrap();
        fs::write(p, "").unwrap();
    }

    #[test]
    fn recognizes_import_shapes() {
        assert_eq!(TypeScriptImports::specifier("import React from 'react';"), Some("react"));
        assert_eq!(
            TypeScriptImports::specifier(r#"  import { a, b } from "../lib/x";"#),
            Some("../lib/x")
        );
        assert_eq!(
            TypeScriptImports::specifier("import type { User } from './types'"),
            Some("./types")
        );
        assert_eq!(TypeScriptImports::specifier("import './polyfills';"), Some("./polyfills"));
        assert_eq!(TypeScriptImports::specifier("const x = require('y');"), None);
        assert_eq!(TypeScriptImports::specifier("// import x from 'y'"), None);
        assert_eq!(TypeScriptImports::specifier("export { a } from './a';"), None);
    }

    #[test]
    fn bare_specifier_is_external_verbatim() {
        let root = TempDir::new().unwrap();
        let edges = extract_in(
            &root,
            "src/App.tsx",
            "import React from 'react';\nimport { api } from '@/lib/api';\n",
        );
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].to_path, EdgeTarget::External("react".into()));
        assert_eq!(edges[0].line_number, Some(1));
        assert_eq!(edges[1].to_path, EdgeTarget::External("@/lib/api".into()));
        assert_eq!(edges[1].line_number, Some(2));
        assert!(edges.iter().all(|e| e.edge_type == EdgeType::Import));
    }

    #[test]
    fn relative_import_resolves_existing_file() {
        let root = TempDir::new().unwrap();
        touch(&root, "frontend/services/UserService.ts");
        let edges = extract_in(
            &root,
            "frontend/components/UserList.tsx",
            "\nimport { UserService } from '../services/UserService';\n",
        );
        assert_eq!(edges.len(), 1);
        assert_eq!(
            edges[0].to_path,
            EdgeTarget::Path("frontend/services/UserService.ts".into())
        );
        assert_eq!(edges[0].line_number, Some(2));
        assert_eq!(edges[0].from_path, "frontend/components/UserList.tsx");
    }

    #[test]
    fn relative_import_without_file_stays_unresolved() {
        let root = TempDir::new().unwrap();
        let edges = extract_in(&root, "src/a/b.ts", "import x from '../c/./d';");
        assert_eq!(edges[0].to_path, EdgeTarget::Path("src/c/d".into()));
    }

    #[test]
    fn resolution_order_prefers_ts_then_tsx_then_index() {
        let root = TempDir::new().unwrap();
        touch(&root, "src/widget.tsx");
        touch(&root, "src/widget/index.ts");
        touch(&root, "src/store/index.tsx");
        touch(&root, "src/types.d.ts");
        let edges = extract_in(
            &root,
            "src/main.ts",
            "import w from './widget';\nimport s from './store';\nimport t from './types';\n",
        );
        let targets: Vec<String> = edges.iter().map(|e| e.to_path.to_string()).collect();
        assert_eq!(
            targets,
            ["src/widget.tsx", "src/store/index.tsx", "src/types.d.ts"]
        );
    }

    #[test]
    fn directory_alone_is_not_a_match() {
        let root = TempDir::new().unwrap();
        touch(&root, "src/api/index.ts");
        let edges = extract_in(&root, "src/main.ts", "import api from './api';");
        assert_eq!(edges[0].to_path, EdgeTarget::Path("src/api/index.ts".into()));
    }

    #[test]
    fn explicit_extension_is_kept() {
        let root = TempDir::new().unwrap();
        let edges = extract_in(&root, "index.ts", "import a from './a.ts';");
        assert_eq!(edges[0].to_path, EdgeTarget::Path("a.ts".into()));
    }

    #[test]
    fn absolute_import_emits_no_edge() {
        let root = TempDir::new().unwrap();
        let edges = extract_in(&root, "src/main.ts", "import x from '/opt/lib/x';");
        assert!(edges.is_empty());
    }

    #[test]
    fn repeated_imports_are_not_deduplicated() {
        let root = TempDir::new().unwrap();
        let edges = extract_in(
            &root,
            "src/main.ts",
            "import a from 'lodash';\nimport b from 'lodash';\n",
        );
        assert_eq!(edges.len(), 2);
        assert_eq!(edges[0].to_path, edges[1].to_path);
    }
}
