//! Node collection: file discovery and layer classification.

use std::path::Path;

use crate::extractor::ExtractorBox;
use crate::layer::LayerResolver;
use crate::types::{FileDiagnostic, Node, Stage};
use crate::utils::paths::{module_name, to_relative_string};

/// Nodes discovered under a root, plus files that could not be enumerated.
#[derive(Debug, Default)]
pub struct Collection {
    /// One node per claimed file, grouped by extractor in registry order.
    pub nodes: Vec<Node>,
    /// Walk errors.
    pub diagnostics: Vec<FileDiagnostic>,
}

/// Walks `root` and classifies every file some extractor claims.
///
/// Hidden files and directories are skipped; ignore files are not honoured.
/// A file claimed by several extractors belongs to the first one registered.
#[must_use]
pub fn collect_nodes(
    root: &Path,
    resolver: &LayerResolver<'_>,
    extractors: &[ExtractorBox],
) -> Collection {
    let mut groups: Vec<Vec<Node>> = vec![Vec::new(); extractors.len()];
    let mut diagnostics = Vec::new();

    let mut builder = ignore::WalkBuilder::new(root);
    builder.standard_filters(false).hidden(true).follow_links(false);

    for entry in builder.build() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                diagnostics.push(walk_diagnostic(root, &e));
                continue;
            }
        };
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        let Some(file_name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        let claim = extractors
            .iter()
            .enumerate()
            .find_map(|(i, e)| e.claimed_extension(file_name).map(|ext| (i, ext)));
        let Some((index, extension)) = claim else {
            continue;
        };

        let rel = to_relative_string(path.strip_prefix(root).unwrap_or(path));
        groups[index].push(Node {
            module_name: module_name(&rel, extension),
            layer: resolver.resolve(&rel).to_string(),
            lang: extractors[index].language_id().to_string(),
            path: rel,
        });
    }

    for group in &mut groups {
        group.sort_by(|a, b| a.path.cmp(&b.path));
    }
    let nodes: Vec<Node> = groups.into_iter().flatten().collect();

    tracing::info!("Collected {} source files under {}", nodes.len(), root.display());

    Collection { nodes, diagnostics }
}

/// Records a walk error against the entry that failed, or the root when
/// the error carries no path.
fn walk_diagnostic(root: &Path, err: &ignore::Error) -> FileDiagnostic {
    let path = failed_path(err).map_or_else(
        || root.display().to_string(),
        |p| to_relative_string(p.strip_prefix(root).unwrap_or(p)),
    );
    FileDiagnostic::warn(path, Stage::Collect, err.to_string())
}

fn failed_path(err: &ignore::Error) -> Option<&Path> {
    match err {
        ignore::Error::WithPath { path, .. } => Some(path),
        ignore::Error::Loop { child, .. } => Some(child),
        ignore::Error::WithDepth { err, .. } | ignore::Error::WithLineNumber { err, .. } => {
            failed_path(err)
        }
        ignore::Error::Partial(errs) => errs.iter().find_map(failed_path),
        _ => None,
    }
}
