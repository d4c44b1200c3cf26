//! Lenient source file reading.

use std::path::Path;

use crate::types::{FileDiagnostic, Stage};

/// Reads a root-relative file, replacing invalid UTF-8 sequences.
///
/// # Errors
///
/// Returns a [`FileDiagnostic`] tagged with `stage` if the file cannot be read.
pub fn read_source(root: &Path, relative: &str, stage: Stage) -> Result<String, FileDiagnostic> {
    std::fs::read(root.join(relative))
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .map_err(|e| FileDiagnostic::warn(relative, stage, e.to_string()))
}
