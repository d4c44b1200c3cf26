//! Path utilities over `/`-separated, root-relative path strings.

use std::path::Path;

/// Replaces `\` with `/`.
#[must_use]
pub fn normalize_separators(path: &str) -> String {
    path.replace('\\', "/")
}

/// Converts a relative filesystem path into the canonical string form.
#[must_use]
pub fn to_relative_string(path: &Path) -> String {
    normalize_separators(&path.to_string_lossy())
}

/// Lexically normalizes a `/`-separated path.
///
/// Collapses `.` and empty segments and resolves `..` against preceding
/// segments. Leading `..` segments that escape the root are kept.
///
/// # Examples
///
/// ```
/// use arch_drift_core::utils::normalize_path;
///
/// assert_eq!(normalize_path("frontend/components/../services/api"), "frontend/services/api");
/// assert_eq!(normalize_path("./a//b/."), "a/b");
/// assert_eq!(normalize_path("../shared/x"), "../shared/x");
/// ```
#[must_use]
pub fn normalize_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if parts.last().is_some_and(|last| *last != "..") {
                    parts.pop();
                } else {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// Returns the directory part of a relative path (`""` for top-level files).
#[must_use]
pub fn parent_dir(path: &str) -> &str {
    path.rsplit_once('/').map_or("", |(dir, _)| dir)
}

/// Derives a dotted module name: strips `extension`, then replaces `/` with `.`.
///
/// # Examples
///
/// ```
/// use arch_drift_core::utils::module_name;
///
/// assert_eq!(module_name("app/models/user.rb", ".rb"), "app.models.user");
/// ```
#[must_use]
pub fn module_name(path: &str, extension: &str) -> String {
    let stem = path.strip_suffix(extension).unwrap_or(path);
    stem.replace('/', ".")
}
