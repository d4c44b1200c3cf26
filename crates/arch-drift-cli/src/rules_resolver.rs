//! Locating the rules file for a `check` run.
//!
//! An explicit `--rules` path always wins. Otherwise the first regular file
//! among [`PROJECT_RULES_NAMES`] in the analyzed directory is used, then
//! `rules.toml` in the user rules directory. With none of these the run
//! proceeds with an empty rule set.

use anyhow::{Context, Result};
use arch_drift_core::RuleSet;
use std::path::{Path, PathBuf};

/// Rules file names looked up in the analyzed directory, in order.
pub const PROJECT_RULES_NAMES: &[&str] = &["arch-drift.toml", ".arch-drift.toml", "arch-drift.json"];

/// Overrides the user rules directory (default `~/.arch-drift`).
const USER_DIR_ENV: &str = "ARCH_DRIFT_CONFIG_DIR";

/// Where the rules for a run come from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RulesSource {
    /// Given with `--rules`; not checked until loaded.
    Explicit(PathBuf),
    /// Found next to the analyzed code.
    Project(PathBuf),
    /// Found in the user rules directory.
    User(PathBuf),
    /// Nothing found.
    Empty,
}

impl RulesSource {
    /// The rules file, unless the source is [`RulesSource::Empty`].
    #[must_use]
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Explicit(p) | Self::Project(p) | Self::User(p) => Some(p),
            Self::Empty => None,
        }
    }

    /// Reads and parses the rule set.
    pub fn load(&self) -> Result<RuleSet> {
        let Some(path) = self.path() else {
            tracing::warn!("No rules file found; every file will be classified as unknown");
            return Ok(RuleSet::default());
        };
        if matches!(self, Self::User(_)) {
            tracing::info!("Using user rules: {}", path.display());
        }
        RuleSet::from_file(path).with_context(|| format!("Failed to load {}", path.display()))
    }
}

/// Looks up rules files for a project.
#[derive(Debug, Clone, Default)]
pub struct RulesLocator {
    user_dir: Option<PathBuf>,
}

impl RulesLocator {
    /// Locator using `$ARCH_DRIFT_CONFIG_DIR`, or `~/.arch-drift` when unset.
    #[must_use]
    pub fn from_env() -> Self {
        Self::with_user_dir(
            std::env::var_os(USER_DIR_ENV)
                .map(PathBuf::from)
                .or_else(|| home::home_dir().map(|h| h.join(".arch-drift"))),
        )
    }

    /// Locator with a fixed user rules directory.
    #[must_use]
    pub fn with_user_dir(user_dir: Option<PathBuf>) -> Self {
        Self { user_dir }
    }

    /// Picks the rules source for `project`.
    #[must_use]
    pub fn locate(&self, project: &Path, explicit: Option<&Path>) -> RulesSource {
        if let Some(path) = explicit {
            return RulesSource::Explicit(path.to_path_buf());
        }

        let in_project = PROJECT_RULES_NAMES
            .iter()
            .map(|name| project.join(name))
            .find(|p| p.is_file())
            .map(RulesSource::Project);
        let in_user_dir = || {
            self.user_dir
                .as_ref()
                .map(|dir| dir.join("rules.toml"))
                .filter(|p| p.is_file())
                .map(RulesSource::User)
        };

        let source = in_project.or_else(in_user_dir).unwrap_or(RulesSource::Empty);
        tracing::debug!("Rules source for {}: {source:?}", project.display());
        source
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn locate(project: &Path, user_dir: Option<&Path>) -> RulesSource {
        RulesLocator::with_user_dir(user_dir.map(Path::to_path_buf)).locate(project, None)
    }

    #[test]
    fn explicit_path_wins_even_if_missing() {
        let project = TempDir::new().unwrap();
        fs::write(project.path().join("arch-drift.toml"), "").unwrap();
        let explicit = project.path().join("elsewhere.json");

        let source = RulesLocator::default().locate(project.path(), Some(&explicit));
        assert_eq!(source, RulesSource::Explicit(explicit));
    }

    #[test]
    fn project_names_checked_in_order() {
        let project = TempDir::new().unwrap();
        let root = project.path();

        fs::write(root.join("arch-drift.json"), "{}").unwrap();
        assert_eq!(locate(root, None), RulesSource::Project(root.join("arch-drift.json")));

        fs::write(root.join(".arch-drift.toml"), "").unwrap();
        assert_eq!(locate(root, None), RulesSource::Project(root.join(".arch-drift.toml")));

        fs::write(root.join("arch-drift.toml"), "").unwrap();
        assert_eq!(locate(root, None), RulesSource::Project(root.join("arch-drift.toml")));
    }

    #[test]
    fn directory_named_like_rules_file_is_skipped() {
        let project = TempDir::new().unwrap();
        fs::create_dir(project.path().join("arch-drift.toml")).unwrap();
        assert_eq!(locate(project.path(), None), RulesSource::Empty);
    }

    #[test]
    fn user_dir_used_when_project_has_none() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(user.path().join("rules.toml"), "").unwrap();

        assert_eq!(
            locate(project.path(), Some(user.path())),
            RulesSource::User(user.path().join("rules.toml"))
        );
    }

    #[test]
    fn project_rules_shadow_user_rules() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        fs::write(project.path().join("arch-drift.toml"), "").unwrap();
        fs::write(user.path().join("rules.toml"), "").unwrap();

        assert!(matches!(
            locate(project.path(), Some(user.path())),
            RulesSource::Project(_)
        ));
    }

    #[test]
    fn nothing_found_is_empty() {
        let project = TempDir::new().unwrap();
        let user = TempDir::new().unwrap();
        let source = locate(project.path(), Some(user.path()));
        assert_eq!(source, RulesSource::Empty);
        assert!(source.path().is_none());
        assert_eq!(source.load().unwrap(), RuleSet::default());
    }

    #[test]
    fn load_reports_bad_rules_file() {
        let project = TempDir::new().unwrap();
        let path = project.path().join("arch-drift.toml");
        fs::write(&path, "[[layers]]\nname = 1\n").unwrap();
        let err = RulesSource::Project(path).load().unwrap_err();
        assert!(format!("{err:#}").contains("invalid rules"));
    }
}
