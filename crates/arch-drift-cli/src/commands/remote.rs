//! Remote command: clone a repository at a ref and analyze it.
//!
//! The request is the JSON document a scan scheduler sends:
//!
//! ```json
//! {
//!   "git": { "repo_url": "https://github.com/acme/shop.git", "ref": "main", "token": null },
//!   "rules": { "layers": [], "forbidden_dependencies": [] },
//!   "mode": "full"
//! }
//! ```

use anyhow::{Context, Result};
use arch_drift_core::{analyze_repo, AnalyzerError, Report, RuleSet};
use serde::Deserialize;
use std::path::Path;
use std::process::Command;
use tempfile::TempDir;
use thiserror::Error;

use crate::OutputFormat;

/// The only analysis mode currently supported.
const FULL_MODE: &str = "full";

/// Repository location and credentials.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitSpec {
    /// Clone URL.
    pub repo_url: String,
    /// Branch, tag, or commit to check out.
    #[serde(rename = "ref")]
    pub git_ref: String,
    /// Access token for private `https://` repositories.
    #[serde(default)]
    pub token: Option<String>,
}

/// A remote analysis request.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnalyzeRequest {
    /// Repository to analyze.
    pub git: GitSpec,
    /// Rules to analyze against.
    #[serde(default)]
    pub rules: RuleSet,
    /// Analysis mode.
    #[serde(default = "default_mode")]
    pub mode: String,
}

fn default_mode() -> String {
    FULL_MODE.to_string()
}

/// Errors from the remote flow.
#[derive(Debug, Error)]
pub enum RemoteError {
    /// A git step failed; the repository could not be materialized.
    #[error("git {step} failed: {stderr}")]
    Git {
        /// Which git step failed.
        step: &'static str,
        /// Captured stderr, with any token redacted.
        stderr: String,
    },

    /// The request is malformed or carries an unsafe value.
    #[error("invalid analyze request: {0}")]
    InvalidRequest(String),

    /// The request asked for a mode other than `full`.
    #[error("unsupported analysis mode '{0}' (only 'full' is supported)")]
    UnsupportedMode(String),

    /// The analysis itself could not start.
    #[error("analysis failed: {0}")]
    Analysis(#[from] AnalyzerError),

    /// IO error preparing the working directory.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AnalyzeRequest {
    /// Parses a request from JSON.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidRequest`] if the JSON does not describe
    /// a request or a git value is unsafe to pass to git.
    pub fn parse_json(content: &str) -> Result<Self, RemoteError> {
        let request: Self = serde_json::from_str(content)
            .map_err(|e| RemoteError::InvalidRequest(e.to_string()))?;
        request.validate()?;
        Ok(request)
    }

    /// Rejects empty git values and values git would read as an option.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidRequest`] naming the offending field.
    pub fn validate(&self) -> Result<(), RemoteError> {
        for (field, value) in [("git.repo_url", &self.git.repo_url), ("git.ref", &self.git.git_ref)] {
            if value.trim().is_empty() {
                return Err(RemoteError::InvalidRequest(format!("{field} is empty")));
            }
            if value.starts_with('-') {
                return Err(RemoteError::InvalidRequest(format!(
                    "{field} must not start with '-'"
                )));
            }
        }
        Ok(())
    }

    /// Clone URL with the token embedded, for `https://` URLs only.
    #[must_use]
    pub fn clone_url(&self) -> String {
        match (&self.git.token, self.git.repo_url.strip_prefix("https://")) {
            (Some(token), Some(rest)) if !token.is_empty() => format!("https://{token}@{rest}"),
            (Some(_), None) => {
                tracing::warn!("Token ignored for non-https URL {}", self.git.repo_url);
                self.git.repo_url.clone()
            }
            _ => self.git.repo_url.clone(),
        }
    }

    /// Removes the token from text that may echo the clone URL.
    fn redact(&self, text: &str) -> String {
        match &self.git.token {
            Some(token) if !token.is_empty() => text.replace(token.as_str(), "***"),
            _ => text.to_string(),
        }
    }

    /// Materializes the repository in a temporary directory and analyzes it.
    ///
    /// The directory is removed when this returns, success or failure.
    ///
    /// # Errors
    ///
    /// Returns [`RemoteError::InvalidRequest`] for unsafe git values,
    /// [`RemoteError::Git`] if cloning or checkout fails, and
    /// [`RemoteError::Analysis`] if the rules are invalid.
    pub fn execute(&self) -> Result<Report, RemoteError> {
        self.validate()?;
        if self.mode != FULL_MODE {
            return Err(RemoteError::UnsupportedMode(self.mode.clone()));
        }

        let workdir = TempDir::new()?;
        let checkout = workdir.path().join("repo");
        tracing::info!("Cloning {} at {}", self.git.repo_url, self.git.git_ref);

        let clone_url = self.clone_url();
        let checkout_arg = checkout.to_string_lossy().into_owned();
        self.run_git(
            "clone",
            None,
            &["clone", "--depth", "1", "--", clone_url.as_str(), checkout_arg.as_str()],
        )?;
        self.checkout_ref(&checkout)?;

        Ok(analyze_repo(checkout, &self.rules)?)
    }

    /// Checks out the requested ref, fetching it first if the shallow
    /// clone does not contain it.
    fn checkout_ref(&self, repo: &Path) -> Result<(), RemoteError> {
        let git_ref = self.git.git_ref.as_str();
        if self
            .run_git("checkout", Some(repo), &["checkout", "--end-of-options", git_ref])
            .is_ok()
        {
            return Ok(());
        }
        tracing::debug!("{git_ref} not in shallow clone, fetching");
        self.run_git(
            "fetch",
            Some(repo),
            &["fetch", "--depth", "1", "--end-of-options", "origin", git_ref],
        )?;
        self.run_git("checkout", Some(repo), &["checkout", "FETCH_HEAD"])
    }

    fn run_git(&self, step: &'static str, cwd: Option<&Path>, args: &[&str]) -> Result<(), RemoteError> {
        let mut cmd = Command::new("git");
        cmd.args(args).env("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = cwd {
            cmd.current_dir(dir);
        }
        let output = cmd.output().map_err(|e| RemoteError::Git {
            step,
            stderr: e.to_string(),
        })?;
        if output.status.success() {
            return Ok(());
        }
        Err(RemoteError::Git {
            step,
            stderr: self.redact(String::from_utf8_lossy(&output.stderr).trim()),
        })
    }
}

/// Runs the remote command.
pub fn run(request_path: &Path, format: OutputFormat) -> Result<()> {
    let content = std::fs::read_to_string(request_path)
        .with_context(|| format!("Failed to read {}", request_path.display()))?;
    let request = AnalyzeRequest::parse_json(&content)
        .with_context(|| format!("Rejected {}", request_path.display()))?;

    let report = request.execute()?;
    super::output::print(&report, format)
}
