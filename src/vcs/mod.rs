use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::error::AnnotateError;

/// Source of unified diffs and modified-file listings.
///
/// Implementations must never fail the caller: an unavailable diff is an
/// empty string and an unavailable listing is an empty set.
pub trait DiffProvider {
    /// Zero-context diff for `path` against the most meaningful baseline.
    fn diff(&self, path: &Path) -> String;

    /// Union of every path reported as modified in the working tree or
    /// index. Paths must resolve from the caller's working directory, so
    /// repository-relative names are returned joined to the repository root.
    fn modified_files(&self) -> BTreeSet<String>;
}

/// Baselines tried, in order, when asking git for a diff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffStrategy {
    /// Working tree against the last commit.
    WorktreeVsHead,
    /// Staged index against the last commit.
    IndexVsHead,
    /// Working tree against the index.
    WorktreeVsIndex,
}

impl DiffStrategy {
    pub const ORDER: [DiffStrategy; 3] = [
        DiffStrategy::WorktreeVsHead,
        DiffStrategy::IndexVsHead,
        DiffStrategy::WorktreeVsIndex,
    ];

    fn baseline_args(self) -> &'static [&'static str] {
        match self {
            DiffStrategy::WorktreeVsHead => &["HEAD"],
            DiffStrategy::IndexVsHead => &["--cached"],
            DiffStrategy::WorktreeVsIndex => &[],
        }
    }

    /// Arguments for a zero-context, colourless diff of a single path.
    pub fn diff_args(self, path: &Path) -> Vec<String> {
        let mut args = vec!["diff".to_string(), "-U0".to_string(), "--no-color".to_string()];
        args.extend(self.baseline_args().iter().map(|s| s.to_string()));
        args.push("--".to_string());
        args.push(path.to_string_lossy().into_owned());
        args
    }

    /// Arguments for the name-only listing used by file discovery.
    pub fn name_only_args(self) -> Vec<String> {
        let mut args = vec!["diff".to_string(), "--name-only".to_string()];
        args.extend(self.baseline_args().iter().map(|s| s.to_string()));
        args
    }
}

/// `DiffProvider` backed by the `git` executable.
#[derive(Debug, Clone, Default)]
pub struct GitCli {
    workdir: Option<PathBuf>,
}

impl GitCli {
    pub fn new() -> Self {
        Self::default()
    }

    /// Run every git invocation inside `dir` instead of the process cwd.
    pub fn in_dir(dir: impl Into<PathBuf>) -> Self {
        Self { workdir: Some(dir.into()) }
    }

    fn run(&self, args: &[String]) -> Result<String, AnnotateError> {
        let mut cmd = Command::new("git");
        cmd.args(args).stdin(Stdio::null());
        if let Some(dir) = &self.workdir {
            cmd.current_dir(dir);
        }
        let output = cmd.output().map_err(|e| AnnotateError::Git {
            args: args.join(" "),
            message: e.to_string(),
        })?;
        if !output.status.success() {
            return Err(AnnotateError::Git {
                args: args.join(" "),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Repository root; `--name-only` output is relative to it.
    fn toplevel(&self) -> Option<PathBuf> {
        match self.run(&["rev-parse".to_string(), "--show-toplevel".to_string()]) {
            Ok(out) => Some(PathBuf::from(out.trim())).filter(|p| !p.as_os_str().is_empty()),
            Err(e) => {
                tracing::debug!(error = %e, "repository root unavailable");
                None
            }
        }
    }
}

impl DiffProvider for GitCli {
    fn diff(&self, path: &Path) -> String {
        for strategy in DiffStrategy::ORDER {
            match self.run(&strategy.diff_args(path)) {
                Ok(out) if !out.trim().is_empty() => {
                    tracing::debug!(path = %path.display(), ?strategy, "diff found");
                    return out;
                }
                Ok(_) => {}
                Err(e) => tracing::debug!(path = %path.display(), ?strategy, error = %e, "diff attempt failed"),
            }
        }
        String::new()
    }

    fn modified_files(&self) -> BTreeSet<String> {
        let Some(root) = self.toplevel() else {
            return BTreeSet::new();
        };
        let mut names = BTreeSet::new();
        for strategy in DiffStrategy::ORDER {
            match self.run(&strategy.name_only_args()) {
                Ok(out) => names.extend(
                    out.lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(|l| root.join(l).to_string_lossy().into_owned()),
                ),
                Err(e) => tracing::debug!(?strategy, error = %e, "name-only listing failed"),
            }
        }
        names
    }
}
