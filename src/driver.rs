use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::{DateTime, Local};
use serde::Deserialize;
use serde_json::Value;

use crate::analysis::classifier;
use crate::analysis::hunk::{self, DiffStats};
use crate::config::{self, AnnotatorConfig};
use crate::formatting::comment::AnnotationBlock;
use crate::placement::{self, PlacementOutcome};
use crate::vcs::DiffProvider;

/// Hook payload read from stdin. Every field is optional and loosely typed
/// so that odd shapes degrade to "no files" instead of a parse failure.
#[derive(Debug, Default, Deserialize)]
pub struct HookPayload {
    #[serde(default)]
    pub files: Option<Value>,
    #[serde(default)]
    pub modified_files: Option<Value>,
    #[serde(default)]
    pub file: Option<Value>,
    #[serde(default)]
    pub filepath: Option<Value>,
    #[serde(default)]
    pub path: Option<Value>,
    #[serde(default)]
    pub cwd: Option<Value>,
    #[serde(default)]
    pub tool_input: Option<Value>,
}

impl HookPayload {
    /// Malformed or non-object input yields an empty payload.
    pub fn parse(input: &str) -> Self {
        match serde_json::from_str(input) {
            Ok(p) => p,
            Err(e) => {
                if !input.trim().is_empty() {
                    tracing::debug!(error = %e, "payload not understood, treating as empty");
                }
                Self::default()
            }
        }
    }

    pub fn cwd(&self) -> Option<&str> {
        self.cwd.as_ref().and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// File list from the first recognised key holding a non-empty string
    /// or list: `files`, `modified_files`, `file`, `filepath`, `path`, then
    /// `tool_input.file_path`.
    pub fn files(&self) -> Vec<String> {
        let host = self.tool_input.as_ref().and_then(|t| t.get("file_path"));
        [
            self.files.as_ref(),
            self.modified_files.as_ref(),
            self.file.as_ref(),
            self.filepath.as_ref(),
            self.path.as_ref(),
            host,
        ]
        .into_iter()
        .flatten()
        .map(file_list)
        .find(|list| !list.is_empty())
        .unwrap_or_default()
    }
}

fn file_list(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(Value::as_str)
            .filter(|s| !s.trim().is_empty())
            .map(str::to_string)
            .collect(),
        _ => Vec::new(),
    }
}

/// Payload files, or every modified path the provider knows of when the
/// payload names none.
pub fn resolve_files(payload: &HookPayload, provider: &dyn DiffProvider) -> Vec<String> {
    let files = payload.files();
    if !files.is_empty() {
        return files;
    }
    let discovered: Vec<String> = provider.modified_files().into_iter().collect();
    tracing::debug!(count = discovered.len(), "payload empty, using modified files");
    discovered
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileOutcome {
    Placed(PlacementOutcome),
    /// Missing, or a directory.
    Skipped,
    /// Matched an ignore glob.
    Ignored,
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub path: PathBuf,
    pub outcome: FileOutcome,
    pub stats: DiffStats,
}

fn resolve_path(base: Option<&Path>, file: &str) -> PathBuf {
    let p = PathBuf::from(file);
    match base {
        Some(base) if p.is_relative() => base.join(p),
        _ => p,
    }
}

fn annotate_file(
    path: &Path,
    cfg: &AnnotatorConfig,
    provider: &dyn DiffProvider,
    now: DateTime<Local>,
) -> Result<(PlacementOutcome, DiffStats)> {
    let diff = provider.diff(path);
    let stats = DiffStats::from_diff(&diff);
    let point = hunk::last_insertion_point(&diff);
    let classification = classifier::classify(&diff, cfg.keyword_limit);
    tracing::debug!(
        path = %path.display(),
        added = stats.added,
        removed = stats.removed,
        ?point,
        reason = %classification.reason,
        "classified"
    );

    let ext = path.extension().map(|e| e.to_string_lossy()).unwrap_or_default();
    let block = AnnotationBlock::new(&classification, now).render_for(&ext);
    let outcome = placement::place(path, point, &block, &cfg.placement())
        .with_context(|| format!("placing annotation in {}", path.display()))?;
    Ok((outcome, stats))
}

pub fn run(payload: &HookPayload, cfg: &AnnotatorConfig, provider: &dyn DiffProvider) -> Vec<FileReport> {
    run_at(payload, cfg, provider, Local::now())
}

/// Annotates every resolved file, in order, stamping blocks with `now`.
/// A failure on one file is recorded in its report and never stops the rest.
pub fn run_at(
    payload: &HookPayload,
    cfg: &AnnotatorConfig,
    provider: &dyn DiffProvider,
    now: DateTime<Local>,
) -> Vec<FileReport> {
    let base = payload.cwd().map(Path::new);
    resolve_files(payload, provider)
        .into_iter()
        .map(|file| {
            let path = resolve_path(base, &file);
            if config::should_ignore_path(cfg, &file) {
                return FileReport { path, outcome: FileOutcome::Ignored, stats: DiffStats::default() };
            }
            if !path.exists() || path.is_dir() {
                tracing::debug!(path = %path.display(), "skipping missing file or directory");
                return FileReport { path, outcome: FileOutcome::Skipped, stats: DiffStats::default() };
            }
            match annotate_file(&path, cfg, provider, now) {
                Ok((outcome, stats)) => {
                    tracing::info!(path = %path.display(), ?outcome, "annotated");
                    FileReport { path, outcome: FileOutcome::Placed(outcome), stats }
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %format!("{e:#}"), "annotation failed");
                    FileReport { path, outcome: FileOutcome::Failed(format!("{e:#}")), stats: DiffStats::default() }
                }
            }
        })
        .collect()
}
