//! Post-edit hook utilities: diff lookup, hunk location, heuristic
//! classification, comment rendering and idempotent placement.

use serde::Serialize;

/// Diff parsing and change classification
pub mod analysis;

/// Comment syntax per file type and the annotation block
pub mod formatting;

/// Git-backed diff retrieval
pub mod vcs;

/// Insert-or-append of annotation blocks
pub mod placement;

/// Payload handling and the per-file pipeline
pub mod driver;

pub mod config;
pub mod error;
pub mod logging;

pub use analysis::classifier::{classify, Classification, Reason};
pub use analysis::hunk::{last_insertion_point, parse_hunks, DiffStats, Hunk};
pub use config::{load_config, AnnotatorConfig};
pub use driver::{run, FileOutcome, FileReport, HookPayload};
pub use error::AnnotateError;
pub use formatting::comment::{render, AnnotationBlock, CommentStyle};
pub use placement::{place, PlacementOptions, PlacementOutcome};
pub use vcs::{DiffProvider, GitCli};

/// Run totals logged by the binary.
#[derive(Debug, Default, Serialize, PartialEq, Eq)]
pub struct RunSummary {
    pub inserted: usize,
    pub appended: usize,
    pub unchanged: usize,
    pub skipped: usize,
    pub failed: usize,
}

impl RunSummary {
    pub fn from_reports(reports: &[FileReport]) -> Self {
        let mut s = Self::default();
        for r in reports {
            match &r.outcome {
                FileOutcome::Placed(PlacementOutcome::Inserted { .. }) => s.inserted += 1,
                FileOutcome::Placed(PlacementOutcome::Appended | PlacementOutcome::AppendedRaw) => s.appended += 1,
                FileOutcome::Placed(PlacementOutcome::AlreadyAnnotated | PlacementOutcome::DryRun { .. }) => {
                    s.unchanged += 1
                }
                FileOutcome::Skipped | FileOutcome::Ignored => s.skipped += 1,
                FileOutcome::Failed(_) => s.failed += 1,
            }
        }
        s
    }
}
