use anyhow::{Context, Result};
use std::io::{self, Read};

use post_edit_annotator::driver::{self, HookPayload};
use post_edit_annotator::{config, logging, GitCli, RunSummary};

/// Post-edit hook: annotate every changed file named in the stdin payload
fn main() -> Result<()> {
    logging::init();

    // Read hook input from stdin; invalid UTF-8 is replaced, not rejected
    let mut buffer = Vec::new();
    io::stdin().read_to_end(&mut buffer).context("Failed to read stdin")?;
    let payload = HookPayload::parse(&String::from_utf8_lossy(&buffer));

    let cfg = config::load_config();
    let git = match payload.cwd() {
        Some(dir) => GitCli::in_dir(dir),
        None => GitCli::new(),
    };

    let reports = driver::run(&payload, &cfg, &git);
    let summary = RunSummary::from_reports(&reports);
    match serde_json::to_string(&summary) {
        Ok(json) => tracing::info!(files = reports.len(), summary = %json, "post-edit annotation finished"),
        Err(e) => tracing::warn!(error = %e, "could not serialize run summary"),
    }

    // Never block the edit workflow: per-file failures were already logged
    Ok(())
}
