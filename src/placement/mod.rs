//! Idempotent placement of rendered annotation blocks.
//!
//! A block goes right after the insertion point when one is known and
//! nothing carrying a signature sits within `nearby_window` lines of it.
//! Without an insertion point it is appended to the end of the file unless
//! the last `tail_window` lines already carry a signature. Files that are
//! not UTF-8 text get the block appended to their raw bytes.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::Path;

use crate::error::AnnotateError;
use crate::formatting::comment::SIGNATURES;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementOptions {
    pub nearby_window: usize,
    pub tail_window: usize,
    pub dry_run: bool,
}

impl Default for PlacementOptions {
    fn default() -> Self {
        Self { nearby_window: 10, tail_window: 50, dry_run: false }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlacementOutcome {
    /// Block spliced in after this 1-based line.
    Inserted { after_line: usize },
    /// Block appended to the end of a text file.
    Appended,
    /// Block appended to the raw bytes of a non-text file.
    AppendedRaw,
    /// A signature was found nearby; the file was left alone.
    AlreadyAnnotated,
    /// Nothing written; `after_line` is where the block would have gone
    /// (`None` for end of file).
    DryRun { after_line: Option<usize> },
}

/// Planned change to a text file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextEdit {
    Rewrite { content: String, after_line: usize },
    Append(String),
    Unchanged,
}

pub fn has_signature<S: AsRef<str>>(lines: &[S]) -> bool {
    lines
        .iter()
        .any(|l| SIGNATURES.iter().any(|sig| l.as_ref().contains(sig)))
}

/// Lines of `content` with their terminators kept.
fn split_lines(content: &str) -> Vec<&str> {
    content.split_inclusive('\n').collect()
}

/// Terminator of the line at `idx`, or of the one before it when `idx` is
/// past the end. `\r\n` only when that line uses it.
fn line_ending(lines: &[&str], idx: usize) -> &'static str {
    match lines.get(idx).or_else(|| lines.last()) {
        Some(line) if line.ends_with("\r\n") => "\r\n",
        _ => "\n",
    }
}

/// `block` with every line terminated by `eol`.
fn terminate_with<'a>(block: &'a [String], eol: &'a str) -> impl Iterator<Item = String> + 'a {
    block.iter().map(move |l| format!("{}{eol}", l.trim_end_matches(['\r', '\n'])))
}

/// Splices `block` plus one blank separator line after 1-based line
/// `after_line` (clamped to the file length). A final line lacking a
/// newline gets one so the block starts on its own line. The block takes
/// the line ending of the line it follows.
pub fn insert_after_line(lines: &[&str], block: &[String], after_line: usize) -> String {
    let idx = after_line.min(lines.len());
    let eol = line_ending(lines, idx.saturating_sub(1));
    let mut out = String::with_capacity(
        lines.iter().map(|l| l.len()).sum::<usize>() + block.iter().map(|l| l.len() + 1).sum::<usize>() + 4,
    );
    for line in &lines[..idx] {
        out.push_str(line);
    }
    if !out.is_empty() && !out.ends_with('\n') {
        out.push_str(eol);
    }
    terminate_with(block, eol).for_each(|l| out.push_str(&l));
    out.push_str(eol);
    for line in &lines[idx..] {
        out.push_str(line);
    }
    out
}

/// Decides what to do with a text file, without touching the disk.
pub fn plan_text_edit(
    content: &str,
    insertion_point: Option<usize>,
    block: &[String],
    opts: &PlacementOptions,
) -> TextEdit {
    let lines = split_lines(content);
    match insertion_point {
        None => {
            let tail = &lines[lines.len().saturating_sub(opts.tail_window)..];
            if has_signature(tail) {
                return TextEdit::Unchanged;
            }
            let eol = line_ending(&lines, lines.len());
            let mut appended = String::from(eol);
            if !content.is_empty() && !content.ends_with('\n') {
                appended.push_str(eol);
            }
            terminate_with(block, eol).for_each(|l| appended.push_str(&l));
            appended.push_str(eol);
            TextEdit::Append(appended)
        }
        Some(point) => {
            // A point past EOF lands at EOF, so the guard must look there too
            let point = point.min(lines.len());
            let end = point.saturating_add(opts.nearby_window).min(lines.len());
            let start = point.saturating_sub(opts.nearby_window);
            if has_signature(&lines[start..end]) {
                return TextEdit::Unchanged;
            }
            TextEdit::Rewrite {
                content: insert_after_line(&lines, block, point),
                after_line: point,
            }
        }
    }
}

/// The bytes as text, or `None` for binary content (NUL bytes or invalid UTF-8).
fn decode_text(bytes: &[u8]) -> Option<&str> {
    if bytes.contains(&0) {
        return None;
    }
    std::str::from_utf8(bytes).ok()
}

fn append_bytes(path: &Path, bytes: &[u8]) -> Result<(), AnnotateError> {
    let mut file = OpenOptions::new()
        .append(true)
        .open(path)
        .map_err(|e| AnnotateError::io(path, e))?;
    file.write_all(bytes).map_err(|e| AnnotateError::io(path, e))
}

/// Places `block` into the file at `path`. Performs at most one write.
pub fn place(
    path: &Path,
    insertion_point: Option<usize>,
    block: &[String],
    opts: &PlacementOptions,
) -> Result<PlacementOutcome, AnnotateError> {
    let raw_block = block.concat();
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "unreadable file, appending raw");
            if opts.dry_run {
                return Ok(PlacementOutcome::DryRun { after_line: None });
            }
            append_bytes(path, raw_block.as_bytes())?;
            return Ok(PlacementOutcome::AppendedRaw);
        }
    };

    let Some(content) = decode_text(&bytes) else {
        tracing::debug!(path = %path.display(), "not UTF-8 text, appending raw");
        let lossy = String::from_utf8_lossy(&bytes);
        let lines = split_lines(&lossy);
        if has_signature(&lines[lines.len().saturating_sub(opts.tail_window)..]) {
            return Ok(PlacementOutcome::AlreadyAnnotated);
        }
        if opts.dry_run {
            return Ok(PlacementOutcome::DryRun { after_line: None });
        }
        append_bytes(path, raw_block.as_bytes())?;
        return Ok(PlacementOutcome::AppendedRaw);
    };

    match plan_text_edit(content, insertion_point, block, opts) {
        TextEdit::Unchanged => Ok(PlacementOutcome::AlreadyAnnotated),
        TextEdit::Append(_) if opts.dry_run => Ok(PlacementOutcome::DryRun { after_line: None }),
        TextEdit::Rewrite { after_line, .. } if opts.dry_run => {
            Ok(PlacementOutcome::DryRun { after_line: Some(after_line) })
        }
        TextEdit::Append(text) => {
            append_bytes(path, text.as_bytes())?;
            Ok(PlacementOutcome::Appended)
        }
        TextEdit::Rewrite { content, after_line } => {
            std::fs::write(path, content).map_err(|e| AnnotateError::io(path, e))?;
            Ok(PlacementOutcome::Inserted { after_line })
        }
    }
}
