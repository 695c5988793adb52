use once_cell::sync::Lazy;
use regex::Regex;

// Compiled once; a compile failure means "no headers", never a panic.
// Anchored so that changed content containing "@@ -a +b @@" is not a header.
static HUNK_HEADER_RE: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"(?m)^@@ -(\d+)(?:,(\d+))? \+(\d+)(?:,(\d+))? @@"));

/// Coordinates of one `@@ -a,b +c,d @@` header. Omitted counts are 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hunk {
    pub old_start: usize,
    pub old_count: usize,
    pub new_start: usize,
    pub new_count: usize,
}

impl Hunk {
    pub fn is_deletion_only(&self) -> bool {
        self.new_count == 0
    }

    /// 1-based line of the current file after which an annotation belongs.
    pub fn insertion_point(&self) -> usize {
        if self.is_deletion_only() {
            self.new_start.max(1)
        } else {
            self.new_start.saturating_add(self.new_count).saturating_sub(1)
        }
    }
}

fn parse_count(m: Option<regex::Match<'_>>) -> Option<usize> {
    match m {
        Some(m) => m.as_str().parse().ok(),
        None => Some(1),
    }
}

/// All well-formed hunk headers in diff order. Headers whose numbers do not
/// fit in `usize` are dropped.
pub fn parse_hunks(diff: &str) -> Vec<Hunk> {
    let Ok(re) = HUNK_HEADER_RE.as_ref() else {
        return Vec::new();
    };
    re.captures_iter(diff)
        .filter_map(|caps| {
            Some(Hunk {
                old_start: caps[1].parse().ok()?,
                old_count: parse_count(caps.get(2))?,
                new_start: caps[3].parse().ok()?,
                new_count: parse_count(caps.get(4))?,
            })
        })
        .collect()
}

/// Insertion point derived from the last hunk of `diff`, or `None` when the
/// diff carries no recognisable header.
pub fn last_insertion_point(diff: &str) -> Option<usize> {
    parse_hunks(diff).last().map(Hunk::insertion_point)
}

/// Added/removed line counts of a unified diff, file headers excluded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub added: usize,
    pub removed: usize,
}

impl DiffStats {
    pub fn from_diff(diff: &str) -> Self {
        diff.lines().fold(Self::default(), |mut acc, line| {
            if line.starts_with('+') && !line.starts_with("+++") {
                acc.added += 1;
            } else if line.starts_with('-') && !line.starts_with("---") {
                acc.removed += 1;
            }
            acc
        })
    }
}
