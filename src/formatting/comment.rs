use std::path::Path;

use chrono::{DateTime, Local};

use crate::analysis::classifier::Classification;

pub const BANNER: &str = "=== 변경 주석 (자동 생성) ===";
pub const TIME_LABEL: &str = "시각:";
pub const REASON_LABEL: &str = "변경 이유:";
pub const KEYWORDS_LABEL: &str = "학습 키워드:";
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Markers whose presence means a block was already placed.
pub const SIGNATURES: [&str; 2] = [REASON_LABEL, BANNER];

/// How comments are written for a file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentStyle {
    /// Every line gets the prefix, e.g. `# `.
    Line(&'static str),
    /// The body is wrapped once between an open and a close marker.
    Block { open: &'static str, close: &'static str },
}

const HASH: CommentStyle = CommentStyle::Line("# ");
const SLASHES: CommentStyle = CommentStyle::Line("// ");
const HTML: CommentStyle = CommentStyle::Block { open: "<!--", close: "-->" };
const C_BLOCK: CommentStyle = CommentStyle::Block { open: "/*", close: "*/" };

const STYLES: &[(&str, CommentStyle)] = &[
    ("py", HASH),
    ("js", SLASHES),
    ("ts", SLASHES),
    ("tsx", SLASHES),
    ("jsx", SLASHES),
    ("java", SLASHES),
    ("go", SLASHES),
    ("rs", SLASHES),
    ("c", SLASHES),
    ("cpp", SLASHES),
    ("h", SLASHES),
    ("cs", SLASHES),
    ("php", SLASHES),
    ("rb", HASH),
    ("sh", HASH),
    ("yml", HASH),
    ("yaml", HASH),
    ("toml", HASH),
    ("md", HTML),
    ("html", HTML),
    ("css", C_BLOCK),
    ("scss", C_BLOCK),
];

/// Style for an extension given with or without the leading dot, matched
/// case-insensitively. Unknown extensions use `// `.
pub fn style_for_extension(ext: &str) -> CommentStyle {
    let ext = ext.trim_start_matches('.');
    STYLES
        .iter()
        .find(|(known, _)| known.eq_ignore_ascii_case(ext))
        .map(|(_, style)| *style)
        .unwrap_or(SLASHES)
}

pub fn style_for_path(path: &Path) -> CommentStyle {
    let ext = path.extension().map(|e| e.to_string_lossy()).unwrap_or_default();
    style_for_extension(&ext)
}

/// Renders `body` in the extension's comment syntax. Each returned line is
/// newline-terminated.
pub fn render(ext: &str, body: &[String]) -> Vec<String> {
    match style_for_extension(ext) {
        CommentStyle::Line(prefix) => body.iter().map(|l| format!("{prefix}{l}\n")).collect(),
        CommentStyle::Block { open, close } => std::iter::once(open.to_string())
            .chain(body.iter().cloned())
            .chain(std::iter::once(close.to_string()))
            .map(|l| l + "\n")
            .collect(),
    }
}

/// The four-line annotation payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnnotationBlock {
    pub timestamp: String,
    pub reason: String,
    pub keywords: Vec<String>,
}

impl AnnotationBlock {
    pub fn new(classification: &Classification, at: DateTime<Local>) -> Self {
        Self {
            timestamp: at.format(TIMESTAMP_FORMAT).to_string(),
            reason: classification.reason.label().to_string(),
            keywords: classification.keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    pub fn body(&self) -> Vec<String> {
        vec![
            BANNER.to_string(),
            format!("{TIME_LABEL} {}", self.timestamp),
            format!("{REASON_LABEL} {}", self.reason),
            format!("{KEYWORDS_LABEL} {}", self.keywords.join(", ")),
        ]
    }

    pub fn render_for(&self, ext: &str) -> Vec<String> {
        render(ext, &self.body())
    }
}
