use globset::{Glob, GlobSet, GlobSetBuilder};

use crate::error::AnnotateError;
use crate::placement::PlacementOptions;

#[derive(Debug, Clone)]
pub struct AnnotatorConfig {
    pub nearby_window: usize,
    pub tail_window: usize,
    pub keyword_limit: usize,
    pub ignore_globs: Option<GlobSet>,
    pub dry_run: bool,
}

impl Default for AnnotatorConfig {
    fn default() -> Self {
        Self {
            nearby_window: 10,
            tail_window: 50,
            keyword_limit: 8,
            // None means: do not ignore anything
            ignore_globs: None,
            dry_run: false,
        }
    }
}

impl AnnotatorConfig {
    pub fn placement(&self) -> PlacementOptions {
        PlacementOptions {
            nearby_window: self.nearby_window,
            tail_window: self.tail_window,
            dry_run: self.dry_run,
        }
    }
}

fn parse_bounded(key: &'static str, raw: &str, min: usize, max: usize) -> Result<usize, AnnotateError> {
    raw.trim()
        .parse::<usize>()
        .map(|v| v.clamp(min, max))
        .map_err(|_| AnnotateError::InvalidConfig { key, value: raw.to_string() })
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}

fn build_globs<'a>(patterns: impl Iterator<Item = &'a str>) -> Option<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pat in patterns.map(str::trim).filter(|s| !s.is_empty()) {
        match Glob::new(pat) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => tracing::warn!(pattern = pat, error = %e, "skipping invalid ignore glob"),
        }
    }
    builder.build().ok()
}

fn apply_bounded(target: &mut usize, key: &'static str, raw: &str, min: usize, max: usize) {
    match parse_bounded(key, raw, min, max) {
        Ok(v) => *target = v,
        Err(e) => tracing::warn!(error = %e, "keeping previous value"),
    }
}

/// Defaults, then `ANNOTATE_*` environment variables, then the JSON file
/// named by `ANNOTATE_CONFIG_FILE` (or `.annotate-config.json` in the cwd).
pub fn load_config() -> AnnotatorConfig {
    let mut cfg = AnnotatorConfig::default();

    if let Ok(val) = std::env::var("ANNOTATE_NEARBY_WINDOW") {
        apply_bounded(&mut cfg.nearby_window, "ANNOTATE_NEARBY_WINDOW", &val, 1, 200);
    }
    if let Ok(val) = std::env::var("ANNOTATE_TAIL_WINDOW") {
        apply_bounded(&mut cfg.tail_window, "ANNOTATE_TAIL_WINDOW", &val, 1, 1000);
    }
    if let Ok(val) = std::env::var("ANNOTATE_KEYWORD_LIMIT") {
        apply_bounded(&mut cfg.keyword_limit, "ANNOTATE_KEYWORD_LIMIT", &val, 1, 32);
    }
    if let Ok(val) = std::env::var("ANNOTATE_DRY_RUN") {
        cfg.dry_run = parse_flag(&val);
    }
    if let Ok(val) = std::env::var("ANNOTATE_IGNORE_GLOBS") {
        if let Some(set) = build_globs(val.split(',')) {
            cfg.ignore_globs = Some(set);
        }
    }

    let cfg_path = std::env::var("ANNOTATE_CONFIG_FILE")
        .ok()
        .unwrap_or_else(|| ".annotate-config.json".to_string());
    if let Ok(text) = std::fs::read_to_string(&cfg_path) {
        match serde_json::from_str::<serde_json::Value>(&text) {
            Ok(json) => apply_json(&mut cfg, &json),
            Err(e) => tracing::warn!(path = %cfg_path, error = %e, "ignoring malformed config file"),
        }
    }

    cfg
}

fn apply_json(cfg: &mut AnnotatorConfig, json: &serde_json::Value) {
    let number = |key: &str| {
        json.get(key).map(|v| match v {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    };
    if let Some(v) = number("nearby_window") {
        apply_bounded(&mut cfg.nearby_window, "nearby_window", &v, 1, 200);
    }
    if let Some(v) = number("tail_window") {
        apply_bounded(&mut cfg.tail_window, "tail_window", &v, 1, 1000);
    }
    if let Some(v) = number("keyword_limit") {
        apply_bounded(&mut cfg.keyword_limit, "keyword_limit", &v, 1, 32);
    }
    match json.get("dry_run") {
        Some(serde_json::Value::Bool(b)) => cfg.dry_run = *b,
        Some(serde_json::Value::String(s)) => cfg.dry_run = parse_flag(s),
        _ => {}
    }
    if let Some(globs) = json.get("ignore_globs").and_then(|v| v.as_array()) {
        if let Some(set) = build_globs(globs.iter().filter_map(|g| g.as_str())) {
            cfg.ignore_globs = Some(set);
        }
    }
}

pub fn should_ignore_path(cfg: &AnnotatorConfig, path: &str) -> bool {
    if path.is_empty() {
        return false;
    }
    let p = std::path::Path::new(path);
    cfg.ignore_globs
        .as_ref()
        .map(|set| set.is_match(p))
        .unwrap_or(false)
}
