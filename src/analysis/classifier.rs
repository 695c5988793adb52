//! Heuristic change classification.
//!
//! Both tables are ordered lists of regex alternatives matched
//! case-insensitively against the raw diff text. The reason table is
//! first-match-wins; the keyword table is union-of-all-matches.

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

/// Returned as the only keyword when no rule matches.
pub const NO_KEYWORDS: &str = "개념 식별 불가(자동 추정 실패)";

/// Why a change was (probably) made, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Reason {
    Bugfix,
    Refactor,
    Performance,
    Api,
    Validation,
    Security,
    Observability,
    Requirement,
}

impl Reason {
    pub fn label(self) -> &'static str {
        match self {
            Reason::Bugfix => "버그 수정 및 예외/경계·동시성 대응",
            Reason::Refactor => "리팩터링/가독성 및 유지보수성 개선",
            Reason::Performance => "성능 최적화/복잡도 개선",
            Reason::Api => "API/인터페이스 변경 대응",
            Reason::Validation => "입력 검증/타입 안정성 강화",
            Reason::Security => "보안 강화(인증/인가/취약점 대응)",
            Reason::Observability => "관측성(로그/메트릭/트레이스) 보강",
            Reason::Requirement => "요구사항 반영 또는 사소한 개선(자동 추정)",
        }
    }
}

impl std::fmt::Display for Reason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

const REASON_RULES: &[(&[&str], Reason)] = &[
    (
        &["fix", "bug", "error", "exception", "null", r"\bnan\b", "edge case", "race", "concurrency", "deadlock"],
        Reason::Bugfix,
    ),
    (&["refactor", "rename", "extract", "inline", "clean", "format", "lint"], Reason::Refactor),
    (
        &["perf", "optimi[sz]e", "latency", "throughput", "complexity", r"big[-_ ]?o\b"],
        Reason::Performance,
    ),
    (&[r"\bapi", "endpoint", "request", "response", "contract change"], Reason::Api),
    (&["validate", "schema", r"\btype", "typing"], Reason::Validation),
    (&[r"\bauth", "oauth", "jwt", "csrf", "xss", "sqli"], Reason::Security),
    (&[r"\blog", "metric", "trace", "telemetry", "observab"], Reason::Observability),
];

const KEYWORD_RULES: &[(&[&str], &[&str])] = &[
    (
        &[r"\basync", "await", "promise", "future", "goroutine", "thread", "lock", "race", "mutex"],
        &["비동기/await", "동시성", "락/경쟁 상태"],
    ),
    (&["refactor", "rename", "extract", "inline", "lint", "format"], &["리팩터링", "가독성 개선"]),
    (
        &["perf", "optimi[sz]e", "latency", "throughput", r"big[-_ ]?o\b", "complexity"],
        &["성능 최적화", "시간복잡도"],
    ),
    (&["cache", "memo", r"\bindex"], &["캐싱", "인덱스"]),
    (&[r"\bsql", r"\bjoin", "transaction", "isolation", "deadlock"], &["SQL", "트랜잭션", "격리수준"]),
    (&["http", r"\brest\b", "graphql", "grpc", "endpoint", "contract"], &["API 설계", "인터페이스 변경"]),
    (&["validate", "schema", r"\btype", "typing"], &["입력 검증", "타입 안정성"]),
    (&[r"\bauth", "oauth", "jwt", "csrf", "xss", "sqli"], &["인증/인가", "보안 취약점"]),
    (&[r"\blog", "metric", "trace", "telemetry", "observab"], &["관측성", "로그/메트릭"]),
    (&["regex", "parser", r"\bast\b"], &["정규표현식", "파서/AST"]),
    (&[r"\bbfs\b", r"\bdfs\b", r"\bdp\b", "binary search", r"\bheap\b"], &["알고리즘", "자료구조"]),
    (&["debounce", "throttle", r"rate[-_ ]limit"], &["호출 빈도 제한", "디바운스/스로틀"]),
];

fn compile(terms: &[&str]) -> Option<Regex> {
    let pattern = format!("(?:{})", terms.join("|"));
    match RegexBuilder::new(&pattern).case_insensitive(true).build() {
        Ok(re) => Some(re),
        Err(e) => {
            tracing::warn!(%pattern, error = %e, "classifier rule failed to compile; rule disabled");
            None
        }
    }
}

static REASONS: Lazy<Vec<(Option<Regex>, Reason)>> =
    Lazy::new(|| REASON_RULES.iter().map(|(terms, r)| (compile(terms), *r)).collect());

static KEYWORDS: Lazy<Vec<(Option<Regex>, &'static [&'static str])>> =
    Lazy::new(|| KEYWORD_RULES.iter().map(|(terms, kws)| (compile(terms), *kws)).collect());

/// Result of classifying one diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub reason: Reason,
    pub keywords: Vec<&'static str>,
}

pub fn detect_reason(diff: &str) -> Reason {
    REASONS
        .iter()
        .find(|(re, _)| re.as_ref().is_some_and(|re| re.is_match(diff)))
        .map(|(_, reason)| *reason)
        .unwrap_or(Reason::Requirement)
}

/// Sorted, deduplicated keyword tags from every matching rule, truncated to
/// `limit`. Falls back to [`NO_KEYWORDS`] when nothing matches.
pub fn detect_keywords(diff: &str, limit: usize) -> Vec<&'static str> {
    let found: BTreeSet<&'static str> = KEYWORDS
        .iter()
        .filter(|(re, _)| re.as_ref().is_some_and(|re| re.is_match(diff)))
        .flat_map(|(_, kws)| kws.iter().copied())
        .collect();
    if found.is_empty() {
        return vec![NO_KEYWORDS];
    }
    found.into_iter().take(limit).collect()
}

pub fn classify(diff: &str, keyword_limit: usize) -> Classification {
    Classification {
        reason: detect_reason(diff),
        keywords: detect_keywords(diff, keyword_limit),
    }
}
