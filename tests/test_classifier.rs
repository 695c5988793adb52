use post_edit_annotator::analysis::classifier::{classify, detect_keywords, detect_reason, Reason, NO_KEYWORDS};

#[test]
fn fix_outranks_every_other_category() {
    let diff = "+    // FIX: refactor the api request, add jwt auth and log metrics\n";
    assert_eq!(detect_reason(diff), Reason::Bugfix);
    assert_eq!(detect_reason(diff).label(), "버그 수정 및 예외/경계·동시성 대응");
}

#[test]
fn reasons_follow_priority_order() {
    assert_eq!(detect_reason("+ rename helper"), Reason::Refactor);
    assert_eq!(detect_reason("+ reduce latency"), Reason::Performance);
    assert_eq!(detect_reason("+ new endpoint"), Reason::Api);
    assert_eq!(detect_reason("+ validate input"), Reason::Validation);
    assert_eq!(detect_reason("+ oauth callback"), Reason::Security);
    assert_eq!(detect_reason("+ telemetry hook"), Reason::Observability);
    assert_eq!(detect_reason("+ hello world"), Reason::Requirement);
    assert_eq!(detect_reason(""), Reason::Requirement);
}

#[test]
fn classification_is_deterministic() {
    let diff = "+ async fn load() { cache.lock().await; }\n+ let re = Regex::new(\"x\");\n";
    let first = classify(diff, 8);
    for _ in 0..5 {
        assert_eq!(classify(diff, 8), first);
    }
}

#[test]
fn keywords_are_sorted_deduplicated_and_capped() {
    // async/lock, cache, sql, http, schema, jwt, log, regex all match
    let diff = "+ async lock cache sql http schema jwt log regex debounce\n";
    let all = detect_keywords(diff, 100);
    let mut sorted = all.clone();
    sorted.sort();
    sorted.dedup();
    assert_eq!(all, sorted);
    assert!(all.len() > 8);

    let capped = detect_keywords(diff, 8);
    assert_eq!(capped.len(), 8);
    assert_eq!(capped[..], all[..8]);
}

#[test]
fn no_match_yields_sentinel() {
    assert_eq!(detect_keywords("+ hello\n", 8), vec![NO_KEYWORDS]);
    assert_eq!(detect_keywords("", 8), vec![NO_KEYWORDS]);
}

#[test]
fn overlapping_rules_contribute_once() {
    // "deadlock" hits both the concurrency and SQL rules; "lock" only once
    let kws = detect_keywords("+ avoid deadlock\n", 8);
    assert!(kws.contains(&"락/경쟁 상태"));
    assert!(kws.contains(&"트랜잭션"));
    assert_eq!(kws.iter().filter(|k| **k == "락/경쟁 상태").count(), 1);
}
