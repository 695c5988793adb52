use chrono::{Local, TimeZone};
use post_edit_annotator::analysis::classifier::classify;
use post_edit_annotator::analysis::hunk::last_insertion_point;
use post_edit_annotator::formatting::comment::AnnotationBlock;
use post_edit_annotator::placement::{place, plan_text_edit, PlacementOptions, PlacementOutcome, TextEdit};

fn ten_lines() -> String {
    (1..=10).map(|i| format!("line{i}\n")).collect()
}

fn py_block() -> Vec<String> {
    let at = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    AnnotationBlock::new(&classify("+ x = 1\n", 8), at).render_for("py")
}

#[test]
fn inserts_after_last_added_line() {
    let td = tempfile::tempdir().unwrap();
    let file = td.path().join("a.py");
    std::fs::write(&file, ten_lines()).unwrap();

    let point = last_insertion_point("@@ -3,2 +3,4 @@\n");
    assert_eq!(point, Some(6));
    let outcome = place(&file, point, &py_block(), &PlacementOptions::default()).unwrap();
    assert_eq!(outcome, PlacementOutcome::Inserted { after_line: 6 });

    let text = std::fs::read_to_string(&file).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines[5], "line6");
    assert_eq!(lines[6], "# === 변경 주석 (자동 생성) ===");
    for l in &lines[7..10] {
        assert!(l.starts_with("# "), "expected comment line, got {l:?}");
    }
    assert_eq!(lines[10], "");
    assert_eq!(lines[11], "line7");
    assert_eq!(lines.len(), 15);
}

#[test]
fn second_insert_is_a_no_op() {
    let td = tempfile::tempdir().unwrap();
    let file = td.path().join("a.py");
    std::fs::write(&file, ten_lines()).unwrap();
    let opts = PlacementOptions::default();

    place(&file, Some(6), &py_block(), &opts).unwrap();
    let once = std::fs::read(&file).unwrap();
    let again = place(&file, Some(6), &py_block(), &opts).unwrap();
    assert_eq!(again, PlacementOutcome::AlreadyAnnotated);
    assert_eq!(std::fs::read(&file).unwrap(), once);
}

#[test]
fn signature_far_from_point_does_not_block_insert() {
    let mut content = String::from("# 변경 이유: old\n");
    content.push_str(&"x\n".repeat(40));
    let edit = plan_text_edit(&content, Some(35), &py_block(), &PlacementOptions::default());
    assert!(matches!(edit, TextEdit::Rewrite { after_line: 35, .. }));
}

#[test]
fn empty_diff_appends_at_end_once() {
    let td = tempfile::tempdir().unwrap();
    let file = td.path().join("notes.md");
    std::fs::write(&file, "# Title\nbody\n").unwrap();
    let at = Local.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();
    let block = AnnotationBlock::new(&classify("", 8), at).render_for("md");
    let opts = PlacementOptions::default();

    assert_eq!(last_insertion_point(""), None);
    assert_eq!(place(&file, None, &block, &opts).unwrap(), PlacementOutcome::Appended);
    let text = std::fs::read_to_string(&file).unwrap();
    assert!(text.starts_with("# Title\nbody\n\n<!--\n=== 변경 주석 (자동 생성) ===\n"));
    assert!(text.ends_with("-->\n\n"));

    assert_eq!(place(&file, None, &block, &opts).unwrap(), PlacementOutcome::AlreadyAnnotated);
    assert_eq!(std::fs::read_to_string(&file).unwrap(), text);
}

#[test]
fn append_separates_unterminated_last_line() {
    let edit = plan_text_edit("tail", None, &py_block(), &PlacementOptions::default());
    match edit {
        TextEdit::Append(s) => assert!(s.starts_with("\n\n# === 변경 주석")),
        other => panic!("unexpected {other:?}"),
    }
}

#[test]
fn tail_window_bounds_the_signature_scan() {
    let mut content = String::from("// 변경 이유: old\n");
    content.push_str(&"x\n".repeat(60));
    let opts = PlacementOptions::default();
    assert!(matches!(plan_text_edit(&content, None, &py_block(), &opts), TextEdit::Append(_)));

    let wide = PlacementOptions { tail_window: 100, ..opts };
    assert_eq!(plan_text_edit(&content, None, &py_block(), &wide), TextEdit::Unchanged);
}

#[test]
fn binary_file_gets_raw_append_once() {
    let td = tempfile::tempdir().unwrap();
    let file = td.path().join("blob.bin");
    let original = vec![0u8, 159, 146, 150, 10];
    std::fs::write(&file, &original).unwrap();
    let block = py_block();
    let opts = PlacementOptions::default();

    assert_eq!(place(&file, Some(1), &block, &opts).unwrap(), PlacementOutcome::AppendedRaw);
    let bytes = std::fs::read(&file).unwrap();
    assert!(bytes.starts_with(&original));
    assert_eq!(&bytes[original.len()..], block.concat().as_bytes());

    assert_eq!(place(&file, Some(1), &block, &opts).unwrap(), PlacementOutcome::AlreadyAnnotated);
    assert_eq!(std::fs::read(&file).unwrap(), bytes);
}

#[test]
fn dry_run_never_writes() {
    let td = tempfile::tempdir().unwrap();
    let file = td.path().join("a.py");
    std::fs::write(&file, ten_lines()).unwrap();
    let opts = PlacementOptions { dry_run: true, ..Default::default() };

    assert_eq!(
        place(&file, Some(6), &py_block(), &opts).unwrap(),
        PlacementOutcome::DryRun { after_line: Some(6) }
    );
    assert_eq!(place(&file, None, &py_block(), &opts).unwrap(), PlacementOutcome::DryRun { after_line: None });
    assert_eq!(std::fs::read_to_string(&file).unwrap(), ten_lines());
}

#[test]
fn stale_point_past_end_inserts_only_once() {
    let td = tempfile::tempdir().unwrap();
    let file = td.path().join("short.py");
    std::fs::write(&file, "a\nb\n").unwrap();
    let opts = PlacementOptions::default();

    assert_eq!(
        place(&file, Some(40), &py_block(), &opts).unwrap(),
        PlacementOutcome::Inserted { after_line: 2 }
    );
    let once = std::fs::read_to_string(&file).unwrap();
    assert_eq!(place(&file, Some(40), &py_block(), &opts).unwrap(), PlacementOutcome::AlreadyAnnotated);
    let twice = std::fs::read_to_string(&file).unwrap();
    assert_eq!(once, twice);
    assert_eq!(twice.matches("=== 변경 주석 (자동 생성) ===").count(), 1);
}

#[test]
fn crlf_file_keeps_crlf_endings() {
    let td = tempfile::tempdir().unwrap();
    let file = td.path().join("win.py");
    std::fs::write(&file, "one\r\ntwo\r\nthree\r\n").unwrap();
    let opts = PlacementOptions::default();

    place(&file, Some(2), &py_block(), &opts).unwrap();
    let text = std::fs::read_to_string(&file).unwrap();
    assert!(text.starts_with("one\r\ntwo\r\n# === 변경 주석 (자동 생성) ===\r\n"));
    assert!(text.ends_with("\r\n\r\nthree\r\n"));
    assert_eq!(text.matches('\n').count(), text.matches("\r\n").count(), "mixed endings in {text:?}");

    let appended = td.path().join("tail.py");
    std::fs::write(&appended, "x\r\n").unwrap();
    place(&appended, None, &py_block(), &opts).unwrap();
    let text = std::fs::read_to_string(&appended).unwrap();
    assert!(text.starts_with("x\r\n\r\n# === 변경 주석"));
    assert_eq!(text.matches('\n').count(), text.matches("\r\n").count());
}
