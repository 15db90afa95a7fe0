use exo_bnb::{export_wolfram, ScriptReader, WOLFRAM_TRAILER};
use exo_core::FailureClass;

const TWO_LEAVES: &str = include_str!("fixtures/two_leaves.txt");
const TWO_LEAVES_WL: &str = include_str!("fixtures/two_leaves.wl");

#[test]
fn two_leaf_script_exports_pinned_statements() {
    let mut reader = ScriptReader::new(TWO_LEAVES.as_bytes());
    let mut out = Vec::new();
    let summary = export_wolfram(&mut reader, &mut out).unwrap();

    assert_eq!(String::from_utf8(out).unwrap(), TWO_LEAVES_WL);
    assert_eq!(summary.regions, 3);
    assert_eq!(summary.splits, 1);
    assert_eq!(summary.certified, 2);
    assert_eq!(summary.trailing_records, 0);
}

#[test]
fn lower_child_lists_four_x_vertices() {
    let mut reader = ScriptReader::new(TWO_LEAVES.as_bytes());
    let mut out = Vec::new();
    export_wolfram(&mut reader, &mut out).unwrap();
    let text = String::from_utf8(out).unwrap();

    let statements: Vec<&str> = text.split("verify[").skip(1).collect();
    assert_eq!(statements.len(), 2);
    // four X vertices on the lower half of slot a, three on the upper half
    assert_eq!(statements[0].matches(",\n{").count(), 1 + 8 + 1 + 11);
    assert_eq!(statements[1].matches(",\n{").count(), 1 + 8 + 1 + 8);
    assert!(text.ends_with(&format!("{WOLFRAM_TRAILER}\n")));
}

#[test]
fn truncated_script_writes_no_trailer() {
    let first_leaf: Vec<&str> = TWO_LEAVES.lines().take(2).collect();
    let text = format!("{}\n", first_leaf.join("\n"));
    let mut reader = ScriptReader::new(text.as_bytes());
    let mut out = Vec::new();
    let err = export_wolfram(&mut reader, &mut out).unwrap_err();

    assert_eq!(err.class(), FailureClass::ScriptFormat);
    let written = String::from_utf8(out).unwrap();
    assert!(written.starts_with("verify[1/2,"));
    assert!(!written.contains(WOLFRAM_TRAILER));
}
