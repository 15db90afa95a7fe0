use std::io::Write;

use exo_bnb::{
    BoundEvaluator, BoundSlot, Driver, LeafCertifier, ProofRecord, Region, ScriptReader,
    VerifyRecord, FIXED_POINT_ONE,
};
use exo_core::{ErrorInfo, ExoError, FailureClass, VerifierConfig};
use exo_num::Float;

const HALF: i64 = FIXED_POINT_ONE / 2;

/// Records every leaf and certifies it with a fixed value, failing at a
/// chosen leaf.
#[derive(Default)]
struct RecordingCertifier {
    leaves: Vec<Region>,
    fail_at: Option<usize>,
}

impl LeafCertifier for RecordingCertifier {
    fn certify_leaf(&mut self, region: &Region, _record: &VerifyRecord) -> Result<Float, ExoError> {
        self.leaves.push(*region);
        if self.fail_at == Some(self.leaves.len()) {
            return Err(ExoError::Certification(ErrorInfo::new("C001", "rigged")));
        }
        // 3/4 minus 2^-(leaf count)
        Ok(Float::from_parts(3.into(), -2).exact_sub(&Float::pow2(-(self.leaves.len() as i64))))
    }
}

fn verify_line(alpha: &str) -> String {
    ProofRecord::Verify(VerifyRecord {
        alpha: Float::parse_radix(alpha, 16).unwrap(),
        beta: Default::default(),
    })
    .to_line()
    .unwrap()
}

fn script(lines: &[&str]) -> String {
    let mut text = lines.join("\n");
    text.push('\n');
    text
}

fn slot(letter: char) -> BoundSlot {
    BoundSlot::from_letter(letter).unwrap()
}

#[test]
fn lower_children_are_visited_first() {
    let leaf = verify_line("0.8");
    let text = script(&["a", "d", leaf.as_str(), leaf.as_str(), leaf.as_str()]);
    let mut reader = ScriptReader::new(text.as_bytes());
    let mut driver = Driver::new(RecordingCertifier::default());
    let mut out = Vec::new();
    let summary = driver.run(&mut reader, &mut out).unwrap();

    let leaves = &driver.certifier().leaves;
    assert_eq!(leaves.len(), 3);
    assert_eq!((leaves[0].upper(slot('a')), leaves[0].upper(slot('d'))), (HALF, HALF));
    assert_eq!((leaves[1].upper(slot('a')), leaves[1].lower(slot('d'))), (HALF, HALF));
    assert_eq!(leaves[2].lower(slot('a')), HALF);
    // Tightening already ran: Q_X(2) <= 1 - Q_X(1) <= 1/2.
    assert_eq!(leaves[2].upper(slot('b')), HALF);

    assert_eq!(summary.regions, 5);
    assert_eq!(summary.splits, 2);
    assert_eq!(summary.certified, 3);
    assert_eq!(summary.peak_stack_depth, 3);
    assert_eq!(summary.trailing_records, 0);
    assert_eq!(summary.weakest_bound.as_deref(), Some("0.25000000000000000000"));

    let printed = String::from_utf8(out).unwrap();
    assert_eq!(
        printed,
        "0.25000000000000000000\n0.50000000000000000000\n0.62500000000000000000\nfinish\n"
    );
}

#[test]
fn failing_leaf_stops_without_completion_marker() {
    let leaf = verify_line("0.8");
    let text = script(&["e", leaf.as_str(), leaf.as_str()]);
    let mut reader = ScriptReader::new(text.as_bytes());
    let mut driver = Driver::new(RecordingCertifier {
        fail_at: Some(2),
        ..RecordingCertifier::default()
    });
    let mut out = Vec::new();
    let err = driver.run(&mut reader, &mut out).unwrap_err();
    assert_eq!(err.class(), FailureClass::Certification);
    assert_eq!(err.info().context["line"], "3");
    let printed = String::from_utf8(out).unwrap();
    assert_eq!(printed, "0.25000000000000000000\n");
}

#[test]
fn script_ending_early_is_a_format_failure() {
    let text = script(&["a", verify_line("0.8").as_str()]);
    let mut reader = ScriptReader::new(text.as_bytes());
    let mut out = Vec::new();
    let err = Driver::new(RecordingCertifier::default())
        .run(&mut reader, &mut out)
        .unwrap_err();
    assert_eq!(err.info().code, "S001");
    assert_eq!(err.class(), FailureClass::ScriptFormat);
    assert!(!String::from_utf8(out).unwrap().contains("finish"));
}

#[test]
fn unexpected_leading_character_is_a_format_failure() {
    let text = script(&["b", "x"]);
    let mut reader = ScriptReader::new(text.as_bytes());
    let err = Driver::new(RecordingCertifier::default())
        .run(&mut reader, &mut Vec::new())
        .unwrap_err();
    assert_eq!(err.info().code, "S002");
    assert_eq!(err.info().context["line"], "2");
}

#[test]
fn splitting_down_to_odd_bounds_is_rejected() {
    // After 29 halvings the lower child of slot c is [0, 1].
    let text = script(&["c"; 30]);
    let mut reader = ScriptReader::new(text.as_bytes());
    let err = Driver::new(RecordingCertifier::default())
        .run(&mut reader, &mut Vec::new())
        .unwrap_err();
    assert_eq!(err.info().code, "S030");
}

#[test]
fn trailing_records_are_counted_but_do_not_fail() {
    let leaf = verify_line("0.8");
    let text = script(&[leaf.as_str(), "a", leaf.as_str()]);
    let mut reader = ScriptReader::new(text.as_bytes());
    let mut out = Vec::new();
    let summary = Driver::new(RecordingCertifier::default())
        .run(&mut reader, &mut out)
        .unwrap();
    assert_eq!(summary.certified, 1);
    assert_eq!(summary.trailing_records, 2);
    assert!(String::from_utf8(out).unwrap().ends_with("finish\n"));
}

#[test]
fn reference_fixture_from_a_script_file_is_rejected() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    writeln!(file, "{}", verify_line("0.8")).unwrap();
    file.flush().unwrap();

    let mut reader = ScriptReader::open(file.path()).unwrap();
    let evaluator = BoundEvaluator::new(&VerifierConfig::default()).unwrap();
    let mut out = Vec::new();
    let err = Driver::new(evaluator).run(&mut reader, &mut out).unwrap_err();
    assert!(matches!(&err, ExoError::Certification(info) if info.code == "C001"));
    assert_eq!(err.info().context["line"], "1");
    assert!(out.is_empty());
}

#[test]
fn missing_script_file_is_an_io_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = ScriptReader::open(dir.path().join("input.txt")).unwrap_err();
    assert!(matches!(err, ExoError::Io(_)));
    assert_eq!(err.info().context["kind"], "NotFound");
}
