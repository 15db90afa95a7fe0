use exo_core::errors::{ErrorInfo, ExoError, FailureClass};

fn sample_info(code: &str, message: &str) -> ErrorInfo {
    ErrorInfo::new(code, message)
        .with_context("slot", "3")
        .with_context("reason", "example")
}

#[test]
fn invariant_error_surface() {
    let err = ExoError::Invariant(sample_info("R001", "lower bound not below upper bound"));
    assert_eq!(err.info().code, "R001");
    assert!(err.info().context.contains_key("slot"));
    assert_eq!(err.class(), FailureClass::Structural);
}

#[test]
fn numeric_error_surface() {
    let err = ExoError::Numeric(sample_info("N001", "logarithm of zero"));
    assert_eq!(err.info().code, "N001");
    assert_eq!(err.class(), FailureClass::Structural);
}

#[test]
fn script_error_surface() {
    let err = ExoError::Script(sample_info("S001", "unexpected leading character"));
    assert!(err.info().context.contains_key("reason"));
    assert_eq!(err.class(), FailureClass::ScriptFormat);
}

#[test]
fn certification_error_surface() {
    let err = ExoError::Certification(sample_info("C001", "value below threshold"));
    assert_eq!(err.class(), FailureClass::Certification);
}

#[test]
fn io_errors_convert_and_count_as_script_failures() {
    let io = std::io::Error::new(std::io::ErrorKind::NotFound, "input.txt");
    let err: ExoError = io.into();
    assert_eq!(err.info().code, "IO001");
    assert_eq!(err.info().context["kind"], "NotFound");
    assert_eq!(err.class(), FailureClass::ScriptFormat);
}

#[test]
fn context_is_appended_and_displayed() {
    let err = ExoError::Script(ErrorInfo::new("S002", "bad field").with_hint("regenerate"))
        .with_context("line", 7);
    let rendered = err.to_string();
    assert!(rendered.starts_with("script error: bad field (code: S002)"));
    assert!(rendered.contains("line=7"));
    assert!(rendered.ends_with("| hint: regenerate"));
}

#[test]
fn errors_serialize_with_family_tag() {
    let err = ExoError::Certification(ErrorInfo::new("C001", "value below threshold"));
    let json = serde_json::to_value(&err).unwrap();
    assert_eq!(json["family"], "Certification");
    assert_eq!(json["detail"]["code"], "C001");
    let restored: ExoError = serde_json::from_value(json).unwrap();
    assert_eq!(restored, err);
}
