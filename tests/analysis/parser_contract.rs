use super::support::{payload, result, sentinel};
use skinsight::AnalysisError;
use skinsight::analysis::{END_MARKER, PARAMETER_NAMES, START_MARKER, parse_analysis};

#[test]
fn every_score_in_range_round_trips() {
    for value in [0, 1, 50, 99, 100] {
        let expected = result(value);
        let rendered = expected.to_sentinel().unwrap();
        assert_eq!(parse_analysis(&rendered).unwrap(), expected);
    }
}

#[test]
fn valid_results_carry_all_nine_parameters() {
    let parsed = result(42);
    for name in PARAMETER_NAMES {
        let assessment = parsed.get(name).unwrap();
        assert!(assessment.value <= 100);
    }
    assert_eq!(parsed.iter().count(), PARAMETER_NAMES.len());
}

#[test]
fn prose_before_and_after_is_ignored() {
    let raw = format!(
        "Certamente! Ecco la valutazione richiesta.\n\n{}\n\nSpero sia utile.",
        sentinel(64)
    );
    assert_eq!(parse_analysis(&raw).unwrap(), result(64));
}

#[test]
fn markers_are_exact_strings() {
    assert_eq!(START_MARKER, "<attribute=analysis_result|");
    assert_eq!(END_MARKER, "| attribute=analysis_result>");
}

#[test]
fn missing_end_marker_is_format_error() {
    let raw = format!("{START_MARKER} {}", payload(10));
    assert!(matches!(parse_analysis(&raw), Err(AnalysisError::Format(_))));
}

#[test]
fn missing_pori_ostruiti_is_schema_error() {
    let mut body = payload(10);
    body.as_object_mut().unwrap().remove("Pori ostruiti");
    let raw = format!("{START_MARKER} {body} {END_MARKER}");
    match parse_analysis(&raw) {
        Err(AnalysisError::Schema(message)) => assert!(message.contains("Pori ostruiti")),
        other => panic!("expected schema error, got {other:?}"),
    }
}

#[test]
fn value_above_hundred_is_schema_error() {
    let mut body = payload(10);
    body["Densità pilifera"]["value"] = serde_json::json!(101);
    let raw = format!("{START_MARKER} {body} {END_MARKER}");
    assert!(matches!(parse_analysis(&raw), Err(AnalysisError::Schema(_))));
}
