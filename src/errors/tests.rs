use std::sync::Arc;

use rstest::rstest;
use text_size::TextSize;

use super::*;
use crate::base::Location;

fn location(line: u32, column: u32) -> Location {
    Location::new(line, column, TextSize::new(0), Arc::<str>::from("input"))
}

#[rstest]
#[case(Severity::Info, Severity::Error, false)]
#[case(Severity::Warning, Severity::Error, false)]
#[case(Severity::Error, Severity::Error, true)]
#[case(Severity::Warning, Severity::Warning, true)]
#[case(Severity::Critical, Severity::Critical, true)]
#[case(Severity::Error, Severity::Critical, false)]
fn test_severity_meets_threshold(
    #[case] severity: Severity,
    #[case] threshold: Severity,
    #[case] expected: bool,
) {
    assert_eq!(severity.meets(threshold), expected);
}

#[test]
fn test_diagnostic_display() {
    assert_eq!(
        Diagnostic::warning("unused rule").to_string(),
        "[Warning] unused rule"
    );
    assert_eq!(
        Diagnostic::error("unexpected `)`")
            .at(location(2, 4))
            .to_string(),
        "[Error@3:5] unexpected `)`"
    );
}

#[test]
fn test_most_severe_prefers_first_of_highest() {
    let diagnostics = vec![
        Diagnostic::warning("a").at(location(0, 0)),
        Diagnostic::error("b").at(location(1, 0)),
        Diagnostic::error("c").at(location(2, 0)),
    ];
    let worst = Diagnostic::most_severe(&diagnostics).unwrap();
    assert_eq!(worst.message, "b");
}

#[test]
fn test_parse_error_uses_most_severe_location() {
    let error = ParseError::new(
        vec![
            Diagnostic::info("note").at(location(0, 1)),
            Diagnostic::error("boom").at(location(4, 2)),
        ],
        location(0, 0),
    );
    assert_eq!(error.location.line(), 4);
    assert_eq!(error.log, "[Info@1:2] note\n[Error@5:3] boom");
}

#[test]
fn test_registration_conflict_converts_into_error() {
    let conflict = RegistrationConflict {
        name: "if".into(),
        existing: "text `if`".into(),
        requested: "text `iff`".into(),
    };
    let error: Error = conflict.into();
    assert!(matches!(error, Error::RegistrationConflict(_)));
    assert!(error.to_string().contains("`if`"));
}
