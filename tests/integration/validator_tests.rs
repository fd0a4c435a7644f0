//! Validation integration tests: issue production, option handling, and
//! error kinds across the public API.

use regrade::{
    is_safe, validate, validate_with_options, Error, IssueKind, Options, Severity, ValidationMode,
};

// =============================================================================
// Safe patterns
// =============================================================================

#[test]
fn test_safe_patterns_produce_no_issues() {
    for pattern in ["^[a-z]+$", "hello", "colou?r", "^(?:abc|def)$", "a+b"] {
        let issues = validate(pattern).unwrap();
        assert!(
            issues.is_empty(),
            "{pattern} should be clean, got {issues:?}"
        );
    }
}

#[test]
fn test_bounded_repetition_reads_as_overlapping_quantifiers() {
    // `{1,3}` expands to a required copy plus optional copies; the
    // conservative adjacency rule then treats the optional copies as an
    // overlapping run. Inherited over-approximation.
    let issues = validate("[0-9]{1,3}").unwrap();
    assert!(issues
        .iter()
        .any(|i| i.kind == IssueKind::PolynomialBacktracking));
}

#[test]
fn test_is_safe_accepts_common_patterns() {
    assert!(is_safe("^[a-z]+$"));
    assert!(is_safe(r"^\d{4}-\d{2}-\d{2}$"));
    assert!(is_safe("hello world"));
}

// =============================================================================
// Unsafe patterns
// =============================================================================

#[test]
fn test_nested_quantifiers_exactly_one_issue() {
    let issues = validate("(a+)+").unwrap();
    let nested: Vec<_> = issues
        .iter()
        .filter(|i| i.kind == IssueKind::NestedQuantifiers)
        .collect();
    assert_eq!(nested.len(), 1);
    assert_eq!(nested[0].severity, Severity::Critical);
    assert!(!nested[0].suggestion.is_empty());
    assert!(!nested[0].example.is_empty());
}

#[test]
fn test_double_nesting_reports_each_outer_quantifier() {
    let issues = validate("((a+)+)+").unwrap();
    let nested = issues
        .iter()
        .filter(|i| i.kind == IssueKind::NestedQuantifiers)
        .count();
    assert!(nested >= 2, "expected at least two nested issues");
}

#[test]
fn test_balanced_mode_adds_exponential_evidence() {
    let issues = validate("(a+)+").unwrap();
    assert!(issues
        .iter()
        .any(|i| i.kind == IssueKind::ExponentialBacktracking
            && i.severity == Severity::Critical));
}

#[test]
fn test_overlapping_alternation_detected() {
    let issues = validate("(a|ab)+").unwrap();
    assert!(issues
        .iter()
        .any(|i| i.kind == IssueKind::OverlappingAlternation && i.severity == Severity::High));
}

#[test]
fn test_polynomial_shape_single_issue_after_dedup() {
    // Both the substring table and the NFA analyzer flag this fragment;
    // the boundary reports it once.
    let issues = validate(r"\d*\d+").unwrap();
    let polynomial = issues
        .iter()
        .filter(|i| i.kind == IssueKind::PolynomialBacktracking)
        .count();
    assert_eq!(polynomial, 1);
}

#[test]
fn test_is_safe_rejects_unsafe_and_invalid() {
    assert!(!is_safe("(a+)+"));
    assert!(!is_safe("(x*)*"));
    assert!(!is_safe("["));
    assert!(!is_safe("(?=a)b"));
}

#[test]
fn test_anchors_do_not_disarm_detection() {
    // Anchors restrict positions, not ambiguity.
    let issues = validate("^(a+)+$").unwrap();
    assert!(issues
        .iter()
        .any(|i| i.kind == IssueKind::NestedQuantifiers));
}

// =============================================================================
// Modes and options
// =============================================================================

#[test]
fn test_fast_mode_skips_nfa_issues() {
    let opts = Options {
        mode: ValidationMode::Fast,
        ..Options::default()
    };
    let issues = validate_with_options("(a+)+", &opts).unwrap();
    assert!(issues.iter().any(|i| i.kind == IssueKind::NestedQuantifiers));
    assert!(issues
        .iter()
        .all(|i| i.kind != IssueKind::ExponentialBacktracking));
}

#[test]
fn test_allow_unsafe_is_a_passthrough() {
    let opts = Options {
        allow_unsafe: true,
        ..Options::default()
    };
    assert!(validate_with_options("(a+)+", &opts).unwrap().is_empty());
    // Even an unparseable pattern passes.
    assert!(validate_with_options("[", &opts).unwrap().is_empty());
}

#[test]
fn test_length_boundary_uses_options() {
    let pattern = "a".repeat(1001);
    assert!(matches!(
        validate(&pattern),
        Err(Error::PatternTooLong {
            length: 1001,
            max: 1000,
        })
    ));

    // Raising the bound admits the same pattern.
    let opts = Options {
        max_pattern_length: 2000,
        ..Options::default()
    };
    assert!(validate_with_options(&pattern, &opts).is_ok());
}

#[test]
fn test_unbounded_length_emits_issue_instead_of_error() {
    // With the boundary disabled, a giant pattern still gets flagged by
    // the detector's own hard limit.
    let pattern = "a".repeat(10_001);
    let opts = Options {
        max_pattern_length: 0,
        ..Options::default()
    };
    let issues = validate_with_options(&pattern, &opts).unwrap();
    assert!(issues
        .iter()
        .any(|i| i.kind == IssueKind::PatternTooLong && i.severity == Severity::High));
}

// =============================================================================
// Error taxonomy
// =============================================================================

#[test]
fn test_invalid_pattern_error() {
    for pattern in ["[", "(a", "a)", "a**", "a{4,2}"] {
        assert!(
            matches!(validate(pattern), Err(Error::InvalidPattern { .. })),
            "{pattern} should be invalid"
        );
    }
}

#[test]
fn test_unsupported_feature_errors_name_the_feature() {
    let cases = [
        ("(?=a)b", "lookahead"),
        ("(?<=a)b", "lookbehind"),
        (r"(a)\1", "backreference"),
        ("(?>a+)", "atomic"),
    ];
    for (pattern, expected) in cases {
        match validate(pattern) {
            Err(Error::UnsupportedFeature { feature }) => {
                assert!(
                    feature.contains(expected),
                    "{pattern}: {feature:?} should mention {expected:?}"
                );
            }
            other => panic!("{pattern}: expected UnsupportedFeature, got {other:?}"),
        }
    }
}

// =============================================================================
// Determinism and serialization shape
// =============================================================================

#[test]
fn test_issue_order_is_stable() {
    let a = validate("(a+)+(b|bc)*").unwrap();
    let b = validate("(a+)+(b|bc)*").unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_issue_serializes_with_snake_case_fields() {
    let issues = validate("(a+)+").unwrap();
    let json = serde_json::to_value(&issues[0]).unwrap();

    assert_eq!(json["kind"], "nested_quantifiers");
    assert_eq!(json["severity"], "critical");
    assert!(json["position"]["start"].is_number());
    assert!(json["message"].is_string());
    assert!(json["suggestion"].is_string());
    assert!(json["complexity"].is_number());
}
