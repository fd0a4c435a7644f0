//! Complexity analysis integration tests: headline verdicts for known
//! pattern shapes plus the universal invariants of the scoring contract.

use regrade::{analyze_complexity, estimate_complexity, Complexity, Error};

// =============================================================================
// Headline scenarios
// =============================================================================

#[test]
fn test_anchored_class_is_linear_and_safe() {
    let score = analyze_complexity("^[a-z]+$").unwrap();
    assert!(score.safe);
    assert_eq!(score.time_complexity, Complexity::Linear);
    assert!(!score.has_eda);
    assert!(!score.has_ida);
    assert_eq!(score.worst_case_input, "");
    assert!(score.pump_components.is_empty());
}

#[test]
fn test_nested_quantifier_is_exponential() {
    let score = analyze_complexity("(a+)+").unwrap();
    assert!(!score.safe);
    assert!(score.overall >= 70);
    assert!(score.has_eda);
    assert!(!score.has_ida);
    assert_eq!(score.time_complexity, Complexity::Exponential);
    assert_eq!(score.polynomial_degree, 0);

    // Pump: component "a", fail suffix "x", pumped 20 times.
    assert_eq!(score.pump_components, vec!["a".to_string()]);
    assert!(score.worst_case_input.starts_with("aaaa"));
    assert!(score.worst_case_input.ends_with('x'));
    assert_eq!(score.worst_case_input.len(), 21);
}

#[test]
fn test_double_nesting_scores_at_least_sixty() {
    let score = analyze_complexity("((a+)+)+").unwrap();
    assert!(!score.safe);
    assert!(score.has_eda);
    assert!(score.overall >= 60);
}

#[test]
fn test_consecutive_digit_quantifiers_are_quadratic() {
    let score = analyze_complexity(r"\d*\d+").unwrap();
    assert!(score.has_ida);
    assert!(!score.has_eda);
    assert_eq!(score.polynomial_degree, 2);
    assert_eq!(score.time_complexity, Complexity::Quadratic);
    assert!(score.overall >= 25 && score.overall <= 70);
}

#[test]
fn test_triple_star_run_is_polynomial() {
    let score = analyze_complexity("a*a*a*").unwrap();
    assert!(score.has_ida);
    assert!(score.polynomial_degree >= 2);
    assert!(score.overall >= 40);
}

#[test]
fn test_plain_literal_is_trivially_safe() {
    let score = analyze_complexity("hello").unwrap();
    assert!(score.safe);
    assert!(score.overall < 20);
    assert_eq!(score.time_complexity, Complexity::Linear);
    assert_eq!(score.worst_case_input, "");

    // The quick estimate goes further: no quantifier at all means O(1).
    assert_eq!(estimate_complexity("hello").unwrap(), Complexity::Constant);
}

// =============================================================================
// Universal invariants
// =============================================================================

const CORPUS: &[&str] = &[
    "^[a-z]+$",
    "hello",
    "(a+)+",
    "((a+)+)+",
    r"\d*\d+",
    "a*a*a*",
    "(a|ab)+x",
    "a.*b",
    "^(a+)+$",
    "(x*)*y",
    "colou?r",
    "[0-9]+[a-f]+",
];

#[test]
fn test_safe_iff_overall_below_fifty() {
    for pattern in CORPUS {
        let score = analyze_complexity(pattern).unwrap();
        assert_eq!(
            score.safe,
            score.overall < 50,
            "{pattern}: safe={} overall={}",
            score.safe,
            score.overall
        );
    }
}

#[test]
fn test_eda_and_ida_are_mutually_exclusive() {
    for pattern in CORPUS {
        let score = analyze_complexity(pattern).unwrap();
        assert!(
            !(score.has_eda && score.has_ida),
            "{pattern}: EDA and IDA both set"
        );
    }
}

#[test]
fn test_eda_implies_exponential_and_high_score() {
    for pattern in CORPUS {
        let score = analyze_complexity(pattern).unwrap();
        if score.has_eda {
            assert!(score.overall >= 70, "{pattern}");
            assert_eq!(score.time_complexity, Complexity::Exponential, "{pattern}");
        }
    }
}

#[test]
fn test_ida_implies_polynomial_class_and_degree() {
    for pattern in CORPUS {
        let score = analyze_complexity(pattern).unwrap();
        if score.has_ida {
            assert!(score.overall >= 40, "{pattern}");
            assert!(score.polynomial_degree >= 2, "{pattern}");
            assert!(
                matches!(
                    score.time_complexity,
                    Complexity::Quadratic | Complexity::Cubic | Complexity::Polynomial
                ),
                "{pattern}: {:?}",
                score.time_complexity
            );
        } else {
            assert_eq!(score.polynomial_degree, 0, "{pattern}");
        }
    }
}

#[test]
fn test_worst_case_input_tracks_unsafe_threshold() {
    for pattern in CORPUS {
        let score = analyze_complexity(pattern).unwrap();
        assert_eq!(
            score.overall >= 50,
            !score.worst_case_input.is_empty(),
            "{pattern}: overall={} worst={:?}",
            score.overall,
            score.worst_case_input
        );
        assert_eq!(
            score.worst_case_input.is_empty(),
            score.pump_components.is_empty(),
            "{pattern}"
        );
    }
}

#[test]
fn test_metrics_are_populated() {
    let score = analyze_complexity("(a+)+b*|c").unwrap();
    assert_eq!(score.metrics.quantifier_count, 3);
    assert_eq!(score.metrics.nesting_depth, 2);
    assert_eq!(score.metrics.alternation_count, 1);
}

#[test]
fn test_space_complexity_reported_linear() {
    let score = analyze_complexity("(a+)+").unwrap();
    assert_eq!(score.space_complexity, Complexity::Linear);
}

#[test]
fn test_explanation_matches_verdict() {
    let exponential = analyze_complexity("(a+)+").unwrap();
    assert!(exponential.explanation.contains("Exponential"));

    let quadratic = analyze_complexity(r"\d*\d+").unwrap();
    assert!(quadratic.explanation.contains("Quadratic"));

    let linear = analyze_complexity("hello").unwrap();
    assert!(linear.explanation.contains("Linear"));
}

// =============================================================================
// Errors
// =============================================================================

#[test]
fn test_analysis_rejects_unparseable_patterns() {
    assert!(matches!(
        analyze_complexity("["),
        Err(Error::InvalidPattern { .. })
    ));
    assert!(matches!(
        analyze_complexity("(?=a)b"),
        Err(Error::UnsupportedFeature { .. })
    ));
}

#[test]
fn test_json_shape_of_score() {
    let score = analyze_complexity("(a+)+").unwrap();
    let json = serde_json::to_value(&score).unwrap();

    assert_eq!(json["overall"], 70);
    assert_eq!(json["time_complexity"], "exponential");
    assert_eq!(json["has_eda"], true);
    assert_eq!(json["has_ida"], false);
    assert_eq!(json["safe"], false);
    assert!(json["metrics"]["nesting_depth"].is_number());
    assert_eq!(json["pump_components"][0], "a");
}
