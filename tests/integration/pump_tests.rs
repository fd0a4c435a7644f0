//! Pump pattern integration tests: generation semantics and the link
//! between analysis verdicts and adversarial inputs.

use regrade::{analyze_complexity, PumpPattern};

fn pump(prefix: &str, pumps: &[&str], suffix: &str, interleave: bool) -> PumpPattern {
    PumpPattern {
        prefix: prefix.to_string(),
        pumps: pumps.iter().map(ToString::to_string).collect(),
        suffix: suffix.to_string(),
        interleave,
        description: String::new(),
    }
}

// =============================================================================
// Generation semantics
// =============================================================================

#[test]
fn test_generate_exact_output() {
    let p = pump("", &["a"], "x", false);
    assert_eq!(p.generate(5), "aaaaax");
}

#[test]
fn test_generate_zero_is_prefix_plus_suffix() {
    let p = pump("pre", &["a", "b"], "x", false);
    assert_eq!(p.generate(0), "prex");

    let interleaved = pump("pre", &["a", "b"], "x", true);
    assert_eq!(interleaved.generate(0), "prex");
}

#[test]
fn test_generate_sequence_progression() {
    let p = pump("", &["a"], "x", false);
    assert_eq!(p.generate_sequence(1, 3, 1), vec!["ax", "aax", "aaax"]);
}

#[test]
fn test_interleaved_vs_concatenated() {
    let concatenated = pump("", &["a", "b"], "x", false);
    assert_eq!(concatenated.generate(2), "aabbx");

    let interleaved = pump("", &["a", "b"], "x", true);
    assert_eq!(interleaved.generate(2), "ababx");
}

#[test]
fn test_generate_length_law() {
    let p = pump("pre", &["ab", "c"], "xy", false);
    for n in [0usize, 1, 2, 7, 19] {
        let expected = 3 + n * (2 + 1) + 2;
        assert_eq!(p.generate(n).len(), expected, "n = {n}");
    }
}

#[test]
fn test_sequence_respects_step() {
    let p = pump("", &["a"], "", false);
    assert_eq!(p.generate_sequence(2, 8, 3), vec!["aa", "aaaaa", "aaaaaaaa"]);
    // An empty range yields no inputs.
    assert!(p.generate_sequence(5, 4, 1).is_empty());
}

// =============================================================================
// Analysis integration
// =============================================================================

#[test]
fn test_nested_quantifier_pump_is_twenty_one_chars() {
    let score = analyze_complexity("(a+)+").unwrap();
    // 20 pumped characters plus the failing suffix.
    assert_eq!(score.worst_case_input, format!("{}x", "a".repeat(20)));
}

#[test]
fn test_pump_component_tracks_pattern_alphabet() {
    let score = analyze_complexity("(b+)+").unwrap();
    assert_eq!(score.pump_components, vec!["b".to_string()]);
    assert!(score.worst_case_input.starts_with("bbbb"));
}

#[test]
fn test_reconstructed_pump_matches_worst_case() {
    let score = analyze_complexity("(a+)+").unwrap();
    let p = PumpPattern {
        prefix: String::new(),
        pumps: score.pump_components.clone(),
        suffix: "x".to_string(),
        interleave: false,
        description: String::new(),
    };
    assert_eq!(p.generate(20), score.worst_case_input);
}

#[test]
fn test_safe_patterns_get_no_pump() {
    for pattern in ["^[a-z]+$", "hello", "colou?r"] {
        let score = analyze_complexity(pattern).unwrap();
        assert!(score.worst_case_input.is_empty(), "{pattern}");
        assert!(score.pump_components.is_empty(), "{pattern}");
    }
}
