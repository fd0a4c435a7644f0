//! Property-based tests for the analyzer's universal contracts.

use proptest::prelude::*;

use regrade::ast::{self, simplify, Parser};
use regrade::{analyze_complexity, validate, PumpPattern};

/// Patterns built from a literal run followed by quantified literal runs:
/// always valid in the supported dialect, and varied enough to exercise
/// runs, nesting-free shapes, and quantifier mixes.
fn pattern_strategy() -> impl Strategy<Value = String> {
    prop::string::string_regex("[a-c]{1,6}([*+?][a-c]{1,4}){0,3}")
        .expect("strategy regex must be valid")
}

/// Small alphabets for pump components.
fn pump_strategy() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec(prop::string::string_regex("[a-z]{1,3}").expect("valid"), 1..4)
}

proptest! {
    #[test]
    fn prop_analysis_is_deterministic(pattern in pattern_strategy()) {
        let first = analyze_complexity(&pattern);
        let second = analyze_complexity(&pattern);
        prop_assert_eq!(first.unwrap(), second.unwrap());

        let first = validate(&pattern);
        let second = validate(&pattern);
        prop_assert_eq!(first.unwrap(), second.unwrap());
    }

    #[test]
    fn prop_safe_iff_score_below_threshold(pattern in pattern_strategy()) {
        let score = analyze_complexity(&pattern).unwrap();
        prop_assert_eq!(score.safe, score.overall < 50);
        prop_assert!(!(score.has_eda && score.has_ida));
    }

    #[test]
    fn prop_simplify_is_idempotent(pattern in pattern_strategy()) {
        let raw = Parser::new(&pattern).parse().unwrap();
        let once = simplify(raw);
        let twice = simplify(once.clone());
        prop_assert_eq!(once, twice);
    }

    #[test]
    fn prop_quantifier_count_bounds_depth(pattern in pattern_strategy()) {
        let tree = ast::parse(&pattern).unwrap();
        prop_assert!(tree.count_quantifiers() >= tree.nesting_depth());
    }

    #[test]
    fn prop_pump_length_law(
        pumps in pump_strategy(),
        prefix in prop::string::string_regex("[a-z]{0,4}").expect("valid"),
        n in 0usize..64,
    ) {
        let pump = PumpPattern {
            prefix: prefix.clone(),
            pumps: pumps.clone(),
            suffix: "x".to_string(),
            interleave: false,
            description: String::new(),
        };
        let total: usize = pumps.iter().map(String::len).sum();
        prop_assert_eq!(
            pump.generate(n).len(),
            prefix.len() + n * total + 1
        );
    }

    #[test]
    fn prop_interleave_preserves_length(pumps in pump_strategy(), n in 0usize..32) {
        let base = PumpPattern {
            prefix: String::new(),
            pumps: pumps.clone(),
            suffix: String::new(),
            interleave: false,
            description: String::new(),
        };
        let interleaved = PumpPattern {
            interleave: true,
            ..base.clone()
        };
        // Interleaving reorders components without changing total length.
        prop_assert_eq!(base.generate(n).len(), interleaved.generate(n).len());
    }
}
