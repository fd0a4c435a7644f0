//! Complexity scoring: aggregates structural metrics into a 0-100 score
//! and an asymptotic class.
//!
//! The scorer is pure and deterministic. It inspects the AST along four
//! aspects (quantifier nesting, overlapping quantifiers, alternations,
//! and overall pattern shape), accumulating score contributions, then
//! resolves the final time class with per-class floors: an exponential
//! verdict never scores below 70, a polynomial one never below 40.
//!
//! It never panics and never fails: every AST yields a report.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::ast::{self, Ast};
use crate::types::Complexity;

/// Scores at or above this are reported unsafe.
pub const UNSAFE_SCORE_THRESHOLD: u32 = 50;

/// Internal time-class state the aspects agree on before finalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimeClass {
    Linear,
    Polynomial,
    Exponential,
}

/// Raw structural metrics gathered while scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportMetrics {
    pub nesting_depth: usize,
    pub nested_quantifiers: usize,
    pub quantifier_count: usize,
    pub overlapping_sequences: usize,
    pub alternation_count: usize,
    pub overlapping_alternations: usize,
    pub pattern_length: usize,
    pub has_dot_star: bool,
}

/// The scorer's output, consumed by the public API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreReport {
    /// Composite score, 0-100
    pub score: u32,
    /// Resolved time class
    pub time_class: TimeClass,
    /// Asymptotic class as a complexity value
    pub complexity: Complexity,
    /// Polynomial degree (2 = quadratic); meaningful for polynomial and
    /// exponential verdicts
    pub degree: usize,
    /// Human-readable summary
    pub explanation: String,
    /// Short names of the contributing findings
    pub findings: Vec<String>,
    /// Raw metrics
    pub metrics: ReportMetrics,
}

/// Complexity analyzer for regex patterns.
#[derive(Debug)]
pub struct ComplexityAnalyzer {
    max_score: u32,
}

impl ComplexityAnalyzer {
    /// `max_score` caps the composite score (profiles use 70 or 100).
    #[must_use]
    pub fn new(max_score: u32) -> Self {
        Self { max_score }
    }

    /// Score a simplified AST.
    #[must_use]
    pub fn analyze(&self, tree: &Ast, pattern: &str) -> ScoreReport {
        let mut report = ScoreReport {
            score: 0,
            time_class: TimeClass::Linear,
            complexity: Complexity::Linear,
            degree: 1,
            explanation: String::new(),
            findings: Vec::new(),
            metrics: ReportMetrics::default(),
        };

        self.score_nesting(tree, &mut report);
        self.score_quantifiers(tree, &mut report);
        self.score_alternations(tree, &mut report);
        self.score_shape(tree, pattern, &mut report);

        self.finalize(&mut report);

        if report.score > self.max_score {
            report.score = self.max_score;
        }

        debug!(
            score = report.score,
            class = ?report.time_class,
            "scored pattern"
        );
        report
    }

    /// Quick asymptotic estimate without the full scoring pass.
    #[must_use]
    pub fn estimate(&self, tree: &Ast) -> Complexity {
        if has_nested_quantifiers(tree) {
            return Complexity::Exponential;
        }

        let overlapping = count_overlapping_concats(tree);
        if overlapping > 0 {
            return match overlapping + 1 {
                2 => Complexity::Quadratic,
                3 => Complexity::Cubic,
                _ => Complexity::Polynomial,
            };
        }

        if tree.has_quantifier() {
            Complexity::Linear
        } else {
            Complexity::Constant
        }
    }

    // =========================================================================
    // Aspects
    // =========================================================================

    /// Nesting: a truly nested quantifier makes the verdict exponential.
    fn score_nesting(&self, tree: &Ast, report: &mut ScoreReport) {
        let max_depth = tree.nesting_depth();
        let nested_count = count_truly_nested(tree);

        report.metrics.nesting_depth = max_depth;
        report.metrics.nested_quantifiers = nested_count;

        if nested_count > 0 {
            report.score += 40 + nested_count as u32 * 10;
            report
                .findings
                .push("nested quantifiers (exponential risk)".to_string());
            report.time_class = TimeClass::Exponential;
            report.degree = nested_count + 1;
        } else if max_depth > 3 {
            report.score += 15 + max_depth as u32 * 5;
            report.findings.push("deep nesting".to_string());
        }
    }

    /// Overlapping quantifier runs give a polynomial verdict; sheer
    /// quantifier volume adds a smaller penalty.
    fn score_quantifiers(&self, tree: &Ast, report: &mut ScoreReport) {
        let quantifier_count = tree.count_quantifiers();
        let overlapping = count_overlapping_concats(tree);

        report.metrics.quantifier_count = quantifier_count;
        report.metrics.overlapping_sequences = overlapping;

        if overlapping > 0 {
            let degree = overlapping + 1;
            report.score += 25 + degree as u32 * 10;

            report.findings.push(
                match degree {
                    2 => "overlapping quantifiers (quadratic)",
                    3 => "overlapping quantifiers (cubic)",
                    _ => "overlapping quantifiers (high polynomial)",
                }
                .to_string(),
            );

            if report.time_class == TimeClass::Linear {
                report.time_class = TimeClass::Polynomial;
                report.degree = degree;
            }
        }

        if quantifier_count > 15 {
            report.score += 10 + (quantifier_count as u32 - 15);
            report.findings.push("excessive quantifiers".to_string());
        }
    }

    /// Alternations whose branches all share a root operation.
    fn score_alternations(&self, tree: &Ast, report: &mut ScoreReport) {
        let mut alternation_count = 0usize;
        let mut overlapping = 0usize;

        ast::walk(tree, &mut |node| {
            if let Ast::Alternate(branches) = node {
                alternation_count += 1;
                if branches_share_root_op(branches) {
                    overlapping += 1;
                }
            }
            true
        });

        report.metrics.alternation_count = alternation_count;
        report.metrics.overlapping_alternations = overlapping;

        if overlapping > 0 {
            report.score += 20 + overlapping as u32 * 5;
            report
                .findings
                .push("overlapping alternation branches".to_string());
        }
    }

    /// Whole-pattern shape: sheer size and dot-star presence.
    fn score_shape(&self, tree: &Ast, pattern: &str, report: &mut ScoreReport) {
        report.metrics.pattern_length = pattern.len();
        if pattern.len() > 500 {
            report.score += 10;
            report.findings.push("very long pattern".to_string());
        }

        report.metrics.has_dot_star = has_dot_star(tree);
        if report.metrics.has_dot_star {
            report.score += 5;
        }
    }

    /// Resolve the asymptotic class, apply floors, and write the summary.
    fn finalize(&self, report: &mut ScoreReport) {
        match report.time_class {
            TimeClass::Exponential => {
                report.complexity = Complexity::Exponential;
                report.explanation =
                    "Exponential time complexity - catastrophic backtracking risk".to_string();
                if report.score < 70 {
                    report.score = 70;
                }
            }
            TimeClass::Polynomial => {
                report.complexity = match report.degree {
                    2 => Complexity::Quadratic,
                    3 => Complexity::Cubic,
                    _ => Complexity::Polynomial,
                };
                report.explanation = match report.degree {
                    2 => "Quadratic time complexity - moderate backtracking risk",
                    3 => "Cubic time complexity - high backtracking risk",
                    _ => "Polynomial time complexity - backtracking risk",
                }
                .to_string();
                if report.score < 40 {
                    report.score = 40;
                }
            }
            TimeClass::Linear => {
                report.complexity = Complexity::Linear;
                report.explanation = if report.score < 20 {
                    "Linear time complexity - good performance".to_string()
                } else {
                    "Linear time complexity with some inefficiencies".to_string()
                };
            }
        }
    }
}

// =============================================================================
// Structural helpers
// =============================================================================

/// A quantifier is truly nested when its subtree reaches another
/// quantifier through sequencing and grouping only; an alternation in
/// between offers a choice, not a repetition of a repetition.
fn count_truly_nested(tree: &Ast) -> usize {
    let mut count = 0;
    ast::walk(tree, &mut |node| {
        if node.is_quantifier()
            && node
                .children()
                .iter()
                .any(contains_quantifier_through_groups)
        {
            count += 1;
        }
        true
    });
    count
}

fn contains_quantifier_through_groups(node: &Ast) -> bool {
    if node.is_quantifier() {
        return true;
    }
    match node {
        Ast::Concat(subs) => subs.iter().any(contains_quantifier_through_groups),
        Ast::Capture { node, .. } => contains_quantifier_through_groups(node),
        _ => false,
    }
}

fn has_nested_quantifiers(tree: &Ast) -> bool {
    let mut found = false;
    ast::walk(tree, &mut |node| {
        if node.is_quantifier()
            && node
                .children()
                .iter()
                .any(contains_quantifier_through_groups)
        {
            found = true;
            return false;
        }
        true
    });
    found
}

/// Number of `Concat` nodes containing at least one run of two or more
/// consecutive quantifier children.
fn count_overlapping_concats(tree: &Ast) -> usize {
    let mut count = 0;
    ast::walk(tree, &mut |node| {
        if let Ast::Concat(subs) = node {
            let mut consecutive = 0;
            for sub in subs {
                if sub.is_quantifier() {
                    consecutive += 1;
                    if consecutive >= 2 {
                        count += 1;
                        break;
                    }
                } else {
                    consecutive = 0;
                }
            }
        }
        true
    });
    count
}

fn branches_share_root_op(branches: &[Ast]) -> bool {
    let Some(first) = branches.first() else {
        return false;
    };
    branches.len() >= 2
        && branches
            .iter()
            .all(|b| std::mem::discriminant(b) == std::mem::discriminant(first))
}

fn has_dot_star(tree: &Ast) -> bool {
    let mut found = false;
    ast::walk(tree, &mut |node| {
        if let Ast::Star(sub) = node {
            if matches!(**sub, Ast::AnyChar | Ast::AnyCharNoNewline) {
                found = true;
                return false;
            }
        }
        true
    });
    found
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast;

    fn score(pattern: &str) -> ScoreReport {
        ComplexityAnalyzer::new(100).analyze(&ast::parse(pattern).unwrap(), pattern)
    }

    #[test]
    fn test_plain_literal_scores_zero() {
        let report = score("hello");
        assert_eq!(report.score, 0);
        assert_eq!(report.time_class, TimeClass::Linear);
        assert_eq!(report.complexity, Complexity::Linear);
        assert!(report.findings.is_empty());
        assert_eq!(report.explanation, "Linear time complexity - good performance");
    }

    #[test]
    fn test_anchored_class_is_linear() {
        let report = score("^[a-z]+$");
        assert!(report.score < UNSAFE_SCORE_THRESHOLD);
        assert_eq!(report.complexity, Complexity::Linear);
        assert_eq!(report.metrics.quantifier_count, 1);
    }

    #[test]
    fn test_nested_quantifier_is_exponential_with_floor() {
        let report = score("(a+)+");
        assert_eq!(report.time_class, TimeClass::Exponential);
        assert_eq!(report.complexity, Complexity::Exponential);
        // 40 + 10·1 = 50, floored to 70
        assert_eq!(report.score, 70);
        assert_eq!(report.degree, 2);
        assert_eq!(report.metrics.nested_quantifiers, 1);
    }

    #[test]
    fn test_double_nesting_scores_higher() {
        let report = score("((a+)+)+");
        assert_eq!(report.time_class, TimeClass::Exponential);
        // 40 + 10·2 = 60, floored to 70
        assert_eq!(report.score, 70);
        assert_eq!(report.metrics.nested_quantifiers, 2);
    }

    #[test]
    fn test_alternation_inside_quantifier_is_not_truly_nested() {
        // The quantifiers under the alternation are alternatives, not
        // stacked repetitions.
        let report = score("(?:a+|b+)x");
        assert_eq!(report.metrics.nested_quantifiers, 0);
        assert_eq!(report.time_class, TimeClass::Linear);
    }

    #[test]
    fn test_consecutive_quantifiers_are_quadratic() {
        let report = score(r"\d*\d+");
        assert_eq!(report.time_class, TimeClass::Polynomial);
        assert_eq!(report.complexity, Complexity::Quadratic);
        assert_eq!(report.degree, 2);
        // 25 + 2·10 = 45
        assert_eq!(report.score, 45);
    }

    #[test]
    fn test_triple_run_still_counts_one_concat() {
        let report = score("a*a*a*");
        assert_eq!(report.time_class, TimeClass::Polynomial);
        assert_eq!(report.degree, 2);
        assert!(report.score >= 40);
    }

    #[test]
    fn test_exponential_takes_precedence_over_polynomial() {
        let report = score("(a+)+b*c*");
        assert_eq!(report.time_class, TimeClass::Exponential);
        assert_eq!(report.complexity, Complexity::Exponential);
        assert!(report.score >= 70);
    }

    #[test]
    fn test_same_op_alternation_penalty() {
        let with = score("abc|abd");
        let without = score("ab|c*d");
        assert!(with
            .findings
            .contains(&"overlapping alternation branches".to_string()));
        assert!(with.score >= 20);
        assert!(!without
            .findings
            .contains(&"overlapping alternation branches".to_string()));
    }

    #[test]
    fn test_dot_star_bonus() {
        let report = score("a.*b");
        assert!(report.metrics.has_dot_star);
        assert_eq!(report.score, 5);
    }

    #[test]
    fn test_long_pattern_bonus() {
        let pattern = format!("^{}$", "a".repeat(600));
        let report = ComplexityAnalyzer::new(100)
            .analyze(&ast::parse(&pattern).unwrap(), &pattern);
        assert!(report
            .findings
            .contains(&"very long pattern".to_string()));
    }

    #[test]
    fn test_score_cap() {
        let report = ComplexityAnalyzer::new(70)
            .analyze(&ast::parse("((a+)+)+(b+)+c*c*").unwrap(), "((a+)+)+(b+)+c*c*");
        assert_eq!(report.score, 70);
    }

    #[test]
    fn test_excessive_quantifier_penalty() {
        let pattern = "a?".repeat(16);
        let report = ComplexityAnalyzer::new(100)
            .analyze(&ast::parse(&pattern).unwrap(), &pattern);
        assert!(report
            .findings
            .contains(&"excessive quantifiers".to_string()));
    }

    #[test]
    fn test_estimate_quick_path() {
        let analyzer = ComplexityAnalyzer::new(100);
        let estimate =
            |pattern: &str| analyzer.estimate(&ast::parse(pattern).unwrap());

        assert_eq!(estimate("hello"), Complexity::Constant);
        assert_eq!(estimate("a+"), Complexity::Linear);
        assert_eq!(estimate(r"\d*\d+"), Complexity::Quadratic);
        assert_eq!(estimate("(a+)+"), Complexity::Exponential);
    }
}
