//! Pattern detection: structural rules that turn an AST into typed issues.
//!
//! The detector layers its rules by [`ValidationMode`]:
//!
//! - **Fast** runs pure AST heuristics: size and depth thresholds, nested
//!   quantifiers, overlapping alternation branches, and a fixed table of
//!   known polynomial shapes.
//! - **Balanced** additionally asks the [`NfaAnalyzer`] for EDA/IDA
//!   evidence; if the automaton cannot be built, detection silently
//!   degrades to the fast results.
//! - **Thorough** reserves a slot for adversarial execution testing.
//!
//! Issues are emitted in rule order. Duplicates (same kind, same pattern
//! fragment) are allowed here; the public API deduplicates.

pub mod nfa_analysis;

pub use nfa_analysis::NfaAnalyzer;

use tracing::debug;

use crate::ast::{self, Ast};
use crate::types::{Issue, IssueKind, Options, Position, Severity, ValidationMode};

/// Hard length limit checked by the fast rules, independent of the
/// configurable `max_pattern_length` boundary check.
const PATTERN_LENGTH_LIMIT: usize = 10_000;

/// Nesting depth above which a pattern is structurally suspect.
const NESTING_DEPTH_LIMIT: usize = 5;

/// Quantifier count above which a pattern is structurally suspect.
const QUANTIFIER_COUNT_LIMIT: usize = 20;

/// Known polynomial-backtracking shapes matched as raw substrings.
const DANGEROUS_SHAPES: &[&str] = &[
    "a*a+", "a+a*", "a*a*",
    r"\d*\d+", r"\d+\d*", r"\d*\d*",
    r"\w*\w+", r"\w+\w*", r"\w*\w*",
    ".*.", ".+.", ".*.*",
];

/// Detector running the rule set selected by the validation mode.
#[derive(Debug)]
pub struct Detector {
    mode: ValidationMode,
}

impl Detector {
    #[must_use]
    pub fn new(opts: &Options) -> Self {
        Self { mode: opts.mode }
    }

    /// Analyze a parsed pattern and return the detected issues.
    #[must_use]
    pub fn detect(&self, tree: &Ast, pattern: &str) -> Vec<Issue> {
        let mut issues = self.fast_checks(tree, pattern);

        match self.mode {
            ValidationMode::Fast => {}
            ValidationMode::Balanced => {
                issues.extend(self.balanced_checks(tree, pattern));
            }
            ValidationMode::Thorough => {
                issues.extend(self.balanced_checks(tree, pattern));
                issues.extend(self.thorough_checks());
            }
        }

        issues
    }

    // =========================================================================
    // Fast rules: pure AST, no automaton
    // =========================================================================

    fn fast_checks(&self, tree: &Ast, pattern: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        let whole = Position::span(0, pattern.len());

        // 1. Pattern length
        if pattern.len() > PATTERN_LENGTH_LIMIT {
            issues.push(
                Issue::new(
                    IssueKind::PatternTooLong,
                    Severity::High,
                    whole,
                    pattern,
                    format!(
                        "Pattern exceeds maximum length ({PATTERN_LENGTH_LIMIT} characters): {} characters",
                        pattern.len()
                    ),
                )
                .with_suggestion("Consider breaking the pattern into multiple smaller patterns"),
            );
        }

        // 2. Nesting depth
        let nesting_depth = tree.nesting_depth();
        if nesting_depth > NESTING_DEPTH_LIMIT {
            issues.push(
                Issue::new(
                    IssueKind::ExcessiveNesting,
                    Severity::High,
                    whole,
                    pattern,
                    format!(
                        "Excessive quantifier nesting depth: {nesting_depth} (threshold: {NESTING_DEPTH_LIMIT})"
                    ),
                )
                .with_example("aaa")
                .with_suggestion("Reduce nesting depth by simplifying quantifiers")
                .with_complexity(nesting_depth as u32 * 15),
            );
        }

        // 3. Quantifier count
        let quantifier_count = tree.count_quantifiers();
        if quantifier_count > QUANTIFIER_COUNT_LIMIT {
            issues.push(
                Issue::new(
                    IssueKind::TooManyQuantifiers,
                    Severity::Medium,
                    whole,
                    pattern,
                    format!(
                        "Excessive quantifiers: {quantifier_count} (threshold: {QUANTIFIER_COUNT_LIMIT})"
                    ),
                )
                .with_suggestion("Simplify the pattern to reduce quantifier count")
                .with_complexity(quantifier_count as u32 * 3),
            );
        }

        // 4. Nested quantifiers, the prototypical exponential shape
        issues.extend(self.detect_nested_quantifiers(tree, pattern));

        // 5. Overlapping alternation branches
        issues.extend(self.detect_overlapping_alternations(tree, pattern));

        // 6. Known dangerous substring shapes
        issues.extend(self.detect_dangerous_shapes(pattern));

        issues
    }

    /// One issue per quantifier that wraps another quantifier, e.g. `(a+)+`.
    fn detect_nested_quantifiers(&self, tree: &Ast, pattern: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        let whole = Position::span(0, pattern.len());

        ast::walk(tree, &mut |node| {
            if !node.is_quantifier() {
                return true;
            }
            if node.children().iter().any(Ast::has_quantifier) {
                let fragment = node.to_string();
                issues.push(
                    Issue::new(
                        IssueKind::NestedQuantifiers,
                        Severity::Critical,
                        whole,
                        fragment.as_str(),
                        format!("Nested quantifiers detected: {fragment}"),
                    )
                    .with_example(nested_quantifier_example(node))
                    .with_suggestion("Remove nesting: simplify to a single quantifier")
                    .with_complexity(90),
                );
            }
            true
        });

        issues
    }

    /// One issue per alternation whose branches can match a shared prefix.
    fn detect_overlapping_alternations(&self, tree: &Ast, pattern: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        let whole = Position::span(0, pattern.len());

        ast::walk(tree, &mut |node| {
            let Ast::Alternate(branches) = node else {
                return true;
            };
            if branches.len() < 2 {
                return true;
            }

            'pairs: for i in 0..branches.len() {
                for j in i + 1..branches.len() {
                    if branches_overlap(&branches[i], &branches[j]) {
                        let fragment = node.to_string();
                        issues.push(
                            Issue::new(
                                IssueKind::OverlappingAlternation,
                                Severity::High,
                                whole,
                                fragment.as_str(),
                                format!("Overlapping alternation branches: {fragment}"),
                            )
                            .with_example("ababababx")
                            .with_suggestion("Reorder branches or use atomic grouping")
                            .with_complexity(70),
                        );
                        break 'pairs;
                    }
                }
            }
            true
        });

        issues
    }

    /// Substring heuristics for shapes known to backtrack polynomially.
    fn detect_dangerous_shapes(&self, pattern: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        let whole = Position::span(0, pattern.len());

        if pattern.contains("*.*") || pattern.contains("+.+") {
            issues.push(
                Issue::new(
                    IssueKind::PolynomialBacktracking,
                    Severity::High,
                    whole,
                    pattern,
                    "Overlapping unbounded quantifiers detected",
                )
                .with_example("aaaaaaaax")
                .with_suggestion("Use possessive quantifiers or atomic grouping")
                .with_complexity(60),
            );
        }

        for shape in DANGEROUS_SHAPES {
            if pattern.contains(shape) {
                issues.push(
                    Issue::new(
                        IssueKind::PolynomialBacktracking,
                        Severity::High,
                        whole,
                        *shape,
                        format!("Potentially dangerous pattern detected: {shape}"),
                    )
                    .with_example("aaaaaaax")
                    .with_suggestion("Consolidate or reorder quantifiers")
                    .with_complexity(65),
                );
            }
        }

        issues
    }

    // =========================================================================
    // Balanced and thorough layers
    // =========================================================================

    fn balanced_checks(&self, tree: &Ast, pattern: &str) -> Vec<Issue> {
        match NfaAnalyzer::new().analyze(tree, pattern) {
            Ok(issues) => issues,
            Err(err) => {
                // Degrade silently to the fast results.
                debug!(%err, "NFA analysis failed; falling back to fast checks");
                Vec::new()
            }
        }
    }

    fn thorough_checks(&self) -> Vec<Issue> {
        // Reserved for adversarial execution testing.
        Vec::new()
    }
}

/// Example input for a nested-quantifier issue, shaped by the outer
/// quantifier kind.
fn nested_quantifier_example(node: &Ast) -> &'static str {
    match node {
        Ast::Star(_) | Ast::Plus(_) => "aaaaaa",
        Ast::Quest(_) => "a",
        _ => "test",
    }
}

/// Whether two alternation branches can match the same prefix of some
/// input. Deliberately over-approximates.
pub(crate) fn branches_overlap(a: &Ast, b: &Ast) -> bool {
    // Unwrap captures to get at the content.
    let mut a = a;
    while let Ast::Capture { node, .. } = a {
        a = node;
    }
    let mut b = b;
    while let Ast::Capture { node, .. } = b {
        b = node;
    }

    // One branch's string form a prefix of the other's.
    let a_str = a.to_string();
    let b_str = b.to_string();
    if !a_str.is_empty()
        && !b_str.is_empty()
        && (a_str.starts_with(&b_str) || b_str.starts_with(&a_str))
    {
        return true;
    }

    match (a, b) {
        // Literals sharing their first character.
        (Ast::Literal(ca), Ast::Literal(cb)) => {
            matches!((ca.first(), cb.first()), (Some(x), Some(y)) if x == y)
        }
        // Sequences overlap when their heads overlap.
        (Ast::Concat(sa), Ast::Concat(sb)) => match (sa.first(), sb.first()) {
            (Some(x), Some(y)) => branches_overlap(x, y),
            _ => false,
        },
        (Ast::Concat(sa), Ast::Literal(_)) => {
            sa.first().is_some_and(|x| branches_overlap(x, b))
        }
        (Ast::Literal(_), Ast::Concat(sb)) => {
            sb.first().is_some_and(|y| branches_overlap(a, y))
        }
        // Two wide classes always share characters.
        (
            Ast::AnyChar | Ast::AnyCharNoNewline | Ast::CharClass { .. },
            Ast::AnyChar | Ast::AnyCharNoNewline | Ast::CharClass { .. },
        ) => true,
        _ => false,
    }
}

// =============================================================================
// Tests
// =============================================================================
