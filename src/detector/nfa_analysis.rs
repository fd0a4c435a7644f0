//! NFA-based ambiguity analysis: EDA and IDA inference.
//!
//! Two complementary exponential tests run side by side. The automaton
//! test flags states whose epsilon closure is suspiciously large *and*
//! that can reach an epsilon cycle, the loop-within-a-loop signature.
//! The AST test independently looks for a quantifier wrapping another
//! quantifier, catching shapes the closure heuristic can miss.
//!
//! Polynomial (IDA) inference walks concatenations for runs of adjacent
//! quantifiers; a run of length L can split one input region L ways,
//! giving degree-L backtracking.

use tracing::debug;

use crate::ast::{self, Ast};
use crate::nfa::{Nfa, NfaError};
use crate::types::{Issue, IssueKind, Position, Severity};

/// Epsilon-closure size above which a state counts as ambiguous.
///
/// A bare quantifier loop closes over at most three states with this
/// construction; only stacked skip/loop edges exceed that.
const CLOSURE_AMBIGUITY_THRESHOLD: usize = 3;

/// EDA/IDA analyzer over the AST plus its Thompson automaton.
///
/// Stateless; create one per detection pass.
#[derive(Debug, Default)]
pub struct NfaAnalyzer;

impl NfaAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Run EDA and IDA detection. Fails only if the automaton cannot be
    /// built within its state budget; callers degrade to fast-only checks.
    pub fn analyze(&self, tree: &Ast, pattern: &str) -> Result<Vec<Issue>, NfaError> {
        let nfa = Nfa::from_ast(tree)?;

        let mut issues = self.detect_eda(&nfa, tree, pattern);
        issues.extend(self.detect_ida(tree, pattern));
        Ok(issues)
    }

    /// Exponential Degree of Ambiguity.
    fn detect_eda(&self, nfa: &Nfa, tree: &Ast, pattern: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        let position = Position::span(0, pattern.len());

        for state in nfa.states() {
            let closure_size = nfa.epsilon_closure(state.id).count_ones(..);
            if closure_size <= CLOSURE_AMBIGUITY_THRESHOLD {
                continue;
            }
            if nfa.has_epsilon_cycle_from(state.id) {
                debug!(state = state.id, closure_size, "ambiguous state on epsilon cycle");
                issues.push(
                    Issue::new(
                        IssueKind::ExponentialBacktracking,
                        Severity::Critical,
                        position,
                        pattern,
                        "Exponential ambiguity detected: multiple paths through quantifier",
                    )
                    .with_example("aaaaaaaaaaaax")
                    .with_suggestion("Remove nested quantifiers or use atomic grouping")
                    .with_complexity(95),
                );
            }
        }

        // Second opinion from the AST: closure sizes can miss nests whose
        // inner loop consumes input.
        if !nested_quantifier_fragments(tree).is_empty() {
            issues.push(
                Issue::new(
                    IssueKind::ExponentialBacktracking,
                    Severity::Critical,
                    position,
                    pattern,
                    "Nested quantifiers create exponential ambiguity",
                )
                .with_example("aaaaaaaax")
                .with_suggestion("Simplify quantifier nesting")
                .with_complexity(95),
            );
        }

        issues
    }

    /// Infinite (polynomial) Degree of Ambiguity.
    fn detect_ida(&self, tree: &Ast, pattern: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        let position = Position::span(0, pattern.len());

        for run_length in overlapping_quantifier_runs(tree) {
            let complexity_str = match run_length {
                2 => "O(n²)",
                3 => "O(n³)",
                _ => "O(n^k)",
            };
            let complexity = (50 + run_length as u32 * 10).min(90);

            issues.push(
                Issue::new(
                    IssueKind::PolynomialBacktracking,
                    Severity::High,
                    position,
                    pattern,
                    format!("Polynomial ambiguity detected: {complexity_str}"),
                )
                .with_example("aaaaaaax")
                .with_suggestion("Consolidate overlapping quantifiers or use possessive quantifiers")
                .with_complexity(complexity),
            );
        }

        issues
    }

    /// Estimate the degree of ambiguity for a pattern.
    ///
    /// Returns `(degree, is_exponential)`: the nested-quantifier match
    /// count when exponential, otherwise the longest overlapping run, and
    /// `(1, false)` for unambiguous patterns.
    #[must_use]
    pub fn ambiguity_degree(&self, tree: &Ast) -> (usize, bool) {
        let nested = nested_quantifier_fragments(tree);
        if !nested.is_empty() {
            return (nested.len(), true);
        }

        let max_run = overlapping_quantifier_runs(tree)
            .into_iter()
            .max()
            .unwrap_or(0);
        if max_run >= 2 {
            return (max_run, false);
        }

        (1, false)
    }
}

/// Pattern fragments of quantifiers that contain another quantifier.
pub(crate) fn nested_quantifier_fragments(tree: &Ast) -> Vec<String> {
    let mut fragments = Vec::new();
    ast::walk(tree, &mut |node| {
        if node.is_quantifier()
            && node.children().iter().any(Ast::has_quantifier)
        {
            fragments.push(node.to_string());
        }
        true
    });
    fragments
}

/// Lengths (≥ 2) of uninterrupted runs of quantifier children inside
/// `Concat` nodes.
///
/// Adjacent quantifiers are assumed to overlap unconditionally; comparing
/// their character sets would be more precise but the scoring constants
/// are calibrated against this conservative form.
pub(crate) fn overlapping_quantifier_runs(tree: &Ast) -> Vec<usize> {
    let mut runs = Vec::new();
    ast::walk(tree, &mut |node| {
        if let Ast::Concat(subs) = node {
            let mut current = 0usize;
            for sub in subs {
                if sub.is_quantifier() {
                    current += 1;
                } else {
                    if current >= 2 {
                        runs.push(current);
                    }
                    current = 0;
                }
            }
            if current >= 2 {
                runs.push(current);
            }
        }
        true
    });
    runs
}

// =============================================================================
// Tests
// =============================================================================
