//! Static ReDoS analysis for regular expressions.
//!
//! The library predicts whether a backtracking matcher will exhibit
//! catastrophic runtime on a given pattern, using formal automata theory:
//! it detects both exponential (EDA) and polynomial (IDA) degrees of
//! ambiguity, aggregates structural metrics into a 0-100 complexity score,
//! and synthesizes adversarial "pump" inputs for unsafe patterns.
//!
//! # Quick safety check
//!
//! ```
//! assert!(regrade::is_safe("^[a-z]+$"));
//! assert!(!regrade::is_safe("(a+)+"));
//! ```
//!
//! # Detailed validation
//!
//! ```
//! let issues = regrade::validate("(a+)+").unwrap();
//! assert!(!issues.is_empty());
//! for issue in &issues {
//!     println!("{}: {}", issue.severity, issue.message);
//! }
//! ```
//!
//! # Complexity analysis
//!
//! ```
//! let score = regrade::analyze_complexity("(a+)+").unwrap();
//! assert!(score.has_eda);
//! assert!(!score.safe);
//! println!("worst case: {}", score.worst_case_input);
//! ```
//!
//! The analyzer is pure: it performs no I/O, holds no state between
//! invocations, and two calls with identical inputs produce byte-identical
//! results. Parsing failures and unsupported features surface as typed
//! [`Error`] values; soft findings accumulate as [`Issue`]s.

pub mod analyzer;
pub mod ast;
pub mod detector;
pub mod error;
pub mod nfa;
pub mod pump;
pub mod types;

use rustc_hash::FxHashSet;
use tracing::debug;

use crate::analyzer::{ComplexityAnalyzer, TimeClass, UNSAFE_SCORE_THRESHOLD};
use crate::detector::Detector;
use crate::pump::Generator;

pub use crate::error::{Error, Result};
pub use crate::types::{
    CheckFlags, Complexity, ComplexityScore, Issue, IssueKind, Metrics, Options, Position,
    PumpPattern, Severity, ValidationMode,
};

/// Pump size used for the report's worst-case input.
const WORST_CASE_PUMP_SIZE: usize = 20;

/// Quick safety check with strict fast-mode settings.
///
/// Returns `false` on any issue or any error, making it suitable for
/// guarding hot paths:
///
/// ```
/// if !regrade::is_safe("(a+)+") {
///     // reject the pattern
/// }
/// ```
#[must_use]
pub fn is_safe(pattern: &str) -> bool {
    let mut opts = Options::fast();
    opts.strict_mode = true;
    match validate_with_options(pattern, &opts) {
        Ok(issues) => issues.is_empty(),
        Err(_) => false,
    }
}

/// Analyze a pattern with default options (balanced mode) and return all
/// detected issues.
///
/// An empty list means no structural risk was found. Errors indicate the
/// pattern could not be analyzed at all (syntax error, unsupported
/// feature, oversized input).
pub fn validate(pattern: &str) -> Result<Vec<Issue>> {
    validate_with_options(pattern, &Options::default())
}

/// Analyze a pattern with custom options.
pub fn validate_with_options(pattern: &str, opts: &Options) -> Result<Vec<Issue>> {
    if opts.allow_unsafe {
        return Ok(Vec::new());
    }

    if opts.max_pattern_length > 0 && pattern.len() > opts.max_pattern_length {
        return Err(Error::PatternTooLong {
            length: pattern.len(),
            max: opts.max_pattern_length,
        });
    }

    let tree = ast::parse(pattern)?;
    debug!(mode = %opts.mode, "validating pattern");

    let issues = Detector::new(opts).detect(&tree, pattern);
    Ok(dedup_issues(issues))
}

/// Perform detailed complexity analysis on a pattern.
///
/// Runs the thorough profile: full scoring, EDA/IDA classification, and,
/// for patterns at or above the unsafe threshold, adversarial input
/// generation.
pub fn analyze_complexity(pattern: &str) -> Result<ComplexityScore> {
    let opts = Options::thorough();
    let tree = ast::parse(pattern)?;

    let report = ComplexityAnalyzer::new(opts.max_complexity_score).analyze(&tree, pattern);

    // Pump generation is supplementary; an empty result is not an error.
    let mut worst_case_input = String::new();
    let mut pump_components = Vec::new();
    if report.score >= UNSAFE_SCORE_THRESHOLD {
        if let Some(shape) = Generator::new().generate(&tree).into_iter().next() {
            let pump = PumpPattern {
                prefix: shape.prefix,
                pumps: vec![shape.component],
                suffix: shape.suffix,
                interleave: false,
                description: shape.description,
            };
            worst_case_input = pump.generate(WORST_CASE_PUMP_SIZE);
            pump_components = pump.pumps;
        }
    }

    let has_eda = report.time_class == TimeClass::Exponential;
    let has_ida = report.time_class == TimeClass::Polynomial;

    Ok(ComplexityScore {
        overall: report.score,
        time_complexity: report.complexity,
        space_complexity: Complexity::Linear,
        has_eda,
        has_ida,
        polynomial_degree: if has_ida { report.degree } else { 0 },
        metrics: Metrics {
            nesting_depth: report.metrics.nesting_depth,
            quantifier_count: report.metrics.quantifier_count,
            alternation_count: report.metrics.alternation_count,
        },
        worst_case_input,
        pump_components,
        explanation: report.explanation,
        safe: report.score < UNSAFE_SCORE_THRESHOLD,
    })
}

/// Quick asymptotic estimate without a full scoring pass.
pub fn estimate_complexity(pattern: &str) -> Result<Complexity> {
    let tree = ast::parse(pattern)?;
    Ok(ComplexityAnalyzer::new(Options::default().max_complexity_score).estimate(&tree))
}

/// Drop issues repeating an earlier (kind, fragment) pair, keeping
/// first-emission order. The fast rules and the NFA analyzer can both
/// name the same fragment; reporting it twice helps no one.
fn dedup_issues(issues: Vec<Issue>) -> Vec<Issue> {
    let mut seen: FxHashSet<(IssueKind, String)> = FxHashSet::default();
    issues
        .into_iter()
        .filter(|issue| seen.insert((issue.kind, issue.pattern.clone())))
        .collect()
}

// =============================================================================
// Tests
// =============================================================================
