//! Public vocabulary shared across the analyzer.
//!
//! This module provides the record types returned by the public API:
//! severity levels, issue kinds, the complexity report, pump patterns, and
//! the options record with its three built-in profiles.

use std::time::Duration;

use serde::{Deserialize, Serialize};

// =============================================================================
// Severity and issue kinds
// =============================================================================

/// Severity level for a detected issue.
///
/// Ordered from least to most severe, so `>=` comparisons work the way a
/// reporting threshold expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Informational, no immediate risk
    Info,
    /// Minor concern
    Low,
    /// Potentially problematic
    Medium,
    /// Very likely to be exploited
    High,
    /// Will definitely cause catastrophic backtracking
    Critical,
}

impl Default for Severity {
    fn default() -> Self {
        Self::Info
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" | "informational" => Ok(Self::Info),
            "low" => Ok(Self::Low),
            "medium" | "med" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            "critical" | "crit" => Ok(Self::Critical),
            _ => Err(format!("Unknown severity: {s}")),
        }
    }
}

/// The kind of problem detected in a pattern.
///
/// This is a closed set; every detector rule maps to exactly one kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// Nested quantifiers like `(a+)+`
    NestedQuantifiers,
    /// Alternation branches that can match the same prefix, like `(a|ab)+`
    OverlappingAlternation,
    /// Exponential backtracking (EDA)
    ExponentialBacktracking,
    /// Polynomial backtracking (IDA)
    PolynomialBacktracking,
    /// Quantifier nesting deeper than the structural threshold
    ExcessiveNesting,
    /// More quantifiers than the structural threshold
    TooManyQuantifiers,
    /// Pattern exceeds the detector's hard length limit
    PatternTooLong,
    /// Ambiguous matching behavior not covered by a more specific kind
    AmbiguousPattern,
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NestedQuantifiers => write!(f, "nested_quantifiers"),
            Self::OverlappingAlternation => write!(f, "overlapping_alternation"),
            Self::ExponentialBacktracking => write!(f, "exponential_backtracking"),
            Self::PolynomialBacktracking => write!(f, "polynomial_backtracking"),
            Self::ExcessiveNesting => write!(f, "excessive_nesting"),
            Self::TooManyQuantifiers => write!(f, "too_many_quantifiers"),
            Self::PatternTooLong => write!(f, "pattern_too_long"),
            Self::AmbiguousPattern => write!(f, "ambiguous_pattern"),
        }
    }
}

// =============================================================================
// Position and Issue
// =============================================================================

/// A location inside the analyzed pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    /// Starting byte offset in the pattern
    pub start: usize,
    /// Ending byte offset in the pattern
    pub end: usize,
    /// Line number (1-indexed)
    pub line: usize,
    /// Column number (1-indexed)
    pub column: usize,
}

impl Position {
    /// A span covering `start..end` on the first line.
    #[must_use]
    pub fn span(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            line: 1,
            column: start + 1,
        }
    }
}

/// A detected problem in a regex pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// The kind of issue detected
    pub kind: IssueKind,

    /// How serious the issue is
    pub severity: Severity,

    /// Where in the pattern the issue occurs
    pub position: Position,

    /// The problematic sub-pattern
    pub pattern: String,

    /// Human-readable description of the issue
    pub message: String,

    /// An example adversarial input that exploits this issue
    pub example: String,

    /// Guidance on how to fix the issue
    pub suggestion: String,

    /// Local complexity contribution (0-100)
    pub complexity: u32,
}

impl Issue {
    /// Create a new issue with required fields.
    #[must_use]
    pub fn new(
        kind: IssueKind,
        severity: Severity,
        position: Position,
        pattern: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            severity,
            position,
            pattern: pattern.into(),
            message: message.into(),
            example: String::new(),
            suggestion: String::new(),
            complexity: 0,
        }
    }

    /// Attach an example adversarial input.
    #[must_use]
    pub fn with_example(mut self, example: impl Into<String>) -> Self {
        self.example = example.into();
        self
    }

    /// Attach remediation advice.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }

    /// Attach the local complexity contribution.
    #[must_use]
    pub fn with_complexity(mut self, complexity: u32) -> Self {
        self.complexity = complexity;
        self
    }
}

// =============================================================================
// Complexity classes and the analysis report
// =============================================================================

/// Asymptotic time or space complexity classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Complexity {
    /// O(1)
    Constant,
    /// O(n)
    Linear,
    /// O(n²)
    Quadratic,
    /// O(n³)
    Cubic,
    /// O(n^k) for k > 3
    Polynomial,
    /// O(2^n)
    Exponential,
    /// Indeterminate
    Unknown,
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Constant => write!(f, "O(1)"),
            Self::Linear => write!(f, "O(n)"),
            Self::Quadratic => write!(f, "O(n²)"),
            Self::Cubic => write!(f, "O(n³)"),
            Self::Polynomial => write!(f, "O(n^k)"),
            Self::Exponential => write!(f, "O(2^n)"),
            Self::Unknown => write!(f, "O(?)"),
        }
    }
}

impl Complexity {
    /// The mathematical Big-O notation, identical to `Display`.
    #[must_use]
    pub fn big_o(&self) -> String {
        self.to_string()
    }
}

/// Structural metrics about a pattern.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Maximum quantifier nesting depth
    pub nesting_depth: usize,
    /// Total number of quantifiers
    pub quantifier_count: usize,
    /// Number of alternation nodes
    pub alternation_count: usize,
}

/// Detailed complexity analysis results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComplexityScore {
    /// Overall complexity score (0-100). Lower is better.
    pub overall: u32,

    /// Estimated worst-case time complexity
    pub time_complexity: Complexity,

    /// Estimated space complexity
    pub space_complexity: Complexity,

    /// Whether Exponential Degree of Ambiguity was detected
    pub has_eda: bool,

    /// Whether Infinite (polynomial) Degree of Ambiguity was detected
    pub has_ida: bool,

    /// Degree of polynomial backtracking (2 = quadratic, 3 = cubic, ...).
    /// Zero unless `has_ida` is set.
    pub polynomial_degree: usize,

    /// Structural metrics about the pattern
    pub metrics: Metrics,

    /// Example input that triggers worst-case behavior.
    /// Empty unless the pattern scored at or above the unsafe threshold.
    pub worst_case_input: String,

    /// Pump components for generating adversarial inputs
    pub pump_components: Vec<String>,

    /// Human-readable explanation of the complexity analysis
    pub explanation: String,

    /// Whether the pattern is considered safe
    pub safe: bool,
}

// =============================================================================
// Pump patterns
// =============================================================================

/// A recipe for generating adversarial inputs by "pumping" a repeated
/// component between a fixed prefix and a failing suffix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PumpPattern {
    /// Initial string before the pumped section
    pub prefix: String,

    /// The repeating components
    pub pumps: Vec<String>,

    /// Final string after the pumped section, typically a character that
    /// cannot match, forcing the engine to backtrack
    pub suffix: String,

    /// Whether pumps are interleaved (`p0 p1 p0 p1 ...`) rather than
    /// concatenated (`p0^n p1^n ...`)
    pub interleave: bool,

    /// What this pump pattern demonstrates
    pub description: String,
}

impl PumpPattern {
    /// Create an adversarial input with every pump repeated `size` times.
    #[must_use]
    pub fn generate(&self, size: usize) -> String {
        if size == 0 {
            return format!("{}{}", self.prefix, self.suffix);
        }

        let mut result = String::with_capacity(
            self.prefix.len()
                + self.suffix.len()
                + size * self.pumps.iter().map(String::len).sum::<usize>(),
        );
        result.push_str(&self.prefix);

        if self.interleave {
            for _ in 0..size {
                for pump in &self.pumps {
                    result.push_str(pump);
                }
            }
        } else {
            for pump in &self.pumps {
                for _ in 0..size {
                    result.push_str(pump);
                }
            }
        }

        result.push_str(&self.suffix);
        result
    }

    /// Create a sequence of adversarial inputs with increasing sizes.
    ///
    /// `start` is clamped to at least 1 and `step` to a positive stride.
    #[must_use]
    pub fn generate_sequence(&self, start: usize, end: usize, step: usize) -> Vec<String> {
        let start = start.max(1);
        let step = step.max(1);

        let mut sequence = Vec::new();
        let mut size = start;
        while size <= end {
            sequence.push(self.generate(size));
            size += step;
        }
        sequence
    }
}

// =============================================================================
// Validation modes, check flags, and options
// =============================================================================

/// Depth of analysis performed during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationMode {
    /// Quick AST heuristics only (~microseconds). Best for hot paths.
    Fast,
    /// Heuristics plus NFA ambiguity detection (~milliseconds).
    /// Recommended for most use cases.
    Balanced,
    /// All checks plus adversarial input generation.
    /// Best for configuration validation and security auditing.
    Thorough,
}

impl Default for ValidationMode {
    fn default() -> Self {
        Self::Balanced
    }
}

impl std::fmt::Display for ValidationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fast => write!(f, "fast"),
            Self::Balanced => write!(f, "balanced"),
            Self::Thorough => write!(f, "thorough"),
        }
    }
}

/// Bitmask of checks to perform during validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CheckFlags(u32);

impl CheckFlags {
    /// Detect nested quantifiers like `(a+)+`, `(x*)*`.
    pub const NESTED_QUANTIFIERS: CheckFlags = CheckFlags(1);
    /// Detect alternations with overlapping branches like `(a|ab)+`.
    pub const OVERLAPPING_ALTERNATION: CheckFlags = CheckFlags(1 << 1);
    /// Detect patterns that cause catastrophic backtracking.
    pub const CATASTROPHIC_BACKTRACK: CheckFlags = CheckFlags(1 << 2);
    /// Detect unbounded repetition without anchors like `.*password.*`.
    pub const UNBOUNDED_REPETITION: CheckFlags = CheckFlags(1 << 3);
    /// Detect patterns with exponentially many matching paths.
    pub const EXPONENTIAL_PATHS: CheckFlags = CheckFlags(1 << 4);
    /// Calculate and validate complexity scores.
    pub const COMPLEXITY_SCORE: CheckFlags = CheckFlags(1 << 5);
    /// Estimate memory usage for pattern matching.
    pub const MEMORY_USAGE: CheckFlags = CheckFlags(1 << 6);
    /// Perform NFA analysis to detect EDA and IDA.
    pub const NFA_AMBIGUITY: CheckFlags = CheckFlags(1 << 7);
    /// Detect and calculate polynomial backtracking degree.
    pub const POLYNOMIAL_DEGREE: CheckFlags = CheckFlags(1 << 8);
    /// Analyze pattern context and ordering for safety.
    pub const CONTEXT_AWARENESS: CheckFlags = CheckFlags(1 << 9);

    /// All available checks.
    pub const ALL: CheckFlags = CheckFlags((1 << 10) - 1);

    /// The most important checks for typical use cases.
    pub const DEFAULT: CheckFlags = CheckFlags(
        Self::NESTED_QUANTIFIERS.0
            | Self::OVERLAPPING_ALTERNATION.0
            | Self::CATASTROPHIC_BACKTRACK.0
            | Self::NFA_AMBIGUITY.0,
    );

    /// No checks.
    #[must_use]
    pub const fn empty() -> Self {
        CheckFlags(0)
    }

    /// Whether every flag in `other` is enabled in `self`.
    #[must_use]
    pub const fn contains(self, other: CheckFlags) -> bool {
        self.0 & other.0 == other.0
    }

    /// The raw bit representation.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }
}

impl Default for CheckFlags {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::ops::BitOr for CheckFlags {
    type Output = CheckFlags;

    fn bitor(self, rhs: CheckFlags) -> CheckFlags {
        CheckFlags(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for CheckFlags {
    fn bitor_assign(&mut self, rhs: CheckFlags) {
        self.0 |= rhs.0;
    }
}

/// Configuration for validation and analysis.
///
/// `timeout` is carried for calling harnesses that bound analysis time;
/// the core itself never blocks and never enforces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Options {
    /// Depth of analysis
    pub mode: ValidationMode,

    /// Time budget surfaced to callers (not enforced by the core)
    pub timeout: Duration,

    /// Which checks to perform
    pub checks: CheckFlags,

    /// Maximum acceptable complexity score (0-100)
    pub max_complexity_score: u32,

    /// Maximum allowed pattern length in bytes (0 = unbounded)
    pub max_pattern_length: usize,

    /// Maximum allowed quantifier nesting depth
    pub max_nesting_depth: usize,

    /// Maximum number of quantifiers allowed
    pub max_quantifiers: usize,

    /// Treat any issue as rendering the pattern unsafe
    pub strict_mode: bool,

    /// Skip validation entirely (passthrough mode)
    pub allow_unsafe: bool,
}

impl Default for Options {
    /// The recommended default configuration (balanced mode).
    fn default() -> Self {
        Self {
            mode: ValidationMode::Balanced,
            timeout: Duration::from_millis(100),
            checks: CheckFlags::DEFAULT,
            max_complexity_score: 70,
            max_pattern_length: 1000,
            max_nesting_depth: 3,
            max_quantifiers: 20,
            strict_mode: false,
            allow_unsafe: false,
        }
    }
}

impl Options {
    /// Options optimized for speed (hot paths, user-input validation).
    #[must_use]
    pub fn fast() -> Self {
        Self {
            mode: ValidationMode::Fast,
            timeout: Duration::from_millis(10),
            checks: CheckFlags::NESTED_QUANTIFIERS | CheckFlags::CATASTROPHIC_BACKTRACK,
            ..Self::default()
        }
    }

    /// Options for comprehensive analysis (security auditing).
    #[must_use]
    pub fn thorough() -> Self {
        Self {
            mode: ValidationMode::Thorough,
            timeout: Duration::from_secs(1),
            checks: CheckFlags::ALL,
            max_complexity_score: 100,
            max_pattern_length: 2000,
            max_nesting_depth: 5,
            max_quantifiers: 50,
            strict_mode: true,
            allow_unsafe: false,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
