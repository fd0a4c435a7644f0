//! Central error types for regrade.
//!
//! Uses `thiserror` for ergonomic error definitions with automatic
//! `Display` implementations.
//!
//! Errors follow a two-tier design: the kinds below abort an analysis
//! (structural problems with the input pattern), while soft findings are
//! collected as [`crate::Issue`] values and never short-circuit.

use thiserror::Error;

/// Main error type for the library.
///
/// Callers distinguish kinds by matching on the variant, not by parsing
/// message content.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The pattern is syntactically invalid under the supported dialect.
    #[error("invalid regex pattern: {message}")]
    InvalidPattern { message: String },

    /// The pattern exceeds the configured maximum length.
    #[error("pattern too long: {length} > {max}")]
    PatternTooLong { length: usize, max: usize },

    /// The analysis exceeded the configured timeout.
    ///
    /// The core never enforces timeouts itself; this kind exists for
    /// calling harnesses that bound analysis time around the library.
    #[error("analysis timeout exceeded")]
    Timeout,

    /// The pattern uses a regex feature outside the Thompson subset
    /// (backreferences, lookaround, conditionals, ...).
    #[error("unsupported regex feature: {feature}")]
    UnsupportedFeature { feature: String },
}

/// Convenience type alias for Results using [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create an `InvalidPattern` error with a position annotation.
    #[inline]
    pub(crate) fn invalid_at(message: impl Into<String>, pos: usize) -> Self {
        Error::InvalidPattern {
            message: format!("{} (at offset {pos})", message.into()),
        }
    }

    /// Create an `UnsupportedFeature` error naming the rejected feature.
    #[inline]
    pub(crate) fn unsupported(feature: impl Into<String>) -> Self {
        Error::UnsupportedFeature {
            feature: feature.into(),
        }
    }
}
