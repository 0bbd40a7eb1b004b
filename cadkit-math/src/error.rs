//! Error types for the algebraic layer.

use crate::interval::Interval;
use crate::polynomial::Var;
use thiserror::Error;

/// Errors raised when constructing algebraic objects from invalid input.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AlgebraicError {
    /// The zero polynomial has no isolated roots.
    #[error("zero polynomial has no isolated roots")]
    ZeroPolynomial,

    /// A univariate polynomial was expected.
    #[error("polynomial is not univariate in x{var}")]
    NotUnivariate {
        /// The expected variable.
        var: Var,
    },

    /// The interval does not contain exactly one root.
    #[error("interval {interval} contains {roots} roots instead of one")]
    NotIsolating {
        /// The offending interval.
        interval: Interval,
        /// Number of distinct roots inside.
        roots: usize,
    },

    /// The interval contains no number.
    #[error("empty interval")]
    EmptyInterval,
}

/// Result type for algebraic operations.
pub type AlgebraicResult<T> = Result<T, AlgebraicError>;
