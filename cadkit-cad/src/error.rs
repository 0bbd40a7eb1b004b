//! Error types for the CAD engine.

use cadkit_math::{AlgebraicError, Var};
use thiserror::Error;

/// Errors raised by the CAD engine on malformed input.
///
/// Unsatisfiability is never an error; it is reported as
/// [`Answer::Unsat`](crate::Answer::Unsat).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CadError {
    /// A constraint mentions a variable the CAD does not know.
    #[error("unknown variable x{0}")]
    UnknownVariable(Var),

    /// A bound refers to a level outside the variable list or is empty.
    #[error("invalid bounds for variable index {var}")]
    InvalidBounds {
        /// The offending variable index.
        var: usize,
    },

    /// An algebraic construction failed.
    #[error(transparent)]
    Algebraic(#[from] AlgebraicError),
}

/// Result type for CAD operations.
pub type CadResult<T> = Result<T, CadError>;
