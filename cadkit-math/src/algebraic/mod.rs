//! Real algebraic numbers and points.
//!
//! Provides exact real algebraic numbers, tuples of them, and evaluation of
//! multivariate polynomials at such tuples.

mod evaluation;
mod number;
mod point;

pub use evaluation::{real_roots_at, sign_at, RealRootsAt};
pub use number::RealAlgebraicNumber;
pub use point::RealAlgebraicPoint;
