//! Exact real algebra for cylindrical algebraic decomposition.
//!
//! This crate provides the arithmetic layer used by `cadkit-cad`:
//!
//! - [`Polynomial`]: sparse multivariate polynomials over the rationals,
//!   with pseudo-division, gcd, square-free decomposition, resultants,
//!   discriminants and principal subresultant coefficients
//! - [`UnivariatePolynomial`]: dense univariate polynomials with Sturm
//!   sequences and root counting
//! - [`Interval`]: rational intervals with strict, weak and infinite bounds
//! - [`RealAlgebraicNumber`]: exact real algebraic numbers with lazy
//!   interval refinement
//! - [`real_roots`] / [`IncrementalRootFinder`]: real root isolation with
//!   several splitting strategies
//! - [`sign_at`] / [`real_roots_at`]: evaluation at real algebraic points
//!
//! All arithmetic is exact; floating point is only used to guess split
//! points during root isolation.

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod algebraic;
pub mod error;
pub mod interval;
pub mod polynomial;
pub mod rootfinder;
pub mod sign;
pub mod univariate;

pub use algebraic::{real_roots_at, sign_at, RealAlgebraicNumber, RealAlgebraicPoint, RealRootsAt};
pub use error::{AlgebraicError, AlgebraicResult};
pub use interval::{BoundType, Interval};
pub use polynomial::resultant::{
    discriminant, resultant, ResultantComputer, ResultantConfig, ResultantMethod, ResultantStats,
};
pub use polynomial::{Monomial, Polynomial, Term, Var, VarPower, NULL_VAR};
pub use rootfinder::{
    real_roots, IncrementalRootFinder, RootFinderConfig, RootFinderStats, SplittingStrategy,
};
pub use sign::Sign;
pub use univariate::UnivariatePolynomial;

pub use num_bigint::BigInt;
pub use num_rational::BigRational;
