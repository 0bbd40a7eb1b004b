//! Property-based tests for cadkit-math
//!
//! This module contains property tests for:
//! - Polynomial gcd, square-free parts and resultants
//! - Real root isolation and real algebraic number comparison

mod polynomial_properties;
mod root_properties;
