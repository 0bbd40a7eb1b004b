//! Property-based tests for cadkit-cad
//!
//! This module contains property tests for:
//! - Conflict graph degrees and UNSAT cores
//! - Elimination set provenance tracking
//! - Answers of simple univariate checks

mod check_properties;
mod conflict_graph_properties;
mod elimination_properties;
