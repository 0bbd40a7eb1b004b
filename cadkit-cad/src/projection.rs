//! Projection operators.
//!
//! A projection operator maps the polynomials of one elimination level to
//! polynomials in the remaining variables whose real roots contain the
//! projections of all points where the input polynomials change their
//! number or order of real roots.
//!
//! ## Operators
//!
//! - **McCallum**: discriminant and all non-constant coefficients of every
//!   polynomial; resultants of all pairs.
//! - **Brown**: like McCallum, but coefficients are skipped below one that
//!   provably does not vanish. Only sound for well-oriented input, so it is
//!   never the default.
//! - **Hong**: leading coefficients of the reducta down to the first
//!   non-vanishing one, and the principal subresultant coefficients of each
//!   reductum with its derivative (single) or with the partner (paired).
//!
//! ## References
//!
//! - McCallum: "An improved projection operation for cylindrical algebraic
//!   decomposition" (1998)
//! - Brown: "Improved projection for cylindrical algebraic decomposition"
//!   (2001)
//! - Hong: "An improvement of the projection operator in cylindrical
//!   algebraic decomposition" (1990)

use crate::elimination_set::{PolyId, Provenance};
use cadkit_math::{Polynomial, ResultantComputer, Var};
use std::fmt;
use tracing::trace;

/// Projection operator choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ProjectionOperator {
    /// McCallum's operator.
    #[default]
    McCallum,
    /// Brown's reduced operator.
    Brown,
    /// Hong's operator.
    Hong,
}

impl fmt::Display for ProjectionOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProjectionOperator::McCallum => write!(f, "McCallum"),
            ProjectionOperator::Brown => write!(f, "Brown"),
            ProjectionOperator::Hong => write!(f, "Hong"),
        }
    }
}

/// Receiver of projection results.
pub trait ProjectionSink {
    /// Accept a primitive, non-constant projection polynomial.
    fn insert(&mut self, poly: Polynomial, provenance: Provenance, avoid_single: bool);
}

impl ProjectionSink for Vec<(Polynomial, Provenance)> {
    fn insert(&mut self, poly: Polynomial, provenance: Provenance, _avoid_single: bool) {
        self.push((poly, provenance));
    }
}

/// Statistics for projection.
#[derive(Debug, Clone, Default)]
pub struct ProjectionStats {
    /// Single projections performed.
    pub single_projections: u64,
    /// Paired projections performed.
    pub paired_projections: u64,
    /// Polynomials handed to sinks.
    pub polynomials_produced: u64,
}

/// Provably nowhere zero: a non-zero constant or a definite polynomial.
fn does_not_vanish(p: &Polynomial) -> bool {
    !p.is_zero() && (p.is_constant() || p.is_definite())
}

/// Projection engine.
#[derive(Debug, Clone, Default)]
pub struct Projection {
    operator: ProjectionOperator,
    resultants: ResultantComputer,
    stats: ProjectionStats,
}

impl Projection {
    /// Create a projection engine for `operator`.
    pub fn new(operator: ProjectionOperator) -> Self {
        Self {
            operator,
            resultants: ResultantComputer::default_config(),
            stats: ProjectionStats::default(),
        }
    }

    /// The operator in use.
    pub fn operator(&self) -> ProjectionOperator {
        self.operator
    }

    /// Switch the operator.
    pub fn set_operator(&mut self, operator: ProjectionOperator) {
        self.operator = operator;
    }

    /// Projection polynomials of `p` alone, eliminating `var`.
    pub fn single(&mut self, p: &Polynomial, var: Var) -> Vec<Polynomial> {
        self.stats.single_projections += 1;
        let mut out = Vec::new();
        match self.operator {
            ProjectionOperator::McCallum => {
                out.push(self.resultants.discriminant(p, var));
                out.extend(p.coefficients(var));
            }
            ProjectionOperator::Brown => {
                out.push(self.resultants.discriminant(p, var));
                let lc = p.leading_coeff_wrt(var);
                if !does_not_vanish(&lc) {
                    let coeffs = p.coefficients(var);
                    if coeffs.iter().any(does_not_vanish) {
                        out.push(lc);
                    } else {
                        out.extend(coeffs);
                    }
                }
            }
            ProjectionOperator::Hong => {
                for r in reducta(p, var) {
                    out.push(r.leading_coeff_wrt(var));
                    let dr = r.derivative(var);
                    out.extend(self.resultants.psc_sequence(&r, &dr, var));
                }
            }
        }
        normalize(out)
    }

    /// Projection polynomials of the pair `p`, `q`, eliminating `var`.
    pub fn paired(&mut self, p: &Polynomial, q: &Polynomial, var: Var) -> Vec<Polynomial> {
        self.stats.paired_projections += 1;
        let out = match self.operator {
            ProjectionOperator::McCallum | ProjectionOperator::Brown => {
                vec![self.resultants.resultant(p, q, var)]
            }
            ProjectionOperator::Hong => {
                let mut out = Vec::new();
                for r in reducta(p, var) {
                    out.extend(self.resultants.psc_sequence(&r, q, var));
                }
                out
            }
        };
        normalize(out)
    }

    /// Project `p` (with id `id`) into `sink`.
    pub fn project_single<S: ProjectionSink>(&mut self, p: &Polynomial, var: Var, id: PolyId, sink: &mut S) {
        let results = self.single(p, var);
        trace!(%p, produced = results.len(), "single projection");
        for r in results {
            self.stats.polynomials_produced += 1;
            sink.insert(r, Provenance::Single(id), false);
        }
    }

    /// Project the pair `p`, `q` (with ids `a`, `b`) into `sink`.
    pub fn project_paired<S: ProjectionSink>(
        &mut self,
        p: &Polynomial,
        q: &Polynomial,
        var: Var,
        (a, b): (PolyId, PolyId),
        sink: &mut S,
    ) {
        let results = self.paired(p, q, var);
        trace!(%p, %q, produced = results.len(), "paired projection");
        for r in results {
            self.stats.polynomials_produced += 1;
            sink.insert(r, Provenance::pair(a, b), false);
        }
    }

    /// Get statistics.
    pub fn stats(&self) -> &ProjectionStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats = ProjectionStats::default();
        self.resultants.reset_stats();
    }
}

/// The reducta of `p` with positive degree in `var`, down to and including
/// the first one whose leading coefficient does not vanish.
fn reducta(p: &Polynomial, var: Var) -> Vec<Polynomial> {
    let mut out = Vec::new();
    let mut r = p.clone();
    while r.degree(var) > 0 {
        let stop = does_not_vanish(&r.leading_coeff_wrt(var));
        let next = r.reductum(var);
        out.push(r);
        if stop {
            break;
        }
        r = next;
    }
    out
}

/// Primitive parts of the non-constant results, without duplicates.
fn normalize(polys: Vec<Polynomial>) -> Vec<Polynomial> {
    let mut out: Vec<Polynomial> = Vec::with_capacity(polys.len());
    for p in polys {
        if p.is_constant() {
            continue;
        }
        let p = p.primitive();
        if !out.contains(&p) {
            out.push(p);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coeffs: &[(i64, &[(Var, u32)])]) -> Polynomial {
        Polynomial::from_coeffs_int(coeffs)
    }

    fn id(slot: usize) -> PolyId {
        PolyId::new(0, slot)
    }

    #[test]
    fn test_mccallum_circle() {
        // x^2 + y^2 - 1 eliminating x gives the discriminant ~ y^2 - 1
        let circle = poly(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
        let mut proj = Projection::new(ProjectionOperator::McCallum);
        let out = proj.single(&circle, 0);
        assert_eq!(out, vec![poly(&[(1, &[(1, 2)]), (-1, &[])])]);
    }

    #[test]
    fn test_mccallum_coefficients() {
        // y x^2 + x - 1: discriminant 1 + 4y and coefficient y
        let p = poly(&[(1, &[(0, 2), (1, 1)]), (1, &[(0, 1)]), (-1, &[])]);
        let mut proj = Projection::new(ProjectionOperator::McCallum);
        let out = proj.single(&p, 0);
        assert!(out.contains(&poly(&[(4, &[(1, 1)]), (1, &[])])));
        assert!(out.contains(&Polynomial::from_var(1)));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_brown_skips_coefficients() {
        // (y^2 + 1) x^2 + y x - 1: the leading coefficient never vanishes
        let p = poly(&[(1, &[(0, 2), (1, 2)]), (1, &[(0, 2)]), (1, &[(0, 1), (1, 1)]), (-1, &[])]);
        let mut brown = Projection::new(ProjectionOperator::Brown);
        let out = brown.single(&p, 0);
        assert_eq!(out.len(), 1);
        let mut mccallum = Projection::new(ProjectionOperator::McCallum);
        assert!(mccallum.single(&p, 0).len() > 1);
    }

    #[test]
    fn test_paired_resultant_into_sink() {
        // x - y and x + y - 2 meet at y = 1
        let p = poly(&[(1, &[(0, 1)]), (-1, &[(1, 1)])]);
        let q = poly(&[(1, &[(0, 1)]), (1, &[(1, 1)]), (-2, &[])]);
        let mut proj = Projection::default();
        let mut sink: Vec<(Polynomial, Provenance)> = Vec::new();
        proj.project_paired(&p, &q, 0, (id(1), id(0)), &mut sink);
        assert_eq!(sink.len(), 1);
        assert_eq!(sink[0].0, poly(&[(1, &[(1, 1)]), (-1, &[])]));
        assert_eq!(sink[0].1, Provenance::pair(id(0), id(1)));
        assert_eq!(proj.stats().paired_projections, 1);
    }

    #[test]
    fn test_hong_contains_resultant_factor() {
        let p = poly(&[(1, &[(0, 1)]), (-1, &[(1, 1)])]);
        let q = poly(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
        let mut hong = Projection::new(ProjectionOperator::Hong);
        let out = hong.paired(&q, &p, 0);
        // res(x^2 + y^2 - 1, x - y) = 2y^2 - 1
        assert!(out.contains(&poly(&[(2, &[(1, 2)]), (-1, &[])])));
    }

    #[test]
    fn test_reducta_stop_at_nonvanishing() {
        // y x^2 + 3 x + y: the second reductum has constant leading coefficient
        let p = poly(&[(1, &[(0, 2), (1, 1)]), (3, &[(0, 1)]), (1, &[(1, 1)])]);
        let r = reducta(&p, 0);
        assert_eq!(r.len(), 2);
        assert_eq!(r[1].degree(0), 1);
    }
}
