//! Evaluation of multivariate polynomials at real algebraic points.
//!
//! Numeric coordinates are substituted directly. A single interval
//! coordinate reduces to a univariate sign test. Several interval
//! coordinates are handled through resultants with their defining
//! polynomials: the value `q(a)` is a root of
//! `R(z) = res(... res(z - q, p_1, x_1) ..., p_k, x_k)`, and refining the
//! isolating boxes until the interval enclosure of `q` separates `q(a)` from
//! the other roots of `R` decides its sign exactly.

use super::RealAlgebraicNumber;
use crate::interval::Interval;
use crate::polynomial::resultant::resultant;
use crate::polynomial::{Polynomial, Var};
use crate::rootfinder::{real_roots, SplittingStrategy};
use crate::sign::Sign;
use crate::univariate::count_roots;
use num_rational::BigRational;
use num_traits::Zero;
use rustc_hash::FxHashMap;
use tracing::{trace, warn};

/// Real roots of a polynomial over a partial algebraic point.
#[derive(Debug, Clone, Default)]
pub struct RealRootsAt {
    /// The roots, sorted ascending.
    pub roots: Vec<RealAlgebraicNumber>,
    /// The polynomial vanishes identically on the fiber.
    pub nullified: bool,
}

/// Substitute all numeric coordinates; returns the reduced polynomial and
/// the interval-represented coordinates that still occur in it.
fn reduce<'a>(
    poly: &Polynomial,
    assignment: &[(Var, &'a RealAlgebraicNumber)],
    skip: Option<Var>,
) -> Option<(Polynomial, Vec<(Var, &'a RealAlgebraicNumber)>)> {
    let mut q = poly.clone();
    for (v, a) in assignment {
        if Some(*v) == skip {
            continue;
        }
        if let Some(value) = a.value() {
            q = q.eval_at(*v, &value);
        }
    }
    let mut irrational = Vec::new();
    for v in q.vars() {
        if Some(v) == skip {
            continue;
        }
        let (_, a) = assignment.iter().find(|(w, _)| *w == v)?;
        irrational.push((v, *a));
    }
    Some((q, irrational))
}

fn closure(interval: &Interval) -> Interval {
    match (interval.lower(), interval.upper()) {
        (Some(l), Some(u)) => Interval::closed(l.clone(), u.clone()),
        _ => interval.clone(),
    }
}

/// Sign of `poly` at the point given by `assignment`.
///
/// Returns `None` if a variable of `poly` is not assigned.
pub fn sign_at(poly: &Polynomial, assignment: &[(Var, &RealAlgebraicNumber)]) -> Option<Sign> {
    let (q, irrational) = reduce(poly, assignment, None)?;
    if let Some(c) = q.constant_value() {
        return Some(Sign::of(&c));
    }
    if let [(v, a)] = irrational.as_slice() {
        return Some(a.sgn_of(&q.to_univariate(*v)?));
    }
    sign_by_resultant(&q, &irrational)
}

fn sign_by_resultant(q: &Polynomial, irrational: &[(Var, &RealAlgebraicNumber)]) -> Option<Sign> {
    let z = irrational
        .iter()
        .map(|(v, _)| *v)
        .chain(q.vars())
        .max()
        .unwrap_or(0)
        + 1;
    let mut r = &Polynomial::from_var(z) - q;
    for (v, a) in irrational {
        r = resultant(&r, &a.defining_polynomial(*v).to_polynomial(), *v);
    }
    let r = r.to_univariate(z)?;
    let zero_is_root = r.eval(&BigRational::zero()).is_zero();
    let seq = r.square_free_part().sturm_sequence();

    let mut rounds = 0u32;
    loop {
        let boxes: FxHashMap<Var, Interval> = irrational
            .iter()
            .map(|(v, a)| (*v, closure(&a.interval())))
            .collect();
        let enclosure = q.eval_interval(&boxes)?;
        if !enclosure.contains(&BigRational::zero()) {
            trace!(rounds, "sign separated by interval evaluation");
            return enclosure.sign();
        }
        if zero_is_root && count_roots(&seq, &enclosure) == 1 {
            return Some(Sign::Zero);
        }
        for (_, a) in irrational {
            a.refine();
        }
        rounds += 1;
    }
}

/// Real roots in `var` of `poly` at the partial point `assignment`, inside
/// `interval`.
///
/// Returns `None` if a variable other than `var` is not assigned, or if the
/// fiber is degenerate in a way the resultant construction cannot resolve.
pub fn real_roots_at(
    poly: &Polynomial,
    var: Var,
    assignment: &[(Var, &RealAlgebraicNumber)],
    interval: &Interval,
    strategy: SplittingStrategy,
) -> Option<RealRootsAt> {
    let (q, irrational) = reduce(poly, assignment, Some(var))?;
    if irrational.is_empty() {
        let u = q.to_univariate(var)?;
        if u.is_zero() {
            return Some(RealRootsAt {
                roots: Vec::new(),
                nullified: true,
            });
        }
        return Some(RealRootsAt {
            roots: real_roots(&u, interval, strategy),
            nullified: false,
        });
    }

    // Drop leading coefficients that vanish at the point.
    let coeffs = q.coefficients(var);
    let mut k = coeffs.len();
    while k > 0 && sign_at(&coeffs[k - 1], &irrational)?.is_zero() {
        k -= 1;
    }
    if k == 0 {
        return Some(RealRootsAt {
            roots: Vec::new(),
            nullified: true,
        });
    }
    if k == 1 {
        return Some(RealRootsAt::default());
    }
    let q = Polynomial::from_coefficients(var, &coeffs[..k]);

    let mut r = q.clone();
    for (v, a) in &irrational {
        let mut p = a.defining_polynomial(*v).to_polynomial();
        let mut res = resultant(&r, &p, *v);
        if res.is_zero() {
            let g = r.gcd(&p);
            if a.sgn_of(&g.to_univariate(*v)?).is_zero() {
                warn!(var = *v, "fiber polynomial vanishes on a defining factor");
                return None;
            }
            p = p.div_exact(&g)?;
            res = resultant(&r, &p, *v);
        }
        r = res;
    }
    let u = r.to_univariate(var)?;
    if u.is_zero() {
        warn!(var, "elimination resultant vanished");
        return None;
    }

    let candidates = real_roots(&u, interval, strategy);
    let mut roots = Vec::with_capacity(candidates.len());
    for c in candidates {
        let vanishes = {
            let mut extended: Vec<(Var, &RealAlgebraicNumber)> = irrational.clone();
            extended.push((var, &c));
            sign_at(&q, &extended) == Some(Sign::Zero)
        };
        if vanishes {
            roots.push(c);
        }
    }
    trace!(var, found = roots.len(), "roots over algebraic point");
    Some(RealRootsAt {
        roots,
        nullified: false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn poly(coeffs: &[(i64, &[(Var, u32)])]) -> Polynomial {
        Polynomial::from_coeffs_int(coeffs)
    }

    fn sqrt(n: i64, var: Var) -> RealAlgebraicNumber {
        let p = poly(&[(1, &[(var, 2)]), (-n, &[])]);
        RealAlgebraicNumber::from_polynomial(&p, var, &Interval::open(rat(0), rat(n + 1)), true)
            .unwrap()
    }

    #[test]
    fn test_sign_numeric() {
        let one = RealAlgebraicNumber::from_rational(rat(1), false);
        let zero = RealAlgebraicNumber::from_rational(rat(0), false);
        let circle = poly(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
        assert_eq!(sign_at(&circle, &[(0, &one), (1, &zero)]), Some(Sign::Zero));
        assert_eq!(sign_at(&circle, &[(0, &one), (1, &one)]), Some(Sign::Positive));
        assert_eq!(sign_at(&circle, &[(0, &one)]), None);
    }

    #[test]
    fn test_sign_single_irrational() {
        let s = sqrt(2, 0);
        let one = RealAlgebraicNumber::from_rational(rat(1), false);
        // x^2 + y - 3 at (sqrt 2, 1) is zero
        let p = poly(&[(1, &[(0, 2)]), (1, &[(1, 1)]), (-3, &[])]);
        assert_eq!(sign_at(&p, &[(0, &s), (1, &one)]), Some(Sign::Zero));
        // x - y at (sqrt 2, 1) is positive
        let q = poly(&[(1, &[(0, 1)]), (-1, &[(1, 1)])]);
        assert_eq!(sign_at(&q, &[(0, &s), (1, &one)]), Some(Sign::Positive));
    }

    #[test]
    fn test_sign_two_irrationals() {
        let a = sqrt(2, 0);
        let b = sqrt(2, 1);
        let c = sqrt(3, 1);
        // x - y at (sqrt 2, sqrt 2) is zero
        let diff = poly(&[(1, &[(0, 1)]), (-1, &[(1, 1)])]);
        assert_eq!(sign_at(&diff, &[(0, &a), (1, &b)]), Some(Sign::Zero));
        // x*y - 2 at (sqrt 2, sqrt 2) is zero
        let prod = poly(&[(1, &[(0, 1), (1, 1)]), (-2, &[])]);
        assert_eq!(sign_at(&prod, &[(0, &a), (1, &b)]), Some(Sign::Zero));
        // x - y at (sqrt 2, sqrt 3) is negative
        assert_eq!(sign_at(&diff, &[(0, &a), (1, &c)]), Some(Sign::Negative));
    }

    #[test]
    fn test_roots_over_rational_point() {
        let half = RealAlgebraicNumber::from_rational(BigRational::new(1.into(), 2.into()), false);
        let circle = poly(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
        let res = real_roots_at(
            &circle,
            1,
            &[(0, &half)],
            &Interval::unbounded(),
            SplittingStrategy::default(),
        )
        .unwrap();
        assert!(!res.nullified);
        assert_eq!(res.roots.len(), 2);
        assert!(res.roots[0] < res.roots[1]);
    }

    #[test]
    fn test_roots_over_irrational_point() {
        // y^2 - x at x = sqrt 2 has two roots +-2^(1/4)
        let s = sqrt(2, 0);
        let p = poly(&[(1, &[(1, 2)]), (-1, &[(0, 1)])]);
        let res = real_roots_at(&p, 1, &[(0, &s)], &Interval::unbounded(), SplittingStrategy::default())
            .unwrap();
        assert_eq!(res.roots.len(), 2);
        // x - y at x = sqrt 2 has the single root sqrt 2
        let q = poly(&[(1, &[(0, 1)]), (-1, &[(1, 1)])]);
        let res = real_roots_at(&q, 1, &[(0, &s)], &Interval::unbounded(), SplittingStrategy::default())
            .unwrap();
        assert_eq!(res.roots.len(), 1);
        assert!(res.roots[0] == s);
    }

    #[test]
    fn test_nullification() {
        // (x^2 - 2) * y vanishes for x = sqrt 2
        let s = sqrt(2, 0);
        let p = poly(&[(1, &[(0, 2), (1, 1)]), (-2, &[(1, 1)])]);
        let res = real_roots_at(&p, 1, &[(0, &s)], &Interval::unbounded(), SplittingStrategy::default())
            .unwrap();
        assert!(res.nullified);
        let zero = RealAlgebraicNumber::from_rational(rat(0), false);
        let res = real_roots_at(&p, 1, &[(0, &zero)], &Interval::unbounded(), SplittingStrategy::default())
            .unwrap();
        assert!(!res.nullified);
        assert_eq!(res.roots.len(), 1);
    }
}
