//! Real algebraic numbers.
//!
//! A number is either known exactly as a rational (numeric representation)
//! or given by a square-free defining polynomial together with an open
//! isolating interval that contains exactly one of its roots (interval
//! representation).
//!
//! Interval-represented numbers keep three invariants:
//!
//! - the interval bounds are not roots of the defining polynomial, so the
//!   polynomial has opposite signs at the two bounds;
//! - the interval never contains zero, so the sign of the number is the
//!   sign of either bound;
//! - refinement only shrinks the interval.
//!
//! Refinement happens through shared references (`RefCell`), so comparing or
//! evaluating at a number sharpens it for every later use. Whenever a
//! bisection point turns out to be the root, the number switches to the
//! numeric representation.

use crate::error::{AlgebraicError, AlgebraicResult};
use crate::interval::{BoundType, Interval};
use crate::polynomial::{Polynomial, Var};
use crate::sign::Sign;
use crate::univariate::{count_roots, UnivariatePolynomial};
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
struct IntervalRepr {
    poly: Arc<UnivariatePolynomial>,
    sturm: Arc<Vec<UnivariatePolynomial>>,
    lower: BigRational,
    upper: BigRational,
    /// Sign of `poly` at `lower`; the sign at `upper` is the opposite one.
    lower_sign: Sign,
    refinements: u32,
}

impl IntervalRepr {
    fn interval(&self) -> Interval {
        Interval::open(self.lower.clone(), self.upper.clone())
    }
}

#[derive(Clone)]
enum Repr {
    Numeric(BigRational),
    Interval(IntervalRepr),
}

/// A real algebraic number.
pub struct RealAlgebraicNumber {
    repr: RefCell<Repr>,
    is_root: bool,
}

impl Clone for RealAlgebraicNumber {
    fn clone(&self) -> Self {
        Self {
            repr: RefCell::new(self.repr.borrow().clone()),
            is_root: self.is_root,
        }
    }
}

impl RealAlgebraicNumber {
    /// An exactly known rational number.
    pub fn from_rational(value: BigRational, is_root: bool) -> Self {
        Self {
            repr: RefCell::new(Repr::Numeric(value)),
            is_root,
        }
    }

    /// The root of `poly` inside `interval`.
    ///
    /// Fails unless the interval contains exactly one root of `poly`. The
    /// polynomial is replaced by its square-free part; linear polynomials,
    /// point intervals and roots on closed bounds give numeric numbers.
    pub fn from_interval(
        poly: &UnivariatePolynomial,
        interval: &Interval,
        is_root: bool,
    ) -> AlgebraicResult<Self> {
        if poly.is_zero() {
            return Err(AlgebraicError::ZeroPolynomial);
        }
        if interval.is_empty() {
            return Err(AlgebraicError::EmptyInterval);
        }
        let p = poly.square_free_part();
        if interval.is_point() {
            let value = interval.lower().cloned().unwrap_or_else(BigRational::zero);
            if p.sign_at(&value).is_zero() {
                return Ok(Self::from_rational(value, is_root));
            }
            return Err(AlgebraicError::NotIsolating {
                interval: interval.clone(),
                roots: 0,
            });
        }

        let sturm = p.sturm_sequence();
        let roots = count_roots(&sturm, interval);
        if roots != 1 {
            return Err(AlgebraicError::NotIsolating {
                interval: interval.clone(),
                roots,
            });
        }
        if p.degree() == 1 {
            let c = p.coeffs();
            return Ok(Self::from_rational(-&c[0] / &c[1], is_root));
        }
        for (bound, kind) in [
            (interval.lower(), interval.lower_type()),
            (interval.upper(), interval.upper_type()),
        ] {
            if let Some(b) = bound {
                if kind == BoundType::Weak && p.sign_at(b).is_zero() {
                    return Ok(Self::from_rational(b.clone(), is_root));
                }
            }
        }

        let bound = p.cauchy_bound();
        let lower = interval.lower().cloned().unwrap_or_else(|| -bound.clone());
        let upper = interval.upper().cloned().unwrap_or(bound);
        Ok(Self::from_isolating(
            Arc::new(p),
            Arc::new(sturm),
            lower,
            upper,
            is_root,
        ))
    }

    /// The root of a multivariate polynomial that is univariate in `var`.
    pub fn from_polynomial(
        poly: &Polynomial,
        var: Var,
        interval: &Interval,
        is_root: bool,
    ) -> AlgebraicResult<Self> {
        let univariate = poly
            .to_univariate(var)
            .ok_or(AlgebraicError::NotUnivariate { var })?;
        Self::from_interval(&univariate, interval, is_root)
    }

    /// Build from a square-free polynomial, its Sturm sequence and an open
    /// interval `(lower, upper)` known to contain exactly one root.
    pub(crate) fn from_isolating(
        poly: Arc<UnivariatePolynomial>,
        sturm: Arc<Vec<UnivariatePolynomial>>,
        mut lower: BigRational,
        mut upper: BigRational,
        is_root: bool,
    ) -> Self {
        if poly.degree() == 1 {
            let c = poly.coeffs();
            return Self::from_rational(-&c[0] / &c[1], is_root);
        }
        while poly.sign_at(&lower).is_zero() || poly.sign_at(&upper).is_zero() {
            let m = Interval::open(lower.clone(), upper.clone()).sample();
            if poly.sign_at(&m).is_zero() {
                return Self::from_rational(m, is_root);
            }
            if count_roots(&sturm, &Interval::open(lower.clone(), m.clone())) == 1 {
                upper = m;
            } else {
                lower = m;
            }
        }
        let lower_sign = poly.sign_at(&lower);
        let number = Self {
            repr: RefCell::new(Repr::Interval(IntervalRepr {
                poly,
                sturm,
                lower,
                upper,
                lower_sign,
                refinements: 0,
            })),
            is_root,
        };
        number.refine_avoiding(&BigRational::zero());
        number
    }

    /// Check whether the exact value is known.
    pub fn is_numeric(&self) -> bool {
        matches!(*self.repr.borrow(), Repr::Numeric(_))
    }

    /// Check whether the number stems from isolating a polynomial root.
    pub fn is_root(&self) -> bool {
        self.is_root
    }

    /// Set the root flag.
    pub fn set_is_root(&mut self, is_root: bool) {
        self.is_root = is_root;
    }

    /// The exact value, if known.
    pub fn value(&self) -> Option<BigRational> {
        match &*self.repr.borrow() {
            Repr::Numeric(v) => Some(v.clone()),
            Repr::Interval(_) => None,
        }
    }

    /// The current isolating interval (a point interval for numeric numbers).
    pub fn interval(&self) -> Interval {
        match &*self.repr.borrow() {
            Repr::Numeric(v) => Interval::point(v.clone()),
            Repr::Interval(ir) => ir.interval(),
        }
    }

    /// A square-free polynomial in `var` having this number as a root.
    pub fn defining_polynomial(&self, var: Var) -> UnivariatePolynomial {
        match &*self.repr.borrow() {
            Repr::Numeric(v) => UnivariatePolynomial::linear_root(var, v),
            Repr::Interval(ir) => ir.poly.with_var(var),
        }
    }

    /// Number of bisection steps performed so far.
    pub fn refinement_count(&self) -> u32 {
        match &*self.repr.borrow() {
            Repr::Numeric(_) => 0,
            Repr::Interval(ir) => ir.refinements,
        }
    }

    /// Lower and upper end of the current enclosure.
    fn bounds(&self) -> (BigRational, BigRational) {
        match &*self.repr.borrow() {
            Repr::Numeric(v) => (v.clone(), v.clone()),
            Repr::Interval(ir) => (ir.lower.clone(), ir.upper.clone()),
        }
    }

    /// Sign of the number.
    pub fn sgn(&self) -> Sign {
        match &*self.repr.borrow() {
            Repr::Numeric(v) => Sign::of(v),
            Repr::Interval(ir) => {
                if ir.lower.is_negative() {
                    Sign::Negative
                } else {
                    Sign::Positive
                }
            }
        }
    }

    /// Halve the isolating interval at its simplest interior rational.
    pub fn refine(&self) {
        let mut repr = self.repr.borrow_mut();
        let Repr::Interval(ir) = &mut *repr else {
            return;
        };
        let m = ir.interval().sample();
        ir.refinements += 1;
        let s = ir.poly.sign_at(&m);
        if s.is_zero() {
            *repr = Repr::Numeric(m);
        } else if s == ir.lower_sign {
            ir.lower = m;
        } else {
            ir.upper = m;
        }
    }

    /// Refine until the interval is not wider than `epsilon`.
    pub fn refine_until(&self, epsilon: &BigRational) {
        loop {
            let (l, u) = self.bounds();
            if &(u - l) <= epsilon {
                return;
            }
            self.refine();
        }
    }

    /// Move `n` out of the isolating interval. Returns true iff `n` is the
    /// number itself, which then becomes numeric.
    pub fn refine_avoiding(&self, n: &BigRational) -> bool {
        let mut repr = self.repr.borrow_mut();
        let ir = match &mut *repr {
            Repr::Numeric(v) => return v == n,
            Repr::Interval(ir) => ir,
        };
        if n <= &ir.lower || n >= &ir.upper {
            return false;
        }
        ir.refinements += 1;
        let s = ir.poly.sign_at(n);
        if s.is_zero() {
            *repr = Repr::Numeric(n.clone());
            true
        } else {
            if s == ir.lower_sign {
                ir.lower = n.clone();
            } else {
                ir.upper = n.clone();
            }
            false
        }
    }

    /// Refine until the interval contains no integer, or the number turns
    /// out to be an integer.
    pub fn refine_to_integrality(&self) {
        let one = BigRational::one();
        loop {
            let (l, u) = self.bounds();
            if self.is_numeric() {
                return;
            }
            if u.clone() - &l > one {
                self.refine();
                continue;
            }
            let k = l.floor() + &one;
            if k >= u || self.refine_avoiding(&k) {
                return;
            }
        }
    }

    /// Check whether the number is an integer.
    pub fn is_integral(&self) -> bool {
        self.value().is_some_and(|v| v.is_integer())
    }

    /// Check whether the number lies in `interval`.
    pub fn contained_in(&self, interval: &Interval) -> bool {
        let repr = self.repr.borrow().clone();
        match repr {
            Repr::Numeric(v) => interval.contains(&v),
            Repr::Interval(ir) => {
                let overlap = ir.interval().intersect(interval);
                !overlap.is_empty() && count_roots(&ir.sturm, &overlap) == 1
            }
        }
    }

    /// A rational close to the number, suitable for splitting.
    pub fn branching_point(&self) -> BigRational {
        match &*self.repr.borrow() {
            Repr::Numeric(v) => v.clone(),
            Repr::Interval(ir) => ir.interval().sample(),
        }
    }

    /// An integer strictly below the number.
    pub fn rational_below(&self) -> BigRational {
        match &*self.repr.borrow() {
            Repr::Numeric(v) => v.ceil() - BigRational::one(),
            Repr::Interval(ir) => ir.lower.floor(),
        }
    }

    /// An integer strictly above the number.
    pub fn rational_above(&self) -> BigRational {
        match &*self.repr.borrow() {
            Repr::Numeric(v) => v.floor() + BigRational::one(),
            Repr::Interval(ir) => ir.upper.ceil(),
        }
    }

    /// A simple rational strictly between `a` and `b`, assuming `a < b`.
    pub fn rational_between(a: &Self, b: &Self) -> BigRational {
        loop {
            let (_, au) = a.bounds();
            let (bl, _) = b.bounds();
            let lower_type = if a.is_numeric() {
                BoundType::Strict
            } else {
                BoundType::Weak
            };
            let upper_type = if b.is_numeric() {
                BoundType::Strict
            } else {
                BoundType::Weak
            };
            let gap = Interval::new(au, lower_type, bl, upper_type);
            if !gap.is_empty() {
                return gap.sample();
            }
            a.refine();
            b.refine();
        }
    }

    /// Sign of a univariate polynomial evaluated at this number.
    pub fn sgn_of(&self, poly: &UnivariatePolynomial) -> Sign {
        if let Some(c) = poly.is_constant().then(|| poly.leading_coeff()) {
            return Sign::of(&c);
        }
        let ir = match self.repr.borrow().clone() {
            Repr::Numeric(v) => return poly.sign_at(&v),
            Repr::Interval(ir) => ir,
        };
        let g = ir.poly.gcd(poly);
        if !g.is_constant() && count_roots(&g.sturm_sequence(), &ir.interval()) > 0 {
            return Sign::Zero;
        }
        let seq = poly.sturm_sequence();
        loop {
            if let Some(v) = self.value() {
                return poly.sign_at(&v);
            }
            let (l, u) = self.bounds();
            if count_roots(&seq, &Interval::closed(l.clone(), u)) == 0 {
                return poly.sign_at(&l);
            }
            self.refine();
        }
    }

    /// Decide equality by exact root tests.
    pub fn equal(&self, other: &Self) -> bool {
        if std::ptr::eq(self, other) {
            return true;
        }
        let a = self.repr.borrow().clone();
        let b = other.repr.borrow().clone();
        match (a, b) {
            (Repr::Numeric(x), Repr::Numeric(y)) => x == y,
            (Repr::Numeric(x), Repr::Interval(_)) => other.refine_avoiding(&x),
            (Repr::Interval(_), Repr::Numeric(y)) => self.refine_avoiding(&y),
            (Repr::Interval(p), Repr::Interval(q)) => {
                if p.upper <= q.lower || q.upper <= p.lower {
                    return false;
                }
                let overlap = p.interval().intersect(&q.interval());
                if p.poly == q.poly {
                    return count_roots(&p.sturm, &overlap) == 1;
                }
                let g = p.poly.gcd(&q.poly);
                !g.is_constant() && count_roots(&g.sturm_sequence(), &overlap) > 0
            }
        }
    }

    /// Decide `self < other` for numbers known to be different by refining
    /// both until their enclosures are disjoint.
    pub fn less_while_unequal(&self, other: &Self) -> bool {
        loop {
            let (al, au) = self.bounds();
            let (bl, bu) = other.bounds();
            if au <= bl {
                return true;
            }
            if bu <= al {
                return false;
            }
            match (self.is_numeric(), other.is_numeric()) {
                (true, true) => return al < bl,
                (true, false) => {
                    if other.refine_avoiding(&al) {
                        return false;
                    }
                }
                (false, true) => {
                    if self.refine_avoiding(&bl) {
                        return false;
                    }
                }
                (false, false) => {
                    self.refine();
                    other.refine();
                }
            }
        }
    }
}

impl PartialEq for RealAlgebraicNumber {
    fn eq(&self, other: &Self) -> bool {
        self.equal(other)
    }
}

impl Eq for RealAlgebraicNumber {}

impl PartialOrd for RealAlgebraicNumber {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RealAlgebraicNumber {
    fn cmp(&self, other: &Self) -> Ordering {
        if self.equal(other) {
            Ordering::Equal
        } else if self.less_while_unequal(other) {
            Ordering::Less
        } else {
            Ordering::Greater
        }
    }
}

impl fmt::Display for RealAlgebraicNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &*self.repr.borrow() {
            Repr::Numeric(v) => write!(f, "(NR {})", v)?,
            Repr::Interval(ir) => write!(f, "(IR {}, {})", ir.interval(), ir.poly)?,
        }
        if self.is_root {
            write!(f, " R")?;
        }
        Ok(())
    }
}

impl fmt::Debug for RealAlgebraicNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}
