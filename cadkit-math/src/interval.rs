//! Intervals over the rationals.
//!
//! Each bound is either strict, weak (closed) or infinite. Intervals serve
//! as isolating intervals of real algebraic numbers, as variable bounds for
//! CAD, and as enclosures in interval evaluation of polynomials.
//!
//! Arithmetic is enclosing: the result contains every value obtained by
//! combining members of the operands, but may be larger.

use crate::sign::Sign;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

/// Kind of an interval bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundType {
    /// The bound value is excluded.
    Strict,
    /// The bound value is included.
    Weak,
    /// No bound.
    Infty,
}

/// An interval with rational bounds.
///
/// The value of an infinite bound is ignored and kept at zero.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Interval {
    lower: BigRational,
    lower_type: BoundType,
    upper: BigRational,
    upper_type: BoundType,
}

/// A bound value on the extended real line.
#[derive(Clone, PartialEq, Eq)]
enum Endpoint {
    NegInf,
    Finite(BigRational),
    PosInf,
}

impl Endpoint {
    fn mul(&self, other: &Endpoint) -> Endpoint {
        use Endpoint::*;
        match (self, other) {
            (Finite(a), Finite(b)) => Finite(a * b),
            (Finite(a), inf) | (inf, Finite(a)) => match Sign::of(a) {
                Sign::Zero => Finite(BigRational::zero()),
                Sign::Positive => inf.clone(),
                Sign::Negative => inf.negate(),
            },
            (a, b) if a == b => PosInf,
            _ => NegInf,
        }
    }

    fn negate(&self) -> Endpoint {
        match self {
            Endpoint::NegInf => Endpoint::PosInf,
            Endpoint::PosInf => Endpoint::NegInf,
            Endpoint::Finite(v) => Endpoint::Finite(-v),
        }
    }
}

impl PartialOrd for Endpoint {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Endpoint {
    fn cmp(&self, other: &Self) -> Ordering {
        use Endpoint::*;
        match (self, other) {
            (NegInf, NegInf) | (PosInf, PosInf) => Ordering::Equal,
            (NegInf, _) | (_, PosInf) => Ordering::Less,
            (_, NegInf) | (PosInf, _) => Ordering::Greater,
            (Finite(a), Finite(b)) => a.cmp(b),
        }
    }
}

impl Interval {
    /// Create an interval from bounds and bound types.
    pub fn new(
        lower: BigRational,
        lower_type: BoundType,
        upper: BigRational,
        upper_type: BoundType,
    ) -> Self {
        let lower = if lower_type == BoundType::Infty {
            BigRational::zero()
        } else {
            lower
        };
        let upper = if upper_type == BoundType::Infty {
            BigRational::zero()
        } else {
            upper
        };
        Self {
            lower,
            lower_type,
            upper,
            upper_type,
        }
    }

    /// The open interval `(lower, upper)`.
    pub fn open(lower: BigRational, upper: BigRational) -> Self {
        Self::new(lower, BoundType::Strict, upper, BoundType::Strict)
    }

    /// The closed interval `[lower, upper]`.
    pub fn closed(lower: BigRational, upper: BigRational) -> Self {
        Self::new(lower, BoundType::Weak, upper, BoundType::Weak)
    }

    /// The point interval `[value, value]`.
    pub fn point(value: BigRational) -> Self {
        Self::closed(value.clone(), value)
    }

    /// The whole real line.
    pub fn unbounded() -> Self {
        Self::new(
            BigRational::zero(),
            BoundType::Infty,
            BigRational::zero(),
            BoundType::Infty,
        )
    }

    /// All numbers above `value` (strictly if `strict`).
    pub fn greater_than(value: BigRational, strict: bool) -> Self {
        let kind = if strict { BoundType::Strict } else { BoundType::Weak };
        Self::new(value, kind, BigRational::zero(), BoundType::Infty)
    }

    /// All numbers below `value` (strictly if `strict`).
    pub fn less_than(value: BigRational, strict: bool) -> Self {
        let kind = if strict { BoundType::Strict } else { BoundType::Weak };
        Self::new(BigRational::zero(), BoundType::Infty, value, kind)
    }

    /// The empty interval.
    pub fn empty() -> Self {
        Self::open(BigRational::zero(), BigRational::zero())
    }

    /// Lower bound value, `None` if unbounded below.
    pub fn lower(&self) -> Option<&BigRational> {
        (self.lower_type != BoundType::Infty).then_some(&self.lower)
    }

    /// Upper bound value, `None` if unbounded above.
    pub fn upper(&self) -> Option<&BigRational> {
        (self.upper_type != BoundType::Infty).then_some(&self.upper)
    }

    /// Lower bound type.
    pub fn lower_type(&self) -> BoundType {
        self.lower_type
    }

    /// Upper bound type.
    pub fn upper_type(&self) -> BoundType {
        self.upper_type
    }

    fn lower_endpoint(&self) -> Endpoint {
        match self.lower() {
            Some(v) => Endpoint::Finite(v.clone()),
            None => Endpoint::NegInf,
        }
    }

    fn upper_endpoint(&self) -> Endpoint {
        match self.upper() {
            Some(v) => Endpoint::Finite(v.clone()),
            None => Endpoint::PosInf,
        }
    }

    fn from_endpoints(lower: Endpoint, lower_strict: bool, upper: Endpoint, upper_strict: bool) -> Self {
        let kind = |strict: bool| if strict { BoundType::Strict } else { BoundType::Weak };
        let (lv, lt) = match lower {
            Endpoint::Finite(v) => (v, kind(lower_strict)),
            _ => (BigRational::zero(), BoundType::Infty),
        };
        let (uv, ut) = match upper {
            Endpoint::Finite(v) => (v, kind(upper_strict)),
            _ => (BigRational::zero(), BoundType::Infty),
        };
        Self::new(lv, lt, uv, ut)
    }

    /// Check whether the interval contains no number.
    pub fn is_empty(&self) -> bool {
        match (self.lower(), self.upper()) {
            (Some(l), Some(u)) => match l.cmp(u) {
                Ordering::Greater => true,
                Ordering::Equal => {
                    self.lower_type == BoundType::Strict || self.upper_type == BoundType::Strict
                }
                Ordering::Less => false,
            },
            _ => false,
        }
    }

    /// Check whether the interval contains exactly one number.
    pub fn is_point(&self) -> bool {
        self.lower_type == BoundType::Weak
            && self.upper_type == BoundType::Weak
            && self.lower == self.upper
    }

    /// Check whether some bound is infinite.
    pub fn is_unbounded(&self) -> bool {
        self.lower_type == BoundType::Infty || self.upper_type == BoundType::Infty
    }

    /// Check whether `value` lies in the interval.
    pub fn contains(&self, value: &BigRational) -> bool {
        let above = match self.lower_type {
            BoundType::Infty => true,
            BoundType::Weak => value >= &self.lower,
            BoundType::Strict => value > &self.lower,
        };
        let below = match self.upper_type {
            BoundType::Infty => true,
            BoundType::Weak => value <= &self.upper,
            BoundType::Strict => value < &self.upper,
        };
        above && below
    }

    /// Check whether `other` is a subset of this interval.
    pub fn contains_interval(&self, other: &Interval) -> bool {
        if other.is_empty() {
            return true;
        }
        let lower_ok = match (self.lower(), other.lower()) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => {
                a < b
                    || (a == b
                        && (self.lower_type == BoundType::Weak
                            || other.lower_type == BoundType::Strict))
            }
        };
        let upper_ok = match (self.upper(), other.upper()) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(a), Some(b)) => {
                a > b
                    || (a == b
                        && (self.upper_type == BoundType::Weak
                            || other.upper_type == BoundType::Strict))
            }
        };
        lower_ok && upper_ok
    }

    /// Intersection of two intervals (possibly empty).
    pub fn intersect(&self, other: &Interval) -> Interval {
        let (lower, lower_type) = match (self.lower(), other.lower()) {
            (None, None) => (BigRational::zero(), BoundType::Infty),
            (Some(_), None) => (self.lower.clone(), self.lower_type),
            (None, Some(_)) => (other.lower.clone(), other.lower_type),
            (Some(a), Some(b)) => match a.cmp(b) {
                Ordering::Greater => (a.clone(), self.lower_type),
                Ordering::Less => (b.clone(), other.lower_type),
                Ordering::Equal => (a.clone(), stricter(self.lower_type, other.lower_type)),
            },
        };
        let (upper, upper_type) = match (self.upper(), other.upper()) {
            (None, None) => (BigRational::zero(), BoundType::Infty),
            (Some(_), None) => (self.upper.clone(), self.upper_type),
            (None, Some(_)) => (other.upper.clone(), other.upper_type),
            (Some(a), Some(b)) => match a.cmp(b) {
                Ordering::Less => (a.clone(), self.upper_type),
                Ordering::Greater => (b.clone(), other.upper_type),
                Ordering::Equal => (a.clone(), stricter(self.upper_type, other.upper_type)),
            },
        };
        Interval::new(lower, lower_type, upper, upper_type)
    }

    /// Width of a bounded interval.
    pub fn width(&self) -> Option<BigRational> {
        Some(self.upper()? - self.lower()?)
    }

    /// Midpoint of a bounded interval.
    pub fn center(&self) -> Option<BigRational> {
        let two = BigRational::from_integer(BigInt::from(2));
        Some((self.lower()? + self.upper()?) / two)
    }

    /// A simple rational inside a non-empty interval.
    ///
    /// Bounded intervals give the rational with the smallest denominator
    /// (and then the smallest absolute numerator) in the middle half of the
    /// interval; half-bounded intervals give an integer just beyond the
    /// bound; the real line gives zero.
    pub fn sample(&self) -> BigRational {
        match (self.lower(), self.upper()) {
            (None, None) => BigRational::zero(),
            (Some(l), None) => {
                let zero = BigRational::zero();
                if self.contains(&zero) {
                    zero
                } else {
                    l.floor() + BigRational::one()
                }
            }
            (None, Some(u)) => {
                let zero = BigRational::zero();
                if self.contains(&zero) {
                    zero
                } else {
                    u.ceil() - BigRational::one()
                }
            }
            (Some(l), Some(u)) => {
                if l == u {
                    return l.clone();
                }
                let quarter = (u - l) / BigRational::from_integer(BigInt::from(4));
                simplest_between(&(l + &quarter), &(u - &quarter))
            }
        }
    }

    /// Split at `point` into the parts strictly below and strictly above it.
    pub fn split_at(&self, point: &BigRational) -> (Interval, Interval) {
        let left = Interval::new(
            self.lower.clone(),
            self.lower_type,
            point.clone(),
            BoundType::Strict,
        );
        let right = Interval::new(
            point.clone(),
            BoundType::Strict,
            self.upper.clone(),
            self.upper_type,
        );
        (left, right)
    }

    /// Sign of every member, if it is the same for all of them.
    pub fn sign(&self) -> Option<Sign> {
        let zero = BigRational::zero();
        if self.is_point() {
            return Some(Sign::of(&self.lower));
        }
        if self.contains(&zero) {
            return None;
        }
        match self.lower() {
            Some(l) if l >= &zero => Some(Sign::Positive),
            _ => Some(Sign::Negative),
        }
    }

    /// Enclosure of `x^n` for `x` in the interval.
    pub fn pow(&self, n: u32) -> Interval {
        if n == 0 {
            return Interval::point(BigRational::one());
        }
        if n == 1 {
            return self.clone();
        }
        let lo = self.lower_endpoint();
        let hi = self.upper_endpoint();
        let power = |e: &Endpoint| -> Endpoint {
            match e {
                Endpoint::Finite(v) => Endpoint::Finite(crate::polynomial::pow_rational(v, n)),
                Endpoint::PosInf => Endpoint::PosInf,
                Endpoint::NegInf if n % 2 == 0 => Endpoint::PosInf,
                Endpoint::NegInf => Endpoint::NegInf,
            }
        };
        if n % 2 == 1 {
            return Interval::from_endpoints(
                power(&lo),
                self.lower_type == BoundType::Strict,
                power(&hi),
                self.upper_type == BoundType::Strict,
            );
        }
        let (a, b) = (power(&lo), power(&hi));
        if self.contains(&BigRational::zero()) {
            let top = a.max(b);
            Interval::from_endpoints(Endpoint::Finite(BigRational::zero()), false, top, false)
        } else if a <= b {
            Interval::from_endpoints(a, false, b, false)
        } else {
            Interval::from_endpoints(b, false, a, false)
        }
    }
}

fn stricter(a: BoundType, b: BoundType) -> BoundType {
    if a == BoundType::Strict || b == BoundType::Strict {
        BoundType::Strict
    } else {
        a
    }
}

/// The simplest rational in the closed interval `[a, b]` (Stern-Brocot
/// descent), assuming `a <= b`.
pub fn simplest_between(a: &BigRational, b: &BigRational) -> BigRational {
    let zero = BigRational::zero();
    if a <= &zero && &zero <= b {
        return zero;
    }
    if b.is_negative() {
        return -simplest_between(&-b, &-a);
    }
    let ceil = a.ceil();
    if &ceil <= b {
        return ceil;
    }
    // a and b lie in (n, n + 1).
    let n = a.floor();
    let inner = simplest_between(
        &(BigRational::one() / (b - &n)),
        &(BigRational::one() / (a - &n)),
    );
    n + BigRational::one() / inner
}

impl Neg for &Interval {
    type Output = Interval;

    fn neg(self) -> Interval {
        Interval::from_endpoints(
            self.upper_endpoint().negate(),
            self.upper_type == BoundType::Strict,
            self.lower_endpoint().negate(),
            self.lower_type == BoundType::Strict,
        )
    }
}

impl Add for &Interval {
    type Output = Interval;

    fn add(self, rhs: &Interval) -> Interval {
        let sum = |a: Endpoint, b: Endpoint| match (a, b) {
            (Endpoint::Finite(x), Endpoint::Finite(y)) => Endpoint::Finite(x + y),
            (Endpoint::Finite(_), inf) | (inf, _) => inf,
        };
        Interval::from_endpoints(
            sum(self.lower_endpoint(), rhs.lower_endpoint()),
            self.lower_type == BoundType::Strict || rhs.lower_type == BoundType::Strict,
            sum(self.upper_endpoint(), rhs.upper_endpoint()),
            self.upper_type == BoundType::Strict || rhs.upper_type == BoundType::Strict,
        )
    }
}

impl Sub for &Interval {
    type Output = Interval;

    fn sub(self, rhs: &Interval) -> Interval {
        self + &(-rhs)
    }
}

impl Mul for &Interval {
    type Output = Interval;

    fn mul(self, rhs: &Interval) -> Interval {
        if self.is_point() && rhs.is_point() {
            return Interval::point(&self.lower * &rhs.lower);
        }
        let candidates = [
            self.lower_endpoint().mul(&rhs.lower_endpoint()),
            self.lower_endpoint().mul(&rhs.upper_endpoint()),
            self.upper_endpoint().mul(&rhs.lower_endpoint()),
            self.upper_endpoint().mul(&rhs.upper_endpoint()),
        ];
        let lo = candidates.iter().min().cloned().unwrap_or(Endpoint::NegInf);
        let hi = candidates.iter().max().cloned().unwrap_or(Endpoint::PosInf);
        Interval::from_endpoints(lo, false, hi, false)
    }
}

impl fmt::Debug for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.lower_type {
            BoundType::Infty => write!(f, "(-oo")?,
            BoundType::Strict => write!(f, "({}", self.lower)?,
            BoundType::Weak => write!(f, "[{}", self.lower)?,
        }
        write!(f, ", ")?;
        match self.upper_type {
            BoundType::Infty => write!(f, "oo)"),
            BoundType::Strict => write!(f, "{})", self.upper),
            BoundType::Weak => write!(f, "{}]", self.upper),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn frac(n: i64, d: i64) -> BigRational {
        BigRational::new(BigInt::from(n), BigInt::from(d))
    }

    #[test]
    fn test_contains() {
        let i = Interval::new(rat(0), BoundType::Strict, rat(1), BoundType::Weak);
        assert!(!i.contains(&rat(0)));
        assert!(i.contains(&rat(1)));
        assert!(i.contains(&frac(1, 2)));
        assert!(Interval::unbounded().contains(&rat(-100)));
    }

    #[test]
    fn test_empty_and_point() {
        assert!(Interval::empty().is_empty());
        assert!(Interval::open(rat(1), rat(1)).is_empty());
        assert!(Interval::point(rat(1)).is_point());
        assert!(!Interval::point(rat(1)).is_empty());
        assert!(!Interval::less_than(rat(0), true).is_empty());
    }

    #[test]
    fn test_intersect() {
        let a = Interval::closed(rat(0), rat(2));
        let b = Interval::greater_than(rat(1), true);
        let c = a.intersect(&b);
        assert_eq!(c, Interval::new(rat(1), BoundType::Strict, rat(2), BoundType::Weak));
        let d = Interval::less_than(rat(0), true);
        assert!(a.intersect(&d).is_empty());
    }

    #[test]
    fn test_contains_interval() {
        let a = Interval::closed(rat(0), rat(2));
        assert!(a.contains_interval(&Interval::open(rat(0), rat(2))));
        assert!(!Interval::open(rat(0), rat(2)).contains_interval(&a));
        assert!(Interval::unbounded().contains_interval(&a));
    }

    #[test]
    fn test_sample_simplest() {
        assert_eq!(Interval::open(rat(0), rat(4)).sample(), rat(1));
        assert_eq!(Interval::open(frac(1, 3), frac(2, 3)).sample(), frac(1, 2));
        assert_eq!(Interval::open(rat(-5), rat(5)).sample(), rat(0));
        assert_eq!(Interval::greater_than(frac(3, 2), true).sample(), rat(2));
        assert_eq!(Interval::less_than(rat(-3), true).sample(), rat(-4));
        let i = Interval::open(frac(7, 5), frac(3, 2));
        assert!(i.contains(&i.sample()));
    }

    #[test]
    fn test_simplest_between() {
        assert_eq!(simplest_between(&frac(2, 7), &frac(3, 7)), frac(1, 3));
        assert_eq!(simplest_between(&frac(-3, 7), &frac(-2, 7)), frac(-1, 3));
    }

    #[test]
    fn test_arithmetic() {
        let a = Interval::closed(rat(-1), rat(2));
        let b = Interval::closed(rat(3), rat(4));
        assert_eq!(&a + &b, Interval::closed(rat(2), rat(6)));
        assert_eq!(&a - &b, Interval::closed(rat(-5), rat(-1)));
        assert_eq!(&a * &b, Interval::closed(rat(-4), rat(8)));
        assert_eq!(a.pow(2), Interval::closed(rat(0), rat(4)));
        assert_eq!(a.pow(3), Interval::closed(rat(-1), rat(8)));
    }

    #[test]
    fn test_unbounded_arithmetic() {
        let a = Interval::greater_than(rat(1), true);
        let sq = a.pow(2);
        assert_eq!(sq.lower(), Some(&rat(1)));
        assert!(sq.upper().is_none());
        let neg = -&a;
        assert_eq!(neg.sign(), Some(Sign::Negative));
        let prod = &a * &neg;
        assert_eq!(prod.sign(), Some(Sign::Negative));
    }

    #[test]
    fn test_sign() {
        assert_eq!(Interval::open(rat(0), rat(1)).sign(), Some(Sign::Positive));
        assert_eq!(Interval::closed(rat(0), rat(1)).sign(), None);
        assert_eq!(Interval::point(rat(0)).sign(), Some(Sign::Zero));
    }

    #[test]
    fn test_display() {
        let i = Interval::new(rat(0), BoundType::Strict, rat(1), BoundType::Weak);
        assert_eq!(i.to_string(), "(0, 1]");
        assert_eq!(Interval::unbounded().to_string(), "(-oo, oo)");
    }
}
