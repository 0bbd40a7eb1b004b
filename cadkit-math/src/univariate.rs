//! Dense univariate polynomials with rational coefficients.
//!
//! This is the representation used for root isolation: defining polynomials
//! of real algebraic numbers, Sturm sequences and the polynomials obtained by
//! substituting a sample point into a multivariate polynomial.
//!
//! ## Algorithms
//!
//! - **Euclidean division** over the rationals
//! - **Sturm sequences** for counting distinct real roots in an interval
//! - **Cauchy bound** for enclosing all real roots
//!
//! ## References
//!
//! - Basu, Pollack, Roy: "Algorithms in Real Algebraic Geometry", chapter 2

use crate::interval::Interval;
use crate::polynomial::{Polynomial, Var};
use crate::sign::Sign;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use std::fmt;

/// A univariate polynomial stored densely; `coeffs[i]` is the coefficient
/// of `var^i`. The leading coefficient is never zero (the zero polynomial
/// has no coefficients).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct UnivariatePolynomial {
    var: Var,
    coeffs: Vec<BigRational>,
}

impl UnivariatePolynomial {
    /// Create a polynomial from coefficients in ascending order.
    pub fn new(var: Var, mut coeffs: Vec<BigRational>) -> Self {
        while coeffs.last().is_some_and(|c| c.is_zero()) {
            coeffs.pop();
        }
        Self { var, coeffs }
    }

    /// The zero polynomial.
    pub fn zero(var: Var) -> Self {
        Self {
            var,
            coeffs: Vec::new(),
        }
    }

    /// A constant polynomial.
    pub fn constant(var: Var, c: BigRational) -> Self {
        Self::new(var, vec![c])
    }

    /// The polynomial `var - value`.
    pub fn linear_root(var: Var, value: &BigRational) -> Self {
        Self::new(var, vec![-value.clone(), BigRational::one()])
    }

    /// The main variable.
    pub fn var(&self) -> Var {
        self.var
    }

    /// The same coefficients as a polynomial in another variable.
    pub fn with_var(&self, var: Var) -> Self {
        Self {
            var,
            coeffs: self.coeffs.clone(),
        }
    }

    /// Coefficients in ascending order.
    pub fn coeffs(&self) -> &[BigRational] {
        &self.coeffs
    }

    /// Check if the polynomial is zero.
    pub fn is_zero(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Check if the polynomial has degree zero (zero included).
    pub fn is_constant(&self) -> bool {
        self.coeffs.len() <= 1
    }

    /// Degree (zero for constants and the zero polynomial).
    pub fn degree(&self) -> usize {
        self.coeffs.len().saturating_sub(1)
    }

    /// Leading coefficient (zero for the zero polynomial).
    pub fn leading_coeff(&self) -> BigRational {
        self.coeffs.last().cloned().unwrap_or_else(BigRational::zero)
    }

    /// Evaluate at a rational point (Horner scheme).
    pub fn eval(&self, x: &BigRational) -> BigRational {
        let mut acc = BigRational::zero();
        for c in self.coeffs.iter().rev() {
            acc = acc * x + c;
        }
        acc
    }

    /// Sign at a rational point.
    pub fn sign_at(&self, x: &BigRational) -> Sign {
        Sign::of(&self.eval(x))
    }

    /// Enclosure of the values on an interval.
    pub fn eval_interval(&self, interval: &Interval) -> Interval {
        let mut acc = Interval::point(BigRational::zero());
        for c in self.coeffs.iter().rev() {
            acc = &(&acc * interval) + &Interval::point(c.clone());
        }
        acc
    }

    /// The derivative.
    pub fn derivative(&self) -> Self {
        if self.coeffs.len() <= 1 {
            return Self::zero(self.var);
        }
        let coeffs = self
            .coeffs
            .iter()
            .enumerate()
            .skip(1)
            .map(|(i, c)| c * BigRational::from_integer(BigInt::from(i)))
            .collect();
        Self::new(self.var, coeffs)
    }

    /// Multiply by a rational.
    pub fn scale(&self, c: &BigRational) -> Self {
        Self::new(self.var, self.coeffs.iter().map(|a| a * c).collect())
    }

    /// Negation.
    pub fn neg(&self) -> Self {
        Self {
            var: self.var,
            coeffs: self.coeffs.iter().map(|c| -c).collect(),
        }
    }

    /// Sum of two polynomials.
    pub fn add(&self, other: &Self) -> Self {
        let n = self.coeffs.len().max(other.coeffs.len());
        let zero = BigRational::zero();
        let coeffs = (0..n)
            .map(|i| self.coeffs.get(i).unwrap_or(&zero) + other.coeffs.get(i).unwrap_or(&zero))
            .collect();
        Self::new(self.var, coeffs)
    }

    /// Difference of two polynomials.
    pub fn sub(&self, other: &Self) -> Self {
        self.add(&other.neg())
    }

    /// Product of two polynomials.
    pub fn mul(&self, other: &Self) -> Self {
        if self.is_zero() || other.is_zero() {
            return Self::zero(self.var);
        }
        let mut coeffs = vec![BigRational::zero(); self.coeffs.len() + other.coeffs.len() - 1];
        for (i, a) in self.coeffs.iter().enumerate() {
            for (j, b) in other.coeffs.iter().enumerate() {
                coeffs[i + j] += a * b;
            }
        }
        Self::new(self.var, coeffs)
    }

    /// Euclidean division. Returns `(quotient, remainder)`; division by zero
    /// returns `(0, self)`.
    pub fn div_rem(&self, divisor: &Self) -> (Self, Self) {
        if divisor.is_zero() || self.degree() < divisor.degree() || self.is_zero() {
            return (Self::zero(self.var), self.clone());
        }
        let lc = divisor.leading_coeff();
        let dd = divisor.degree();
        let mut rem = self.coeffs.clone();
        let mut quot = vec![BigRational::zero(); self.degree() - dd + 1];
        for k in (0..quot.len()).rev() {
            let q = &rem[k + dd] / &lc;
            if !q.is_zero() {
                for (j, c) in divisor.coeffs.iter().enumerate() {
                    rem[k + j] -= &q * c;
                }
            }
            quot[k] = q;
        }
        rem.truncate(dd);
        (Self::new(self.var, quot), Self::new(self.var, rem))
    }

    /// Remainder of Euclidean division.
    pub fn rem(&self, divisor: &Self) -> Self {
        self.div_rem(divisor).1
    }

    /// Scale to a monic polynomial (zero stays zero).
    pub fn monic(&self) -> Self {
        if self.is_zero() {
            return self.clone();
        }
        let lc = self.leading_coeff();
        if lc.is_one() {
            return self.clone();
        }
        self.scale(&(BigRational::one() / lc))
    }

    /// Monic greatest common divisor.
    pub fn gcd(&self, other: &Self) -> Self {
        let mut a = self.clone();
        let mut b = other.clone();
        while !b.is_zero() {
            let r = a.rem(&b);
            a = b;
            b = r;
        }
        a.monic()
    }

    /// Monic square-free part `p / gcd(p, p')`.
    pub fn square_free_part(&self) -> Self {
        if self.is_constant() {
            return self.monic();
        }
        let g = self.gcd(&self.derivative());
        self.div_rem(&g).0.monic()
    }

    /// Divide out the root at zero. Returns the multiplicity of zero as a
    /// root and the remaining polynomial.
    pub fn strip_zero_root(&self) -> (usize, Self) {
        let k = self.coeffs.iter().take_while(|c| c.is_zero()).count();
        if k == 0 || self.is_zero() {
            return (0, self.clone());
        }
        (k, Self::new(self.var, self.coeffs[k..].to_vec()))
    }

    /// Convert to a sparse multivariate polynomial.
    pub fn to_polynomial(&self) -> Polynomial {
        Polynomial::univariate(self.var, &self.coeffs)
    }

    /// Standard Sturm sequence `p, p', -rem(p, p'), ...`.
    pub fn sturm_sequence(&self) -> Vec<Self> {
        let mut seq = vec![self.clone()];
        if self.is_constant() {
            return seq;
        }
        seq.push(self.derivative());
        loop {
            let n = seq.len();
            let r = seq[n - 2].rem(&seq[n - 1]).neg();
            if r.is_zero() {
                break;
            }
            seq.push(r);
        }
        seq
    }

    /// Cauchy bound: every real root has absolute value strictly below it.
    pub fn cauchy_bound(&self) -> BigRational {
        if self.is_constant() {
            return BigRational::one();
        }
        let lc = self.leading_coeff().abs();
        let max = self.coeffs[..self.degree()]
            .iter()
            .map(|c| c.abs() / &lc)
            .max()
            .unwrap_or_else(BigRational::zero);
        max + BigRational::one()
    }

    /// Number of distinct real roots in `interval`.
    pub fn count_roots(&self, interval: &Interval) -> usize {
        count_roots(&self.sturm_sequence(), interval)
    }

    /// Number of distinct real roots.
    pub fn count_real_roots(&self) -> usize {
        self.count_roots(&Interval::unbounded())
    }
}

fn count_sign_changes(signs: impl Iterator<Item = Sign>) -> usize {
    let mut last = Sign::Zero;
    let mut changes = 0;
    for s in signs.filter(|s| !s.is_zero()) {
        if !last.is_zero() && s != last {
            changes += 1;
        }
        last = s;
    }
    changes
}

/// Sign variations of a Sturm sequence at a rational point.
pub fn sign_variations(seq: &[UnivariatePolynomial], x: &BigRational) -> usize {
    count_sign_changes(seq.iter().map(|p| p.sign_at(x)))
}

fn sign_variations_at_infinity(seq: &[UnivariatePolynomial], positive: bool) -> usize {
    count_sign_changes(seq.iter().map(|p| {
        let s = Sign::of(&p.leading_coeff());
        if positive || p.degree() % 2 == 0 {
            s
        } else {
            -s
        }
    }))
}

/// Number of distinct real roots of `seq[0]` in `interval`, given its Sturm
/// sequence. Respects strict, weak and infinite bounds.
pub fn count_roots(seq: &[UnivariatePolynomial], interval: &Interval) -> usize {
    let Some(p) = seq.first() else {
        return 0;
    };
    if p.is_zero() || interval.is_empty() {
        return 0;
    }
    if interval.is_point() {
        return interval
            .lower()
            .map_or(0, |v| usize::from(p.sign_at(v).is_zero()));
    }
    let va = match interval.lower() {
        Some(a) => sign_variations(seq, a),
        None => sign_variations_at_infinity(seq, false),
    };
    let vb = match interval.upper() {
        Some(b) => sign_variations(seq, b),
        None => sign_variations_at_infinity(seq, true),
    };
    // Roots in (a, b].
    let mut count = va.saturating_sub(vb);
    if let Some(b) = interval.upper() {
        if interval.upper_type() == crate::interval::BoundType::Strict && p.sign_at(b).is_zero() {
            count = count.saturating_sub(1);
        }
    }
    if let Some(a) = interval.lower() {
        if interval.lower_type() == crate::interval::BoundType::Weak && p.sign_at(a).is_zero() {
            count += 1;
        }
    }
    count
}

impl fmt::Debug for UnivariatePolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&self.to_polynomial(), f)
    }
}

impl fmt::Display for UnivariatePolynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.to_polynomial(), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn upoly(coeffs: &[i64]) -> UnivariatePolynomial {
        UnivariatePolynomial::new(0, coeffs.iter().map(|&c| rat(c)).collect())
    }

    #[test]
    fn test_normalization() {
        let p = upoly(&[1, 2, 0, 0]);
        assert_eq!(p.degree(), 1);
        assert!(upoly(&[0, 0]).is_zero());
    }

    #[test]
    fn test_eval_and_derivative() {
        // x^3 - 2x + 1
        let p = upoly(&[1, -2, 0, 1]);
        assert_eq!(p.eval(&rat(2)), rat(5));
        assert_eq!(p.derivative(), upoly(&[-2, 0, 3]));
    }

    #[test]
    fn test_div_rem() {
        // (x^3 - 1) / (x - 1) = x^2 + x + 1
        let p = upoly(&[-1, 0, 0, 1]);
        let d = upoly(&[-1, 1]);
        let (q, r) = p.div_rem(&d);
        assert_eq!(q, upoly(&[1, 1, 1]));
        assert!(r.is_zero());
    }

    #[test]
    fn test_gcd_and_square_free() {
        // (x - 1)^2 (x + 2)
        let p = upoly(&[2, -3, 0, 1]);
        assert_eq!(p.gcd(&p.derivative()), upoly(&[-1, 1]));
        assert_eq!(p.square_free_part(), upoly(&[-2, 1, 1]));
    }

    #[test]
    fn test_sturm_counts() {
        // x^2 - 2 has roots +-sqrt(2)
        let p = upoly(&[-2, 0, 1]);
        assert_eq!(p.count_real_roots(), 2);
        assert_eq!(p.count_roots(&Interval::open(rat(0), rat(2))), 1);
        assert_eq!(p.count_roots(&Interval::open(rat(-1), rat(1))), 0);
        // x^2 + 1 has none
        assert_eq!(upoly(&[1, 0, 1]).count_real_roots(), 0);
    }

    #[test]
    fn test_sturm_bound_types() {
        // (x - 1)(x - 2)
        let p = upoly(&[2, -3, 1]);
        assert_eq!(p.count_roots(&Interval::closed(rat(1), rat(2))), 2);
        assert_eq!(p.count_roots(&Interval::open(rat(1), rat(2))), 0);
        assert_eq!(
            p.count_roots(&Interval::new(
                rat(1),
                crate::interval::BoundType::Weak,
                rat(2),
                crate::interval::BoundType::Strict
            )),
            1
        );
        assert_eq!(p.count_roots(&Interval::point(rat(2))), 1);
        assert_eq!(p.count_roots(&Interval::greater_than(rat(1), true)), 1);
    }

    #[test]
    fn test_cauchy_bound() {
        let p = upoly(&[-6, 1, 1]); // roots 2 and -3
        let bound = p.cauchy_bound();
        assert!(bound > rat(3));
    }

    #[test]
    fn test_strip_zero_root() {
        let p = upoly(&[0, 0, -1, 1]);
        let (k, q) = p.strip_zero_root();
        assert_eq!(k, 2);
        assert_eq!(q, upoly(&[-1, 1]));
    }
}
