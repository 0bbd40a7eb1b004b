//! Polynomial arithmetic for cylindrical algebraic decomposition.
//!
//! This module provides a sparse multivariate polynomial over the rationals.
//! Polynomials are always kept in canonical form: terms sorted by descending
//! lexicographic monomial order, like terms combined and zero coefficients
//! dropped. Structural equality and hashing therefore coincide with equality
//! of polynomials, which the elimination sets use for deduplication.
//!
//! The heavier algorithms live in submodules:
//!
//! - [`gcd`]: multivariate gcd, content, primitive and square-free parts
//! - [`resultant`]: resultants, discriminants and principal subresultant
//!   coefficients
//!
//! Reference: Z3's `math/polynomial/` directory.

pub mod gcd;
pub mod resultant;

use crate::interval::Interval;
use crate::univariate::UnivariatePolynomial;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{One, Signed, Zero};
use rustc_hash::FxHashMap;
use smallvec::SmallVec;
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::{Add, Mul, Neg, Sub};

/// Variable identifier for polynomials.
pub type Var = u32;

/// Null variable constant (indicates no variable).
pub const NULL_VAR: Var = u32::MAX;

/// Power of a variable (variable, exponent).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct VarPower {
    /// The variable identifier.
    pub var: Var,
    /// The exponent (power) of the variable.
    pub power: u32,
}

impl VarPower {
    /// Create a new variable power.
    #[inline]
    pub fn new(var: Var, power: u32) -> Self {
        Self { var, power }
    }
}

/// A monomial is a product of variables with exponents.
/// Represented as a list of (variable, power) pairs sorted by variable.
/// The unit monomial (1) is represented as an empty list.
#[derive(Clone, PartialEq, Eq)]
pub struct Monomial {
    vars: SmallVec<[VarPower; 4]>,
    total_degree: u32,
    hash: u64,
}

impl Monomial {
    /// Create the unit monomial (1).
    #[inline]
    pub fn unit() -> Self {
        Self {
            vars: SmallVec::new(),
            total_degree: 0,
            hash: 0,
        }
    }

    /// Create a monomial from a single variable with power 1.
    #[inline]
    pub fn from_var(var: Var) -> Self {
        Self::from_var_power(var, 1)
    }

    /// Create a monomial from a single variable with a given power.
    pub fn from_var_power(var: Var, power: u32) -> Self {
        if power == 0 {
            return Self::unit();
        }
        let mut vars = SmallVec::new();
        vars.push(VarPower::new(var, power));
        Self::from_sorted(vars)
    }

    /// Create a monomial from (variable, power) pairs in any order.
    pub fn from_powers(powers: impl IntoIterator<Item = (Var, u32)>) -> Self {
        let mut vars: SmallVec<[VarPower; 4]> = SmallVec::new();
        for (var, power) in powers {
            if power == 0 {
                continue;
            }
            match vars.iter_mut().find(|vp| vp.var == var) {
                Some(vp) => vp.power += power,
                None => vars.push(VarPower::new(var, power)),
            }
        }
        vars.sort_by_key(|vp| vp.var);
        Self::from_sorted(vars)
    }

    fn from_sorted(vars: SmallVec<[VarPower; 4]>) -> Self {
        let total_degree = vars.iter().map(|vp| vp.power).sum();
        let hash = compute_monomial_hash(&vars);
        Self {
            vars,
            total_degree,
            hash,
        }
    }

    /// Returns true if this is the unit monomial.
    #[inline]
    pub fn is_unit(&self) -> bool {
        self.vars.is_empty()
    }

    /// Returns the total degree of the monomial.
    #[inline]
    pub fn total_degree(&self) -> u32 {
        self.total_degree
    }

    /// Returns the variable-power pairs.
    #[inline]
    pub fn vars(&self) -> &[VarPower] {
        &self.vars
    }

    /// Returns the degree of a specific variable in this monomial.
    pub fn degree(&self, var: Var) -> u32 {
        self.vars
            .iter()
            .find(|vp| vp.var == var)
            .map(|vp| vp.power)
            .unwrap_or(0)
    }

    /// Returns the maximum variable in this monomial, or NULL_VAR if unit.
    pub fn max_var(&self) -> Var {
        self.vars.last().map(|vp| vp.var).unwrap_or(NULL_VAR)
    }

    /// Returns true if every exponent is even.
    pub fn is_square(&self) -> bool {
        self.vars.iter().all(|vp| vp.power % 2 == 0)
    }

    /// The monomial with `var` removed.
    pub fn without(&self, var: Var) -> Monomial {
        if self.degree(var) == 0 {
            return self.clone();
        }
        Self::from_sorted(self.vars.iter().filter(|vp| vp.var != var).copied().collect())
    }

    /// Multiply two monomials.
    pub fn mul(&self, other: &Monomial) -> Monomial {
        if self.is_unit() {
            return other.clone();
        }
        if other.is_unit() {
            return self.clone();
        }

        let mut vars: SmallVec<[VarPower; 4]> = SmallVec::new();
        let mut i = 0;
        let mut j = 0;
        while i < self.vars.len() && j < other.vars.len() {
            match self.vars[i].var.cmp(&other.vars[j].var) {
                Ordering::Less => {
                    vars.push(self.vars[i]);
                    i += 1;
                }
                Ordering::Greater => {
                    vars.push(other.vars[j]);
                    j += 1;
                }
                Ordering::Equal => {
                    vars.push(VarPower::new(
                        self.vars[i].var,
                        self.vars[i].power + other.vars[j].power,
                    ));
                    i += 1;
                    j += 1;
                }
            }
        }
        vars.extend_from_slice(&self.vars[i..]);
        vars.extend_from_slice(&other.vars[j..]);
        Self::from_sorted(vars)
    }

    /// Check if other divides self. Returns the quotient if it does.
    pub fn div(&self, other: &Monomial) -> Option<Monomial> {
        if other.is_unit() {
            return Some(self.clone());
        }

        let mut vars: SmallVec<[VarPower; 4]> = SmallVec::new();
        let mut j = 0;
        for vp in &self.vars {
            if j < other.vars.len() && other.vars[j].var == vp.var {
                if vp.power < other.vars[j].power {
                    return None;
                }
                let rest = vp.power - other.vars[j].power;
                if rest > 0 {
                    vars.push(VarPower::new(vp.var, rest));
                }
                j += 1;
            } else if j < other.vars.len() && other.vars[j].var < vp.var {
                return None;
            } else {
                vars.push(*vp);
            }
        }
        if j < other.vars.len() {
            return None;
        }
        Some(Self::from_sorted(vars))
    }

    /// Raise monomial to a power.
    pub fn pow(&self, n: u32) -> Monomial {
        match n {
            0 => Monomial::unit(),
            1 => self.clone(),
            _ => Self::from_sorted(
                self.vars
                    .iter()
                    .map(|vp| VarPower::new(vp.var, vp.power * n))
                    .collect(),
            ),
        }
    }

    /// Lexicographic comparison of monomials (smaller variable index is more
    /// significant).
    pub fn lex_cmp(&self, other: &Monomial) -> Ordering {
        let mut i = 0;
        let mut j = 0;
        while i < self.vars.len() && j < other.vars.len() {
            match self.vars[i].var.cmp(&other.vars[j].var) {
                Ordering::Less => return Ordering::Greater,
                Ordering::Greater => return Ordering::Less,
                Ordering::Equal => match self.vars[i].power.cmp(&other.vars[j].power) {
                    Ordering::Equal => {
                        i += 1;
                        j += 1;
                    }
                    ord => return ord,
                },
            }
        }
        if i < self.vars.len() {
            Ordering::Greater
        } else if j < other.vars.len() {
            Ordering::Less
        } else {
            Ordering::Equal
        }
    }
}

fn compute_monomial_hash(vars: &[VarPower]) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    // Must agree with `Monomial::unit()`.
    if vars.is_empty() {
        return 0;
    }
    let mut hasher = DefaultHasher::new();
    for vp in vars {
        vp.hash(&mut hasher);
    }
    hasher.finish()
}

impl Hash for Monomial {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.hash.hash(state);
    }
}

impl fmt::Debug for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_unit() {
            return write!(f, "1");
        }
        for (i, vp) in self.vars.iter().enumerate() {
            if i > 0 {
                write!(f, "*")?;
            }
            if vp.power == 1 {
                write!(f, "x{}", vp.var)?;
            } else {
                write!(f, "x{}^{}", vp.var, vp.power)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Monomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// A term is a coefficient multiplied by a monomial.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Term {
    /// The coefficient of the term.
    pub coeff: BigRational,
    /// The monomial part of the term.
    pub monomial: Monomial,
}

impl Term {
    /// Create a new term.
    #[inline]
    pub fn new(coeff: BigRational, monomial: Monomial) -> Self {
        Self { coeff, monomial }
    }

    /// Create a constant term.
    #[inline]
    pub fn constant(c: BigRational) -> Self {
        Self::new(c, Monomial::unit())
    }

    /// Check if this term is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.coeff.is_zero()
    }
}

impl fmt::Debug for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.monomial.is_unit() {
            write!(f, "{}", self.coeff)
        } else if self.coeff.is_one() {
            write!(f, "{:?}", self.monomial)
        } else if self.coeff == -BigRational::one() {
            write!(f, "-{:?}", self.monomial)
        } else {
            write!(f, "{}*{:?}", self.coeff, self.monomial)
        }
    }
}

/// A multivariate polynomial over the rationals in canonical form.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Polynomial {
    /// Terms in decreasing lexicographic order.
    terms: Vec<Term>,
}

impl Polynomial {
    /// Create the zero polynomial.
    #[inline]
    pub fn zero() -> Self {
        Self { terms: Vec::new() }
    }

    /// Create the one polynomial.
    #[inline]
    pub fn one() -> Self {
        Self::constant(BigRational::one())
    }

    /// Create a constant polynomial.
    pub fn constant(c: BigRational) -> Self {
        if c.is_zero() {
            Self::zero()
        } else {
            Self {
                terms: vec![Term::constant(c)],
            }
        }
    }

    /// Create a polynomial from a single variable.
    pub fn from_var(var: Var) -> Self {
        Self::from_var_power(var, 1)
    }

    /// Create a polynomial x^k.
    pub fn from_var_power(var: Var, power: u32) -> Self {
        Self {
            terms: vec![Term::new(
                BigRational::one(),
                Monomial::from_var_power(var, power),
            )],
        }
    }

    /// Create a polynomial from terms. Normalizes and combines like terms.
    pub fn from_terms(terms: impl IntoIterator<Item = Term>) -> Self {
        let mut poly = Self {
            terms: terms.into_iter().filter(|t| !t.is_zero()).collect(),
        };
        poly.normalize();
        poly
    }

    /// Create a polynomial from integer coefficients.
    ///
    /// Each entry is `(coefficient, [(var, power), ...])`.
    pub fn from_coeffs_int(coeffs: &[(i64, &[(Var, u32)])]) -> Self {
        Self::from_terms(coeffs.iter().map(|(c, powers)| {
            Term::new(
                BigRational::from_integer(BigInt::from(*c)),
                Monomial::from_powers(powers.iter().copied()),
            )
        }))
    }

    /// Create a univariate polynomial from coefficients.
    /// `coeffs[i]` is the coefficient of x^i.
    pub fn univariate(var: Var, coeffs: &[BigRational]) -> Self {
        Self::from_terms(
            coeffs
                .iter()
                .enumerate()
                .map(|(i, c)| Term::new(c.clone(), Monomial::from_var_power(var, i as u32))),
        )
    }

    /// Build `sum_k coeffs[k] * var^k` from polynomial coefficients.
    pub fn from_coefficients(var: Var, coeffs: &[Polynomial]) -> Self {
        let terms = coeffs.iter().enumerate().flat_map(|(k, c)| {
            let shift = Monomial::from_var_power(var, k as u32);
            c.terms
                .iter()
                .map(move |t| Term::new(t.coeff.clone(), t.monomial.mul(&shift)))
        });
        Self::from_terms(terms)
    }

    /// Check if the polynomial is zero.
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.terms.is_empty()
    }

    /// Check if the polynomial contains no variables (zero included).
    #[inline]
    pub fn is_constant(&self) -> bool {
        self.terms.iter().all(|t| t.monomial.is_unit())
    }

    /// The value of a constant polynomial.
    pub fn constant_value(&self) -> Option<BigRational> {
        if self.is_zero() {
            Some(BigRational::zero())
        } else if self.is_constant() {
            Some(self.terms[0].coeff.clone())
        } else {
            None
        }
    }

    /// Check if the polynomial is one.
    pub fn is_one(&self) -> bool {
        self.terms.len() == 1 && self.terms[0].monomial.is_unit() && self.terms[0].coeff.is_one()
    }

    /// Get the number of terms.
    #[inline]
    pub fn num_terms(&self) -> usize {
        self.terms.len()
    }

    /// Get the terms.
    #[inline]
    pub fn terms(&self) -> &[Term] {
        &self.terms
    }

    /// Get the total degree of the polynomial.
    pub fn total_degree(&self) -> u32 {
        self.terms
            .iter()
            .map(|t| t.monomial.total_degree())
            .max()
            .unwrap_or(0)
    }

    /// Get the degree with respect to a specific variable.
    pub fn degree(&self, var: Var) -> u32 {
        self.terms
            .iter()
            .map(|t| t.monomial.degree(var))
            .max()
            .unwrap_or(0)
    }

    /// Check whether the variable occurs in the polynomial.
    pub fn has_var(&self, var: Var) -> bool {
        self.terms.iter().any(|t| t.monomial.degree(var) > 0)
    }

    /// Get the maximum variable in the polynomial, or NULL_VAR if constant.
    pub fn max_var(&self) -> Var {
        self.terms
            .iter()
            .map(|t| t.monomial.max_var())
            .filter(|&v| v != NULL_VAR)
            .max()
            .unwrap_or(NULL_VAR)
    }

    /// Get all variables in the polynomial, sorted.
    pub fn vars(&self) -> Vec<Var> {
        let mut vars: Vec<Var> = self
            .terms
            .iter()
            .flat_map(|t| t.monomial.vars().iter().map(|vp| vp.var))
            .collect();
        vars.sort_unstable();
        vars.dedup();
        vars
    }

    /// Get the leading coefficient (lexicographic order).
    pub fn leading_coeff(&self) -> BigRational {
        self.terms
            .first()
            .map(|t| t.coeff.clone())
            .unwrap_or_else(BigRational::zero)
    }

    /// Get the constant term.
    pub fn constant_term(&self) -> BigRational {
        self.terms
            .iter()
            .find(|t| t.monomial.is_unit())
            .map(|t| t.coeff.clone())
            .unwrap_or_else(BigRational::zero)
    }

    /// Get the coefficient polynomial of `var^k`.
    pub fn coeff(&self, var: Var, k: u32) -> Polynomial {
        Polynomial::from_terms(
            self.terms
                .iter()
                .filter(|t| t.monomial.degree(var) == k)
                .map(|t| Term::new(t.coeff.clone(), t.monomial.without(var))),
        )
    }

    /// All coefficients with respect to `var`; index `k` holds the
    /// coefficient of `var^k`.
    pub fn coefficients(&self, var: Var) -> Vec<Polynomial> {
        let deg = self.degree(var) as usize;
        let mut buckets: Vec<Vec<Term>> = vec![Vec::new(); deg + 1];
        for t in &self.terms {
            let d = t.monomial.degree(var) as usize;
            buckets[d].push(Term::new(t.coeff.clone(), t.monomial.without(var)));
        }
        buckets.into_iter().map(Polynomial::from_terms).collect()
    }

    /// Get the leading coefficient with respect to variable x.
    pub fn leading_coeff_wrt(&self, var: Var) -> Polynomial {
        self.coeff(var, self.degree(var))
    }

    /// Drop the leading term with respect to `var`.
    pub fn reductum(&self, var: Var) -> Polynomial {
        let d = self.degree(var);
        Polynomial {
            terms: self
                .terms
                .iter()
                .filter(|t| t.monomial.degree(var) != d)
                .cloned()
                .collect(),
        }
    }

    fn normalize(&mut self) {
        if self.terms.is_empty() {
            return;
        }
        self.terms.sort_by(|a, b| b.monomial.lex_cmp(&a.monomial));

        let mut merged: Vec<Term> = Vec::with_capacity(self.terms.len());
        for term in self.terms.drain(..) {
            match merged.last_mut() {
                Some(last) if last.monomial == term.monomial => last.coeff += term.coeff,
                _ => merged.push(term),
            }
        }
        merged.retain(|t| !t.coeff.is_zero());
        self.terms = merged;
    }

    /// Negate the polynomial.
    pub fn neg(&self) -> Polynomial {
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|t| Term::new(-t.coeff.clone(), t.monomial.clone()))
                .collect(),
        }
    }

    /// Add two polynomials.
    pub fn add(&self, other: &Polynomial) -> Polynomial {
        let mut terms = Vec::with_capacity(self.terms.len() + other.terms.len());
        terms.extend(self.terms.iter().cloned());
        terms.extend(other.terms.iter().cloned());
        Polynomial::from_terms(terms)
    }

    /// Subtract two polynomials.
    pub fn sub(&self, other: &Polynomial) -> Polynomial {
        self.add(&other.neg())
    }

    /// Multiply by a scalar.
    pub fn scale(&self, c: &BigRational) -> Polynomial {
        if c.is_zero() {
            return Polynomial::zero();
        }
        if c.is_one() {
            return self.clone();
        }
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|t| Term::new(&t.coeff * c, t.monomial.clone()))
                .collect(),
        }
    }

    /// Multiply two polynomials.
    pub fn mul(&self, other: &Polynomial) -> Polynomial {
        if self.is_zero() || other.is_zero() {
            return Polynomial::zero();
        }
        let mut terms: Vec<Term> = Vec::with_capacity(self.terms.len() * other.terms.len());
        for t1 in &self.terms {
            for t2 in &other.terms {
                terms.push(Term::new(
                    &t1.coeff * &t2.coeff,
                    t1.monomial.mul(&t2.monomial),
                ));
            }
        }
        Polynomial::from_terms(terms)
    }

    /// Multiply by a monomial.
    pub fn mul_monomial(&self, m: &Monomial) -> Polynomial {
        if m.is_unit() {
            return self.clone();
        }
        // Multiplying every term by the same monomial preserves the order.
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|t| Term::new(t.coeff.clone(), t.monomial.mul(m)))
                .collect(),
        }
    }

    /// Compute p^k.
    pub fn pow(&self, k: u32) -> Polynomial {
        if k == 0 {
            return Polynomial::one();
        }
        if k == 1 || self.is_zero() {
            return self.clone();
        }
        let mut result = Polynomial::one();
        let mut base = self.clone();
        let mut exp = k;
        while exp > 0 {
            if exp & 1 == 1 {
                result = Polynomial::mul(&result, &base);
            }
            exp >>= 1;
            if exp > 0 {
                base = Polynomial::mul(&base, &base);
            }
        }
        result
    }

    /// Compute the derivative with respect to a variable.
    pub fn derivative(&self, var: Var) -> Polynomial {
        Polynomial::from_terms(self.terms.iter().filter_map(|t| {
            let d = t.monomial.degree(var);
            if d == 0 {
                return None;
            }
            let shifted = t
                .monomial
                .div(&Monomial::from_var(var))
                .unwrap_or_else(Monomial::unit);
            Some(Term::new(
                &t.coeff * BigRational::from_integer(BigInt::from(d)),
                shifted,
            ))
        }))
    }

    /// Substitute a rational value for a variable.
    pub fn eval_at(&self, var: Var, value: &BigRational) -> Polynomial {
        if !self.has_var(var) {
            return self.clone();
        }
        Polynomial::from_terms(self.terms.iter().map(|t| {
            let d = t.monomial.degree(var);
            if d == 0 {
                t.clone()
            } else {
                Term::new(&t.coeff * pow_rational(value, d), t.monomial.without(var))
            }
        }))
    }

    /// Evaluate the polynomial completely. Returns `None` if a variable of
    /// the polynomial is not assigned.
    pub fn eval(&self, assignment: &FxHashMap<Var, BigRational>) -> Option<BigRational> {
        let mut result = BigRational::zero();
        for term in &self.terms {
            let mut val = term.coeff.clone();
            for vp in term.monomial.vars() {
                val *= pow_rational(assignment.get(&vp.var)?, vp.power);
            }
            result += val;
        }
        Some(result)
    }

    /// Evaluate over a box of intervals. Returns `None` if a variable of the
    /// polynomial has no interval.
    pub fn eval_interval(&self, boxes: &FxHashMap<Var, Interval>) -> Option<Interval> {
        let mut result = Interval::point(BigRational::zero());
        for term in &self.terms {
            let mut val = Interval::point(term.coeff.clone());
            for vp in term.monomial.vars() {
                val = &val * &boxes.get(&vp.var)?.pow(vp.power);
            }
            result = &result + &val;
        }
        Some(result)
    }

    /// Substitute a polynomial for a variable.
    pub fn substitute(&self, var: Var, replacement: &Polynomial) -> Polynomial {
        if !self.has_var(var) {
            return self.clone();
        }
        let coeffs = self.coefficients(var);
        // Horner scheme in `var`.
        let mut result = Polynomial::zero();
        for c in coeffs.iter().rev() {
            result = &(&result * replacement) + c;
        }
        result
    }

    /// Exact division. Returns `None` if `divisor` does not divide `self`.
    ///
    /// Uses the leading term of the canonical order: for a single divisor,
    /// `lt(q * d) = lt(q) * lt(d)`, so a non-divisible leading term proves
    /// that the division is not exact.
    pub fn div_exact(&self, divisor: &Polynomial) -> Option<Polynomial> {
        if divisor.is_zero() {
            return None;
        }
        if self.is_zero() {
            return Some(Polynomial::zero());
        }
        if let Some(c) = divisor.constant_value() {
            return Some(self.scale(&(BigRational::one() / c)));
        }

        let lead = &divisor.terms[0];
        let mut rem = self.clone();
        let mut quotient = Vec::new();
        while let Some(t) = rem.terms.first() {
            let mono = t.monomial.div(&lead.monomial)?;
            let q = Term::new(&t.coeff / &lead.coeff, mono);
            rem = Polynomial::sub(&rem, &divisor.mul_term(&q));
            quotient.push(q);
        }
        Some(Polynomial::from_terms(quotient))
    }

    fn mul_term(&self, t: &Term) -> Polynomial {
        Polynomial {
            terms: self
                .terms
                .iter()
                .map(|s| Term::new(&s.coeff * &t.coeff, s.monomial.mul(&t.monomial)))
                .collect(),
        }
    }

    /// Pseudo-remainder with respect to `var`.
    ///
    /// Returns `r` with `lc(b)^(m - n + 1) * a = q * b + r` and
    /// `deg_var(r) < deg_var(b)`, where `m` and `n` are the degrees of `a`
    /// and `b`. Returns `a` unchanged if `m < n`.
    pub fn pseudo_remainder(&self, divisor: &Polynomial, var: Var) -> Polynomial {
        if divisor.is_zero() || self.is_zero() {
            return self.clone();
        }
        let deg_b = divisor.degree(var);
        let deg_a = self.degree(var);
        if deg_a < deg_b {
            return self.clone();
        }
        let lc_b = divisor.leading_coeff_wrt(var);
        let mut remaining = deg_a - deg_b + 1;
        let mut r = self.clone();
        while !r.is_zero() && r.degree(var) >= deg_b {
            let deg_r = r.degree(var);
            let lc_r = r.leading_coeff_wrt(var);
            let shift = Monomial::from_var_power(var, deg_r - deg_b);
            r = &(&r * &lc_b) - &(&divisor.mul_monomial(&shift) * &lc_r);
            remaining -= 1;
        }
        // The exponent is always deg(a) - deg(b) + 1.
        &r * &lc_b.pow(remaining)
    }

    /// Convert to a dense univariate polynomial in `var`.
    ///
    /// Returns `None` if another variable occurs.
    pub fn to_univariate(&self, var: Var) -> Option<UnivariatePolynomial> {
        let deg = self.degree(var) as usize;
        let mut coeffs = vec![BigRational::zero(); deg + 1];
        for t in &self.terms {
            let d = t.monomial.degree(var);
            if t.monomial.vars().len() > usize::from(d > 0) {
                return None;
            }
            coeffs[d as usize] += &t.coeff;
        }
        Some(UnivariatePolynomial::new(var, coeffs))
    }

    /// The rational content: a positive rational `c` such that `self / c` has
    /// coprime integer coefficients.
    pub fn content(&self) -> BigRational {
        if self.is_zero() {
            return BigRational::one();
        }
        let mut num = BigInt::zero();
        let mut den = BigInt::one();
        for t in &self.terms {
            num = num_integer::Integer::gcd(&num, t.coeff.numer());
            den = num_integer::Integer::lcm(&den, t.coeff.denom());
        }
        BigRational::new(num, den)
    }

    /// Primitive integer representative: coprime integer coefficients and a
    /// positive leading coefficient. Associates map to the same polynomial.
    pub fn primitive(&self) -> Polynomial {
        if self.is_zero() {
            return Polynomial::zero();
        }
        let mut c = self.content();
        if self.leading_coeff().is_negative() {
            c = -c;
        }
        if c.is_one() {
            return self.clone();
        }
        self.scale(&(BigRational::one() / c))
    }

    /// Check if the polynomial is positive for every real assignment.
    ///
    /// Sufficient test: all monomials are squares, all coefficients are
    /// positive and the constant term is non-zero.
    pub fn is_definitely_positive(&self) -> bool {
        !self.constant_term().is_zero()
            && self
                .terms
                .iter()
                .all(|t| t.coeff.is_positive() && t.monomial.is_square())
    }

    /// Check if the polynomial is negative for every real assignment.
    pub fn is_definitely_negative(&self) -> bool {
        self.neg().is_definitely_positive()
    }

    /// A polynomial that provably has no real zero.
    pub fn is_definite(&self) -> bool {
        self.is_definitely_positive() || self.is_definitely_negative()
    }
}

/// Raise a rational to a non-negative power.
pub(crate) fn pow_rational(base: &BigRational, exp: u32) -> BigRational {
    let mut result = BigRational::one();
    let mut b = base.clone();
    let mut e = exp;
    while e > 0 {
        if e & 1 == 1 {
            result *= &b;
        }
        e >>= 1;
        if e > 0 {
            b = &b * &b;
        }
    }
    result
}

impl Default for Polynomial {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Debug for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }
        for (i, term) in self.terms.iter().enumerate() {
            if i == 0 {
                write!(f, "{:?}", term)?;
            } else if term.coeff.is_negative() {
                write!(
                    f,
                    " - {:?}",
                    Term::new(-term.coeff.clone(), term.monomial.clone())
                )?;
            } else {
                write!(f, " + {:?}", term)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Polynomial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

impl Neg for Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Self::Output {
        Polynomial::neg(&self)
    }
}

impl Neg for &Polynomial {
    type Output = Polynomial;

    fn neg(self) -> Self::Output {
        Polynomial::neg(self)
    }
}

impl Add for Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: Self) -> Self::Output {
        Polynomial::add(&self, &rhs)
    }
}

impl Add<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn add(self, rhs: &Polynomial) -> Self::Output {
        Polynomial::add(self, rhs)
    }
}

impl Sub for Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: Self) -> Self::Output {
        Polynomial::sub(&self, &rhs)
    }
}

impl Sub<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn sub(self, rhs: &Polynomial) -> Self::Output {
        Polynomial::sub(self, rhs)
    }
}

impl Mul for Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: Self) -> Self::Output {
        Polynomial::mul(&self, &rhs)
    }
}

impl Mul<&Polynomial> for &Polynomial {
    type Output = Polynomial;

    fn mul(self, rhs: &Polynomial) -> Self::Output {
        Polynomial::mul(self, rhs)
    }
}
