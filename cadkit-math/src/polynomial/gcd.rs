//! Multivariate GCD, content and square-free decomposition.
//!
//! ## Algorithms
//!
//! 1. **Recursive content**: the content with respect to a variable is the
//!    gcd of the coefficients, which live in one variable less
//! 2. **Primitive PRS**: pseudo-remainder sequence with the content removed
//!    after every step, which keeps coefficient growth in check
//! 3. **Yun's algorithm**: square-free decomposition with respect to the
//!    main variable, combined with a recursive decomposition of the content
//!
//! All results are normalized with [`Polynomial::primitive`], so associated
//! polynomials compare equal.
//!
//! ## References
//!
//! - Geddes et al.: "Algorithms for Computer Algebra" (1992), chapter 7
//! - Z3's `math/polynomial/polynomial.cpp`

use super::{Polynomial, Var};
use tracing::trace;

impl Polynomial {
    /// The main variable used for recursive algorithms.
    fn main_var(&self, other: &Polynomial) -> Var {
        let a = self.max_var();
        let b = other.max_var();
        match (a == super::NULL_VAR, b == super::NULL_VAR) {
            (true, _) => b,
            (_, true) => a,
            _ => a.max(b),
        }
    }

    /// Greatest common divisor, normalized to a primitive integer polynomial
    /// with positive leading coefficient.
    ///
    /// `gcd(0, 0) = 0`; the gcd with a non-zero constant is `1`.
    pub fn gcd(&self, other: &Polynomial) -> Polynomial {
        if self.is_zero() {
            return other.primitive();
        }
        if other.is_zero() {
            return self.primitive();
        }
        if self.is_constant() || other.is_constant() {
            return Polynomial::one();
        }
        if self == other {
            return self.primitive();
        }

        let var = self.main_var(other);
        match (self.has_var(var), other.has_var(var)) {
            (true, false) => return self.content_wrt(var).gcd(other),
            (false, true) => return self.gcd(&other.content_wrt(var)),
            _ => {}
        }

        if let (Some(a), Some(b)) = (self.to_univariate(var), other.to_univariate(var)) {
            return a.gcd(&b).to_polynomial().primitive();
        }

        let ca = self.content_wrt(var);
        let cb = other.content_wrt(var);
        let content = ca.gcd(&cb);

        let mut a = self.exact_quotient(&ca);
        let mut b = other.exact_quotient(&cb);
        if a.degree(var) < b.degree(var) {
            std::mem::swap(&mut a, &mut b);
        }

        let mut steps = 0u32;
        let g = loop {
            steps += 1;
            let r = a.pseudo_remainder(&b, var);
            if r.is_zero() {
                break b;
            }
            if r.degree(var) == 0 {
                break Polynomial::one();
            }
            a = b;
            b = r.primitive_part_wrt(var);
        };
        trace!(steps, "primitive PRS finished");

        (&content * &g.primitive_part_wrt(var)).primitive()
    }

    /// Division that is known to be exact; falls back to `self` when it is
    /// not, which only happens on inconsistent input.
    fn exact_quotient(&self, divisor: &Polynomial) -> Polynomial {
        match self.div_exact(divisor) {
            Some(q) => q,
            None => {
                debug_assert!(false, "{:?} does not divide {:?}", divisor, self);
                self.clone()
            }
        }
    }

    /// Content with respect to `var`: the gcd of all coefficients of `var`.
    pub fn content_wrt(&self, var: Var) -> Polynomial {
        let mut coeffs = self.coefficients(var).into_iter().filter(|c| !c.is_zero());
        let Some(first) = coeffs.next() else {
            return Polynomial::zero();
        };
        let mut g = first.primitive();
        for c in coeffs {
            if g.is_one() {
                break;
            }
            g = g.gcd(&c);
        }
        g
    }

    /// Primitive part with respect to `var`.
    pub fn primitive_part_wrt(&self, var: Var) -> Polynomial {
        if self.is_zero() {
            return Polynomial::zero();
        }
        let content = self.content_wrt(var);
        self.exact_quotient(&content).primitive()
    }

    /// Square-free part: the product of the distinct irreducible factors,
    /// normalized with [`Polynomial::primitive`].
    ///
    /// Idempotent. Constants map to `1` (zero stays zero).
    pub fn square_free_part(&self) -> Polynomial {
        if self.is_zero() {
            return Polynomial::zero();
        }
        if self.is_constant() {
            return Polynomial::one();
        }
        let var = self.max_var();
        let p = self.primitive();
        let content = p.content_wrt(var);
        let pp = p.exact_quotient(&content);
        let g = pp.gcd(&pp.derivative(var));
        let reduced = pp.exact_quotient(&g);
        (&content.square_free_part() * &reduced).primitive()
    }

    /// Check whether the polynomial has no repeated non-constant factor.
    pub fn is_square_free(&self) -> bool {
        self.square_free_part() == self.primitive()
    }

    /// Square-free decomposition: pairwise coprime square-free factors with
    /// their multiplicities, such that the product of `f^k` equals the
    /// polynomial up to a rational constant.
    pub fn square_free_factors(&self) -> Vec<(Polynomial, u32)> {
        let mut result = Vec::new();
        if self.is_constant() {
            return result;
        }
        let var = self.max_var();
        let p = self.primitive();
        let content = p.content_wrt(var);
        let pp = p.exact_quotient(&content);

        // Yun's algorithm in `var`.
        let derivative = pp.derivative(var);
        let g = pp.gcd(&derivative);
        let mut c = pp.exact_quotient(&g);
        let mut d = &derivative.exact_quotient(&g) - &c.derivative(var);
        let mut k = 1u32;
        while !c.is_constant() {
            let a = c.gcd(&d);
            if !a.is_constant() {
                result.push((a.clone(), k));
            }
            c = c.exact_quotient(&a);
            d = &d.exact_quotient(&a) - &c.derivative(var);
            k += 1;
        }

        for (f, m) in content.square_free_factors() {
            match result.iter_mut().find(|(g, _)| *g == f) {
                Some(entry) => entry.1 += m,
                None => result.push((f, m)),
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn poly(coeffs: &[(i64, &[(Var, u32)])]) -> Polynomial {
        Polynomial::from_coeffs_int(coeffs)
    }

    #[test]
    fn test_gcd_univariate() {
        // gcd((x-1)(x+2), (x-1)(x-3)) = x - 1
        let a = poly(&[(1, &[(0, 2)]), (1, &[(0, 1)]), (-2, &[])]);
        let b = poly(&[(1, &[(0, 2)]), (-4, &[(0, 1)]), (3, &[])]);
        assert_eq!(a.gcd(&b), poly(&[(1, &[(0, 1)]), (-1, &[])]));
    }

    #[test]
    fn test_gcd_multivariate() {
        // gcd((x + y)(x - y), (x + y)^2) = x + y
        let s = poly(&[(1, &[(0, 1)]), (1, &[(1, 1)])]);
        let d = poly(&[(1, &[(0, 1)]), (-1, &[(1, 1)])]);
        let a = &s * &d;
        let b = &s * &s;
        assert_eq!(a.gcd(&b), s);
    }

    #[test]
    fn test_gcd_with_content() {
        // gcd(y*(x + 1), y^2*(x - 1)) = y
        let y = Polynomial::from_var(1);
        let a = &y * &poly(&[(1, &[(0, 1)]), (1, &[])]);
        let b = &(&y * &y) * &poly(&[(1, &[(0, 1)]), (-1, &[])]);
        assert_eq!(a.gcd(&b), y);
    }

    #[test]
    fn test_gcd_coprime() {
        let a = poly(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
        let b = poly(&[(1, &[(0, 1)]), (-1, &[(1, 1)])]);
        assert!(a.gcd(&b).is_one());
    }

    #[test]
    fn test_content_wrt() {
        // (y^2 - 1) x + (2y + 2) has content y + 1 w.r.t. x
        let p = poly(&[(1, &[(0, 1), (1, 2)]), (-1, &[(0, 1)]), (2, &[(1, 1)]), (2, &[])]);
        assert_eq!(p.content_wrt(0), poly(&[(1, &[(1, 1)]), (1, &[])]));
    }

    #[test]
    fn test_square_free_part() {
        // (x - 1)^2 (x + 1) -> (x - 1)(x + 1)
        let a = poly(&[(1, &[(0, 1)]), (-1, &[])]);
        let b = poly(&[(1, &[(0, 1)]), (1, &[])]);
        let p = &(&a * &a) * &b;
        let sqf = p.square_free_part();
        assert_eq!(sqf, &a * &b);
        assert_eq!(sqf.square_free_part(), sqf);
        assert!(!p.is_square_free());
    }

    #[test]
    fn test_square_free_part_multivariate() {
        // y^2 (x - y)^3 -> y (x - y)
        let y = Polynomial::from_var(1);
        let d = poly(&[(1, &[(0, 1)]), (-1, &[(1, 1)])]);
        let p = &(&y * &y) * &d.pow(3);
        assert_eq!(p.square_free_part(), (&y * &d).primitive());
    }

    #[test]
    fn test_square_free_factors() {
        // x^3 (x - 1)^2 (x + 1)
        let x = Polynomial::from_var(0);
        let a = poly(&[(1, &[(0, 1)]), (-1, &[])]);
        let b = poly(&[(1, &[(0, 1)]), (1, &[])]);
        let p = &(&x.pow(3) * &a.pow(2)) * &b;
        let mut factors = p.square_free_factors();
        factors.sort_by_key(|(_, k)| *k);
        assert_eq!(factors.len(), 3);
        assert_eq!(factors[0], (b, 1));
        assert_eq!(factors[1], (a, 2));
        assert_eq!(factors[2], (x, 3));
    }
}
