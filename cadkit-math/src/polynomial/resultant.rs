//! Polynomial Resultants and Discriminants.
//!
//! Computes resultants, discriminants and principal subresultant
//! coefficients, the building blocks of CAD projection.
//!
//! ## Algorithms
//!
//! - **Sylvester Matrix**: fraction-free (Bareiss) determinant of the
//!   Sylvester matrix; every division is exact
//! - **Subresultant PRS**: Collins' subresultant remainder sequence
//! - **Principal subresultant coefficients**: determinants of the truncated
//!   Sylvester matrices, used by Hong's projection
//!
//! ## Applications
//!
//! - Variable elimination in CAD
//! - Common root detection
//!
//! ## References
//!
//! - "Algorithms in Real Algebraic Geometry" (Basu et al., 2006)
//! - Cohen: "A Course in Computational Algebraic Number Theory", 3.3.7
//! - Z3's `math/polynomial/polynomial.cpp`

use crate::polynomial::{Polynomial, Var};
use tracing::trace;

/// Configuration for resultant computation.
#[derive(Debug, Clone, Default)]
pub struct ResultantConfig {
    /// Method to use for computation.
    pub method: ResultantMethod,
}

/// Method for resultant computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultantMethod {
    /// Bareiss determinant of the Sylvester matrix.
    #[default]
    Sylvester,
    /// Subresultant polynomial remainder sequence.
    Subresultant,
}

/// Statistics for resultant computation.
#[derive(Debug, Clone, Default)]
pub struct ResultantStats {
    /// Resultants computed.
    pub resultants_computed: u64,
    /// Discriminants computed.
    pub discriminants_computed: u64,
    /// Sylvester determinants.
    pub sylvester_determinants: u64,
    /// Subresultant PRS runs.
    pub subresultant_prs: u64,
    /// Principal subresultant coefficients computed.
    pub psc_computed: u64,
}

/// Resultant computation engine.
#[derive(Debug, Clone, Default)]
pub struct ResultantComputer {
    config: ResultantConfig,
    stats: ResultantStats,
}

impl ResultantComputer {
    /// Create a new resultant computer.
    pub fn new(config: ResultantConfig) -> Self {
        Self {
            config,
            stats: ResultantStats::default(),
        }
    }

    /// Create with default configuration.
    pub fn default_config() -> Self {
        Self::new(ResultantConfig::default())
    }

    /// Compute the resultant of two polynomials.
    ///
    /// res(p, q, x) eliminates x from the system {p(x) = 0, q(x) = 0}.
    /// Returns a polynomial in the remaining variables.
    pub fn resultant(&mut self, p: &Polynomial, q: &Polynomial, var: Var) -> Polynomial {
        self.stats.resultants_computed += 1;

        if p.is_zero() || q.is_zero() {
            return Polynomial::zero();
        }
        let deg_p = p.degree(var);
        let deg_q = q.degree(var);
        if deg_p == 0 || deg_q == 0 {
            return constant_case(p, q, var);
        }

        let result = match self.config.method {
            ResultantMethod::Sylvester => {
                self.stats.sylvester_determinants += 1;
                let matrix = sylvester_matrix(p, q, var, 0);
                match bareiss_determinant(matrix) {
                    Some(det) => det,
                    None => {
                        self.stats.subresultant_prs += 1;
                        subresultant_prs(p, q, var)
                    }
                }
            }
            ResultantMethod::Subresultant => {
                self.stats.subresultant_prs += 1;
                subresultant_prs(p, q, var)
            }
        };
        trace!(deg_p, deg_q, terms = result.num_terms(), "resultant");
        result
    }

    /// Compute the discriminant of a polynomial.
    ///
    /// disc(p, x) = (-1)^(n(n-1)/2) / lc(p) * res(p, p', x).
    /// Polynomials of degree at most one have discriminant one.
    pub fn discriminant(&mut self, p: &Polynomial, var: Var) -> Polynomial {
        self.stats.discriminants_computed += 1;

        let n = p.degree(var);
        if n <= 1 {
            return Polynomial::one();
        }
        let res = self.resultant(p, &p.derivative(var), var);
        let lc = p.leading_coeff_wrt(var);
        let disc = match res.div_exact(&lc) {
            Some(d) => d,
            None => {
                debug_assert!(false, "leading coefficient does not divide res(p, p')");
                res
            }
        };
        if (n * (n - 1) / 2) % 2 == 1 {
            -disc
        } else {
            disc
        }
    }

    /// The `j`-th principal subresultant coefficient of `p` and `q`.
    ///
    /// `psc_0` is the resultant. Defined for `j < min(deg p, deg q)`;
    /// returns zero otherwise.
    pub fn psc(&mut self, p: &Polynomial, q: &Polynomial, var: Var, j: u32) -> Polynomial {
        self.stats.psc_computed += 1;
        let m = p.degree(var);
        let n = q.degree(var);
        if j >= m.min(n) {
            return Polynomial::zero();
        }
        if j == 0 {
            return self.resultant(p, q, var);
        }
        bareiss_determinant(sylvester_matrix(p, q, var, j as usize)).unwrap_or_else(Polynomial::zero)
    }

    /// All principal subresultant coefficients `psc_0 .. psc_{k-1}` with
    /// `k = min(deg p, deg q)`.
    pub fn psc_sequence(&mut self, p: &Polynomial, q: &Polynomial, var: Var) -> Vec<Polynomial> {
        let k = p.degree(var).min(q.degree(var));
        (0..k).map(|j| self.psc(p, q, var, j)).collect()
    }

    /// Check if two polynomials have a common root in `var` (for generic
    /// values of the other variables).
    pub fn have_common_root(&mut self, p: &Polynomial, q: &Polynomial, var: Var) -> bool {
        if p == q && p.degree(var) > 0 {
            return true;
        }
        self.resultant(p, q, var).is_zero()
    }

    /// Get statistics.
    pub fn stats(&self) -> &ResultantStats {
        &self.stats
    }

    /// Reset statistics.
    pub fn reset_stats(&mut self) {
        self.stats = ResultantStats::default();
    }
}

/// Resultant when one polynomial does not contain the variable.
fn constant_case(p: &Polynomial, q: &Polynomial, var: Var) -> Polynomial {
    let deg_p = p.degree(var);
    let deg_q = q.degree(var);
    if deg_p == 0 {
        p.pow(deg_q)
    } else {
        q.pow(deg_p)
    }
}

/// The Sylvester matrix of `p` and `q`, truncated for the `j`-th
/// subresultant: `n - j` shifted rows of `p`, `m - j` shifted rows of `q`
/// and the first `m + n - 2j` columns.
fn sylvester_matrix(p: &Polynomial, q: &Polynomial, var: Var, j: usize) -> Vec<Vec<Polynomial>> {
    let a = p.coefficients(var);
    let b = q.coefficients(var);
    let m = a.len() - 1;
    let n = b.len() - 1;
    let size = m + n - 2 * j;

    let mut matrix = Vec::with_capacity(size);
    for (coeffs, deg, rows) in [(&a, m, n - j), (&b, n, m - j)] {
        for shift in 0..rows {
            let mut row = vec![Polynomial::zero(); size];
            for k in 0..=deg {
                let col = shift + k;
                if col < size {
                    row[col] = coeffs[deg - k].clone();
                }
            }
            matrix.push(row);
        }
    }
    matrix
}

/// Fraction-free Gaussian elimination. Returns `None` if an exact division
/// fails, which indicates inconsistent input.
fn bareiss_determinant(mut m: Vec<Vec<Polynomial>>) -> Option<Polynomial> {
    let n = m.len();
    if n == 0 {
        return Some(Polynomial::one());
    }
    let mut negate = false;
    let mut prev = Polynomial::one();

    for k in 0..n.saturating_sub(1) {
        if m[k][k].is_zero() {
            let Some(pivot) = (k + 1..n).find(|&i| !m[i][k].is_zero()) else {
                return Some(Polynomial::zero());
            };
            m.swap(k, pivot);
            negate = !negate;
        }
        for i in k + 1..n {
            for j in k + 1..n {
                let num = &(&m[i][j] * &m[k][k]) - &(&m[i][k] * &m[k][j]);
                m[i][j] = num.div_exact(&prev)?;
            }
            m[i][k] = Polynomial::zero();
        }
        prev = m[k][k].clone();
    }

    let det = m[n - 1][n - 1].clone();
    Some(if negate { -det } else { det })
}

/// Collins' subresultant PRS.
fn subresultant_prs(p: &Polynomial, q: &Polynomial, var: Var) -> Polynomial {
    let mut a = p.clone();
    let mut b = q.clone();
    let mut negate = false;
    if a.degree(var) < b.degree(var) {
        std::mem::swap(&mut a, &mut b);
        if a.degree(var) % 2 == 1 && b.degree(var) % 2 == 1 {
            negate = true;
        }
    }

    let mut g = Polynomial::one();
    let mut h = Polynomial::one();
    loop {
        let deg_a = a.degree(var);
        let deg_b = b.degree(var);
        let delta = deg_a - deg_b;
        if deg_a % 2 == 1 && deg_b % 2 == 1 {
            negate = !negate;
        }
        let r = a.pseudo_remainder(&b, var);
        a = b;
        let divisor = &g * &h.pow(delta);
        b = match r.div_exact(&divisor) {
            Some(quot) => quot,
            None => return Polynomial::zero(),
        };
        g = a.leading_coeff_wrt(var);
        // h = g^delta / h^(delta - 1)
        h = if delta == 0 {
            // h^(1 - 0) * g^0
            h
        } else {
            match g.pow(delta).div_exact(&h.pow(delta - 1)) {
                Some(v) => v,
                None => return Polynomial::zero(),
            }
        };
        if b.is_zero() {
            return Polynomial::zero();
        }
        if b.degree(var) == 0 {
            break;
        }
    }

    let deg_a = a.degree(var);
    let res = match b.pow(deg_a).div_exact(&h.pow(deg_a - 1)) {
        Some(v) => v,
        None => return Polynomial::zero(),
    };
    if negate {
        -res
    } else {
        res
    }
}

/// Convenience wrapper around [`ResultantComputer::resultant`].
pub fn resultant(p: &Polynomial, q: &Polynomial, var: Var) -> Polynomial {
    ResultantComputer::default_config().resultant(p, q, var)
}

/// Convenience wrapper around [`ResultantComputer::discriminant`].
pub fn discriminant(p: &Polynomial, var: Var) -> Polynomial {
    ResultantComputer::default_config().discriminant(p, var)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use num_rational::BigRational;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    fn poly(coeffs: &[(i64, &[(Var, u32)])]) -> Polynomial {
        Polynomial::from_coeffs_int(coeffs)
    }

    #[test]
    fn test_computer_creation() {
        let computer = ResultantComputer::default_config();
        assert_eq!(computer.stats().resultants_computed, 0);
    }

    #[test]
    fn test_constant_resultant() {
        let mut computer = ResultantComputer::default_config();
        let p = Polynomial::constant(rat(2));
        let q = Polynomial::univariate(0, &[rat(1), rat(0), rat(1)]);
        // res(2, x^2 + 1) = 2^2
        assert_eq!(computer.resultant(&p, &q, 0), Polynomial::constant(rat(4)));
    }

    #[test]
    fn test_resultant_univariate() {
        // res(x^2 - 1, x - 2) = (2 - 1)(2 + 1) = 3
        let p = poly(&[(1, &[(0, 2)]), (-1, &[])]);
        let q = poly(&[(1, &[(0, 1)]), (-2, &[])]);
        assert_eq!(resultant(&p, &q, 0), Polynomial::constant(rat(3)));
        // res(x - 2, x^2 - 1) = (-1)^2 * 3
        assert_eq!(resultant(&q, &p, 0), Polynomial::constant(rat(3)));
    }

    #[test]
    fn test_resultant_common_root() {
        let p = poly(&[(1, &[(0, 2)]), (-1, &[])]);
        let q = poly(&[(1, &[(0, 2)]), (-3, &[(0, 1)]), (2, &[])]);
        assert!(resultant(&p, &q, 0).is_zero());
        let mut computer = ResultantComputer::default_config();
        assert!(computer.have_common_root(&p, &q, 0));
    }

    #[test]
    fn test_resultant_circle_line() {
        // res_y(x^2 + y^2 - 1, x - y) = 2x^2 - 1
        let circle = poly(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
        let line = poly(&[(1, &[(0, 1)]), (-1, &[(1, 1)])]);
        let res = resultant(&circle, &line, 1);
        assert_eq!(res, poly(&[(2, &[(0, 2)]), (-1, &[])]));
    }

    #[test]
    fn test_methods_agree() {
        let p = poly(&[(1, &[(0, 3), (1, 1)]), (2, &[(0, 1)]), (-1, &[(1, 2)])]);
        let q = poly(&[(3, &[(0, 2)]), (-1, &[(0, 1), (1, 1)]), (5, &[])]);
        let mut sylvester = ResultantComputer::default_config();
        let mut prs = ResultantComputer::new(ResultantConfig {
            method: ResultantMethod::Subresultant,
        });
        for var in [0, 1] {
            assert_eq!(sylvester.resultant(&p, &q, var), prs.resultant(&p, &q, var));
            assert_eq!(sylvester.resultant(&q, &p, var), prs.resultant(&q, &p, var));
        }
        assert_eq!(prs.stats().subresultant_prs, 4);
    }

    #[test]
    fn test_discriminant_quadratic() {
        // disc(a x^2 + b x + c) = b^2 - 4ac for x^2 + 3x + 2: 9 - 8 = 1
        let p = poly(&[(1, &[(0, 2)]), (3, &[(0, 1)]), (2, &[])]);
        assert_eq!(discriminant(&p, 0), Polynomial::constant(rat(1)));
        // disc_y(x^2 + y^2 - 1) = -4(x^2 - 1)
        let circle = poly(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
        assert_eq!(
            discriminant(&circle, 1),
            poly(&[(-4, &[(0, 2)]), (4, &[])])
        );
    }

    #[test]
    fn test_discriminant_cubic() {
        // disc(x^3 - x) = 4
        let p = poly(&[(1, &[(0, 3)]), (-1, &[(0, 1)])]);
        assert_eq!(discriminant(&p, 0), Polynomial::constant(rat(4)));
    }

    #[test]
    fn test_discriminant_linear() {
        let mut computer = ResultantComputer::default_config();
        let p = poly(&[(1, &[(0, 1)]), (-1, &[])]);
        assert!(computer.discriminant(&p, 0).is_one());
        assert_eq!(computer.stats().discriminants_computed, 1);
    }

    #[test]
    fn test_psc() {
        let mut computer = ResultantComputer::default_config();
        let p = poly(&[(1, &[(0, 2)]), (-1, &[])]);
        let dp = p.derivative(0);
        let seq = computer.psc_sequence(&p, &dp, 0);
        assert_eq!(seq.len(), 1);
        assert_eq!(seq[0], resultant(&p, &dp, 0));
        // p and q of degree 2 share the factor x - 1, so psc_0 = 0 and
        // psc_1 != 0
        let q = poly(&[(1, &[(0, 2)]), (-3, &[(0, 1)]), (2, &[])]);
        let seq = computer.psc_sequence(&p, &q, 0);
        assert!(seq[0].is_zero());
        assert!(!seq[1].is_zero());
        assert!(computer.psc(&p, &q, 0, 2).is_zero());
    }

    #[test]
    fn test_zero_input() {
        let p = poly(&[(1, &[(0, 2)]), (-1, &[])]);
        assert!(resultant(&p, &Polynomial::zero(), 0).is_zero());
    }
}
