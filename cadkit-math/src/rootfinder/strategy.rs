//! Split point selection for the root finder.
//!
//! The exact strategies only need the interval and the polynomial. The
//! numeric strategies approximate all complex roots in `f64` and place split
//! points halfway between neighbouring real approximations; a bad
//! approximation only costs an extra split, since every piece is recounted
//! with the exact Sturm sequence.

use super::SplittingStrategy;
use crate::interval::{simplest_between, Interval};
use crate::univariate::UnivariatePolynomial;
use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{ToPrimitive, Zero};
use std::ops::{Add, Div, Mul, Sub};

const QR_ITERATIONS: usize = 200;
const ABERTH_ITERATIONS: usize = 100;

/// Split points for `(lower, upper)`. Points outside the open interval are
/// discarded by the caller.
pub(super) fn split_points(
    strategy: SplittingStrategy,
    poly: &UnivariatePolynomial,
    lower: &BigRational,
    upper: &BigRational,
) -> Vec<BigRational> {
    let two = BigRational::from_integer(BigInt::from(2));
    match strategy {
        SplittingStrategy::Generic => vec![(lower + upper) / two],
        SplittingStrategy::BinarySample => {
            vec![Interval::open(lower.clone(), upper.clone()).sample()]
        }
        SplittingStrategy::BinaryNewton => {
            let mid = (lower + upper) / two;
            let mut points = vec![mid.clone()];
            let slope = poly.derivative().eval(&mid);
            if !slope.is_zero() {
                // Simplest rational within a width/8 of the Newton iterate.
                let newton = &mid - poly.eval(&mid) / slope;
                let radius = (upper - lower) / BigRational::from_integer(BigInt::from(8));
                let a = (&newton - &radius).max(lower + &radius);
                let b = (&newton + &radius).min(upper - &radius);
                if a <= b {
                    points.push(simplest_between(&a, &b));
                }
            }
            points
        }
        SplittingStrategy::Grid => {
            let parts = BigRational::from_integer(BigInt::from(poly.degree() + 1));
            let step = (upper - lower) / parts;
            (1..=poly.degree())
                .map(|k| lower + &step * BigRational::from_integer(BigInt::from(k)))
                .collect()
        }
        SplittingStrategy::Eigenvalues => {
            between_approximations(companion_eigenvalues(poly), lower, upper)
        }
        SplittingStrategy::Aberth => between_approximations(aberth_real_roots(poly), lower, upper),
    }
}

/// Simple rationals halfway between consecutive approximations inside the
/// interval.
fn between_approximations(
    mut approx: Vec<f64>,
    lower: &BigRational,
    upper: &BigRational,
) -> Vec<BigRational> {
    let (Some(lo), Some(hi)) = (lower.to_f64(), upper.to_f64()) else {
        return Vec::new();
    };
    approx.retain(|x| x.is_finite() && *x > lo && *x < hi);
    approx.sort_by(f64::total_cmp);
    approx.dedup();
    approx
        .windows(2)
        .filter_map(|w| {
            let mid = (w[0] + w[1]) / 2.0;
            let radius = (w[1] - w[0]) / 4.0;
            let a = BigRational::from_float(mid - radius)?;
            let b = BigRational::from_float(mid + radius)?;
            Some(simplest_between(&a, &b))
        })
        .filter(|m| m > lower && m < upper)
        .collect()
}

fn monic_f64(poly: &UnivariatePolynomial) -> Option<Vec<f64>> {
    let lc = poly.leading_coeff();
    poly.coeffs()
        .iter()
        .map(|c| (c / &lc).to_f64().filter(|x| x.is_finite()))
        .collect()
}

/// Real eigenvalues of the companion matrix, by unshifted QR iteration.
fn companion_eigenvalues(poly: &UnivariatePolynomial) -> Vec<f64> {
    let n = poly.degree();
    let Some(coeffs) = monic_f64(poly) else {
        return Vec::new();
    };
    if n == 0 {
        return Vec::new();
    }
    let mut a = vec![vec![0.0; n]; n];
    for i in 1..n {
        a[i][i - 1] = 1.0;
    }
    for (i, row) in a.iter_mut().enumerate() {
        row[n - 1] = -coeffs[i];
    }

    for _ in 0..QR_ITERATIONS {
        let (q, r) = qr_decompose(&a);
        a = mat_mul(&r, &q);
    }

    let scale = a.iter().flatten().fold(1.0f64, |m, x| m.max(x.abs()));
    let tol = 1e-9 * scale;
    let mut values = Vec::with_capacity(n);
    let mut i = 0;
    while i < n {
        if i + 1 < n && a[i + 1][i].abs() > tol {
            let trace = a[i][i] + a[i + 1][i + 1];
            let det = a[i][i] * a[i + 1][i + 1] - a[i][i + 1] * a[i + 1][i];
            let disc = trace * trace / 4.0 - det;
            if disc >= 0.0 {
                values.push(trace / 2.0 - disc.sqrt());
                values.push(trace / 2.0 + disc.sqrt());
            }
            i += 2;
        } else {
            values.push(a[i][i]);
            i += 1;
        }
    }
    values
}

fn qr_decompose(a: &[Vec<f64>]) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let n = a.len();
    let mut q = vec![vec![0.0; n]; n];
    let mut r = vec![vec![0.0; n]; n];
    for j in 0..n {
        let mut v: Vec<f64> = (0..n).map(|i| a[i][j]).collect();
        for k in 0..j {
            let dot: f64 = (0..n).map(|i| q[i][k] * v[i]).sum();
            r[k][j] = dot;
            for (i, vi) in v.iter_mut().enumerate() {
                *vi -= dot * q[i][k];
            }
        }
        let norm = v.iter().map(|x| x * x).sum::<f64>().sqrt();
        r[j][j] = norm;
        if norm > f64::EPSILON {
            for (i, vi) in v.iter().enumerate() {
                q[i][j] = vi / norm;
            }
        }
    }
    (q, r)
}

fn mat_mul(a: &[Vec<f64>], b: &[Vec<f64>]) -> Vec<Vec<f64>> {
    let n = a.len();
    (0..n)
        .map(|i| (0..n).map(|j| (0..n).map(|k| a[i][k] * b[k][j]).sum()).collect())
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Complex {
    re: f64,
    im: f64,
}

impl Complex {
    fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }

    fn norm_sqr(self) -> f64 {
        self.re * self.re + self.im * self.im
    }
}

impl Add for Complex {
    type Output = Complex;
    fn add(self, o: Complex) -> Complex {
        Complex::new(self.re + o.re, self.im + o.im)
    }
}

impl Sub for Complex {
    type Output = Complex;
    fn sub(self, o: Complex) -> Complex {
        Complex::new(self.re - o.re, self.im - o.im)
    }
}

impl Mul for Complex {
    type Output = Complex;
    fn mul(self, o: Complex) -> Complex {
        Complex::new(
            self.re * o.re - self.im * o.im,
            self.re * o.im + self.im * o.re,
        )
    }
}

impl Div for Complex {
    type Output = Complex;
    fn div(self, o: Complex) -> Complex {
        let d = o.norm_sqr();
        Complex::new(
            (self.re * o.re + self.im * o.im) / d,
            (self.im * o.re - self.re * o.im) / d,
        )
    }
}

/// Value and derivative by Horner's scheme.
fn horner(coeffs: &[f64], z: Complex) -> (Complex, Complex) {
    let mut p = Complex::new(0.0, 0.0);
    let mut dp = Complex::new(0.0, 0.0);
    for &c in coeffs.iter().rev() {
        dp = dp * z + p;
        p = p * z + Complex::new(c, 0.0);
    }
    (p, dp)
}

/// Real parts of the Aberth approximations with negligible imaginary part.
fn aberth_real_roots(poly: &UnivariatePolynomial) -> Vec<f64> {
    let n = poly.degree();
    let (Some(coeffs), Some(radius)) = (monic_f64(poly), poly.cauchy_bound().to_f64()) else {
        return Vec::new();
    };
    if n == 0 {
        return Vec::new();
    }
    let radius = radius / 2.0;
    let mut z: Vec<Complex> = (0..n)
        .map(|k| {
            let angle = std::f64::consts::TAU * (k as f64) / (n as f64) + 0.4;
            Complex::new(radius * angle.cos(), radius * angle.sin())
        })
        .collect();

    for _ in 0..ABERTH_ITERATIONS {
        let mut moved = 0.0f64;
        for i in 0..n {
            let (p, dp) = horner(&coeffs, z[i]);
            if p.norm_sqr() == 0.0 || dp.norm_sqr() == 0.0 {
                continue;
            }
            let ratio = p / dp;
            let mut sum = Complex::new(0.0, 0.0);
            for j in (0..n).filter(|&j| j != i) {
                let diff = z[i] - z[j];
                if diff.norm_sqr() > 0.0 {
                    sum = sum + Complex::new(1.0, 0.0) / diff;
                }
            }
            let step = ratio / (Complex::new(1.0, 0.0) - ratio * sum);
            if step.re.is_finite() && step.im.is_finite() {
                z[i] = z[i] - step;
                moved = moved.max(step.norm_sqr());
            }
        }
        if moved < 1e-24 {
            break;
        }
    }
    z.into_iter()
        .filter(|c| c.im.abs() <= 1e-6 * (1.0 + c.re.abs()))
        .map(|c| c.re)
        .collect()
}
