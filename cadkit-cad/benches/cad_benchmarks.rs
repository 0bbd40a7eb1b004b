//! Criterion benchmarks for cadkit
//!
//! These benchmarks can be run with:
//! ```bash
//! cargo bench -p cadkit-cad
//! ```

use cadkit_cad::{Cad, Constraint};
use cadkit_math::{
    real_roots, BigInt, BigRational, Interval, Polynomial, Sign, SplittingStrategy, UnivariatePolynomial,
};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

fn upoly(coeffs: &[i64]) -> UnivariatePolynomial {
    UnivariatePolynomial::new(0, coeffs.iter().map(|&c| BigRational::from_integer(BigInt::from(c))).collect())
}

/// Root isolation of (x - 1)(x - 2)...(x - 8)(x^2 - 2) per strategy
fn bench_root_isolation(c: &mut Criterion) {
    let mut group = c.benchmark_group("root_isolation");
    let p = (1..=8).fold(upoly(&[-2, 0, 1]), |acc, r| acc.mul(&upoly(&[-r, 1])));

    for strategy in [
        SplittingStrategy::Generic,
        SplittingStrategy::BinarySample,
        SplittingStrategy::Grid,
        SplittingStrategy::Eigenvalues,
        SplittingStrategy::Aberth,
    ] {
        group.bench_with_input(BenchmarkId::from_parameter(strategy), &strategy, |b, &s| {
            b.iter(|| black_box(real_roots(&p, &Interval::unbounded(), s)))
        });
    }

    group.finish();
}

/// Benchmark a fresh check of circle and line, and a repeated one
fn bench_cad_check(c: &mut Criterion) {
    let circle = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (-1, &[])]);
    let line = Polynomial::from_coeffs_int(&[(1, &[(0, 1)]), (-1, &[(1, 1)])]);
    let constraints = vec![
        Constraint::new(circle, Sign::Zero, vec![0, 1]),
        Constraint::new(line, Sign::Zero, vec![0, 1]),
    ];

    c.bench_function("cad_circle_line", |b| {
        b.iter(|| {
            let mut cad = Cad::new();
            black_box(cad.check(&constraints))
        })
    });

    let mut cad = Cad::new();
    let _ = cad.check(&constraints);
    c.bench_function("cad_circle_line_incremental", |b| b.iter(|| black_box(cad.check(&constraints))));
}

/// Benchmark an unsatisfiable check in three variables
fn bench_cad_unsat(c: &mut Criterion) {
    // x^2 + y^2 + z^2 < 1 and x + y + z > 2
    let ball = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (1, &[(1, 2)]), (1, &[(2, 2)]), (-1, &[])]);
    let plane = Polynomial::from_coeffs_int(&[(1, &[(0, 1)]), (1, &[(1, 1)]), (1, &[(2, 1)]), (-2, &[])]);
    let constraints = vec![
        Constraint::new(ball, Sign::Negative, vec![0, 1, 2]),
        Constraint::new(plane, Sign::Positive, vec![0, 1, 2]),
    ];

    c.bench_function("cad_ball_plane_unsat", |b| {
        b.iter(|| {
            let mut cad = Cad::new();
            black_box(cad.check(&constraints))
        })
    });
}

criterion_group!(benches, bench_root_isolation, bench_cad_check, bench_cad_unsat);
criterion_main!(benches);
