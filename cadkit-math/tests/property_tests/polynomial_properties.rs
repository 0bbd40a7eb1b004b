//! Property-based tests for polynomial algebra

use cadkit_math::polynomial::resultant::{
    resultant, ResultantComputer, ResultantConfig, ResultantMethod,
};
use cadkit_math::polynomial::Polynomial;
use proptest::prelude::*;

fn coeff_strategy() -> impl Strategy<Value = i64> {
    -4i64..=4i64
}

/// x - r
fn linear(r: i64) -> Polynomial {
    Polynomial::from_coeffs_int(&[(1, &[(0, 1)]), (-r, &[])])
}

fn product(roots: &[i64]) -> Polynomial {
    roots
        .iter()
        .fold(Polynomial::one(), |acc, &r| &acc * &linear(r))
}

/// a*x^2 + b*x*y + c*y + d
fn bivariate(a: i64, b: i64, c: i64, d: i64) -> Polynomial {
    Polynomial::from_coeffs_int(&[
        (a, &[(0, 2)]),
        (b, &[(0, 1), (1, 1)]),
        (c, &[(1, 1)]),
        (d, &[]),
    ])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// The square-free part is square-free and idempotent.
    #[test]
    fn square_free_part_idempotent(roots in prop::collection::vec(-3i64..=3i64, 1..5)) {
        let p = product(&roots);
        let sqf = p.square_free_part();
        prop_assert!(sqf.is_square_free());
        prop_assert_eq!(sqf.square_free_part(), sqf.clone());

        let mut distinct = roots.clone();
        distinct.sort();
        distinct.dedup();
        prop_assert_eq!(sqf.degree(0) as usize, distinct.len());
    }

    /// The gcd divides both arguments.
    #[test]
    fn gcd_divides(
        common in prop::collection::vec(-3i64..=3i64, 0..3),
        a in prop::collection::vec(-3i64..=3i64, 0..3),
        b in prop::collection::vec(-3i64..=3i64, 0..3),
    ) {
        let c = product(&common);
        let p = &c * &product(&a);
        let q = &c * &product(&b);
        let g = p.gcd(&q);
        prop_assert!(p.div_exact(&g).is_some());
        prop_assert!(q.div_exact(&g).is_some());
        prop_assert!(g.degree(0) >= c.degree(0));
    }

    /// The resultant vanishes exactly when the polynomials share a root.
    #[test]
    fn resultant_detects_common_roots(
        p_roots in prop::collection::vec(-3i64..=3i64, 1..4),
        q_roots in prop::collection::vec(-3i64..=3i64, 1..4),
    ) {
        let shared = p_roots.iter().any(|r| q_roots.contains(r));
        let res = resultant(&product(&p_roots), &product(&q_roots), 0);
        prop_assert_eq!(res.is_zero(), shared);
    }

    /// Determinant and subresultant methods agree.
    #[test]
    fn resultant_methods_agree(
        a in coeff_strategy(), b in coeff_strategy(), c in coeff_strategy(), d in coeff_strategy(),
        e in coeff_strategy(), f in coeff_strategy(), g in coeff_strategy(), h in coeff_strategy(),
    ) {
        let p = bivariate(a, b, c, d);
        let q = bivariate(e, f, g, h);
        let mut sylvester = ResultantComputer::default_config();
        let mut prs = ResultantComputer::new(ResultantConfig {
            method: ResultantMethod::Subresultant,
        });
        prop_assert_eq!(sylvester.resultant(&p, &q, 0), prs.resultant(&p, &q, 0));
        prop_assert_eq!(sylvester.resultant(&p, &q, 1), prs.resultant(&p, &q, 1));
    }
}
