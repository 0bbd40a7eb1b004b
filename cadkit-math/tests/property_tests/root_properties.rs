//! Property-based tests for root isolation and real algebraic numbers

use cadkit_math::{
    real_roots, BigInt, BigRational, Interval, RealAlgebraicNumber, Sign, SplittingStrategy,
    UnivariatePolynomial,
};
use proptest::prelude::*;

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

fn upoly(coeffs: &[i64]) -> UnivariatePolynomial {
    UnivariatePolynomial::new(0, coeffs.iter().map(|&c| rat(c)).collect())
}

fn strategy() -> impl Strategy<Value = SplittingStrategy> {
    prop_oneof![
        Just(SplittingStrategy::Generic),
        Just(SplittingStrategy::BinarySample),
        Just(SplittingStrategy::BinaryNewton),
        Just(SplittingStrategy::Grid),
        Just(SplittingStrategy::Eigenvalues),
        Just(SplittingStrategy::Aberth),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// Integer roots are found exactly, once each, in ascending order.
    #[test]
    fn integer_roots_found(roots in prop::collection::vec(-6i64..=6i64, 1..5), s in strategy()) {
        let p = roots
            .iter()
            .fold(upoly(&[1]), |acc, &r| acc.mul(&upoly(&[-r, 1])));
        let found = real_roots(&p, &Interval::unbounded(), s);
        let mut expected = roots.clone();
        expected.sort();
        expected.dedup();
        let values: Vec<BigRational> = found.iter().filter_map(|r| r.value()).collect();
        prop_assert_eq!(values, expected.into_iter().map(rat).collect::<Vec<_>>());
    }

    /// Roots of (x^2 - a)(x^2 - b) are strictly ordered and stay roots under
    /// refinement.
    #[test]
    fn irrational_roots_ordered(a in 2i64..8, b in 9i64..20, s in strategy()) {
        let p = upoly(&[-a, 0, 1]).mul(&upoly(&[-b, 0, 1]));
        let found = real_roots(&p, &Interval::unbounded(), s);
        prop_assert_eq!(found.len(), 4);
        for w in found.windows(2) {
            prop_assert!(w[0] < w[1]);
        }
        for r in &found {
            r.refine();
            prop_assert_eq!(r.sgn_of(&p), Sign::Zero);
            prop_assert!(!r.interval().contains(&rat(0)));
        }
        prop_assert_eq!(found[0].sgn(), Sign::Negative);
        prop_assert_eq!(found[3].sgn(), Sign::Positive);
    }

    /// Refinement keeps a single root inside the isolating interval.
    #[test]
    fn refinement_keeps_isolation(k in 2i64..30, steps in 1usize..20) {
        prop_assume!((1..=6).all(|m| m * m != k));
        let p = upoly(&[-k, 0, 1]);
        let r = RealAlgebraicNumber::from_interval(&p, &Interval::open(rat(0), rat(k)), false).unwrap();
        for _ in 0..steps {
            r.refine();
            let interval = r.interval();
            prop_assert_eq!(p.count_roots(&interval), 1);
        }
        let below = r.rational_below();
        let above = r.rational_above();
        prop_assert!(&below * &below < rat(k));
        prop_assert!(&above * &above > rat(k));
    }

    /// Comparison with rationals matches comparison of squares.
    #[test]
    fn ordering_against_rationals(k in 2i64..30, n in -6i64..=6) {
        prop_assume!((1..=6).all(|m| m * m != k));
        let p = upoly(&[-k, 0, 1]);
        let r = RealAlgebraicNumber::from_interval(&p, &Interval::open(rat(0), rat(k)), false).unwrap();
        let q = RealAlgebraicNumber::from_rational(rat(n), false);
        let expected = n < 0 || n * n < k;
        prop_assert_eq!(q < r, expected);
        prop_assert!(q != r);
    }
}
