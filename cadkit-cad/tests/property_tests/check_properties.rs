//! Property-based tests for simple checks

use cadkit_cad::{Answer, Cad, Constraint};
use cadkit_math::{BigInt, BigRational, Polynomial, Sign};
use proptest::prelude::*;

fn rat(n: i64) -> BigRational {
    BigRational::from_integer(BigInt::from(n))
}

/// x - r
fn shifted(r: i64) -> Polynomial {
    Polynomial::from_coeffs_int(&[(1, &[(0, 1)]), (-r, &[])])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    /// a < x < b is satisfiable iff a < b, with a witness in between.
    #[test]
    fn open_interval(a in -20i64..20, b in -20i64..20) {
        let mut cad = Cad::new();
        let cs = [
            Constraint::new(shifted(a), Sign::Positive, vec![0]),
            Constraint::new(shifted(b), Sign::Negative, vec![0]),
        ];
        let answer = cad.check(&cs).expect("well-formed");
        if a < b {
            let point = answer.point().expect("sat");
            let x = point[0].value().expect("rational sample");
            prop_assert!(rat(a) < x && x < rat(b));
        } else {
            prop_assert_eq!(answer, Answer::Unsat);
        }
    }

    /// x^2 = k has a solution iff k >= 0, and the solution squares to k.
    #[test]
    fn square_root(k in -10i64..30) {
        let mut cad = Cad::new();
        let p = Polynomial::from_coeffs_int(&[(1, &[(0, 2)]), (-k, &[])]);
        let cs = [Constraint::new(p.clone(), Sign::Zero, vec![0])];
        let answer = cad.check(&cs).expect("well-formed");
        match answer {
            Answer::Sat(point) => {
                prop_assert!(k >= 0);
                prop_assert!(cs[0].satisfied_by(&point, &[0]));
            }
            other => {
                prop_assert!(k < 0);
                prop_assert_eq!(other, Answer::Unsat);
            }
        }
    }
}
