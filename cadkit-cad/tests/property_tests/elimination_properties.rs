//! Property-based tests for elimination set provenance

use cadkit_cad::{EliminationSet, PolyId, PolynomialOrder, Provenance};
use cadkit_math::Polynomial;
use proptest::prelude::*;

/// x - r at level 0
fn linear(r: i64) -> Polynomial {
    Polynomial::from_coeffs_int(&[(1, &[(0, 1)]), (-r, &[])])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Removing a parent erases exactly the entries it alone produced.
    #[test]
    fn remove_by_parent_erases_orphans(parents in prop::collection::vec(0u8..4, 1..12)) {
        let a = PolyId::new(9, 0);
        let b = PolyId::new(9, 1);
        let mut set = EliminationSet::new(0, 0, PolynomialOrder::default());
        let mut ids = Vec::new();
        for (i, &mask) in parents.iter().enumerate() {
            let p = linear(i as i64);
            if mask & 1 != 0 {
                set.insert(p.clone(), Provenance::Single(a), false);
            }
            if mask & 2 != 0 {
                set.insert(p.clone(), Provenance::pair(a, b), false);
            }
            if mask == 0 {
                set.insert(p.clone(), Provenance::Single(b), false);
            }
            ids.push((set.find(&p), mask));
        }
        let erased = set.remove_by_parent(a);
        for (id, mask) in ids {
            let id = id.expect("inserted");
            let orphan = mask != 0;
            prop_assert_eq!(erased.contains(&id), orphan);
            prop_assert_eq!(set.get(id).is_none(), orphan);
        }
    }

    /// Inputs survive the removal of every parent.
    #[test]
    fn inputs_survive_parent_removal(n in 1i64..8) {
        let parent = PolyId::new(9, 0);
        let mut set = EliminationSet::new(0, 0, PolynomialOrder::default());
        for r in 0..n {
            set.insert(linear(r), Provenance::Input, false);
            set.insert(linear(r), Provenance::Single(parent), false);
        }
        prop_assert!(set.remove_by_parent(parent).is_empty());
        prop_assert_eq!(set.len(), n as usize);
    }
}
