//! Property-based tests for conflict graphs

use cadkit_cad::ConflictGraph;
use proptest::prelude::*;

fn matrix() -> impl Strategy<Value = Vec<Vec<bool>>> {
    (1usize..6, 1usize..40).prop_flat_map(|(rows, columns)| {
        prop::collection::vec(prop::collection::vec(any::<bool>(), columns), rows)
    })
}

fn graph(rows: &[Vec<bool>]) -> ConflictGraph {
    let mut g = ConflictGraph::with_vertices(rows.len());
    for s in 0..rows[0].len() {
        g.add_edges((0..rows.len()).filter(|&c| rows[c][s]));
    }
    g
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    /// Satisfying and conflicting degrees add up to the sample count.
    #[test]
    fn degrees_complement(rows in matrix()) {
        let mut g = graph(&rows);
        let plain: Vec<usize> = (0..g.size()).map(|i| g.degree(i)).collect();
        g.invert();
        for (i, d) in plain.iter().enumerate() {
            prop_assert_eq!(d + g.degree(i), g.sample_count());
        }
    }

    /// Every column with some conflict is explained by the core.
    #[test]
    fn core_covers_conflicts(rows in matrix()) {
        let g = graph(&rows);
        let core = g.unsat_core();
        for s in 0..g.sample_count() {
            let conflicting = (0..g.size()).any(|c| !g.satisfies(c, s));
            let covered = core.iter().any(|&c| !g.satisfies(c, s));
            prop_assert_eq!(conflicting, covered);
        }
    }

    /// The bitset selection covers exactly when every column conflicts with
    /// some row.
    #[test]
    fn selection_cover(rows in matrix()) {
        let g = graph(&rows);
        let coverable = (0..g.sample_count()).all(|s| (0..g.size()).any(|c| !g.satisfies(c, s)));
        match g.selection_graph().cover() {
            Some(cover) => {
                prop_assert!(coverable);
                for s in 0..g.sample_count() {
                    prop_assert!(cover.iter().any(|&c| !g.satisfies(c, s)));
                }
            }
            None => prop_assert!(!coverable),
        }
    }
}
