//! Constraint/sample incidence for explanation generation.
//!
//! The conflict graph is a bipartite graph between constraints (rows) and
//! full or partial sample points (columns). A cell is `true` iff the sample
//! satisfies the constraint. Reading the graph in inverted mode counts
//! conflicts instead of satisfactions, which is what the greedy UNSAT core
//! construction maximizes.
//!
//! ## Algorithms
//!
//! - Greedy set cover: repeatedly pick the constraint violated by the most
//!   uncovered samples and mark its samples covered
//!   ([`ConflictGraph::unsat_core`]).
//! - The same selection on a packed bitset ([`SelectionGraph`]).

use crate::constraint::Constraint;
use rustc_hash::FxHashMap;
use std::fmt;

/// Index of a constraint vertex.
pub type Vertex = usize;

/// Bipartite incidence between constraints and sample points.
#[derive(Debug, Clone, Default)]
pub struct ConflictGraph {
    /// `data[c][s]` is true iff sample `s` satisfies constraint `c`.
    data: Vec<Vec<bool>>,
    /// Number of satisfying samples per constraint.
    degrees: Vec<usize>,
    samples: usize,
    inverted: bool,
    /// Row of every constraint referenced through [`Self::constraint_id`].
    ids: FxHashMap<Constraint, Vertex>,
    constraints: Vec<Option<Constraint>>,
}

impl ConflictGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a graph with `m` anonymous constraint vertices.
    pub fn with_vertices(m: usize) -> Self {
        Self {
            data: vec![Vec::new(); m],
            degrees: vec![0; m],
            constraints: vec![None; m],
            ..Self::default()
        }
    }

    /// Number of constraint vertices.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Number of sample columns.
    pub fn sample_count(&self) -> usize {
        self.samples
    }

    /// Flip the read semantics of [`Self::degree`] and
    /// [`Self::max_degree_vertex`].
    pub fn invert(&mut self) {
        self.inverted = !self.inverted;
    }

    /// Check whether the graph is read inverted.
    pub fn is_inverted(&self) -> bool {
        self.inverted
    }

    /// Add an anonymous constraint vertex; it conflicts with every sample
    /// registered so far.
    pub fn add_constraint_vertex(&mut self) -> Vertex {
        self.data.push(vec![false; self.samples]);
        self.degrees.push(0);
        self.constraints.push(None);
        self.data.len() - 1
    }

    /// Remove a constraint vertex. Later vertices shift down by one.
    pub fn remove_constraint_vertex(&mut self, i: Vertex) {
        debug_assert!(i < self.data.len());
        self.data.remove(i);
        self.degrees.remove(i);
        if let Some(c) = self.constraints.remove(i) {
            self.ids.remove(&c);
        }
        for id in self.ids.values_mut() {
            if *id > i {
                *id -= 1;
            }
        }
    }

    /// The vertex of `constraint`, created on first reference.
    pub fn constraint_id(&mut self, constraint: &Constraint) -> Vertex {
        if let Some(&id) = self.ids.get(constraint) {
            return id;
        }
        let id = self.add_constraint_vertex();
        self.ids.insert(constraint.clone(), id);
        self.constraints[id] = Some(constraint.clone());
        id
    }

    /// The constraint registered for vertex `i`, if it was added by value.
    pub fn constraint(&self, i: Vertex) -> Option<&Constraint> {
        self.constraints.get(i).and_then(Option::as_ref)
    }

    /// Drop all sample columns.
    pub fn clear_sample_vertices(&mut self) {
        for row in &mut self.data {
            row.clear();
        }
        self.degrees.iter_mut().for_each(|d| *d = 0);
        self.samples = 0;
    }

    /// Register a new sample column satisfying exactly the constraints in
    /// `satisfied`.
    pub fn add_edges(&mut self, satisfied: impl IntoIterator<Item = Vertex>) {
        for row in &mut self.data {
            row.push(false);
        }
        let column = self.samples;
        self.samples += 1;
        for i in satisfied {
            debug_assert!(i < self.data.len());
            if !self.data[i][column] {
                self.data[i][column] = true;
                self.degrees[i] += 1;
            }
        }
    }

    /// Whether sample `s` satisfies constraint `i`.
    pub fn satisfies(&self, i: Vertex, s: usize) -> bool {
        self.data[i][s]
    }

    /// Number of satisfying samples of `i`, or of conflicting samples when
    /// inverted.
    pub fn degree(&self, i: Vertex) -> usize {
        debug_assert!(i < self.data.len());
        if self.inverted {
            self.data[i].len() - self.degrees[i]
        } else {
            self.degrees[i]
        }
    }

    /// The vertex with the highest [`Self::degree`].
    pub fn max_degree_vertex(&self) -> Option<Vertex> {
        (0..self.data.len()).max_by_key(|&i| (self.degree(i), std::cmp::Reverse(i)))
    }

    /// Mark every sample conflicting with `vertex` as satisfying all
    /// constraints.
    pub fn invert_conflicting_vertices(&mut self, vertex: Vertex) {
        let columns: Vec<usize> = (0..self.samples).filter(|&s| !self.data[vertex][s]).collect();
        for s in columns {
            for (row, degree) in self.data.iter_mut().zip(&mut self.degrees) {
                if !row[s] {
                    row[s] = true;
                    *degree += 1;
                }
            }
        }
    }

    /// Mark every sample satisfying `vertex` as conflicting with all
    /// constraints.
    pub fn invert_satisfying_vertices(&mut self, vertex: Vertex) {
        let columns: Vec<usize> = (0..self.samples).filter(|&s| self.data[vertex][s]).collect();
        for s in columns {
            for (row, degree) in self.data.iter_mut().zip(&mut self.degrees) {
                if row[s] {
                    row[s] = false;
                    *degree -= 1;
                }
            }
        }
    }

    /// Vertices whose conflicts cover every sample column, chosen greedily.
    ///
    /// Every sample registered during an unsatisfiable check violates some
    /// constraint, so the result is an infeasible subset of the constraints.
    pub fn unsat_core(&self) -> Vec<Vertex> {
        let mut graph = self.clone();
        if !graph.inverted {
            graph.invert();
        }
        let mut core = Vec::new();
        while let Some(v) = graph.max_degree_vertex() {
            if graph.degree(v) == 0 {
                break;
            }
            graph.invert_conflicting_vertices(v);
            core.push(v);
        }
        core.sort_unstable();
        core
    }

    /// The packed selection view of this graph.
    pub fn selection_graph(&self) -> SelectionGraph {
        let mut sel = SelectionGraph::new(self.samples);
        for row in &self.data {
            sel.add_row(row.iter().map(|satisfied| !satisfied));
        }
        sel
    }
}

impl fmt::Display for ConflictGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.data.is_empty() {
            return write!(f, "{{}}");
        }
        let suffix = if self.inverted { " (inverted)" } else { "" };
        for i in 0..self.data.len() {
            writeln!(f, "{} -> {} points adjacent{}", i, self.degree(i), suffix)?;
        }
        Ok(())
    }
}

const WORD: usize = 64;

/// Conflicts as packed bit rows, with coverage-driven row selection.
///
/// Bit `s` of row `c` is set iff constraint `c` conflicts with sample `s`.
/// Selecting a row removes it and disables every column it covered.
#[derive(Debug, Clone)]
pub struct SelectionGraph {
    rows: Vec<Option<Vec<u64>>>,
    active: Vec<u64>,
    columns: usize,
}

impl SelectionGraph {
    /// A graph with `columns` active sample columns and no rows.
    pub fn new(columns: usize) -> Self {
        let words = columns.div_ceil(WORD);
        let mut active = vec![u64::MAX; words];
        if columns % WORD != 0 {
            if let Some(last) = active.last_mut() {
                *last = (1u64 << (columns % WORD)) - 1;
            }
        }
        Self {
            rows: Vec::new(),
            active,
            columns,
        }
    }

    /// Append a row from its conflict bits.
    pub fn add_row(&mut self, bits: impl IntoIterator<Item = bool>) -> Vertex {
        let mut row = vec![0u64; self.active.len()];
        for (s, bit) in bits.into_iter().enumerate().take(self.columns) {
            if bit {
                row[s / WORD] |= 1 << (s % WORD);
            }
        }
        self.rows.push(Some(row));
        self.rows.len() - 1
    }

    /// Number of active columns covered by row `i`; zero once selected.
    pub fn coverage(&self, i: Vertex) -> usize {
        match self.rows.get(i) {
            Some(Some(row)) => row
                .iter()
                .zip(&self.active)
                .map(|(r, a)| (r & a).count_ones() as usize)
                .sum(),
            _ => 0,
        }
    }

    /// Number of columns not yet covered by a selected row.
    pub fn remaining_columns(&self) -> usize {
        self.active.iter().map(|a| a.count_ones() as usize).sum()
    }

    /// The unselected row covering the most active columns.
    pub fn max_coverage_row(&self) -> Option<Vertex> {
        (0..self.rows.len())
            .filter(|&i| self.coverage(i) > 0)
            .max_by_key(|&i| (self.coverage(i), std::cmp::Reverse(i)))
    }

    /// Remove row `i` and disable the columns it covered.
    pub fn select_constraint(&mut self, i: Vertex) {
        if let Some(slot) = self.rows.get_mut(i) {
            if let Some(row) = slot.take() {
                for (a, r) in self.active.iter_mut().zip(&row) {
                    *a &= !r;
                }
            }
        }
    }

    /// Greedy cover of all active columns. Returns `None` if some column
    /// conflicts with no row.
    pub fn cover(mut self) -> Option<Vec<Vertex>> {
        let mut selected = Vec::new();
        while self.remaining_columns() > 0 {
            let i = self.max_coverage_row()?;
            self.select_constraint(i);
            selected.push(i);
        }
        selected.sort_unstable();
        Some(selected)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph(rows: &[&[bool]]) -> ConflictGraph {
        let mut g = ConflictGraph::with_vertices(rows.len());
        let columns = rows.first().map_or(0, |r| r.len());
        for s in 0..columns {
            g.add_edges((0..rows.len()).filter(|&c| rows[c][s]));
        }
        g
    }

    #[test]
    fn test_degrees() {
        let mut g = graph(&[&[true, false, true], &[false, false, true], &[true, true, true]]);
        assert_eq!(g.sample_count(), 3);
        assert_eq!(g.degree(0), 2);
        assert_eq!(g.degree(1), 1);
        assert_eq!(g.max_degree_vertex(), Some(2));
        g.invert();
        assert_eq!(g.degree(0), 1);
        assert_eq!(g.degree(1), 2);
        assert_eq!(g.max_degree_vertex(), Some(1));
    }

    #[test]
    fn test_new_vertex_conflicts_with_old_samples() {
        let mut g = graph(&[&[true, true]]);
        let v = g.add_constraint_vertex();
        assert_eq!(g.degree(v), 0);
        g.invert();
        assert_eq!(g.degree(v), 2);
    }

    #[test]
    fn test_invert_vertices() {
        let mut g = graph(&[&[true, false, false], &[false, true, false]]);
        g.invert_conflicting_vertices(0);
        // columns 1 and 2 now satisfy everything
        assert_eq!(g.degree(0), 3);
        assert_eq!(g.degree(1), 2);

        let mut g = graph(&[&[true, false, true], &[true, true, false]]);
        g.invert_satisfying_vertices(0);
        assert_eq!(g.degree(0), 0);
        assert_eq!(g.degree(1), 1);
    }

    #[test]
    fn test_remove_vertex_keeps_ids() {
        let x = Constraint::new(
            cadkit_math::Polynomial::from_var(0),
            cadkit_math::Sign::Zero,
            vec![0],
        );
        let y = Constraint::new(
            cadkit_math::Polynomial::from_var(1),
            cadkit_math::Sign::Zero,
            vec![1],
        );
        let mut g = ConflictGraph::new();
        assert_eq!(g.constraint_id(&x), 0);
        assert_eq!(g.constraint_id(&y), 1);
        assert_eq!(g.constraint_id(&x), 0);
        g.remove_constraint_vertex(0);
        assert_eq!(g.size(), 1);
        assert_eq!(g.constraint(0), Some(&y));
        assert_eq!(g.constraint_id(&y), 0);
    }

    #[test]
    fn test_unsat_core() {
        // 0 conflicts with samples 0 and 1, 2 with sample 2, 1 with sample 1
        let g = graph(&[
            &[false, false, true],
            &[true, false, true],
            &[true, true, false],
        ]);
        assert_eq!(g.unsat_core(), vec![0, 2]);
    }

    #[test]
    fn test_selection_graph_cover() {
        let g = graph(&[
            &[false, false, true, true],
            &[true, true, false, true],
            &[true, true, false, false],
        ]);
        let mut sel = g.selection_graph();
        assert_eq!(sel.remaining_columns(), 4);
        assert_eq!(sel.coverage(0), 2);
        sel.select_constraint(0);
        assert_eq!(sel.coverage(0), 0);
        assert_eq!(sel.remaining_columns(), 2);
        assert_eq!(sel.coverage(1), 1);
        assert_eq!(sel.coverage(2), 2);
        assert_eq!(g.selection_graph().cover(), Some(vec![0, 2]));
    }

    #[test]
    fn test_selection_graph_uncoverable() {
        let g = graph(&[&[true, false]]);
        assert_eq!(g.selection_graph().cover(), None);
    }
}
