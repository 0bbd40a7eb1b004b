//! Hooks into the progress of a CAD.
//!
//! A [`CadObserver`] is handed to [`Cad`](crate::Cad) at construction and
//! told about every sample that is created, every sample that is checked
//! and every elimination step. [`NoopObserver`] ignores everything;
//! [`DotObserver`] collects the sample tree for rendering with Graphviz.

use crate::sample_tree::NodeId;
use cadkit_math::{Polynomial, RealAlgebraicNumber};
use rustc_hash::FxHashMap;
use std::fmt::Write as _;

/// Receiver of CAD events. Every method defaults to doing nothing.
pub trait CadObserver {
    /// `node` was created as a child of `parent` with `value`.
    fn on_sample(&mut self, parent: NodeId, node: NodeId, value: &RealAlgebraicNumber) {
        let _ = (parent, node, value);
    }

    /// The constraints decided at `node` were checked.
    fn on_check(&mut self, node: NodeId, satisfied: bool) {
        let _ = (node, satisfied);
    }

    /// `poly` of `level` was projected, yielding `produced` new polynomials.
    fn on_elimination(&mut self, level: usize, poly: &Polynomial, produced: usize) {
        let _ = (level, poly, produced);
    }

    /// The sample tree was discarded.
    fn on_reset(&mut self) {}
}

/// Observer that ignores every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl CadObserver for NoopObserver {}

/// Observer recording the sample tree as a DOT graph.
#[derive(Debug, Clone, Default)]
pub struct DotObserver {
    labels: Vec<(NodeId, String)>,
    edges: Vec<(NodeId, NodeId)>,
    checks: FxHashMap<NodeId, bool>,
    eliminations: u64,
}

impl DotObserver {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded sample nodes.
    pub fn node_count(&self) -> usize {
        self.labels.len()
    }

    /// Number of recorded elimination steps.
    pub fn elimination_count(&self) -> u64 {
        self.eliminations
    }

    /// Render the recorded tree.
    ///
    /// Nodes whose check failed are drawn red, passed ones green.
    pub fn to_dot(&self) -> String {
        let mut out = String::from("digraph samples {\n  n0 [label=\"root\", shape=point];\n");
        for (id, label) in &self.labels {
            let color = match self.checks.get(id) {
                Some(true) => ", color=green",
                Some(false) => ", color=red",
                None => "",
            };
            let _ = writeln!(out, "  n{} [label=\"{}\"{}];", id, label.replace('"', "'"), color);
        }
        for (from, to) in &self.edges {
            let _ = writeln!(out, "  n{} -> n{};", from, to);
        }
        out.push_str("}\n");
        out
    }
}

impl CadObserver for DotObserver {
    fn on_sample(&mut self, parent: NodeId, node: NodeId, value: &RealAlgebraicNumber) {
        self.labels.push((node, value.to_string()));
        self.edges.push((parent, node));
    }

    fn on_check(&mut self, node: NodeId, satisfied: bool) {
        self.checks.insert(node, satisfied);
    }

    fn on_elimination(&mut self, _level: usize, _poly: &Polynomial, _produced: usize) {
        self.eliminations += 1;
    }

    fn on_reset(&mut self) {
        self.labels.clear();
        self.edges.clear();
        self.checks.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;
    use num_rational::BigRational;

    fn rat(n: i64) -> BigRational {
        BigRational::from_integer(BigInt::from(n))
    }

    #[test]
    fn test_dot_output() {
        let mut dot = DotObserver::new();
        dot.on_sample(0, 1, &RealAlgebraicNumber::from_rational(rat(2), true));
        dot.on_sample(1, 2, &RealAlgebraicNumber::from_rational(rat(-1), false));
        dot.on_check(2, false);
        let text = dot.to_dot();
        assert!(text.starts_with("digraph samples {"));
        assert!(text.contains("n0 -> n1;"));
        assert!(text.contains("n1 -> n2;"));
        assert!(text.contains("color=red"));
        assert_eq!(dot.node_count(), 2);
        dot.on_reset();
        assert_eq!(dot.node_count(), 0);
    }
}
